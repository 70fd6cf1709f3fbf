use crate::domain::assembly::AssemblyError;
use crate::domain::synthesis::SynthesisError;

/// Top-level pipeline error surfaced to the job worker. A failed job is
/// retried whole by the caller; nothing inside the core retries.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("assembly failed: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Custom result type for the pipeline.
pub type PipelineResult<T> = Result<T, PipelineError>;
