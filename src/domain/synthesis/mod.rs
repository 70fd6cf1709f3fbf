pub mod dispatcher;
pub mod error;
pub mod routing;

pub use dispatcher::{SynthesisDispatcher, UnitAudio};
pub use error::SynthesisError;
pub use routing::{dialect_for, dialect_for_voice, route_voice, BackendFamily};
