pub mod assembly;
pub mod batching;
pub mod markup;
pub mod pipeline;
pub mod pronunciation;
pub mod script;
pub mod synthesis;
