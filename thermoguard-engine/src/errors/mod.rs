pub mod engine;
pub mod replay;

pub use engine::EngineError;
pub use replay::ReplayError;
