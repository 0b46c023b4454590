mod client;
mod decoder;
mod encoder;
mod pool;
mod process;

pub mod commands;

pub use client::EvalClient;
pub use commands::{EngineRequest, EngineResponse, InfoLine, Score};
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use pool::ClientPool;

/// Move text an engine sends when the position has no legal moves.
pub const NULL_MOVE: &str = "(none)";
