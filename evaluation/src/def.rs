// Evaluator interface for depth-capped position evaluation.
//
// The `evaluation` crate provides the shared interface and result types.
// Concrete implementations live in their own crates:
// - `uci` crate: external engine over the UCI protocol (the real evaluator)
// - `UniformEvaluator` here: a stub for tests and benches
//
// This separation allows `search` to depend only on the interface, while
// the `uci` crate implements it without creating a circular dependency.

use oracle::Position;

use crate::{EngineError, Evaluation};

pub trait Evaluator: Send {
    /// Evaluate a position to at most `max_ply` plies. The score is in
    /// centipawns from the side-to-move's perspective.
    fn evaluate(&mut self, position: &Position, max_ply: u8) -> Result<Evaluation, EngineError>;
}
