mod def;
mod error;
mod result;
mod uniform;

pub use def::Evaluator;
pub use error::EngineError;
pub use result::{value_from_cp, Evaluation, RankedMove, MATE_CP};
pub use uniform::UniformEvaluator;

/// Hard ceiling on the ply depth requested from the external engine.
/// Every configured ply cap is clamped to this bound.
pub const MAX_PLY: u8 = 8;
