use oracle::Position;

use crate::{EngineError, Evaluation, Evaluator};

/// Evaluator that knows nothing: a flat score and no ranked list, which
/// makes the search run on pure exploration weighting. Useful for testing
/// and benchmarking the tree without an engine process.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformEvaluator {
    pub score_cp: i32,
}

impl UniformEvaluator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Evaluator for UniformEvaluator {
    fn evaluate(&mut self, _position: &Position, _max_ply: u8) -> Result<Evaluation, EngineError> {
        Ok(Evaluation {
            score_cp: self.score_cp,
            best_move: None,
            ranked: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_evaluator_has_no_ranked_list() {
        let mut evaluator = UniformEvaluator::new();
        let evaluation = evaluator.evaluate(&Position::startpos(), 8).unwrap();

        assert_eq!(evaluation.score_cp, 0);
        assert!(evaluation.best_move.is_none());
        assert!(evaluation.ranked.is_empty());
    }
}
