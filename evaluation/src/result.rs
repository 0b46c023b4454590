use chess::ChessMove;

/// Centipawn magnitude mate scores are saturated to, so move ordering
/// still works when the engine reports a forced mate.
pub const MATE_CP: i32 = 100_000;

/// One move from the engine's ranked list, with its score from the
/// side-to-move's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedMove {
    pub mv: ChessMove,
    pub score_cp: i32,
}

/// Result of one depth-capped evaluation. Immutable; cached by the client
/// per (position key, depth) for the duration of a single search.
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    /// Scalar score in centipawns, side-to-move perspective.
    pub score_cp: i32,

    /// The engine's preferred move, if the position has one.
    pub best_move: Option<ChessMove>,

    /// Ranked move list, best first. Empty when the engine offers only a
    /// position score; callers must then fall back to uniform priors.
    pub ranked: Vec<RankedMove>,
}

/// Map a centipawn score to a value in [-1, 1] from the same perspective,
/// through the logistic curve also used for ELO expectation:
/// value = 2 / (1 + 10^(-cp/400)) - 1.
#[inline]
pub fn value_from_cp(cp: i32) -> f64 {
    2.0 / (1.0 + 10f64.powf(-(cp as f64) / 400.0)) - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_from_cp_is_zero_at_equality() {
        assert!(value_from_cp(0).abs() < 1e-12);
    }

    #[test]
    fn test_value_from_cp_is_antisymmetric() {
        for cp in [50, 120, 400, 900, MATE_CP] {
            assert!((value_from_cp(cp) + value_from_cp(-cp)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_value_from_cp_is_monotone() {
        let mut last = -1.0;
        for cp in (-2000..=2000).step_by(100) {
            let value = value_from_cp(cp);
            assert!(value > last);
            last = value;
        }
    }

    #[test]
    fn test_mate_scores_saturate_towards_unity() {
        assert!(value_from_cp(MATE_CP) > 0.999);
        assert!(value_from_cp(-MATE_CP) < -0.999);
    }
}
