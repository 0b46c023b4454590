use std::time::Duration;

use evaluation::MAX_PLY;

/// Configuration for one hybrid search. These five options are the whole
/// surface; everything else is a named constant.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Depth ceiling for tree expansion and engine evaluation, in plies.
    /// Clamped to [`MAX_PLY`].
    pub ply_cap: u8,

    /// Number of simulations per search invocation.
    pub simulations: u32,

    /// A move scored more than this many centipawns below the best
    /// sibling is filtered out of selection entirely.
    pub blunder_threshold_cp: i32,

    /// Deadline for a single engine evaluation.
    pub eval_timeout: Duration,

    /// Exploration constant in the selection formula.
    pub exploration_constant: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            ply_cap: MAX_PLY,
            simulations: 200,
            blunder_threshold_cp: 100,
            eval_timeout: Duration::from_secs(5),
            exploration_constant: 1.5,
        }
    }
}

impl SearchConfig {
    /// Small, fast settings for unit tests.
    pub fn for_testing() -> Self {
        Self {
            ply_cap: 2,
            simulations: 32,
            blunder_threshold_cp: 100,
            eval_timeout: Duration::from_millis(500),
            exploration_constant: 1.5,
        }
    }

    pub fn with_ply_cap(mut self, ply_cap: u8) -> Self {
        self.ply_cap = ply_cap.min(MAX_PLY);
        self
    }

    pub fn with_simulations(mut self, simulations: u32) -> Self {
        self.simulations = simulations;
        self
    }

    pub fn with_blunder_threshold_cp(mut self, threshold: i32) -> Self {
        self.blunder_threshold_cp = threshold;
        self
    }

    pub fn with_eval_timeout(mut self, timeout: Duration) -> Self {
        self.eval_timeout = timeout;
        self
    }

    pub fn with_exploration_constant(mut self, c: f64) -> Self {
        self.exploration_constant = c;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SearchConfig::default();
        assert_eq!(config.ply_cap, MAX_PLY);
        assert_eq!(config.simulations, 200);
        assert_eq!(config.blunder_threshold_cp, 100);
        assert!((config.exploration_constant - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_ply_cap_is_clamped() {
        let config = SearchConfig::default().with_ply_cap(30);
        assert_eq!(config.ply_cap, MAX_PLY);

        let config = SearchConfig::default().with_ply_cap(0);
        assert_eq!(config.ply_cap, 0);
    }

    #[test]
    fn test_builders() {
        let config = SearchConfig::default()
            .with_simulations(800)
            .with_blunder_threshold_cp(50)
            .with_exploration_constant(2.0);

        assert_eq!(config.simulations, 800);
        assert_eq!(config.blunder_threshold_cp, 50);
        assert!((config.exploration_constant - 2.0).abs() < 1e-12);
    }
}
