use std::fmt;

use thiserror::Error;

use crate::elo::{elo_delta, expected_score};
use crate::sample::MetricSample;
use crate::stats::{mean_absolute_error, mean_squared_error, r_squared, TimingStats};

#[derive(Debug, Clone, Copy, Error)]
#[error("metrics require at least one sample")]
pub struct EmptyDatasetError;

/// Aggregate comparison of the hybrid search against the reference
/// evaluator over one dataset run.
#[derive(Debug, Clone)]
pub struct MetricsReport {
    pub samples: usize,

    /// Score-accuracy of the hybrid against the reference, centipawns.
    pub mae: f64,
    pub mse: f64,
    pub r_squared: f64,

    /// Fraction of positions where both picked the same move.
    pub move_agreement: f64,

    /// Estimated strength difference, hybrid minus reference.
    pub elo_delta: f64,

    pub timing: TimingStats,

    pub degraded_samples: usize,
    pub failed_evals: u32,
}

/// Compute the full report in one pass over the sample set.
pub fn score(samples: &[MetricSample]) -> Result<MetricsReport, EmptyDatasetError> {
    if samples.is_empty() {
        return Err(EmptyDatasetError);
    }

    let pairs: Vec<(f64, f64)> = samples
        .iter()
        .map(|s| (s.hybrid_score_cp as f64, s.reference_score_cp as f64))
        .collect();

    let agreements = samples
        .iter()
        .filter(|s| s.hybrid_move == s.reference_move)
        .count();

    // Paired outcome per sample: the logistic expectation of the
    // centipawn gap between the hybrid's move and the reference's.
    let outcomes: Vec<f64> = samples
        .iter()
        .map(|s| expected_score((s.hybrid_score_cp - s.reference_score_cp) as f64))
        .collect();

    let durations: Vec<_> = samples.iter().map(|s| s.elapsed).collect();

    Ok(MetricsReport {
        samples: samples.len(),
        mae: mean_absolute_error(&pairs),
        mse: mean_squared_error(&pairs),
        r_squared: r_squared(&pairs),
        move_agreement: agreements as f64 / samples.len() as f64,
        elo_delta: elo_delta(&outcomes),
        timing: TimingStats::from_durations(&durations),
        degraded_samples: samples.iter().filter(|s| s.degraded).count(),
        failed_evals: samples.iter().map(|s| s.failed_evals).sum(),
    })
}

impl fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Experiment Summary")?;
        writeln!(f, "==================")?;
        writeln!(f, "Positions: {}", self.samples)?;
        writeln!(f)?;
        writeln!(f, "Score accuracy vs reference:")?;
        writeln!(f, "   MAE: {:.2} cp", self.mae)?;
        writeln!(f, "   MSE: {:.2} cp^2", self.mse)?;
        writeln!(f, "   R^2: {:.4}", self.r_squared)?;
        writeln!(f)?;
        writeln!(f, "Move agreement: {:.1}%", self.move_agreement * 100.0)?;
        writeln!(f, "ELO delta (hybrid - reference): {:+.1}", self.elo_delta)?;
        writeln!(f)?;
        writeln!(f, "Search time: {}", self.timing)?;

        if self.degraded_samples > 0 {
            writeln!(f)?;
            writeln!(
                f,
                "DEGRADED: {} of {} samples ({} failed evaluations)",
                self.degraded_samples, self.samples, self.failed_evals
            )?;
        }

        Ok(())
    }
}
