use std::fmt;
use std::time::Duration;

/// Mean absolute error over (predicted, observed) pairs.
pub fn mean_absolute_error(pairs: &[(f64, f64)]) -> f64 {
    if pairs.is_empty() {
        return 0.0;
    }

    pairs.iter().map(|(p, o)| (p - o).abs()).sum::<f64>() / pairs.len() as f64
}

/// Mean squared error over (predicted, observed) pairs.
pub fn mean_squared_error(pairs: &[(f64, f64)]) -> f64 {
    if pairs.is_empty() {
        return 0.0;
    }

    pairs
        .iter()
        .map(|(p, o)| (p - o) * (p - o))
        .sum::<f64>()
        / pairs.len() as f64
}

/// Coefficient of determination of `predicted` against `observed`.
///
/// When the observed values have zero variance the usual definition
/// divides by zero: a perfect fit reports 1.0, anything else 0.0.
pub fn r_squared(pairs: &[(f64, f64)]) -> f64 {
    if pairs.is_empty() {
        return 0.0;
    }

    let mean_observed = pairs.iter().map(|(_, o)| o).sum::<f64>() / pairs.len() as f64;

    let ss_residual: f64 = pairs.iter().map(|(p, o)| (o - p) * (o - p)).sum();
    let ss_total: f64 = pairs
        .iter()
        .map(|(_, o)| (o - mean_observed) * (o - mean_observed))
        .sum();

    if ss_total == 0.0 {
        return if ss_residual == 0.0 { 1.0 } else { 0.0 };
    }

    1.0 - ss_residual / ss_total
}

/// Distribution summary of per-search wall-clock times.
#[derive(Debug, Clone, Copy)]
pub struct TimingStats {
    pub mean: Duration,
    pub median: Duration,
    pub p90: Duration,
    pub p99: Duration,
}

impl TimingStats {
    /// Nearest-rank percentiles over the (non-empty) set of durations.
    pub fn from_durations(durations: &[Duration]) -> Self {
        let mut sorted: Vec<Duration> = durations.to_vec();
        sorted.sort();

        let total: Duration = sorted.iter().sum();
        let mean = total / sorted.len() as u32;

        Self {
            mean,
            median: nearest_rank(&sorted, 50.0),
            p90: nearest_rank(&sorted, 90.0),
            p99: nearest_rank(&sorted, 99.0),
        }
    }
}

impl fmt::Display for TimingStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mean {:.1?}, median {:.1?}, p90 {:.1?}, p99 {:.1?}",
            self.mean, self.median, self.p90, self.p99
        )
    }
}

fn nearest_rank(sorted: &[Duration], percentile: f64) -> Duration {
    let rank = ((percentile / 100.0) * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}
