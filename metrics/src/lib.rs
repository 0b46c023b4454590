mod elo;
mod report;
mod sample;
mod stats;

pub use elo::{elo_delta, expected_score, ELO_K_FACTOR};
pub use report::{score, EmptyDatasetError, MetricsReport};
pub use sample::MetricSample;
pub use stats::{mean_absolute_error, mean_squared_error, r_squared, TimingStats};
