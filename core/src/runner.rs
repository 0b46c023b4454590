use std::error::Error;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use evaluation::{EngineError, Evaluator};
use indicatif::ProgressBar;
use metrics::MetricSample;
use oracle::Position;
use rayon::prelude::*;
use search::{HybridSearch, SearchConfig};
use uci::ClientPool;

/// One experiment run: the hybrid search and the reference evaluation
/// over a dataset of positions, one fresh tree per position.
pub struct Experiment {
    config: SearchConfig,
    pool: ClientPool,
    budget: Option<Duration>,
}

impl Experiment {
    pub fn new(config: SearchConfig, pool: ClientPool, budget: Option<Duration>) -> Self {
        Self {
            config,
            pool,
            budget,
        }
    }

    /// Scan the dataset with up to `jobs` positions in flight. Results
    /// keep dataset order; a raised stop flag skips the remaining
    /// positions but keeps everything already finished.
    pub fn run(
        &self,
        fens: &[String],
        jobs: usize,
        stop: Arc<AtomicBool>,
    ) -> Result<Vec<MetricSample>, Box<dyn Error>> {
        let thread_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs.max(1))
            .build()?;

        let progress = ProgressBar::new(fens.len() as u64);

        let samples: Vec<MetricSample> = thread_pool.install(|| {
            fens.par_iter()
                .filter_map(|fen| {
                    if stop.load(Ordering::Relaxed) {
                        return None;
                    }

                    let result = self.run_position(fen);
                    progress.inc(1);

                    match result {
                        Ok(sample) => sample,
                        Err(e) => {
                            log::warn!("skipping {}: {}", fen, e);
                            None
                        }
                    }
                })
                .collect()
        });

        progress.finish_and_clear();
        Ok(samples)
    }

    fn run_position(&self, fen: &str) -> Result<Option<MetricSample>, Box<dyn Error>> {
        let position = Position::from_fen(fen).map_err(|e| e.to_string())?;
        if position.is_terminal() {
            log::info!("skipping terminal position {}", fen);
            return Ok(None);
        }

        let sample = self.pool.with_client(|client| {
            client.clear_cache();

            let outcome = self.measure(client, &position, fen);

            // Nothing cached survives a search invocation.
            client.clear_cache();
            outcome
        })?;

        Ok(sample)
    }

    fn measure(
        &self,
        client: &mut uci::EvalClient,
        position: &Position,
        fen: &str,
    ) -> Result<Option<MetricSample>, EngineError> {
        client.new_game()?;

        let reference = client.evaluate(position, self.config.ply_cap)?;
        let Some(reference_move) = reference
            .best_move
            .or_else(|| reference.ranked.first().map(|r| r.mv))
        else {
            log::warn!("reference engine offered no move for {}", fen);
            return Ok(None);
        };

        let started = Instant::now();
        let outcome = HybridSearch::new(self.config.clone(), client, position.clone())
            .run_with_budget(self.budget);
        let elapsed = started.elapsed();

        let Some(hybrid_move) = outcome.best_move else {
            log::warn!("hybrid search produced no move for {}", fen);
            return Ok(None);
        };

        // The root filter and the reference share one cached evaluation,
        // so the score of the chosen move normally comes from the filter;
        // when the root fell back to uniform priors, look it up.
        let hybrid_score_cp = outcome
            .score_cp
            .or_else(|| {
                reference
                    .ranked
                    .iter()
                    .find(|r| r.mv == hybrid_move)
                    .map(|r| r.score_cp)
            })
            .unwrap_or(reference.score_cp);

        if outcome.degraded {
            log::warn!(
                "degraded search for {} ({} failed evaluations)",
                fen,
                outcome.failed_evals
            );
        }

        Ok(Some(MetricSample {
            fen: fen.to_string(),
            hybrid_move,
            hybrid_score_cp,
            elapsed,
            reference_move,
            reference_score_cp: reference.score_cp,
            degraded: outcome.degraded,
            failed_evals: outcome.failed_evals,
        }))
    }
}

/// Append-style CSV run log, one row per sample, named by timestamp.
pub fn write_run_log(dir: &Path, samples: &[MetricSample]) -> std::io::Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let timestamp = chrono::Local::now().format("%Y-%m-%d-%H:%M:%S");
    let path = dir.join(format!("{}.csv", timestamp));

    let mut file = File::create(&path)?;
    writeln!(
        file,
        "fen,hybrid_move,hybrid_cp,reference_move,reference_cp,elapsed_ms,degraded,failed_evals"
    )?;

    for sample in samples {
        writeln!(
            file,
            "{},{},{},{},{},{},{},{}",
            sample.fen,
            sample.hybrid_move,
            sample.hybrid_score_cp,
            sample.reference_move,
            sample.reference_score_cp,
            sample.elapsed.as_millis(),
            sample.degraded,
            sample.failed_evals,
        )?;
    }

    Ok(path)
}
