mod args;
mod positions;
mod runner;

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use args::Args;
use clap::Parser;
use log::LevelFilter;
use runner::Experiment;
use search::SearchConfig;
use simplelog::{Config, SimpleLogger};
use uci::ClientPool;

fn main() -> Result<(), Box<dyn Error>> {
    let args = init()?;

    // Set up SIGINT handler
    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_flag_handler = Arc::clone(&stop_flag);

    ctrlc::set_handler(move || {
        log::info!("Received SIGINT, finishing in-flight positions...");
        stop_flag_handler.store(true, Ordering::Relaxed);
    })?;

    let fens = match &args.positions {
        Some(path) => load_positions(path)?,
        None => positions::suite(),
    };

    let config = SearchConfig::default()
        .with_ply_cap(args.ply_cap)
        .with_simulations(args.simulations)
        .with_blunder_threshold_cp(args.blunder_threshold)
        .with_eval_timeout(Duration::from_millis(args.eval_timeout_ms))
        .with_exploration_constant(args.exploration);

    let jobs = args.jobs.unwrap_or_else(num_cpus::get).max(1);

    log::info!(
        "Running hybrid search over {} positions ({} simulations, ply cap {})",
        fens.len(),
        config.simulations,
        config.ply_cap
    );
    log::info!(
        "Connecting {} instance(s) of {}",
        jobs,
        args.engine.display()
    );

    let pool = ClientPool::connect(&args.engine, jobs, config.eval_timeout)?;
    let budget = args.search_budget_ms.map(Duration::from_millis);

    let experiment = Experiment::new(config, pool, budget);
    let samples = experiment.run(&fens, jobs, stop_flag)?;

    if samples.is_empty() {
        log::warn!("No samples collected, nothing to report");
        return Ok(());
    }

    let report = metrics::score(&samples)?;
    log::info!("\n{}", report);

    let log_path = runner::write_run_log(&PathBuf::from("logs"), &samples)?;
    log::info!("Run log written to {}", log_path.display());

    Ok(())
}

fn init() -> Result<Args, Box<dyn Error>> {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    SimpleLogger::init(level, Config::default())?;

    Ok(args)
}

fn load_positions(path: &Path) -> Result<Vec<String>, Box<dyn Error>> {
    let contents = fs::read_to_string(path)?;

    let fens: Vec<String> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();

    Ok(fens)
}
