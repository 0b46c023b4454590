use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "Graft")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Path to a UCI engine binary used both as the move filter and as
    /// the reference evaluator.
    #[arg(long)]
    pub engine: PathBuf,

    /// Depth ceiling for tree expansion and engine evaluation, in plies.
    #[arg(long, default_value_t = 8)]
    pub ply_cap: u8,

    /// Simulations per position.
    #[arg(long, default_value_t = 200)]
    pub simulations: u32,

    /// A move scored this many centipawns below the best sibling is
    /// filtered out of selection.
    #[arg(long, default_value_t = 100)]
    pub blunder_threshold: i32,

    /// Deadline for a single engine evaluation, milliseconds.
    #[arg(long, default_value_t = 5000)]
    pub eval_timeout_ms: u64,

    /// Exploration constant in the selection formula.
    #[arg(long, default_value_t = 1.5)]
    pub exploration: f64,

    /// File with one FEN per line. Defaults to the built-in suite.
    #[arg(long)]
    pub positions: Option<PathBuf>,

    /// Wall-clock budget per position search, milliseconds.
    #[arg(long)]
    pub search_budget_ms: Option<u64>,

    /// Engine instances and concurrent positions. Defaults to the CPU count.
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Log engine protocol traffic.
    #[arg(long)]
    pub verbose: bool,
}
