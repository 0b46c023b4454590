use std::time::Duration;

use chess::ChessMove;

/// One dataset row: the hybrid's answer and the reference evaluator's
/// answer for the same position. Never mutated after creation.
#[derive(Debug, Clone)]
pub struct MetricSample {
    pub fen: String,

    pub hybrid_move: ChessMove,
    pub hybrid_score_cp: i32,
    pub elapsed: Duration,

    pub reference_move: ChessMove,
    pub reference_score_cp: i32,

    pub degraded: bool,
    pub failed_evals: u32,
}
