//! The evaluation filter: turns one depth-capped engine evaluation into
//! per-move priors and an admissible set.

use ahash::AHashMap;
use chess::ChessMove;
use evaluation::{EngineError, Evaluator};
use oracle::Position;

/// Softmax temperature over centipawn scores. 100 cp of score difference
/// costs a factor e in prior mass.
const SOFTMAX_TEMPERATURE_CP: f64 = 100.0;

/// The filter's verdict on one legal move.
#[derive(Debug, Clone, Copy)]
pub struct MoveAssessment {
    pub mv: ChessMove,
    /// Prior in [0, 1]; priors over all legal moves sum to 1.
    pub prior: f64,
    /// Admissible moves compete in selection; pruned ones never do.
    pub admissible: bool,
    /// Engine score for the move, if it appeared in the ranked list.
    pub score_cp: Option<i32>,
}

/// Evaluate `position` once at the ply cap and assess every legal move.
///
/// Ranked moves get softmax priors and are admissible unless they score
/// more than `blunder_threshold_cp` below the best sibling. Legal moves
/// outside the engine's ranked window are pruned. Two fallbacks keep the
/// search alive: an empty ranked list (engine gave only a position score)
/// and an empty admissible set both degrade to "everything admissible,
/// uniform prior".
pub fn assess_moves(
    position: &Position,
    legal: &[ChessMove],
    evaluator: &mut dyn Evaluator,
    ply_cap: u8,
    blunder_threshold_cp: i32,
) -> Result<Vec<MoveAssessment>, EngineError> {
    if legal.is_empty() {
        return Ok(Vec::new());
    }

    let evaluation = evaluator.evaluate(position, ply_cap)?;
    if evaluation.ranked.is_empty() {
        return Ok(uniform(legal));
    }

    let scores: AHashMap<ChessMove, i32> = evaluation
        .ranked
        .iter()
        .map(|ranked| (ranked.mv, ranked.score_cp))
        .collect();

    let best = evaluation
        .ranked
        .iter()
        .map(|ranked| ranked.score_cp)
        .max()
        .unwrap_or(0);

    // Softmax over the ranked scores, shifted by the best score so the
    // exponentials stay tame even near mate values.
    let normalizer: f64 = scores
        .values()
        .map(|&cp| softmax_weight(cp, best))
        .sum();

    let assessments: Vec<MoveAssessment> = legal
        .iter()
        .map(|&mv| match scores.get(&mv) {
            Some(&cp) => MoveAssessment {
                mv,
                prior: softmax_weight(cp, best) / normalizer,
                admissible: cp >= best - blunder_threshold_cp,
                score_cp: Some(cp),
            },
            None => MoveAssessment {
                mv,
                prior: 0.0,
                admissible: false,
                score_cp: None,
            },
        })
        .collect();

    if !assessments.iter().any(|a| a.admissible) {
        return Ok(uniform(legal));
    }

    Ok(assessments)
}

#[inline]
fn softmax_weight(cp: i32, best: i32) -> f64 {
    (((cp - best) as f64) / SOFTMAX_TEMPERATURE_CP).exp()
}

fn uniform(legal: &[ChessMove]) -> Vec<MoveAssessment> {
    let prior = 1.0 / legal.len() as f64;

    legal
        .iter()
        .map(|&mv| MoveAssessment {
            mv,
            prior,
            admissible: true,
            score_cp: None,
        })
        .collect()
}
