//! The hybrid search: MCTS over an arena of positions, with the external
//! engine substituting for rollouts. The filter decides which moves may
//! be selected at all; the engine's depth-capped score values the leaves.

use std::time::{Duration, Instant};

use chess::ChessMove;
use evaluation::{value_from_cp, EngineError, Evaluator, MAX_PLY};

use crate::arena::{Arena, NodeId, NodeState};
use crate::config::SearchConfig;
use crate::filter::assess_moves;

use oracle::Position;

/// What a search invocation hands back. A degraded outcome carries the
/// best statistics gathered before evaluation failures set in; it is
/// never silently conflated with a clean one.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub best_move: Option<ChessMove>,
    /// Root-filter score of the chosen move, in centipawns, when ranked.
    pub score_cp: Option<i32>,
    /// Mean value of the chosen move, root perspective, in [-1, 1].
    pub value: f64,
    /// Simulations that completed (equals the configured count when no
    /// evaluation failed and no budget expired).
    pub simulations: u32,
    /// Nodes materialized in the tree.
    pub nodes: usize,
    pub degraded: bool,
    pub failed_evals: u32,
}

pub struct HybridSearch<'a> {
    arena: Arena,
    config: SearchConfig,
    evaluator: &'a mut dyn Evaluator,
}

impl<'a> HybridSearch<'a> {
    pub fn new(config: SearchConfig, evaluator: &'a mut dyn Evaluator, root: Position) -> Self {
        let config = SearchConfig {
            ply_cap: config.ply_cap.min(MAX_PLY),
            ..config
        };

        Self {
            arena: Arena::new(root),
            config,
            evaluator,
        }
    }

    pub fn run(&mut self) -> SearchOutcome {
        self.run_with_budget(None)
    }

    /// Run up to the configured simulation count, stopping early when the
    /// wall-clock budget expires; the root decision then uses whatever
    /// statistics have accumulated.
    pub fn run_with_budget(&mut self, budget: Option<Duration>) -> SearchOutcome {
        let deadline = budget.map(|b| Instant::now() + b);

        if let Some(value) = self.arena.get(self.arena.root()).terminal_value {
            return SearchOutcome {
                best_move: None,
                score_cp: None,
                value,
                simulations: 0,
                nodes: self.arena.len(),
                degraded: false,
                failed_evals: 0,
            };
        }

        let mut completed = 0u32;
        let mut failed_evals = 0u32;
        let mut degraded = false;

        for _ in 0..self.config.simulations {
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    log::debug!("search budget exhausted after {} simulations", completed);
                    break;
                }
            }

            match self.simulate() {
                Ok(()) => completed += 1,
                Err(EngineError::Unavailable(reason)) => {
                    failed_evals += 1;
                    degraded = true;
                    log::warn!(
                        "engine unavailable mid-search ({}); keeping {} completed simulations",
                        reason,
                        completed
                    );
                    break;
                }
                Err(e) => {
                    // Timeout or protocol noise: this simulation is void,
                    // the batch continues.
                    failed_evals += 1;
                    degraded = true;
                    log::warn!("simulation voided: {}", e);
                }
            }
        }

        let (best_move, score_cp, value) = select_root_move(&self.arena);

        SearchOutcome {
            best_move,
            score_cp,
            value,
            simulations: completed,
            nodes: self.arena.len(),
            degraded,
            failed_evals,
        }
    }

    #[inline]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// One simulation: descend, expand or cap at the frontier, value the
    /// leaf, propagate.
    fn simulate(&mut self) -> Result<(), EngineError> {
        let mut current = self.arena.root();

        let value = loop {
            if let Some(value) = self.arena.get(current).terminal_value {
                break value;
            }

            match self.arena.get(current).state {
                NodeState::Capped { value } => break value,

                NodeState::Expanded => {
                    current = self.select_child(current);
                }

                NodeState::Unexpanded => {
                    if self.expandable(current) {
                        current = self.expand(current)?;
                        break self.leaf_value(current)?;
                    }

                    // At the ply cap: fix this leaf's value once.
                    let value = self.leaf_value(current)?;
                    self.arena.get_mut(current).state = NodeState::Capped { value };
                    break value;
                }
            }
        };

        self.arena.backpropagate(current, value);
        Ok(())
    }

    /// The root always expands (a move must be chosen even at ply cap 0);
    /// everything else stops at the cap.
    #[inline]
    fn expandable(&self, id: NodeId) -> bool {
        let depth = self.arena.get(id).depth;
        depth == 0 || depth < self.config.ply_cap
    }

    /// Materialize all legal children with the filter's priors and
    /// admissibility, then descend into the admissible child with the
    /// highest prior (first in oracle order on ties).
    fn expand(&mut self, id: NodeId) -> Result<NodeId, EngineError> {
        let position = self.arena.get(id).position.clone();
        let legal = position.legal_moves();

        let assessments = assess_moves(
            &position,
            &legal,
            self.evaluator,
            self.config.ply_cap,
            self.config.blunder_threshold_cp,
        )?;

        for assessment in &assessments {
            let child_position = position
                .apply(assessment.mv)
                .expect("oracle rejected a move it generated");

            self.arena.add_child(
                id,
                assessment.mv,
                child_position,
                assessment.prior,
                assessment.admissible,
                assessment.score_cp,
            );
        }
        self.arena.get_mut(id).state = NodeState::Expanded;

        let children = &self.arena.get(id).children;
        let mut picked = children[0].1;
        let mut best_prior = f64::NEG_INFINITY;
        for &(_, child_id) in children {
            let child = self.arena.get(child_id);
            if child.admissible && child.prior > best_prior {
                best_prior = child.prior;
                picked = child_id;
            }
        }

        Ok(picked)
    }

    /// Blended selection: negated child mean (zero-sum flip) plus the
    /// prior-weighted exploration bonus, over admissible children only.
    /// A node whose children were all pruned falls back to treating them
    /// all as admissible with uniform weight.
    fn select_child(&self, id: NodeId) -> NodeId {
        let node = self.arena.get(id);
        let sqrt_parent = (node.visits.max(1) as f64).sqrt();
        let c = self.config.exploration_constant;

        let mut candidates: Vec<NodeId> = node
            .children
            .iter()
            .map(|&(_, child_id)| child_id)
            .filter(|&child_id| self.arena.get(child_id).admissible)
            .collect();

        let uniform = candidates.is_empty();
        if uniform {
            candidates = node.children.iter().map(|&(_, child_id)| child_id).collect();
        }
        let uniform_prior = 1.0 / candidates.len() as f64;

        let mut best = candidates[0];
        let mut best_score = f64::NEG_INFINITY;
        for &child_id in &candidates {
            let child = self.arena.get(child_id);

            let exploitation = if child.visits == 0 {
                0.0
            } else {
                -child.mean_value()
            };
            let prior = if uniform { uniform_prior } else { child.prior };
            let exploration = c * prior * sqrt_parent / (1.0 + child.visits as f64);

            let score = exploitation + exploration;
            if score > best_score {
                best_score = score;
                best = child_id;
            }
        }

        best
    }

    fn leaf_value(&mut self, id: NodeId) -> Result<f64, EngineError> {
        if let Some(value) = self.arena.get(id).terminal_value {
            return Ok(value);
        }

        let position = self.arena.get(id).position.clone();
        let evaluation = self.evaluator.evaluate(&position, self.config.ply_cap)?;

        Ok(value_from_cp(evaluation.score_cp))
    }
}

/// Root decision: admissible child with the most visits, ties broken by
/// mean value, then by oracle move order (strict comparisons keep the
/// earliest candidate).
pub(crate) fn select_root_move(arena: &Arena) -> (Option<ChessMove>, Option<i32>, f64) {
    let root = arena.get(arena.root());
    if root.children.is_empty() {
        return (None, None, 0.0);
    }

    let any_admissible = root
        .children
        .iter()
        .any(|&(_, id)| arena.get(id).admissible);

    let mut best: Option<(ChessMove, NodeId)> = None;
    for &(mv, id) in &root.children {
        let child = arena.get(id);
        if any_admissible && !child.admissible {
            continue;
        }

        let better = match best {
            None => true,
            Some((_, best_id)) => {
                let incumbent = arena.get(best_id);
                child.visits > incumbent.visits
                    || (child.visits == incumbent.visits
                        && -child.mean_value() > -incumbent.mean_value())
            }
        };

        if better {
            best = Some((mv, id));
        }
    }

    match best {
        Some((mv, id)) => {
            let child = arena.get(id);
            (Some(mv), child.score_cp, -child.mean_value())
        }
        None => (None, None, 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evaluation::{Evaluation, RankedMove, UniformEvaluator};
    use std::str::FromStr;

    /// Ranked answers for the root position, a flat score elsewhere.
    struct RootRankedEvaluator {
        root_key: u64,
        root: Evaluation,
    }

    impl Evaluator for RootRankedEvaluator {
        fn evaluate(
            &mut self,
            position: &Position,
            _max_ply: u8,
        ) -> Result<Evaluation, EngineError> {
            if position.key() == self.root_key {
                Ok(self.root.clone())
            } else {
                Ok(Evaluation::default())
            }
        }
    }

    /// Delegates to a uniform evaluator, injecting one error per entry in
    /// `failures` at the matching call index (1-based).
    struct FlakyEvaluator {
        inner: UniformEvaluator,
        calls: u32,
        failures: Vec<(u32, EngineError)>,
    }

    impl Evaluator for FlakyEvaluator {
        fn evaluate(
            &mut self,
            position: &Position,
            max_ply: u8,
        ) -> Result<Evaluation, EngineError> {
            self.calls += 1;
            if let Some((_, error)) = self.failures.iter().find(|(at, _)| *at == self.calls) {
                return Err(error.clone());
            }
            self.inner.evaluate(position, max_ply)
        }
    }

    fn ranked(moves: &[(&str, i32)]) -> Evaluation {
        let ranked: Vec<RankedMove> = moves
            .iter()
            .map(|&(mv, score_cp)| RankedMove {
                mv: ChessMove::from_str(mv).unwrap(),
                score_cp,
            })
            .collect();

        Evaluation {
            score_cp: ranked.first().map(|r| r.score_cp).unwrap_or(0),
            best_move: ranked.first().map(|r| r.mv),
            ranked,
        }
    }

    #[test]
    fn test_root_visits_match_simulations() {
        let mut evaluator = UniformEvaluator::new();
        let config = SearchConfig::for_testing().with_simulations(24);
        let mut search = HybridSearch::new(config, &mut evaluator, Position::startpos());

        let outcome = search.run();

        assert_eq!(outcome.simulations, 24);
        assert_eq!(search.arena().get(search.arena().root()).visits, 24);
        assert!(!outcome.degraded);
        assert_eq!(outcome.failed_evals, 0);
        assert!(outcome.best_move.is_some());
    }

    #[test]
    fn test_depth_never_exceeds_cap() {
        let mut evaluator = UniformEvaluator::new();
        let config = SearchConfig::for_testing().with_ply_cap(2).with_simulations(64);
        let mut search = HybridSearch::new(config, &mut evaluator, Position::startpos());

        search.run();

        for node in search.arena().nodes() {
            assert!(node.depth <= 2);
            if node.depth == 2 {
                assert!(node.children.is_empty());
                assert!(!matches!(node.state, NodeState::Expanded));
            }
        }
    }

    #[test]
    fn test_ply_cap_zero_caps_every_root_child() {
        let mut evaluator = UniformEvaluator::new();
        let config = SearchConfig::for_testing().with_ply_cap(0).with_simulations(40);
        let mut search = HybridSearch::new(config, &mut evaluator, Position::startpos());

        let outcome = search.run();

        assert!(outcome.best_move.is_some());
        // Root plus its 20 children, nothing deeper.
        assert_eq!(search.arena().len(), 21);
        for node in search.arena().nodes() {
            assert!(node.depth <= 1);
            if node.depth == 1 {
                assert!(node.children.is_empty());
            }
        }
    }

    #[test]
    fn test_blunder_is_never_selected_at_root() {
        let root = Position::startpos();
        let mut evaluator = RootRankedEvaluator {
            root_key: root.key(),
            root: ranked(&[("e2e4", 50), ("d2d4", 40), ("h2h4", -400)]),
        };
        let config = SearchConfig::for_testing()
            .with_ply_cap(1)
            .with_simulations(50)
            .with_blunder_threshold_cp(100);
        let mut search = HybridSearch::new(config, &mut evaluator, root);

        let outcome = search.run();

        let blunder = ChessMove::from_str("h2h4").unwrap();
        assert_ne!(outcome.best_move, Some(blunder));

        let root_node = search.arena().get(search.arena().root());
        let (_, blunder_id) = root_node
            .children
            .iter()
            .find(|(mv, _)| *mv == blunder)
            .copied()
            .unwrap();
        assert_eq!(search.arena().get(blunder_id).visits, 0);
        assert!(!search.arena().get(blunder_id).admissible);
    }

    #[test]
    fn test_chosen_move_carries_root_filter_score() {
        let root = Position::startpos();
        let mut evaluator = RootRankedEvaluator {
            root_key: root.key(),
            root: ranked(&[("e2e4", 50), ("d2d4", 40)]),
        };
        let config = SearchConfig::for_testing().with_ply_cap(1).with_simulations(30);
        let mut search = HybridSearch::new(config, &mut evaluator, root);

        let outcome = search.run();

        assert!(outcome.best_move.is_some());
        assert!(outcome.score_cp.is_some());
    }

    #[test]
    fn test_engine_unavailable_mid_search_degrades() {
        let mut evaluator = FlakyEvaluator {
            inner: UniformEvaluator::new(),
            calls: 0,
            failures: vec![(5, EngineError::Unavailable("gone".to_string()))],
        };
        let config = SearchConfig::for_testing().with_ply_cap(1).with_simulations(100);
        let mut search = HybridSearch::new(config, &mut evaluator, Position::startpos());

        let outcome = search.run();

        assert!(outcome.degraded);
        assert_eq!(outcome.failed_evals, 1);
        assert!(outcome.simulations < 100);
        assert!(outcome.best_move.is_some());
        assert_eq!(
            search.arena().get(search.arena().root()).visits,
            outcome.simulations
        );
    }

    #[test]
    fn test_unavailable_on_first_call_returns_degraded_empty() {
        let mut evaluator = FlakyEvaluator {
            inner: UniformEvaluator::new(),
            calls: 0,
            failures: vec![(1, EngineError::Unavailable("gone".to_string()))],
        };
        let config = SearchConfig::for_testing();
        let mut search = HybridSearch::new(config, &mut evaluator, Position::startpos());

        let outcome = search.run();

        assert!(outcome.degraded);
        assert!(outcome.best_move.is_none());
        assert_eq!(outcome.simulations, 0);
    }

    #[test]
    fn test_timeout_voids_one_simulation_and_continues() {
        let mut evaluator = FlakyEvaluator {
            inner: UniformEvaluator::new(),
            calls: 0,
            failures: vec![(
                3,
                EngineError::Timeout(Duration::from_millis(100)),
            )],
        };
        let config = SearchConfig::for_testing().with_ply_cap(1).with_simulations(10);
        let mut search = HybridSearch::new(config, &mut evaluator, Position::startpos());

        let outcome = search.run();

        assert!(outcome.degraded);
        assert_eq!(outcome.failed_evals, 1);
        assert_eq!(outcome.simulations, 9);
        assert_eq!(
            search.arena().get(search.arena().root()).visits,
            outcome.simulations
        );
    }

    #[test]
    fn test_terminal_root_returns_no_move() {
        let mated =
            Position::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
                .unwrap();
        let mut evaluator = UniformEvaluator::new();
        let mut search =
            HybridSearch::new(SearchConfig::for_testing(), &mut evaluator, mated);

        let outcome = search.run();

        assert!(outcome.best_move.is_none());
        assert_eq!(outcome.simulations, 0);
        assert!(!outcome.degraded);
        assert!((outcome.value + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_root_selection_prefers_visit_count() {
        let root_position = Position::startpos();
        let mut arena = Arena::new(root_position.clone());

        let e4 = ChessMove::from_str("e2e4").unwrap();
        let d4 = ChessMove::from_str("d2d4").unwrap();

        let first =
            arena.add_child(arena.root(), e4, root_position.apply(e4).unwrap(), 0.5, true, Some(10));
        let second =
            arena.add_child(arena.root(), d4, root_position.apply(d4).unwrap(), 0.5, true, Some(20));

        // 7 visits vs 3 after 10 simulations; the 3-visit child even has
        // the better mean, but visits decide.
        arena.get_mut(first).visits = 7;
        arena.get_mut(first).value_sum = -0.7;
        arena.get_mut(second).visits = 3;
        arena.get_mut(second).value_sum = -2.1;
        arena.get_mut(arena.root()).visits = 10;

        let (best_move, score_cp, value) = select_root_move(&arena);
        assert_eq!(best_move, Some(e4));
        assert_eq!(score_cp, Some(10));
        assert!((value - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_root_selection_breaks_visit_ties_by_mean() {
        let root_position = Position::startpos();
        let mut arena = Arena::new(root_position.clone());

        let e4 = ChessMove::from_str("e2e4").unwrap();
        let d4 = ChessMove::from_str("d2d4").unwrap();

        let first =
            arena.add_child(arena.root(), e4, root_position.apply(e4).unwrap(), 0.5, true, None);
        let second =
            arena.add_child(arena.root(), d4, root_position.apply(d4).unwrap(), 0.5, true, None);

        arena.get_mut(first).visits = 5;
        arena.get_mut(first).value_sum = 1.0; // root perspective -0.2
        arena.get_mut(second).visits = 5;
        arena.get_mut(second).value_sum = -1.0; // root perspective +0.2

        let (best_move, _, _) = select_root_move(&arena);
        assert_eq!(best_move, Some(d4));
    }

    #[test]
    fn test_root_selection_ignores_inadmissible_children() {
        let root_position = Position::startpos();
        let mut arena = Arena::new(root_position.clone());

        let e4 = ChessMove::from_str("e2e4").unwrap();
        let h4 = ChessMove::from_str("h2h4").unwrap();

        let good =
            arena.add_child(arena.root(), e4, root_position.apply(e4).unwrap(), 0.8, true, Some(30));
        let pruned =
            arena.add_child(arena.root(), h4, root_position.apply(h4).unwrap(), 0.2, false, Some(-300));

        arena.get_mut(good).visits = 2;
        arena.get_mut(pruned).visits = 9;

        let (best_move, _, _) = select_root_move(&arena);
        assert_eq!(best_move, Some(e4));
    }
}
