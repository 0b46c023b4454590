//! Search tree storage.
//!
//! Nodes live in a contiguous arena and reference each other by index,
//! so ownership stays flat: a node records its parent index and a list
//! of (move, child index) pairs in oracle move order. The whole tree is
//! dropped when the search invocation ends.

use chess::ChessMove;
use oracle::{Position, TerminalStatus};

/// Index into the node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    #[inline]
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeState {
    /// Not yet visited; no children materialized.
    Unexpanded,
    /// Children known, statistics updating.
    Expanded,
    /// At the ply cap: a leaf whose value is fixed by the evaluator.
    Capped { value: f64 },
}

#[derive(Debug, Clone)]
pub struct SearchNode {
    pub parent: NodeId,
    /// Move from the parent that led here (None for the root).
    pub mv: Option<ChessMove>,
    pub position: Position,
    pub depth: u8,
    pub state: NodeState,

    pub visits: u32,
    /// Accumulated value, side-to-move perspective at this node.
    pub value_sum: f64,
    /// Filter prior for the incoming move.
    pub prior: f64,
    /// Whether the filter admitted the incoming move into selection.
    pub admissible: bool,
    /// Engine score of the incoming move at the parent, if ranked.
    pub score_cp: Option<i32>,

    /// Fixed value for terminal positions: -1 checkmated, 0 drawn.
    pub terminal_value: Option<f64>,

    /// Children in oracle move order; empty until expanded.
    pub children: Vec<(ChessMove, NodeId)>,
}

impl SearchNode {
    #[inline]
    pub fn mean_value(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.value_sum / self.visits as f64
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.terminal_value.is_some()
    }
}

/// Fixed leaf value for a terminal position, from the perspective of the
/// side to move in it.
#[inline]
pub(crate) fn terminal_value(status: TerminalStatus) -> Option<f64> {
    match status {
        TerminalStatus::Ongoing => None,
        TerminalStatus::Checkmate => Some(-1.0),
        TerminalStatus::Stalemate | TerminalStatus::Draw => Some(0.0),
    }
}

pub struct Arena {
    nodes: Vec<SearchNode>,
}

impl Arena {
    pub fn new(root: Position) -> Self {
        let terminal = terminal_value(root.status());

        Self {
            nodes: vec![SearchNode {
                parent: NodeId::NONE,
                mv: None,
                position: root,
                depth: 0,
                state: NodeState::Unexpanded,
                visits: 0,
                value_sum: 0.0,
                prior: 1.0,
                admissible: true,
                score_cp: None,
                terminal_value: terminal,
                children: Vec::new(),
            }],
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.0 as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut SearchNode {
        &mut self.nodes[id.0 as usize]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn nodes(&self) -> &[SearchNode] {
        &self.nodes
    }

    /// Materialize a child reached by `mv`. Depth and terminal value are
    /// derived here; the caller supplies the filter's verdict.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        mv: ChessMove,
        position: Position,
        prior: f64,
        admissible: bool,
        score_cp: Option<i32>,
    ) -> NodeId {
        let depth = self.get(parent).depth + 1;
        let terminal = terminal_value(position.status());

        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(SearchNode {
            parent,
            mv: Some(mv),
            position,
            depth,
            state: NodeState::Unexpanded,
            visits: 0,
            value_sum: 0.0,
            prior,
            admissible,
            score_cp,
            terminal_value: terminal,
            children: Vec::new(),
        });

        self.get_mut(parent).children.push((mv, id));
        id
    }

    /// Propagate a leaf value to the root, flipping the sign at every ply.
    pub fn backpropagate(&mut self, leaf: NodeId, value: f64) {
        let mut current = leaf;
        let mut value = value;

        while !current.is_none() {
            let node = self.get_mut(current);
            node.visits += 1;
            node.value_sum += value;

            value = -value;
            current = node.parent;
        }
    }
}
