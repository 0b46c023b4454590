mod arena;
mod config;
mod filter;
mod hybrid;

pub use arena::{Arena, NodeId, NodeState, SearchNode};
pub use config::SearchConfig;
pub use filter::{assess_moves, MoveAssessment};
pub use hybrid::{HybridSearch, SearchOutcome};

pub use evaluation::MAX_PLY;
