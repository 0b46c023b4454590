mod board;
mod position;

pub use board::insufficient_material;
pub use position::{IllegalMoveError, Position, TerminalStatus};
