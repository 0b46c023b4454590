use std::fmt;
use std::str::FromStr;

use chess::{Board, BoardStatus, ChessMove, Color, MoveGen};
use thiserror::Error;

use crate::board::insufficient_material;

/// Raised when a move is applied to a position whose legal set does not
/// contain it. Always indicates a caller bug, never an engine condition.
#[derive(Debug, Clone, Error)]
#[error("illegal move {mv} in position {fen}")]
pub struct IllegalMoveError {
    pub mv: String,
    pub fen: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalStatus {
    Ongoing,
    Checkmate,
    Stalemate,
    Draw,
}

/// An immutable chess position. Applying a move always produces a new
/// `Position`; nothing is mutated in place during search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    board: Board,
}

impl Position {
    pub fn startpos() -> Self {
        Self {
            board: Board::default(),
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, chess::Error> {
        Ok(Self {
            board: Board::from_str(fen)?,
        })
    }

    /// FEN encoding of this position, as sent to the external engine.
    #[inline]
    pub fn fen(&self) -> String {
        self.board.to_string()
    }

    /// Zobrist key, used as the evaluation cache key.
    #[inline]
    pub fn key(&self) -> u64 {
        self.board.get_hash()
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// All legal moves, in generation order. Empty iff the position is
    /// terminal. The order is stable and is the tie-break order used by
    /// the search.
    pub fn legal_moves(&self) -> Vec<ChessMove> {
        MoveGen::new_legal(&self.board).collect()
    }

    /// Apply a move, producing the resulting position.
    pub fn apply(&self, mv: ChessMove) -> Result<Position, IllegalMoveError> {
        if !self.board.legal(mv) {
            return Err(IllegalMoveError {
                mv: mv.to_string(),
                fen: self.fen(),
            });
        }

        Ok(Position {
            board: self.board.make_move_new(mv),
        })
    }

    /// Terminal status of the position. `Draw` covers insufficient
    /// material; repetition and the fifty-move rule need game history a
    /// bare FEN does not carry.
    pub fn status(&self) -> TerminalStatus {
        match self.board.status() {
            BoardStatus::Checkmate => TerminalStatus::Checkmate,
            BoardStatus::Stalemate => TerminalStatus::Stalemate,
            BoardStatus::Ongoing => {
                if insufficient_material(&self.board) {
                    TerminalStatus::Draw
                } else {
                    TerminalStatus::Ongoing
                }
            }
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.status() != TerminalStatus::Ongoing
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startpos_has_twenty_moves() {
        let position = Position::startpos();
        assert_eq!(position.legal_moves().len(), 20);
        assert_eq!(position.status(), TerminalStatus::Ongoing);
    }

    #[test]
    fn test_generated_moves_are_applicable() {
        let position =
            Position::from_fen("r2q1rk1/pp2bppp/2n1pn2/2bp4/3P4/2N1PN2/PPQ1BPPP/R1B2RK1 w - - 0 10")
                .unwrap();

        for mv in position.legal_moves() {
            assert!(position.apply(mv).is_ok(), "oracle rejected its own move {}", mv);
        }
    }

    #[test]
    fn test_apply_rejects_illegal_move() {
        let position = Position::startpos();
        let mv = ChessMove::from_str("e2e5").unwrap();

        let err = position.apply(mv).unwrap_err();
        assert_eq!(err.mv, "e2e5");
    }

    #[test]
    fn test_apply_does_not_mutate() {
        let position = Position::startpos();
        let mv = ChessMove::from_str("e2e4").unwrap();

        let next = position.apply(mv).unwrap();
        assert_ne!(position, next);
        assert_eq!(position, Position::startpos());
    }

    #[test]
    fn test_checkmate_status() {
        // Fool's mate, white to move and mated.
        let position =
            Position::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
                .unwrap();

        assert_eq!(position.status(), TerminalStatus::Checkmate);
        assert!(position.legal_moves().is_empty());
    }

    #[test]
    fn test_stalemate_status() {
        let position = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(position.status(), TerminalStatus::Stalemate);
    }

    #[test]
    fn test_insufficient_material_is_draw() {
        let position = Position::from_fen("8/8/8/8/8/4k3/8/4K3 w - - 0 1").unwrap();
        assert_eq!(position.status(), TerminalStatus::Draw);
    }

    #[test]
    fn test_key_is_stable_across_clones() {
        let position = Position::startpos();
        assert_eq!(position.key(), position.clone().key());
    }
}
