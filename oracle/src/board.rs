use chess::{Board, Piece};

/// Check whether neither side retains mating material (bare kings, or a
/// single minor piece against a bare king).
#[inline]
pub fn insufficient_material(board: &Board) -> bool {
    let total = board.combined().popcnt();

    match total {
        2 => true,
        3 => {
            let minors =
                (*board.pieces(Piece::Knight) | *board.pieces(Piece::Bishop)).popcnt();
            minors == 1
        }
        _ => false,
    }
}
