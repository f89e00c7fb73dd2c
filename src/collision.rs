//! Collision detection between pieces and the board

use crate::board::Board;
use crate::piece::Piece;
use crate::tetromino::{RotationDirection, Shape};

/// Check whether `piece`, rotated by `rotation` and then moved by `offset`,
/// would hit a wall, the floor or an occupied cell.
pub fn collides(
    board: &Board,
    piece: &Piece,
    offset: (i32, i32),
    rotation: Option<RotationDirection>,
) -> bool {
    let (dx, dy) = offset;
    match rotation {
        Some(direction) => {
            let rotated = piece.shape.rotated(direction);
            shape_collides(board, &rotated, piece.x + dx, piece.y + dy)
        }
        None => shape_collides(board, &piece.shape, piece.x + dx, piece.y + dy),
    }
}

/// Check a bare shape anchored at (x, y)
pub fn shape_collides(board: &Board, shape: &Shape, x: i32, y: i32) -> bool {
    shape
        .filled_cells()
        .any(|(dx, dy)| board.is_blocked(x + dx, y + dy))
}
