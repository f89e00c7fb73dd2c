//! Rotation with wall kicks
//!
//! A rotation that collides in place is retried with a short, fixed list of
//! offsets. This is a simplification of SRS: the same kicks are used for
//! every piece and every orientation.

use crate::board::Board;
use crate::collision::shape_collides;
use crate::piece::Piece;
use crate::tetromino::RotationDirection;

/// Offsets (dx, dy) tried in order after the in-place rotation collides
pub const WALL_KICKS: [(i32, i32); 5] = [(-1, 0), (1, 0), (0, -1), (-1, -1), (1, -1)];

/// Rotate a piece, applying the first wall kick that clears a collision.
///
/// Returns the offset that was applied (`(0, 0)` when no kick was needed),
/// or None when every attempt collided and the piece was left untouched.
pub fn rotate(piece: &mut Piece, board: &Board, direction: RotationDirection) -> Option<(i32, i32)> {
    let rotated = piece.shape.rotated(direction);

    let offset = std::iter::once((0, 0))
        .chain(WALL_KICKS)
        .find(|&(dx, dy)| !shape_collides(board, &rotated, piece.x + dx, piece.y + dy))?;

    piece.shape = rotated;
    piece.x += offset.0;
    piece.y += offset.1;
    Some(offset)
}
