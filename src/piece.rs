//! Active falling piece and hold snapshot

use crate::board::BOARD_WIDTH;
use crate::tetromino::{Shape, TetrominoType};
use ratatui::style::Color;

/// An active falling piece
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    /// The type of tetromino
    pub piece_type: TetrominoType,
    /// Current shape matrix (re-derived on every rotation)
    pub shape: Shape,
    pub color: Color,
    /// Top-left corner of the shape in board coordinates
    pub x: i32,
    pub y: i32,
}

impl Piece {
    /// Create a new piece from the catalog at the spawn position
    pub fn new(piece_type: TetrominoType) -> Self {
        Self::spawn(piece_type, piece_type.shape(), piece_type.color())
    }

    /// Place a shape at the top center of the board
    pub fn spawn(piece_type: TetrominoType, shape: Shape, color: Color) -> Self {
        let x = (BOARD_WIDTH / 2) as i32 - (shape.width() / 2) as i32;
        Self {
            piece_type,
            shape,
            color,
            x,
            y: 0,
        }
    }

    /// Absolute board positions (x, y) of every filled cell
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape
            .filled_cells()
            .map(|(dx, dy)| (self.x + dx, self.y + dy))
    }

    /// Snapshot without position, for the hold slot
    pub fn to_held(&self) -> HeldPiece {
        HeldPiece {
            piece_type: self.piece_type,
            shape: self.shape.clone(),
            color: self.color,
        }
    }
}

/// A piece parked in the hold slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeldPiece {
    pub piece_type: TetrominoType,
    pub shape: Shape,
    pub color: Color,
}

impl HeldPiece {
    /// Bring the held piece back into play at the spawn position
    pub fn respawn(self) -> Piece {
        Piece::spawn(self.piece_type, self.shape, self.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tetromino::RotationDirection;

    #[test]
    fn test_spawn_position() {
        // 3 wide: 5 - 1
        let piece = Piece::new(TetrominoType::T);
        assert_eq!((piece.x, piece.y), (4, 0));

        // 4 wide: 5 - 2
        let piece = Piece::new(TetrominoType::I);
        assert_eq!((piece.x, piece.y), (3, 0));

        let piece = Piece::new(TetrominoType::O);
        assert_eq!((piece.x, piece.y), (4, 0));
    }

    #[test]
    fn test_cells_are_offset_by_position() {
        let mut piece = Piece::new(TetrominoType::O);
        piece.x = 2;
        piece.y = 7;
        let cells: Vec<_> = piece.cells().collect();
        assert_eq!(cells, vec![(2, 7), (3, 7), (2, 8), (3, 8)]);
    }

    #[test]
    fn test_hold_snapshot_keeps_rotated_shape() {
        let mut piece = Piece::new(TetrominoType::J);
        piece.shape = piece.shape.rotated(RotationDirection::Clockwise);
        piece.x = 0;
        piece.y = 12;

        let respawned = piece.to_held().respawn();
        assert_eq!(respawned.shape, piece.shape);
        assert_eq!(respawned.color, TetrominoType::J.color());
        assert_eq!((respawned.x, respawned.y), (4, 0));
    }
}
