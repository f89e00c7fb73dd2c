//! Tetromino catalog: the 7 piece types, their shape matrices and colors

use ratatui::style::Color;

/// The 7 tetromino types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TetrominoType {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl TetrominoType {
    /// Get the color for this tetromino
    pub fn color(&self) -> Color {
        match self {
            TetrominoType::I => Color::Rgb(0xff, 0xb3, 0x00),
            TetrominoType::J => Color::Rgb(0xff, 0xe6, 0x00),
            TetrominoType::L => Color::Rgb(0x00, 0xe6, 0x00),
            TetrominoType::O => Color::Rgb(0x00, 0xbf, 0xff),
            TetrominoType::S => Color::Rgb(0xa2, 0x59, 0xff),
            TetrominoType::T => Color::Rgb(0xff, 0x3d, 0x7f),
            TetrominoType::Z => Color::Rgb(0x23, 0x23, 0xad),
        }
    }

    /// Get all tetromino types, in catalog order
    pub fn all() -> [TetrominoType; 7] {
        [
            TetrominoType::I,
            TetrominoType::J,
            TetrominoType::L,
            TetrominoType::O,
            TetrominoType::S,
            TetrominoType::T,
            TetrominoType::Z,
        ]
    }

    /// Get the spawn shape for this tetromino
    pub fn shape(&self) -> Shape {
        let rows: &[&str] = match self {
            TetrominoType::I => &["....", "####", "....", "...."],
            TetrominoType::J => &["#..", "###", "..."],
            TetrominoType::L => &["..#", "###", "..."],
            TetrominoType::O => &["##", "##"],
            TetrominoType::S => &[".##", "##.", "..."],
            TetrominoType::T => &[".#.", "###", "..."],
            TetrominoType::Z => &["##.", ".##", "..."],
        };
        Shape::from_pattern(rows)
    }
}

/// Direction for rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

/// A rectangular binary matrix, stored as `cells[y][x]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    cells: Vec<Vec<bool>>,
}

impl Shape {
    /// Build a shape from rows of booleans.
    /// Returns None for an empty or ragged matrix.
    #[cfg(test)]
    pub fn new(cells: Vec<Vec<bool>>) -> Option<Self> {
        let width = cells.first()?.len();
        if width == 0 || cells.iter().any(|row| row.len() != width) {
            return None;
        }
        Some(Self { cells })
    }

    /// Catalog patterns are always rectangular, `#` marks a filled cell
    fn from_pattern(rows: &[&str]) -> Self {
        Self {
            cells: rows
                .iter()
                .map(|row| row.chars().map(|c| c == '#').collect())
                .collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.cells[0].len()
    }

    pub fn height(&self) -> usize {
        self.cells.len()
    }

    pub fn is_filled(&self, x: usize, y: usize) -> bool {
        self.cells
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or(false)
    }

    /// Offsets (dx, dy) of every filled cell, top row first
    pub fn filled_cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.cells.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, filled)| **filled)
                .map(move |(x, _)| (x as i32, y as i32))
        })
    }

    /// Rotate 90 degrees; the result has swapped dimensions
    pub fn rotated(&self, direction: RotationDirection) -> Shape {
        let rows = self.height();
        let cols = self.width();
        let mut rotated = vec![vec![false; rows]; cols];

        for (y, row) in self.cells.iter().enumerate() {
            for (x, &filled) in row.iter().enumerate() {
                match direction {
                    RotationDirection::Clockwise => rotated[x][rows - 1 - y] = filled,
                    RotationDirection::CounterClockwise => rotated[cols - 1 - x][y] = filled,
                }
            }
        }

        Shape { cells: rotated }
    }
}
