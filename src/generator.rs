//! Piece generation
//!
//! The default randomizer draws every type with equal probability. The 7-bag
//! randomizer deals all 7 pieces in shuffled order before reshuffling, which
//! prevents long droughts.

use crate::piece::Piece;
use crate::tetromino::TetrominoType;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// How the next piece type is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Randomizer {
    #[default]
    Uniform,
    Bag,
}

/// Produces new pieces at their spawn position
#[derive(Debug, Clone)]
pub struct PieceGenerator {
    randomizer: Randomizer,
    rng: ChaCha8Rng,
    /// Remaining pieces of the current bag (bag randomizer only)
    bag: Vec<TetrominoType>,
}

impl PieceGenerator {
    /// Create a generator seeded from the thread RNG
    pub fn new(randomizer: Randomizer) -> Self {
        Self::with_seed(randomizer, rand::random())
    }

    /// Create a generator with a fixed seed for a reproducible sequence
    pub fn with_seed(randomizer: Randomizer, seed: u64) -> Self {
        Self {
            randomizer,
            rng: ChaCha8Rng::seed_from_u64(seed),
            bag: Vec::with_capacity(7),
        }
    }

    /// Get the next piece type
    pub fn next_type(&mut self) -> TetrominoType {
        let all = TetrominoType::all();
        match self.randomizer {
            Randomizer::Uniform => all[self.rng.gen_range(0..all.len())],
            Randomizer::Bag => loop {
                if let Some(piece_type) = self.bag.pop() {
                    return piece_type;
                }
                self.refill();
            },
        }
    }

    /// Get the next piece, ready to spawn
    pub fn next_piece(&mut self) -> Piece {
        Piece::new(self.next_type())
    }

    /// Refill the bag with a new shuffled permutation
    fn refill(&mut self) {
        self.bag.extend(TetrominoType::all());
        self.bag.shuffle(&mut self.rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = PieceGenerator::with_seed(Randomizer::Uniform, 42);
        let mut b = PieceGenerator::with_seed(Randomizer::Uniform, 42);
        for _ in 0..50 {
            assert_eq!(a.next_type(), b.next_type());
        }
    }

    #[test]
    fn test_uniform_produces_every_type() {
        let mut generator = PieceGenerator::with_seed(Randomizer::Uniform, 7);
        let seen: HashSet<_> = (0..500).map(|_| generator.next_type()).collect();
        assert_eq!(seen.len(), 7);
    }

    #[test]
    fn test_bag_contains_all_pieces() {
        let mut generator = PieceGenerator::with_seed(Randomizer::Bag, 3);
        for _ in 0..5 {
            let bag: HashSet<_> = (0..7).map(|_| generator.next_type()).collect();
            assert_eq!(bag.len(), 7);
        }
    }

    #[test]
    fn test_bag_refills_when_empty() {
        let mut generator = PieceGenerator::with_seed(Randomizer::Bag, 8);
        let drawn: Vec<_> = (0..21).map(|_| generator.next_type()).collect();
        for piece_type in TetrominoType::all() {
            let count = drawn.iter().filter(|&&t| t == piece_type).count();
            assert_eq!(count, 3, "{:?}", piece_type);
        }
    }

    #[test]
    fn test_next_piece_spawns_at_top() {
        let mut generator = PieceGenerator::with_seed(Randomizer::Uniform, 1);
        for _ in 0..20 {
            let piece = generator.next_piece();
            assert_eq!(piece.y, 0);
            assert_eq!(piece.color, piece.piece_type.color());
        }
    }
}
