//! Scoring, levels and combo tracking

use std::time::Duration;

/// Base points per clear, indexed by lines cleared
pub const LINE_SCORES: [u64; 5] = [0, 100, 300, 500, 800];

/// Extra points per combo step after the first clear in a chain
pub const COMBO_BONUS: u64 = 50;

pub const LINES_PER_LEVEL: u32 = 10;

const BASE_DROP_INTERVAL_MS: u64 = 1000;
const DROP_INTERVAL_STEP_MS: u64 = 100;
const MIN_DROP_INTERVAL_MS: u64 = 100;

/// Scoring calculation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Score {
    /// Current score
    pub points: u64,
    /// Current level, starting at 1
    pub level: u32,
    /// Total lines cleared
    pub lines: u32,
    /// Consecutive placements that cleared at least one line
    pub combo: u32,
}

impl Default for Score {
    fn default() -> Self {
        Self::new()
    }
}

impl Score {
    pub fn new() -> Self {
        Self {
            points: 0,
            level: 1,
            lines: 0,
            combo: 0,
        }
    }

    /// Apply the result of one placement.
    /// Returns the points awarded.
    pub fn record_clear(&mut self, lines_cleared: usize) -> u64 {
        if lines_cleared == 0 {
            self.combo = 0;
            return 0;
        }

        self.combo += 1;
        let bonus = if self.combo > 1 {
            (self.combo as u64 - 1) * COMBO_BONUS
        } else {
            0
        };

        // More than four lines at once scores as four
        let base = LINE_SCORES[lines_cleared.min(LINE_SCORES.len() - 1)];
        let awarded = base * self.level as u64 + bonus;

        self.points += awarded;
        self.lines += lines_cleared as u32;
        self.level = self.lines / LINES_PER_LEVEL + 1;
        awarded
    }

    /// Add score for soft drop (1 point per cell)
    pub fn add_soft_drop(&mut self, cells: u32) {
        self.points += cells as u64;
    }

    /// Add score for hard drop (2 points per cell)
    pub fn add_hard_drop(&mut self, cells: u32) {
        self.points += cells as u64 * 2;
    }

    /// Time between gravity steps at the current level
    pub fn drop_interval(&self) -> Duration {
        let speedup = (self.level.saturating_sub(1) as u64).saturating_mul(DROP_INTERVAL_STEP_MS);
        let ms = BASE_DROP_INTERVAL_MS
            .saturating_sub(speedup)
            .max(MIN_DROP_INTERVAL_MS);
        Duration::from_millis(ms)
    }
}
