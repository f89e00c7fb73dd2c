//! Input handling with timed key repeat
//!
//! Works on logical keys only; the host translates device events (see
//! `keymap`). Left/right move once on the press edge, then every held
//! directional key repeats once `repeat_interval` has passed.

use crate::session::{Session, SessionState};
use crate::settings::GameplaySettings;
use crate::tetromino::RotationDirection;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Logical keys delivered by the input source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    MoveLeft,
    MoveRight,
    SoftDrop,
    RotateCw,
    RotateCcw,
    HardDrop,
    Hold,
    PauseToggle,
    /// Start from the title screen, restart after game over
    Confirm,
}

/// Whether held keys share one repeat timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatClock {
    /// Every held key repeats on its own schedule
    #[default]
    PerKey,
    /// One timestamp for all keys: at most one key repeats per interval
    Shared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Left,
    Right,
    Down,
}

impl Axis {
    /// Repeat order
    const ALL: [Axis; 3] = [Axis::Left, Axis::Right, Axis::Down];

    fn index(self) -> usize {
        self as usize
    }

    fn from_key(key: Key) -> Option<Axis> {
        match key {
            Key::MoveLeft => Some(Axis::Left),
            Key::MoveRight => Some(Axis::Right),
            Key::SoftDrop => Some(Axis::Down),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct HeldKey {
    held: bool,
    /// Last time (ms) this key produced a move, per-key clock only
    last_repeat: u64,
    /// Last time (ms) a press event was seen, for the release timeout
    last_seen: u64,
}

/// Turns key edges into moves and repeats
#[derive(Debug, Clone)]
pub struct InputController {
    keys: [HeldKey; 3],
    clock: RepeatClock,
    shared_last_repeat: u64,
    repeat_interval: u64,
    /// Treat a key as released when no press was seen for this long
    release_timeout: Option<u64>,
}

impl InputController {
    pub fn new(repeat_interval: Duration, clock: RepeatClock) -> Self {
        Self {
            keys: [HeldKey::default(); 3],
            clock,
            shared_last_repeat: 0,
            repeat_interval: repeat_interval.as_millis() as u64,
            release_timeout: None,
        }
    }

    /// Create input handler from settings
    pub fn from_settings(gameplay: &GameplaySettings) -> Self {
        Self::new(
            Duration::from_millis(gameplay.repeat_interval_ms),
            gameplay.repeat_clock,
        )
    }

    /// Enable the release timeout, for input sources without key-up events
    pub fn with_release_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.release_timeout = timeout.map(|t| t.as_millis() as u64);
        self
    }

    /// Handle a key press edge at `now` (monotonic ms)
    pub fn key_down(&mut self, key: Key, now: u64, session: &mut Session) {
        if let Some(axis) = Axis::from_key(key) {
            self.press(axis, now, session);
            return;
        }

        match key {
            Key::RotateCw => {
                session.rotate_current_piece(RotationDirection::Clockwise);
            }
            Key::RotateCcw => {
                session.rotate_current_piece(RotationDirection::CounterClockwise);
            }
            Key::HardDrop => session.hard_drop(),
            Key::Hold => {
                session.hold_current_piece();
            }
            Key::PauseToggle => {
                session.pause_game();
            }
            Key::Confirm => match session.state() {
                SessionState::Idle => {
                    session.start_game();
                }
                SessionState::GameOver => session.restart(),
                SessionState::Running | SessionState::Paused => {}
            },
            Key::MoveLeft | Key::MoveRight | Key::SoftDrop => {}
        }
    }

    fn press(&mut self, axis: Axis, now: u64, session: &mut Session) {
        let state = &mut self.keys[axis.index()];
        state.last_seen = now;
        if state.held {
            // OS auto-repeat; the controller does its own repeating
            return;
        }
        state.held = true;

        let opposite = match axis {
            Axis::Left => Axis::Right,
            Axis::Right => Axis::Left,
            // Down only arms the repeat; its first step comes from update()
            Axis::Down => return,
        };
        if !self.keys[opposite.index()].held {
            Self::step(axis, session);
            self.stamp(axis, now);
        }
    }

    /// Handle a key release edge
    pub fn key_up(&mut self, key: Key) {
        if let Some(axis) = Axis::from_key(key) {
            self.keys[axis.index()].held = false;
        }
    }

    /// Repeat held keys whose interval has passed (call every frame)
    pub fn update(&mut self, now: u64, session: &mut Session) {
        if let Some(timeout) = self.release_timeout {
            for state in self.keys.iter_mut().filter(|s| s.held) {
                if now.saturating_sub(state.last_seen) > timeout {
                    state.held = false;
                }
            }
        }

        for axis in Axis::ALL {
            if !self.keys[axis.index()].held {
                continue;
            }
            if now.saturating_sub(self.last_repeat(axis)) > self.repeat_interval {
                Self::step(axis, session);
                self.stamp(axis, now);
            }
        }
    }

    /// Forget all held keys
    pub fn clear(&mut self) {
        for state in &mut self.keys {
            state.held = false;
        }
    }

    fn step(axis: Axis, session: &mut Session) {
        match axis {
            Axis::Left => {
                session.move_piece(-1, 0);
            }
            Axis::Right => {
                session.move_piece(1, 0);
            }
            Axis::Down => {
                session.soft_drop();
            }
        }
    }

    fn last_repeat(&self, axis: Axis) -> u64 {
        match self.clock {
            RepeatClock::PerKey => self.keys[axis.index()].last_repeat,
            RepeatClock::Shared => self.shared_last_repeat,
        }
    }

    fn stamp(&mut self, axis: Axis, now: u64) {
        match self.clock {
            RepeatClock::PerKey => self.keys[axis.index()].last_repeat = now,
            RepeatClock::Shared => self.shared_last_repeat = now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{PieceGenerator, Randomizer};
    use crate::highscore::MemoryHighScoreStore;
    use crate::piece::Piece;
    use crate::tetromino::TetrominoType;

    const INTERVAL: Duration = Duration::from_millis(105);

    fn running_session() -> Session {
        let mut session = Session::new(
            PieceGenerator::with_seed(Randomizer::Uniform, 9),
            Box::new(MemoryHighScoreStore::default()),
        );
        session.start_game();
        // Centered O: 4 free columns on either side
        session.set_current(Piece::new(TetrominoType::O));
        session
    }

    fn position(session: &Session) -> (i32, i32) {
        let piece = session.current().unwrap();
        (piece.x, piece.y)
    }

    #[test]
    fn test_press_moves_immediately() {
        let mut session = running_session();
        let mut input = InputController::new(INTERVAL, RepeatClock::PerKey);

        input.key_down(Key::MoveLeft, 1000, &mut session);
        assert_eq!(position(&session), (3, 0));

        // Auto-repeated presses of a held key are ignored
        input.key_down(Key::MoveLeft, 1010, &mut session);
        assert_eq!(position(&session), (3, 0));
    }

    #[test]
    fn test_held_key_repeats_after_interval() {
        let mut session = running_session();
        let mut input = InputController::new(INTERVAL, RepeatClock::PerKey);

        input.key_down(Key::MoveRight, 1000, &mut session);
        input.update(1105, &mut session);
        assert_eq!(position(&session), (5, 0));
        input.update(1106, &mut session);
        assert_eq!(position(&session), (6, 0));
        input.update(1150, &mut session);
        assert_eq!(position(&session), (6, 0));

        input.key_up(Key::MoveRight);
        input.update(2000, &mut session);
        assert_eq!(position(&session), (6, 0));
    }

    #[test]
    fn test_opposite_direction_suppresses_initial_move() {
        let mut session = running_session();
        let mut input = InputController::new(INTERVAL, RepeatClock::PerKey);

        input.key_down(Key::MoveLeft, 1000, &mut session);
        input.key_down(Key::MoveRight, 1010, &mut session);
        assert_eq!(position(&session), (3, 0));
    }

    #[test]
    fn test_soft_drop_repeats_and_scores() {
        let mut session = running_session();
        let mut input = InputController::new(INTERVAL, RepeatClock::PerKey);

        input.key_down(Key::SoftDrop, 1000, &mut session);
        assert_eq!(position(&session), (4, 0));

        input.update(1016, &mut session);
        assert_eq!(position(&session), (4, 1));
        input.update(1122, &mut session);
        assert_eq!(position(&session), (4, 2));
        assert_eq!(session.score().points, 2);
    }

    #[test]
    fn test_shared_clock_repeats_one_key_per_interval() {
        let mut session = running_session();
        let mut input = InputController::new(INTERVAL, RepeatClock::Shared);

        input.key_down(Key::MoveLeft, 1000, &mut session);
        input.key_down(Key::SoftDrop, 1000, &mut session);
        assert_eq!(position(&session), (3, 0));

        // Left repeats and stamps the shared clock; down has to wait
        input.update(1106, &mut session);
        assert_eq!(position(&session), (2, 0));
        input.update(1212, &mut session);
        assert_eq!(position(&session), (1, 0));
    }

    #[test]
    fn test_per_key_clock_repeats_every_key() {
        let mut session = running_session();
        let mut input = InputController::new(INTERVAL, RepeatClock::PerKey);

        input.key_down(Key::MoveLeft, 1000, &mut session);
        input.key_down(Key::SoftDrop, 1000, &mut session);

        input.update(1106, &mut session);
        assert_eq!(position(&session), (2, 1));
    }

    #[test]
    fn test_backwards_clock_never_repeats() {
        let mut session = running_session();
        let mut input = InputController::new(INTERVAL, RepeatClock::PerKey);

        input.key_down(Key::MoveLeft, 5000, &mut session);
        input.update(100, &mut session);
        assert_eq!(position(&session), (3, 0));
    }

    #[test]
    fn test_release_timeout() {
        let mut session = running_session();
        let mut input = InputController::new(INTERVAL, RepeatClock::PerKey)
            .with_release_timeout(Some(Duration::from_millis(100)));

        input.key_down(Key::MoveLeft, 1000, &mut session);
        input.update(1150, &mut session);
        assert_eq!(position(&session), (3, 0));

        // Released by the timeout, so the next press is a fresh edge
        input.key_down(Key::MoveLeft, 1160, &mut session);
        assert_eq!(position(&session), (2, 0));
    }

    #[test]
    fn test_action_keys() {
        let mut session = Session::new(
            PieceGenerator::with_seed(Randomizer::Uniform, 9),
            Box::new(MemoryHighScoreStore::default()),
        );
        let mut input = InputController::new(INTERVAL, RepeatClock::PerKey);

        input.key_down(Key::Confirm, 0, &mut session);
        assert_eq!(session.state(), SessionState::Running);

        input.key_down(Key::Hold, 10, &mut session);
        assert!(!session.can_hold());

        input.key_down(Key::HardDrop, 20, &mut session);
        assert!(!session.board().is_empty());
        assert!(session.can_hold());

        input.key_down(Key::PauseToggle, 30, &mut session);
        assert_eq!(session.state(), SessionState::Paused);
        // Confirm does nothing mid-game
        input.key_down(Key::Confirm, 40, &mut session);
        assert_eq!(session.state(), SessionState::Paused);
        input.key_down(Key::PauseToggle, 50, &mut session);
        assert_eq!(session.state(), SessionState::Running);

        session.game_over();
        input.key_down(Key::Confirm, 60, &mut session);
        assert_eq!(session.state(), SessionState::Running);
        assert!(session.board().is_empty());
    }

    #[test]
    fn test_rotate_keys() {
        let mut session = running_session();
        let mut t = Piece::new(TetrominoType::T);
        t.y = 5;
        session.set_current(t.clone());
        let mut input = InputController::new(INTERVAL, RepeatClock::PerKey);

        input.key_down(Key::RotateCw, 0, &mut session);
        assert_ne!(session.current().unwrap().shape, t.shape);
        input.key_down(Key::RotateCcw, 10, &mut session);
        assert_eq!(session.current().unwrap().shape, t.shape);
    }
}
