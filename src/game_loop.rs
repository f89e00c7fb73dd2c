//! Per-frame driver: key repeat first, then gravity

use crate::input::InputController;
use crate::session::{Session, SessionState};
use std::time::{Duration, Instant};

/// Milliseconds since the clock was created
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Feeds frame timestamps into the input controller and session
#[derive(Debug, Clone, Default)]
pub struct GameLoop {
    /// Latest timestamp seen; never moves backwards
    last_tick_ms: Option<u64>,
}

impl GameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one frame at `now_ms`. Returns the time credited to gravity.
    pub fn tick(&mut self, now_ms: u64, session: &mut Session, input: &mut InputController) -> Duration {
        let last = self.last_tick_ms.unwrap_or(now_ms);
        let elapsed = Duration::from_millis(now_ms.saturating_sub(last));
        self.last_tick_ms = Some(last.max(now_ms));

        if session.state() != SessionState::Running {
            return Duration::ZERO;
        }

        input.update(now_ms, session);
        session.tick(elapsed);
        elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{PieceGenerator, Randomizer};
    use crate::highscore::MemoryHighScoreStore;
    use crate::input::{Key, RepeatClock};

    fn session() -> Session {
        Session::new(
            PieceGenerator::with_seed(Randomizer::Bag, 3),
            Box::new(MemoryHighScoreStore::default()),
        )
    }

    fn input() -> InputController {
        InputController::new(Duration::from_millis(105), RepeatClock::PerKey)
    }

    fn current_y(session: &Session) -> i32 {
        session.current().unwrap().y
    }

    #[test]
    fn test_gravity_through_the_loop() {
        let mut session = session();
        let mut input = input();
        let mut game_loop = GameLoop::new();
        session.start_game();

        game_loop.tick(0, &mut session, &mut input);
        game_loop.tick(1000, &mut session, &mut input);
        // Exactly one interval is not enough
        assert_eq!(current_y(&session), 0);
        game_loop.tick(1001, &mut session, &mut input);
        assert_eq!(current_y(&session), 1);
    }

    #[test]
    fn test_backwards_clock_credits_nothing() {
        let mut session = session();
        let mut input = input();
        let mut game_loop = GameLoop::new();
        session.start_game();

        game_loop.tick(5000, &mut session, &mut input);
        assert_eq!(game_loop.tick(10, &mut session, &mut input), Duration::ZERO);
        // The reference stays at 5000
        assert_eq!(
            game_loop.tick(5200, &mut session, &mut input),
            Duration::from_millis(200)
        );
    }

    #[test]
    fn test_paused_session_is_left_alone() {
        let mut session = session();
        let mut input = input();
        let mut game_loop = GameLoop::new();
        session.start_game();
        input.key_down(Key::SoftDrop, 0, &mut session);
        session.pause_game();

        game_loop.tick(0, &mut session, &mut input);
        assert_eq!(game_loop.tick(5000, &mut session, &mut input), Duration::ZERO);
        assert_eq!(current_y(&session), 0);
        assert_eq!(session.score().points, 0);
    }

    #[test]
    fn test_held_key_repeats_before_gravity() {
        let mut session = session();
        let mut input = input();
        let mut game_loop = GameLoop::new();
        session.start_game();

        input.key_down(Key::SoftDrop, 0, &mut session);
        game_loop.tick(0, &mut session, &mut input);
        game_loop.tick(200, &mut session, &mut input);
        assert_eq!(current_y(&session), 1);
        game_loop.tick(306, &mut session, &mut input);
        assert_eq!(current_y(&session), 2);
        assert_eq!(session.score().points, 2);
    }
}
