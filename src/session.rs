//! Game session: the state machine that owns the board and piece slots

use crate::board::{Board, Cell};
use crate::collision::collides;
use crate::generator::PieceGenerator;
use crate::highscore::HighScoreStore;
use crate::piece::{HeldPiece, Piece};
use crate::rotation;
use crate::score::Score;
use crate::tetromino::RotationDirection;
use std::time::Duration;

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created or restarted, waiting for the player
    Idle,
    Running,
    Paused,
    GameOver,
}

/// Final result reported when a game ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOverSummary {
    pub score: u64,
    pub high_score: u64,
    pub new_record: bool,
}

/// Notifications for the presentation layer, drained by the host each frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// A placement cleared lines; `combo` counts consecutive clearing placements
    LinesCleared { count: usize, combo: u32 },
    GameOver(GameOverSummary),
    /// Show a message box over the board
    Overlay {
        title: String,
        message: String,
        show_restart: bool,
    },
    /// Play resumed, hide any overlay
    OverlayDismissed,
}

/// The main game session
pub struct Session {
    board: Board,
    /// Falling piece; None until the game starts
    current: Option<Piece>,
    next: Piece,
    hold: Option<HeldPiece>,
    /// Hold may be used once per placed piece
    can_hold: bool,
    score: Score,
    state: SessionState,
    /// Time accumulated towards the next gravity step
    drop_timer: Duration,
    high_score: u64,
    generator: PieceGenerator,
    store: Box<dyn HighScoreStore>,
    events: Vec<GameEvent>,
}

impl Session {
    /// Create an idle session, loading the high score from `store`
    pub fn new(mut generator: PieceGenerator, store: Box<dyn HighScoreStore>) -> Self {
        let high_score = store.load().unwrap_or_else(|e| {
            tracing::warn!("Could not load high score, starting from 0: {}", e);
            0
        });
        let next = generator.next_piece();

        let mut session = Self {
            board: Board::new(),
            current: None,
            next,
            hold: None,
            can_hold: true,
            score: Score::new(),
            state: SessionState::Idle,
            drop_timer: Duration::ZERO,
            high_score,
            generator,
            store,
            events: Vec::new(),
        };
        session.push_ready_overlay();
        session
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current(&self) -> Option<&Piece> {
        self.current.as_ref()
    }

    pub fn next(&self) -> &Piece {
        &self.next
    }

    pub fn hold(&self) -> Option<&HeldPiece> {
        self.hold.as_ref()
    }

    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    /// Row the current piece would land on if hard dropped
    pub fn ghost_y(&self) -> Option<i32> {
        let piece = self.current.as_ref()?;
        let mut dy = 0;
        while !collides(&self.board, piece, (0, dy + 1), None) {
            dy += 1;
        }
        Some(piece.y + dy)
    }

    /// Take all events emitted since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn is_running(&self) -> bool {
        self.state == SessionState::Running
    }

    /// Start play from Idle
    pub fn start_game(&mut self) -> bool {
        if self.state != SessionState::Idle {
            return false;
        }

        self.promote_next();
        self.drop_timer = Duration::ZERO;
        self.state = SessionState::Running;
        self.events.push(GameEvent::OverlayDismissed);
        tracing::info!("Game started, high score {}", self.high_score);
        true
    }

    /// Toggle between Running and Paused
    pub fn pause_game(&mut self) -> bool {
        match self.state {
            SessionState::Running => {
                self.state = SessionState::Paused;
                self.events.push(GameEvent::Overlay {
                    title: "Paused".to_string(),
                    message: "Press P to resume".to_string(),
                    show_restart: false,
                });
                tracing::debug!("Paused");
                true
            }
            SessionState::Paused => {
                self.state = SessionState::Running;
                self.events.push(GameEvent::OverlayDismissed);
                tracing::debug!("Resumed");
                true
            }
            SessionState::Idle | SessionState::GameOver => false,
        }
    }

    /// Translate the current piece if nothing is in the way
    pub fn move_piece(&mut self, dx: i32, dy: i32) -> bool {
        if !self.is_running() {
            return false;
        }
        let Some(piece) = &mut self.current else {
            return false;
        };
        if collides(&self.board, piece, (dx, dy), None) {
            return false;
        }
        piece.x += dx;
        piece.y += dy;
        true
    }

    /// Move down one row, awarding a point on success
    pub fn soft_drop(&mut self) -> bool {
        if self.move_piece(0, 1) {
            self.score.add_soft_drop(1);
            true
        } else {
            false
        }
    }

    pub fn rotate_current_piece(&mut self, direction: RotationDirection) -> bool {
        if !self.is_running() {
            return false;
        }
        let Some(piece) = &mut self.current else {
            return false;
        };
        rotation::rotate(piece, &self.board, direction).is_some()
    }

    /// Drop the piece as far as it goes and lock it
    pub fn hard_drop(&mut self) {
        if !self.is_running() {
            return;
        }

        let mut distance = 0;
        while self.move_piece(0, 1) {
            distance += 1;
        }
        self.score.add_hard_drop(distance);
        self.place_piece();
    }

    /// Park the current piece, or swap it with the parked one
    pub fn hold_current_piece(&mut self) -> bool {
        if !self.is_running() || !self.can_hold {
            return false;
        }
        let Some(current) = self.current.take() else {
            return false;
        };

        match self.hold.replace(current.to_held()) {
            Some(held) => self.current = Some(held.respawn()),
            None => self.promote_next(),
        }
        self.can_hold = false;
        self.drop_timer = Duration::ZERO;

        if self.current_collides() {
            self.game_over();
        }
        true
    }

    /// Advance gravity by `elapsed`
    pub fn tick(&mut self, elapsed: Duration) {
        if !self.is_running() {
            return;
        }

        self.drop_timer += elapsed;
        if self.drop_timer > self.score.drop_interval() {
            self.drop_timer = Duration::ZERO;
            if !self.move_piece(0, 1) {
                self.place_piece();
            }
        }
    }

    /// Lock the current piece into the board, clear lines and spawn the next
    pub fn place_piece(&mut self) {
        if !self.is_running() {
            return;
        }
        let Some(piece) = self.current.take() else {
            return;
        };

        for (x, y) in piece.cells() {
            if y >= 0 {
                self.board.set(x, y, Cell::Filled(piece.color));
            }
        }

        let lines_cleared = self.board.clear_lines();
        let awarded = self.score.record_clear(lines_cleared);
        if lines_cleared > 0 {
            tracing::debug!(
                "Cleared {} lines for {} points, combo {}",
                lines_cleared,
                awarded,
                self.score.combo
            );
            self.events.push(GameEvent::LinesCleared {
                count: lines_cleared,
                combo: self.score.combo,
            });
        }

        self.promote_next();
        self.can_hold = true;
        self.drop_timer = Duration::ZERO;

        if self.current_collides() {
            self.game_over();
        }
    }

    /// End the game and record a new high score.
    /// Returns None if no game was in progress.
    pub fn game_over(&mut self) -> Option<GameOverSummary> {
        if !matches!(self.state, SessionState::Running | SessionState::Paused) {
            return None;
        }
        self.state = SessionState::GameOver;

        let score = self.score.points;
        let new_record = score > self.high_score;
        if new_record {
            self.high_score = score;
            if let Err(e) = self.store.save(score) {
                tracing::warn!("Could not save high score {}: {}", score, e);
            }
        }

        let summary = GameOverSummary {
            score,
            high_score: self.high_score,
            new_record,
        };
        tracing::info!(
            "Game over: score {}, lines {}, level {}, new record {}",
            score,
            self.score.lines,
            self.score.level,
            new_record
        );

        let title = if new_record { "New Record!" } else { "Game Over" };
        self.events.push(GameEvent::GameOver(summary));
        self.events.push(GameEvent::Overlay {
            title: title.to_string(),
            message: format!("Score {}  Best {}", score, self.high_score),
            show_restart: true,
        });
        Some(summary)
    }

    /// Throw away the current game and start a fresh one.
    /// The high score is kept.
    pub fn restart(&mut self) {
        self.board = Board::new();
        self.current = None;
        self.next = self.generator.next_piece();
        self.hold = None;
        self.can_hold = true;
        self.score = Score::new();
        self.drop_timer = Duration::ZERO;
        self.state = SessionState::Idle;
        tracing::info!("Restarting");

        self.start_game();
    }

    fn promote_next(&mut self) {
        let next = std::mem::replace(&mut self.next, self.generator.next_piece());
        self.current = Some(next);
    }

    fn current_collides(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|piece| collides(&self.board, piece, (0, 0), None))
    }

    fn push_ready_overlay(&mut self) {
        self.events.push(GameEvent::Overlay {
            title: "Blockfall".to_string(),
            message: "Press Enter to start".to_string(),
            show_restart: false,
        });
    }

    #[cfg(test)]
    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    #[cfg(test)]
    pub(crate) fn set_current(&mut self, piece: Piece) {
        self.current = Some(piece);
    }
}
