//! Terminal UI rendering with ratatui

use crate::board::{Cell, BOARD_HEIGHT, BOARD_WIDTH};
use crate::session::{GameEvent, Session};
use crate::settings::Settings;
use crate::tetromino::Shape;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const EMPTY: &str = "  ";

/// Total width needed: hold(12) + board(22) + next/stats(16) = 50
const GAME_WIDTH: u16 = 50;
/// Total height needed: board(20) + 2 for borders
const GAME_HEIGHT: u16 = 22;

/// How long the combo banner stays up
const BANNER_MS: u64 = 1500;
/// How long the board shakes after a big clear
const SHAKE_MS: u64 = 300;
/// Shake direction flips this often
const SHAKE_STEP_MS: u64 = 50;

/// Message box requested by the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    pub title: String,
    pub message: String,
    pub show_restart: bool,
}

/// Transient display state driven by session events
#[derive(Debug, Clone, Default)]
pub struct Presentation {
    overlay: Option<Overlay>,
    banner: Option<(String, u64)>,
    shake_until: u64,
}

impl Presentation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply events drained from the session at `now` (monotonic ms)
    pub fn apply(&mut self, events: Vec<GameEvent>, now: u64) {
        for event in events {
            match event {
                GameEvent::LinesCleared { count, combo } => {
                    if combo > 1 {
                        self.banner = Some((format!("COMBO x{}", combo), now + BANNER_MS));
                    } else if count >= 2 {
                        self.banner = Some((format!("{} LINES", count), now + BANNER_MS));
                    }
                    if count >= 2 || combo > 1 {
                        self.shake_until = now + SHAKE_MS;
                    }
                }
                GameEvent::Overlay {
                    title,
                    message,
                    show_restart,
                } => {
                    self.overlay = Some(Overlay {
                        title,
                        message,
                        show_restart,
                    });
                }
                GameEvent::OverlayDismissed => self.overlay = None,
                // The game over overlay arrives as its own event
                GameEvent::GameOver(_) => self.banner = None,
            }
        }
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    /// Banner text, if it has not expired
    pub fn banner(&self, now: u64) -> Option<&str> {
        self.banner
            .as_ref()
            .filter(|(_, until)| now < *until)
            .map(|(text, _)| text.as_str())
    }

    /// Horizontal board offset in columns while shaking
    pub fn shake_offset(&self, now: u64) -> i16 {
        if now >= self.shake_until {
            return 0;
        }
        if (now / SHAKE_STEP_MS) % 2 == 0 { 1 } else { -1 }
    }
}

/// Render the game screen
pub fn render_game(
    frame: &mut Frame,
    session: &Session,
    presentation: &Presentation,
    settings: &Settings,
    now: u64,
) {
    let area = frame.area();
    let (block_char, _) = settings.visual.block_chars();

    // Center the game area
    let game_area = center_rect(area, GAME_WIDTH, GAME_HEIGHT);

    // Create main layout: hold | board | next + stats
    let main_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(12), // Hold box
            Constraint::Length(22), // Board (10*2 + 2 for borders)
            Constraint::Length(16), // Next piece + stats
        ])
        .split(game_area);

    let hold = session.hold().map(|held| (&held.shape, held.color));
    render_piece_box(frame, main_layout[0], " HOLD ", hold, block_char, session.can_hold());

    let board_area = shift_rect(main_layout[1], presentation.shake_offset(now), area);
    render_board(frame, board_area, session, settings);

    // Right side: next piece and stats
    let right_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Next piece
            Constraint::Min(10),   // Stats
        ])
        .split(main_layout[2]);

    let next = session.next();
    render_piece_box(frame, right_layout[0], " NEXT ", Some((&next.shape, next.color)), block_char, true);
    render_stats(frame, right_layout[1], session, presentation.banner(now));

    if let Some(overlay) = presentation.overlay() {
        render_overlay(frame, area, overlay);
    }
}

/// Center a rect within another rect
fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Move a rect sideways, staying inside `bounds`
fn shift_rect(rect: Rect, dx: i16, bounds: Rect) -> Rect {
    let max_x = (bounds.x + bounds.width).saturating_sub(rect.width);
    let x = rect.x.saturating_add_signed(dx).clamp(bounds.x, max_x.max(bounds.x));
    Rect { x, ..rect }
}

/// Render a boxed piece preview (hold and next)
fn render_piece_box(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    piece: Option<(&Shape, Color)>,
    block_char: &str,
    enabled: bool,
) {
    let border = if enabled { Color::Gray } else { Color::DarkGray };
    let block = Block::default()
        .title(title)
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some((shape, color)) = piece {
        let color = if enabled { color } else { Color::DarkGray };
        render_mini_piece(frame, inner, shape, color, block_char);
    }
}

/// Render a small piece preview, trimmed to its filled rows
fn render_mini_piece(frame: &mut Frame, area: Rect, shape: &Shape, color: Color, block_char: &str) {
    if area.height < 1 || area.width < 4 {
        return;
    }

    let rows: Vec<usize> = (0..shape.height())
        .filter(|&y| (0..shape.width()).any(|x| shape.is_filled(x, y)))
        .collect();

    let lines: Vec<Line> = rows
        .iter()
        .map(|&y| {
            let spans: Vec<Span> = (0..shape.width())
                .map(|x| {
                    if shape.is_filled(x, y) {
                        Span::styled(block_char, Style::default().fg(color))
                    } else {
                        Span::raw(EMPTY)
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Render the game board with the falling piece and its ghost
fn render_board(frame: &mut Frame, area: Rect, session: &Session, settings: &Settings) {
    let (block_char, ghost_char) = settings.visual.block_chars();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let current = session.current();
    let piece_cells: Vec<(i32, i32)> = current.map(|p| p.cells().collect()).unwrap_or_default();
    let ghost_cells: Vec<(i32, i32)> = match (current, session.ghost_y()) {
        (Some(piece), Some(ghost_y)) if settings.visual.show_ghost => {
            let dy = ghost_y - piece.y;
            piece.cells().map(|(x, y)| (x, y + dy)).collect()
        }
        _ => Vec::new(),
    };
    let piece_color = current.map(|p| p.color).unwrap_or(Color::White);

    let mut lines: Vec<Line> = Vec::with_capacity(BOARD_HEIGHT);
    for (row, cells) in session.board().rows().enumerate() {
        let mut spans = Vec::with_capacity(BOARD_WIDTH);
        for (col, cell) in cells.iter().enumerate() {
            let pos = (col as i32, row as i32);
            let (text, style) = if piece_cells.contains(&pos) {
                (block_char, Style::default().fg(piece_color))
            } else if ghost_cells.contains(&pos) {
                (ghost_char, Style::default().fg(piece_color).dim())
            } else {
                match cell {
                    Cell::Filled(color) => (block_char, Style::default().fg(*color)),
                    Cell::Empty => (EMPTY, Style::default()),
                }
            };
            spans.push(Span::styled(text, style));
        }
        lines.push(Line::from(spans));
    }

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

fn stat_lines(label: &str, value: String, color: Color) -> [Line<'static>; 3] {
    [
        Line::from(Span::styled(label.to_string(), Style::default().fg(Color::Gray))),
        Line::from(Span::styled(value, Style::default().fg(color).bold())),
        Line::raw(""),
    ]
}

/// Render stats panel
fn render_stats(frame: &mut Frame, area: Rect, session: &Session, banner: Option<&str>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let score = session.score();
    let mut lines = Vec::new();
    lines.extend(stat_lines("SCORE", score.points.to_string(), Color::Yellow));
    lines.extend(stat_lines("BEST", session.high_score().to_string(), Color::Magenta));
    lines.extend(stat_lines("LEVEL", score.level.to_string(), Color::Cyan));
    lines.extend(stat_lines("LINES", score.lines.to_string(), Color::Green));

    if let Some(text) = banner {
        lines.push(Line::styled(text.to_string(), Style::default().fg(Color::Magenta).bold()));
    }

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

/// Render an overlay (title screen, pause, game over)
fn render_overlay(frame: &mut Frame, area: Rect, overlay: &Overlay) {
    let popup_width = 28u16;
    let popup_height = if overlay.show_restart { 7u16 } else { 5u16 };
    let popup_area = center_rect(area, popup_width, popup_height);

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let mut text = vec![
        Line::styled(overlay.title.as_str(), Style::default().fg(Color::Yellow).bold()),
        Line::raw(""),
        Line::styled(overlay.message.as_str(), Style::default().fg(Color::Gray)),
    ];
    if overlay.show_restart {
        text.push(Line::raw(""));
        text.push(Line::styled("Enter: restart", Style::default().fg(Color::Cyan)));
    }

    let paragraph = Paragraph::new(text).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}
