//! Terminal key codes to logical keys

use crate::input::Key;
use crate::settings;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What a terminal key press means to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Game(Key),
    Quit,
}

/// Key edge to hand to the input controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEdge {
    Down(Key),
    Up(Key),
    Quit,
}

/// Key bindings configuration - supports multiple keys per action
#[derive(Debug, Clone)]
pub struct KeyMap {
    entries: Vec<(KeyCode, Binding)>,
}

impl KeyMap {
    /// Parse a key string into KeyCode
    fn parse_key(s: &str) -> Option<KeyCode> {
        let code = match s.to_lowercase().as_str() {
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "space" => KeyCode::Char(' '),
            "enter" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "esc" | "escape" => KeyCode::Esc,
            "backspace" => KeyCode::Backspace,
            s => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => return None,
                }
            }
        };
        Some(code)
    }

    /// Create keybindings from settings; unknown key names are skipped
    pub fn from_settings(keys: &settings::KeyBindings) -> Self {
        let groups: [(&[String], Binding); 10] = [
            (&keys.move_left, Binding::Game(Key::MoveLeft)),
            (&keys.move_right, Binding::Game(Key::MoveRight)),
            (&keys.soft_drop, Binding::Game(Key::SoftDrop)),
            (&keys.hard_drop, Binding::Game(Key::HardDrop)),
            (&keys.rotate_cw, Binding::Game(Key::RotateCw)),
            (&keys.rotate_ccw, Binding::Game(Key::RotateCcw)),
            (&keys.hold, Binding::Game(Key::Hold)),
            (&keys.pause, Binding::Game(Key::PauseToggle)),
            (&keys.confirm, Binding::Game(Key::Confirm)),
            (&keys.quit, Binding::Quit),
        ];

        let mut entries = Vec::new();
        for (names, binding) in groups {
            for name in names {
                match Self::parse_key(name) {
                    Some(code) => entries.push((code, binding)),
                    None => tracing::warn!("Ignoring unknown key name {:?} in settings", name),
                }
            }
        }
        Self { entries }
    }

    /// Look up a key event; Ctrl+C always quits
    pub fn lookup(&self, key: &KeyEvent) -> Option<Binding> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Binding::Quit);
        }

        let code = normalize_key(key.code);
        self.entries
            .iter()
            .find(|(bound, _)| *bound == code)
            .map(|&(_, binding)| binding)
    }

    /// Turn a terminal key event into a press or release edge.
    /// Terminal auto-repeat is dropped; held keys repeat in the controller.
    pub fn edge(&self, key: &KeyEvent) -> Option<KeyEdge> {
        let binding = self.lookup(key)?;
        match (binding, key.kind) {
            (Binding::Quit, KeyEventKind::Press) => Some(KeyEdge::Quit),
            (Binding::Game(game_key), KeyEventKind::Press) => Some(KeyEdge::Down(game_key)),
            (Binding::Game(game_key), KeyEventKind::Release) => Some(KeyEdge::Up(game_key)),
            (_, KeyEventKind::Repeat) | (Binding::Quit, KeyEventKind::Release) => None,
        }
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::from_settings(&settings::KeyBindings::default())
    }
}

/// Normalize key codes for consistent handling
fn normalize_key(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}
