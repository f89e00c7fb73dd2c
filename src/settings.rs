//! Settings persistence using TOML
//!
//! Stores settings in ~/.config/blockfall/settings.toml (or platform equivalent)

use crate::error::{Result, StorageError};
use crate::generator::Randomizer;
use crate::input::RepeatClock;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Game settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Keybindings
    pub keys: KeyBindings,
    /// Visual settings
    pub visual: VisualSettings,
    /// Gameplay settings
    pub gameplay: GameplaySettings,
}

/// Key bindings (stored as strings for easy editing)
/// Each action can have one or more keys bound to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub move_left: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub move_right: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub soft_drop: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub hard_drop: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub rotate_cw: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub rotate_ccw: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub hold: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub pause: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub confirm: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub quit: Vec<String>,
}

/// Deserialize keys as either a single string or array of strings
fn deserialize_keys<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};

    struct KeysVisitor;

    impl<'de> Visitor<'de> for KeysVisitor {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a string or array of strings")
        }

        fn visit_str<E>(self, v: &str) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: de::SeqAccess<'de>,
        {
            let mut keys = Vec::new();
            while let Some(key) = seq.next_element::<String>()? {
                keys.push(key);
            }
            Ok(keys)
        }
    }

    deserializer.deserialize_any(KeysVisitor)
}

/// Serialize keys: single key as string, multiple as array
fn serialize_keys<S>(keys: &[String], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeSeq;

    if let [key] = keys {
        serializer.serialize_str(key)
    } else {
        let mut seq = serializer.serialize_seq(Some(keys.len()))?;
        for key in keys {
            seq.serialize_element(key)?;
        }
        seq.end()
    }
}

/// Visual settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualSettings {
    /// Ghost piece visibility
    pub show_ghost: bool,
    /// Block style: "solid", "bracket", "round"
    pub block_style: String,
}

/// Gameplay settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplaySettings {
    /// Delay between repeated moves of a held key, in milliseconds
    pub repeat_interval_ms: u64,
    /// "per_key" or "shared"
    pub repeat_clock: RepeatClock,
    /// "uniform" or "bag"
    pub randomizer: Randomizer,
    /// Release held keys after this long without a press event, for
    /// terminals that never report key releases. 0 disables it.
    pub key_release_timeout_ms: u64,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            move_left: vec!["Left".to_string()],
            move_right: vec!["Right".to_string()],
            soft_drop: vec!["Down".to_string()],
            hard_drop: vec!["Space".to_string()],
            rotate_cw: vec!["Up".to_string(), "x".to_string()],
            rotate_ccw: vec!["z".to_string()],
            hold: vec!["c".to_string()],
            pause: vec!["p".to_string(), "Esc".to_string()],
            confirm: vec!["Enter".to_string()],
            quit: vec!["q".to_string()],
        }
    }
}

impl Default for VisualSettings {
    fn default() -> Self {
        Self {
            show_ghost: true,
            block_style: "solid".to_string(),
        }
    }
}

impl Default for GameplaySettings {
    fn default() -> Self {
        Self {
            repeat_interval_ms: 105,
            repeat_clock: RepeatClock::PerKey,
            randomizer: Randomizer::Uniform,
            key_release_timeout_ms: 100,
        }
    }
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "blockfall", "blockfall")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the settings file path
    fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("settings.toml"))
    }

    /// Load settings from file, or fall back to defaults.
    /// A missing file is created with the defaults so it can be edited.
    pub fn load() -> Self {
        match Self::settings_path() {
            Some(path) => Self::load_or_create(&path),
            None => {
                tracing::warn!("{}, using default settings", StorageError::NoDirectory("config"));
                Self::default()
            }
        }
    }

    /// An existing file is never written, even when it fails to parse
    fn load_or_create(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents).unwrap_or_else(|e| {
                tracing::warn!("{}: {}, using defaults", path.display(), e);
                Self::default()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let settings = Self::default();
                match settings.save_to(path) {
                    Ok(()) => tracing::debug!("Wrote default settings to {}", path.display()),
                    Err(e) => tracing::warn!("Could not write {}: {}", path.display(), e),
                }
                settings
            }
            Err(e) => {
                tracing::warn!("Could not read {}: {}, using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}

impl VisualSettings {
    /// Get the block characters (block, ghost) based on style
    pub fn block_chars(&self) -> (&'static str, &'static str) {
        match self.block_style.as_str() {
            "bracket" => ("[]", ".."),
            "round" => ("()", ".."),
            _ => ("██", "░░"), // "solid" or default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("blockfall-settings-test-{}-{}", std::process::id(), name))
            .join("settings.toml")
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(Settings::from_toml("").unwrap(), Settings::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let settings = Settings::from_toml(
            r#"
            [gameplay]
            repeat_interval_ms = 80
            repeat_clock = "shared"
            randomizer = "bag"

            [keys]
            move_left = "a"
            rotate_cw = ["w", "Up"]
            "#,
        )
        .unwrap();

        assert_eq!(settings.gameplay.repeat_interval_ms, 80);
        assert_eq!(settings.gameplay.repeat_clock, RepeatClock::Shared);
        assert_eq!(settings.gameplay.randomizer, Randomizer::Bag);
        assert_eq!(settings.gameplay.key_release_timeout_ms, 100);
        assert_eq!(settings.keys.move_left, vec!["a".to_string()]);
        assert_eq!(settings.keys.rotate_cw, vec!["w".to_string(), "Up".to_string()]);
        assert_eq!(settings.keys.hard_drop, vec!["Space".to_string()]);
        assert!(settings.visual.show_ghost);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        assert!(matches!(
            Settings::from_toml("[gameplay]\nrepeat_clock = \"sometimes\""),
            Err(StorageError::TomlRead(_))
        ));
    }

    #[test]
    fn test_toml_survives_a_save() {
        let mut settings = Settings::default();
        settings.keys.hold = vec!["c".to_string(), "Tab".to_string()];
        settings.gameplay.repeat_clock = RepeatClock::Shared;

        let contents = toml::to_string_pretty(&settings).unwrap();
        assert!(contents.contains("move_left = \"Left\""));
        assert_eq!(Settings::from_toml(&contents).unwrap(), settings);
    }

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let path = scratch_path("missing");
        assert_eq!(Settings::load_or_create(&path), Settings::default());

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(Settings::from_toml(&written).unwrap(), Settings::default());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_broken_file_is_left_alone() {
        let path = scratch_path("broken");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let contents = "[keys]\nmove_left = \"a\"\n\n[gameplay]\nrepeat_clock = \"Shared\"\n";
        fs::write(&path, contents).unwrap();

        assert_eq!(Settings::load_or_create(&path), Settings::default());
        assert_eq!(fs::read_to_string(&path).unwrap(), contents);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_existing_file_is_loaded() {
        let path = scratch_path("existing");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "[keys]\nmove_left = \"a\"\n").unwrap();

        let settings = Settings::load_or_create(&path);
        assert_eq!(settings.keys.move_left, vec!["a".to_string()]);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_block_chars() {
        let mut visual = VisualSettings::default();
        assert_eq!(visual.block_chars(), ("██", "░░"));
        visual.block_style = "bracket".to_string();
        assert_eq!(visual.block_chars().0, "[]");
    }
}
