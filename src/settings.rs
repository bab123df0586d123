//! Settings persistence using TOML
//!
//! Stores settings in ~/.config/bucketris/settings.toml (or platform equivalent)

use crate::bag::PieceOrder;
use crate::game::Action;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Keys the rebinding screen needs for itself
pub const RESERVED_KEYS: [&str; 2] = ["Enter", "Esc"];

/// Highest level a game can start on
pub const MAX_STARTING_LEVEL: u32 = 15;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not determine a config directory")]
    NoConfigDir,
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid score file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0} is reserved")]
    KeyReserved(String),
    #[error("{key} is already bound to {action}")]
    KeyTaken { key: String, action: String },
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Keybindings
    pub keys: KeyBindings,
    /// Visual settings
    pub visual: VisualSettings,
    /// Gameplay settings
    pub gameplay: GameplaySettings,
    /// Name recorded with high scores
    pub player_name: String,
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
    pub rotate: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub pause: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub quit: Vec<String>,
}

/// Deserialize keys as either a single string or array of strings
fn deserialize_keys<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
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

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
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
fn serialize_keys<S>(keys: &[String], serializer: S) -> Result<S::Ok, S::Error>
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

/// Block styles in the order the settings menu cycles them
pub const BLOCK_STYLES: [&str; 3] = ["solid", "bracket", "round"];

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
    /// Delayed Auto Shift in milliseconds
    pub das_ms: u64,
    /// Auto Repeat Rate in milliseconds
    pub arr_ms: u64,
    pub starting_level: u32,
    pub piece_order: PieceOrder,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            keys: KeyBindings::default(),
            visual: VisualSettings::default(),
            gameplay: GameplaySettings::default(),
            player_name: "Player".to_string(),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            move_left: vec!["Left".to_string()],
            move_right: vec!["Right".to_string()],
            soft_drop: vec!["Down".to_string()],
            hard_drop: vec!["Space".to_string()],
            rotate: vec!["Up".to_string(), "x".to_string()],
            pause: vec!["p".to_string()],
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
            das_ms: 170,
            arr_ms: 50,
            starting_level: 1,
            piece_order: PieceOrder::Cycle,
        }
    }
}

/// Every action that can be bound, in display order
pub const BINDABLE_ACTIONS: [Action; 7] = [
    Action::MoveLeft,
    Action::MoveRight,
    Action::SoftDrop,
    Action::HardDrop,
    Action::Rotate,
    Action::Pause,
    Action::Quit,
];

/// Display name of a bindable action
pub fn action_name(action: Action) -> &'static str {
    match action {
        Action::MoveLeft => "Move Left",
        Action::MoveRight => "Move Right",
        Action::SoftDrop => "Soft Drop",
        Action::HardDrop => "Hard Drop",
        Action::Rotate => "Rotate",
        Action::Pause => "Pause",
        Action::Quit => "Quit",
    }
}

fn same_key(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

impl KeyBindings {
    pub fn keys_for(&self, action: Action) -> &[String] {
        match action {
            Action::MoveLeft => &self.move_left,
            Action::MoveRight => &self.move_right,
            Action::SoftDrop => &self.soft_drop,
            Action::HardDrop => &self.hard_drop,
            Action::Rotate => &self.rotate,
            Action::Pause => &self.pause,
            Action::Quit => &self.quit,
        }
    }

    fn keys_for_mut(&mut self, action: Action) -> &mut Vec<String> {
        match action {
            Action::MoveLeft => &mut self.move_left,
            Action::MoveRight => &mut self.move_right,
            Action::SoftDrop => &mut self.soft_drop,
            Action::HardDrop => &mut self.hard_drop,
            Action::Rotate => &mut self.rotate,
            Action::Pause => &mut self.pause,
            Action::Quit => &mut self.quit,
        }
    }

    /// The action a key is currently bound to, if any
    pub fn action_for(&self, key: &str) -> Option<Action> {
        BINDABLE_ACTIONS
            .into_iter()
            .find(|&action| self.keys_for(action).iter().any(|k| same_key(k, key)))
    }

    /// Check that `key` may be given to `action`
    fn check(&self, action: Action, key: &str) -> Result<(), SettingsError> {
        if RESERVED_KEYS.iter().any(|r| same_key(r, key)) {
            return Err(SettingsError::KeyReserved(key.to_string()));
        }
        match self.action_for(key) {
            Some(owner) if owner != action => Err(SettingsError::KeyTaken {
                key: key.to_string(),
                action: action_name(owner).to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Replace all keys of an action with a single key
    pub fn set_key(&mut self, action: Action, key: &str) -> Result<(), SettingsError> {
        self.check(action, key)?;
        *self.keys_for_mut(action) = vec![key.to_string()];
        Ok(())
    }

    /// Add another key to an action
    pub fn add_key(&mut self, action: Action, key: &str) -> Result<(), SettingsError> {
        self.check(action, key)?;
        let keys = self.keys_for_mut(action);
        if !keys.iter().any(|k| same_key(k, key)) {
            keys.push(key.to_string());
        }
        Ok(())
    }

    /// Unbind every key of an action
    pub fn clear(&mut self, action: Action) {
        self.keys_for_mut(action).clear();
    }

    /// Format the keys of an action for display, e.g. "Up / x"
    pub fn describe(&self, action: Action) -> String {
        self.keys_for(action).join(" / ")
    }
}

impl Settings {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf, SettingsError> {
        ProjectDirs::from("com", "bucketris", "bucketris")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or(SettingsError::NoConfigDir)
    }

    /// Get the settings file path
    fn settings_path() -> Result<PathBuf, SettingsError> {
        Self::config_dir().map(|dir| dir.join("settings.toml"))
    }

    /// Load settings from file, or create default
    pub fn load() -> Self {
        let loaded = Self::settings_path().and_then(|path| Self::load_from(&path));
        match loaded {
            Ok(settings) => settings,
            Err(SettingsError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no settings file yet, using defaults");
                Self::default()
            }
            Err(e) => {
                warn!(error = %e, "failed to load settings, using defaults");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Save settings to file
    pub fn save(&self) -> Result<(), SettingsError> {
        self.save_to(&Self::settings_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        // Create directory if needed
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        debug!(path = %path.display(), "settings saved");
        Ok(())
    }

    /// Restore defaults, keeping the player's name
    pub fn reset(&mut self) {
        let player_name = std::mem::take(&mut self.player_name);
        *self = Self {
            player_name,
            ..Self::default()
        };
    }

    /// Starting level clamped to the supported range
    pub fn starting_level(&self) -> u32 {
        self.gameplay.starting_level.clamp(1, MAX_STARTING_LEVEL)
    }
}

impl VisualSettings {
    /// Get the block characters based on style
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

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("bucketris-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_defaults_have_no_conflicts() {
        let keys = KeyBindings::default();
        let mut seen = Vec::new();
        for action in BINDABLE_ACTIONS {
            for key in keys.keys_for(action) {
                assert!(!seen.contains(key), "{} bound twice", key);
                assert!(!RESERVED_KEYS.contains(&key.as_str()));
                seen.push(key.clone());
            }
        }
    }

    #[test]
    fn test_set_key() {
        let mut keys = KeyBindings::default();
        keys.set_key(Action::HardDrop, "w").unwrap();
        assert_eq!(keys.keys_for(Action::HardDrop), ["w".to_string()]);
        assert_eq!(keys.action_for("W"), Some(Action::HardDrop));
        assert_eq!(keys.action_for("Space"), None);
    }

    #[test]
    fn test_add_key() {
        let mut keys = KeyBindings::default();
        keys.add_key(Action::MoveLeft, "a").unwrap();
        assert_eq!(keys.describe(Action::MoveLeft), "Left / a");
        // Adding the same key again is a no-op
        keys.add_key(Action::MoveLeft, "A").unwrap();
        assert_eq!(keys.keys_for(Action::MoveLeft).len(), 2);
    }

    #[test]
    fn test_key_conflict_rejected() {
        let mut keys = KeyBindings::default();
        let err = keys.set_key(Action::Pause, "q").unwrap_err();
        assert!(matches!(err, SettingsError::KeyTaken { ref action, .. } if action == "Quit"));
        assert_eq!(keys.keys_for(Action::Pause), ["p".to_string()]);
    }

    #[test]
    fn test_reserved_keys_rejected() {
        let mut keys = KeyBindings::default();
        assert!(matches!(
            keys.set_key(Action::Rotate, "Enter"),
            Err(SettingsError::KeyReserved(_))
        ));
        assert!(matches!(
            keys.add_key(Action::Pause, "esc"),
            Err(SettingsError::KeyReserved(_))
        ));
    }

    #[test]
    fn test_rebinding_own_key_is_allowed() {
        let mut keys = KeyBindings::default();
        keys.set_key(Action::Rotate, "x").unwrap();
        assert_eq!(keys.keys_for(Action::Rotate), ["x".to_string()]);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let path = temp_path("settings.toml");
        let mut settings = Settings::default();
        settings.player_name = "Ada".to_string();
        settings.gameplay.piece_order = PieceOrder::Bag;
        settings.gameplay.starting_level = 4;
        settings.keys.add_key(Action::SoftDrop, "s").unwrap();
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded, settings);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_single_key_serializes_as_string() {
        let text = toml::to_string_pretty(&Settings::default()).unwrap();
        assert!(text.contains("move_left = \"Left\""));
        assert!(text.contains("rotate = ["));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let text = "player_name = \"Bo\"\n[keys]\npause = \"o\"\n";
        let settings: Settings = toml::from_str(text).unwrap();
        assert_eq!(settings.player_name, "Bo");
        assert_eq!(settings.keys.pause, vec!["o".to_string()]);
        assert_eq!(settings.keys.quit, vec!["q".to_string()]);
        assert_eq!(settings.gameplay, GameplaySettings::default());
    }

    #[test]
    fn test_bad_file_is_parse_error() {
        let path = temp_path("broken.toml");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "keys = 5").unwrap();
        assert!(matches!(Settings::load_from(&path), Err(SettingsError::Parse(_))));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_reset_keeps_name() {
        let mut settings = Settings::default();
        settings.player_name = "Cy".to_string();
        settings.visual.show_ghost = false;
        settings.reset();
        assert!(settings.visual.show_ghost);
        assert_eq!(settings.player_name, "Cy");
    }

    #[test]
    fn test_block_chars() {
        let mut visual = VisualSettings::default();
        assert_eq!(visual.block_chars().0, "██");
        visual.block_style = "bracket".to_string();
        assert_eq!(visual.block_chars(), ("[]", ".."));
        visual.block_style = "unknown".to_string();
        assert_eq!(visual.block_chars().0, "██");
    }

    #[test]
    fn test_clear_unbinds() {
        let mut keys = KeyBindings::default();
        keys.clear(Action::Rotate);
        assert!(keys.rotate.is_empty());
        assert_eq!(keys.action_for("x"), None);
    }
}
