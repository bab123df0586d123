//! Input handling with DAS (Delayed Auto Shift) and ARR (Auto Repeat Rate)
//!
//! Uses a polling-based approach that doesn't rely on key release events,
//! which are unreliable on Linux terminals.

use crate::game::Action;
use crate::settings::{BINDABLE_ACTIONS, Settings};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};

/// Time after which we consider a key "released" if no repeat received
const KEY_TIMEOUT: Duration = Duration::from_millis(100);

/// Input handler with DAS/ARR support
pub struct InputHandler {
    /// Last press time for movement keys (for DAS)
    left_state: Option<KeyPressState>,
    right_state: Option<KeyPressState>,
    down_state: Option<KeyPressState>,
    /// Key bindings
    bindings: KeyMap,
    /// DAS duration
    das: Duration,
    /// ARR duration
    arr: Duration,
}

#[derive(Debug, Clone)]
struct KeyPressState {
    first_press: Instant,
    last_seen: Instant,
    das_triggered: bool,
    last_arr: Option<Instant>,
}

impl KeyPressState {
    fn new(now: Instant) -> Self {
        Self {
            first_press: now,
            last_seen: now,
            das_triggered: false,
            last_arr: None,
        }
    }
}

/// Parsed key codes for every action
#[derive(Debug, Clone)]
pub struct KeyMap {
    entries: Vec<(Action, Vec<KeyCode>)>,
}

impl KeyMap {
    /// Create a key map from settings, skipping names that do not parse
    pub fn from_settings(settings: &Settings) -> Self {
        let entries = BINDABLE_ACTIONS
            .into_iter()
            .map(|action| {
                let codes = settings
                    .keys
                    .keys_for(action)
                    .iter()
                    .filter_map(|name| parse_key(name))
                    .collect();
                (action, codes)
            })
            .collect();
        Self { entries }
    }

    /// The action bound to a key code
    pub fn action_for(&self, code: KeyCode) -> Option<Action> {
        self.entries
            .iter()
            .find(|(_, codes)| codes.contains(&code))
            .map(|(action, _)| *action)
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Parse a key name into a KeyCode
pub fn parse_key(s: &str) -> Option<KeyCode> {
    let code = match s.to_lowercase().as_str() {
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "space" => KeyCode::Char(' '),
        "enter" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "backspace" => KeyCode::Backspace,
        "delete" => KeyCode::Delete,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "insert" => KeyCode::Insert,
        "esc" | "escape" => KeyCode::Esc,
        s if s.len() > 1 && s.starts_with('f') => KeyCode::F(s[1..].parse().ok()?),
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

/// Name of a key code as stored in the settings file
pub fn key_name(code: KeyCode) -> Option<String> {
    let name = match code {
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::Insert => "Insert".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_ascii_lowercase().to_string(),
        _ => return None,
    };
    Some(name)
}

impl InputHandler {
    /// Create input handler from settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            left_state: None,
            right_state: None,
            down_state: None,
            bindings: KeyMap::from_settings(settings),
            das: Duration::from_millis(settings.gameplay.das_ms),
            arr: Duration::from_millis(settings.gameplay.arr_ms),
        }
    }

    /// Handle a key press event - returns immediate actions
    pub fn key_down(&mut self, key: KeyEvent) -> Vec<Action> {
        let now = Instant::now();

        // Handle Ctrl+C for quit
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return vec![Action::Quit];
        }

        let Some(action) = self.bindings.action_for(normalize_key(key.code)) else {
            return Vec::new();
        };

        // Movement keys with DAS/ARR tracking fire once on a new press
        let (state, opposite) = match action {
            Action::MoveLeft => (&mut self.left_state, Some(&mut self.right_state)),
            Action::MoveRight => (&mut self.right_state, Some(&mut self.left_state)),
            Action::SoftDrop => (&mut self.down_state, None),
            other => return vec![other],
        };
        if let Some(opposite) = opposite {
            *opposite = None;
        }
        match state {
            Some(held) => {
                held.last_seen = now;
                Vec::new()
            }
            None => {
                *state = Some(KeyPressState::new(now));
                vec![action]
            }
        }
    }

    /// Handle a key release event (may not be called on Linux)
    pub fn key_up(&mut self, key: KeyEvent) {
        match self.bindings.action_for(normalize_key(key.code)) {
            Some(Action::MoveLeft) => self.left_state = None,
            Some(Action::MoveRight) => self.right_state = None,
            Some(Action::SoftDrop) => self.down_state = None,
            _ => {}
        }
    }

    /// Update held keys and return repeat actions (call every frame)
    pub fn update(&mut self) -> Vec<Action> {
        self.update_at(Instant::now())
    }

    fn update_at(&mut self, now: Instant) -> Vec<Action> {
        let mut actions = Vec::new();
        let das = self.das;
        let arr = self.arr;

        for (slot, action) in [
            (&mut self.left_state, Action::MoveLeft),
            (&mut self.right_state, Action::MoveRight),
            (&mut self.down_state, Action::SoftDrop),
        ] {
            // No recent key event means the key was released
            if slot
                .as_ref()
                .is_some_and(|state| now.duration_since(state.last_seen) > KEY_TIMEOUT)
            {
                *slot = None;
            }
            if let Some(state) = slot {
                if process_das_arr(state, now, das, arr) {
                    actions.push(action);
                }
            }
        }

        actions
    }

    /// Clear all held keys (useful for pause/resume)
    pub fn clear(&mut self) {
        self.left_state = None;
        self.right_state = None;
        self.down_state = None;
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Process DAS/ARR logic for a key state, returns true if should trigger action
fn process_das_arr(state: &mut KeyPressState, now: Instant, das: Duration, arr: Duration) -> bool {
    let held_duration = now.duration_since(state.first_press);

    if held_duration >= das {
        if !state.das_triggered {
            // First trigger after DAS
            state.das_triggered = true;
            state.last_arr = Some(now);
            return true;
        } else if let Some(last) = state.last_arr {
            // Subsequent ARR triggers
            if now.duration_since(last) >= arr {
                state.last_arr = Some(now);
                return true;
            }
        }
    }

    false
}

/// Normalize key codes for consistent handling
fn normalize_key(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_parse_and_name_agree() {
        for name in ["Left", "Space", "Esc", "F5", "x", "PageUp"] {
            let code = parse_key(name).unwrap();
            assert_eq!(key_name(code).as_deref(), Some(name));
        }
        assert_eq!(parse_key("nonsense"), None);
        assert_eq!(parse_key("X"), Some(KeyCode::Char('x')));
    }

    #[test]
    fn test_default_bindings() {
        let mut input = InputHandler::default();
        assert_eq!(input.key_down(press(KeyCode::Up)), vec![Action::Rotate]);
        assert_eq!(input.key_down(press(KeyCode::Char('X'))), vec![Action::Rotate]);
        assert_eq!(input.key_down(press(KeyCode::Char(' '))), vec![Action::HardDrop]);
        assert_eq!(input.key_down(press(KeyCode::Char('p'))), vec![Action::Pause]);
        assert!(input.key_down(press(KeyCode::Char('k'))).is_empty());
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut input = InputHandler::default();
        let event = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(input.key_down(event), vec![Action::Quit]);
    }

    #[test]
    fn test_rebound_keys() {
        let mut settings = Settings::default();
        settings.keys.set_key(Action::Rotate, "w").unwrap();
        let mut input = InputHandler::from_settings(&settings);
        assert_eq!(input.key_down(press(KeyCode::Char('w'))), vec![Action::Rotate]);
        assert!(input.key_down(press(KeyCode::Up)).is_empty());
    }

    #[test]
    fn test_held_key_fires_once_then_repeats() {
        let mut input = InputHandler::default();
        assert_eq!(input.key_down(press(KeyCode::Left)), vec![Action::MoveLeft]);
        // Terminal auto-repeat before DAS elapses does not move again
        assert!(input.key_down(press(KeyCode::Left)).is_empty());

        let start = input.left_state.as_ref().unwrap().first_press;
        let state = input.left_state.as_mut().unwrap();
        state.last_seen = start + Duration::from_millis(240);

        assert_eq!(
            input.update_at(start + Duration::from_millis(170)),
            vec![Action::MoveLeft]
        );
        assert!(input.update_at(start + Duration::from_millis(190)).is_empty());
        assert_eq!(
            input.update_at(start + Duration::from_millis(220)),
            vec![Action::MoveLeft]
        );
    }

    #[test]
    fn test_key_times_out() {
        let mut input = InputHandler::default();
        input.key_down(press(KeyCode::Down));
        let start = input.down_state.as_ref().unwrap().first_press;
        assert!(input.update_at(start + Duration::from_millis(500)).is_empty());
        assert!(input.down_state.is_none());
    }

    #[test]
    fn test_opposite_direction_cancels() {
        let mut input = InputHandler::default();
        input.key_down(press(KeyCode::Left));
        assert_eq!(input.key_down(press(KeyCode::Right)), vec![Action::MoveRight]);
        assert!(input.left_state.is_none());
        input.clear();
        assert!(input.right_state.is_none());
    }
}
