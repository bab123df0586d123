//! Main menu system with settings configuration

use crate::bag::PieceOrder;
use crate::game::Action;
use crate::mode::GameMode;
use crate::picture::PictureKind;
use crate::settings::{BINDABLE_ACTIONS, BLOCK_STYLES, MAX_STARTING_LEVEL, Settings, action_name};

/// Longest player name accepted by the text field
pub const MAX_NAME_LEN: usize = 16;

/// Menu screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuScreen {
    Main,
    FieldSelect,
    PictureSelect,
    HighScores,
    Settings,
    SettingsKeys,
    SettingsVisual,
    SettingsGameplay,
}

/// Menu state
#[derive(Debug, Clone)]
pub struct Menu {
    pub screen: MenuScreen,
    pub selected: usize,
    pub items: Vec<MenuItem>,
    /// For key rebinding: which action is waiting for input
    pub rebinding: Option<usize>,
    /// Feedback line, e.g. a rejected key binding
    pub status: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MenuItem {
    pub label: String,
    pub item_type: MenuItemType,
}

#[derive(Debug, Clone)]
pub enum MenuItemType {
    /// Simple button that triggers an action
    Button(MenuAction),
    /// Toggle boolean setting
    Toggle { key: SettingKey, value: bool },
    /// Cycle through options
    Cycle { key: SettingKey, options: Vec<String>, current: usize },
    /// Numeric value with increment/decrement
    Number { key: SettingKey, value: u64, min: u64, max: u64, step: u64 },
    /// Key binding (shows current keys, can rebind)
    KeyBind { action: Action, keys: Vec<String> },
    /// Text input field
    TextInput { key: SettingKey, value: String, placeholder: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    StartGame(GameMode),
    GoToScreen(MenuScreen),
    Back,
    Quit,
    ResetSettings,
}

/// Setting keys for identifying which setting to modify
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    PlayerName,
    ShowGhost,
    BlockStyle,
    DasMs,
    ArrMs,
    StartingLevel,
    PieceOrder,
}

fn button(label: &str, action: MenuAction) -> MenuItem {
    MenuItem {
        label: label.to_string(),
        item_type: MenuItemType::Button(action),
    }
}

impl Menu {
    fn with_items(screen: MenuScreen, items: Vec<MenuItem>) -> Self {
        Self {
            screen,
            selected: 0,
            items,
            rebinding: None,
            status: None,
        }
    }

    pub fn main_menu(settings: &Settings) -> Self {
        let mut menu = Self::with_items(
            MenuScreen::Main,
            vec![
                MenuItem {
                    label: "Player".to_string(),
                    item_type: MenuItemType::TextInput {
                        key: SettingKey::PlayerName,
                        value: settings.player_name.clone(),
                        placeholder: "Your name".to_string(),
                    },
                },
                button("Play", MenuAction::GoToScreen(MenuScreen::FieldSelect)),
                button("High Scores", MenuAction::GoToScreen(MenuScreen::HighScores)),
                button("Settings", MenuAction::GoToScreen(MenuScreen::Settings)),
                button("Quit", MenuAction::Quit),
            ],
        );
        menu.selected = 1;
        menu
    }

    pub fn field_select() -> Self {
        Self::with_items(
            MenuScreen::FieldSelect,
            vec![
                button("Standard", MenuAction::StartGame(GameMode::Standard)),
                button("Bucket", MenuAction::StartGame(GameMode::Bucket)),
                button("Picture", MenuAction::GoToScreen(MenuScreen::PictureSelect)),
                button("Back", MenuAction::Back),
            ],
        )
    }

    pub fn picture_select() -> Self {
        let mut items: Vec<MenuItem> = PictureKind::all()
            .into_iter()
            .map(|kind| button(kind.name(), MenuAction::StartGame(GameMode::Picture(kind))))
            .collect();
        items.push(button("Back", MenuAction::Back));
        Self::with_items(MenuScreen::PictureSelect, items)
    }

    /// The table itself is drawn from the loaded scores
    pub fn high_scores() -> Self {
        Self::with_items(MenuScreen::HighScores, vec![button("Back", MenuAction::Back)])
    }

    pub fn settings_menu() -> Self {
        Self::with_items(
            MenuScreen::Settings,
            vec![
                button("Key Bindings", MenuAction::GoToScreen(MenuScreen::SettingsKeys)),
                button("Visual", MenuAction::GoToScreen(MenuScreen::SettingsVisual)),
                button("Gameplay", MenuAction::GoToScreen(MenuScreen::SettingsGameplay)),
                button("Reset to Defaults", MenuAction::ResetSettings),
                button("Back", MenuAction::Back),
            ],
        )
    }

    pub fn settings_keys(settings: &Settings) -> Self {
        let mut items: Vec<MenuItem> = BINDABLE_ACTIONS
            .into_iter()
            .map(|action| MenuItem {
                label: action_name(action).to_string(),
                item_type: MenuItemType::KeyBind {
                    action,
                    keys: settings.keys.keys_for(action).to_vec(),
                },
            })
            .collect();
        items.push(button("Back", MenuAction::Back));
        Self::with_items(MenuScreen::SettingsKeys, items)
    }

    pub fn settings_visual(settings: &Settings) -> Self {
        let current_style = BLOCK_STYLES
            .iter()
            .position(|s| *s == settings.visual.block_style)
            .unwrap_or(0);

        Self::with_items(
            MenuScreen::SettingsVisual,
            vec![
                MenuItem {
                    label: "Ghost Piece".to_string(),
                    item_type: MenuItemType::Toggle {
                        key: SettingKey::ShowGhost,
                        value: settings.visual.show_ghost,
                    },
                },
                MenuItem {
                    label: "Block Style".to_string(),
                    item_type: MenuItemType::Cycle {
                        key: SettingKey::BlockStyle,
                        options: BLOCK_STYLES.iter().map(|s| s.to_string()).collect(),
                        current: current_style,
                    },
                },
                button("Back", MenuAction::Back),
            ],
        )
    }

    pub fn settings_gameplay(settings: &Settings) -> Self {
        let orders = [PieceOrder::Cycle, PieceOrder::Bag];
        let current_order = orders
            .iter()
            .position(|o| *o == settings.gameplay.piece_order)
            .unwrap_or(0);

        Self::with_items(
            MenuScreen::SettingsGameplay,
            vec![
                MenuItem {
                    label: "Starting Level".to_string(),
                    item_type: MenuItemType::Number {
                        key: SettingKey::StartingLevel,
                        value: settings.starting_level() as u64,
                        min: 1,
                        max: MAX_STARTING_LEVEL as u64,
                        step: 1,
                    },
                },
                MenuItem {
                    label: "Piece Order".to_string(),
                    item_type: MenuItemType::Cycle {
                        key: SettingKey::PieceOrder,
                        options: orders.iter().map(|o| o.name().to_string()).collect(),
                        current: current_order,
                    },
                },
                MenuItem {
                    label: "DAS (ms)".to_string(),
                    item_type: MenuItemType::Number {
                        key: SettingKey::DasMs,
                        value: settings.gameplay.das_ms,
                        min: 0,
                        max: 500,
                        step: 10,
                    },
                },
                MenuItem {
                    label: "ARR (ms)".to_string(),
                    item_type: MenuItemType::Number {
                        key: SettingKey::ArrMs,
                        value: settings.gameplay.arr_ms,
                        min: 0,
                        max: 100,
                        step: 5,
                    },
                },
                button("Back", MenuAction::Back),
            ],
        )
    }

    /// Whether the selected item is a text field
    pub fn on_text_input(&self) -> bool {
        self.items
            .get(self.selected)
            .is_some_and(|item| matches!(item.item_type, MenuItemType::TextInput { .. }))
    }

    /// Whether the selected item is a key binding
    pub fn on_key_bind(&self) -> bool {
        self.items
            .get(self.selected)
            .is_some_and(|item| matches!(item.item_type, MenuItemType::KeyBind { .. }))
    }

    /// Add character to text input
    pub fn text_input_char(&mut self, c: char, settings: &mut Settings) {
        if c.is_whitespace() || c.is_control() {
            return;
        }
        if let Some(item) = self.items.get_mut(self.selected) {
            if let MenuItemType::TextInput { key, value, .. } = &mut item.item_type {
                if value.chars().count() < MAX_NAME_LEN {
                    value.push(c);
                    apply_setting(settings, *key, &SettingValue::String(value.clone()));
                }
            }
        }
    }

    /// Backspace on text input
    pub fn text_input_backspace(&mut self, settings: &mut Settings) {
        if let Some(item) = self.items.get_mut(self.selected) {
            if let MenuItemType::TextInput { key, value, .. } = &mut item.item_type {
                value.pop();
                apply_setting(settings, *key, &SettingValue::String(value.clone()));
            }
        }
    }

    pub fn move_up(&mut self) {
        if self.rebinding.is_some() {
            return; // Don't move while rebinding
        }
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = self.items.len().saturating_sub(1);
        }
    }

    pub fn move_down(&mut self) {
        if self.rebinding.is_some() {
            return;
        }
        if self.selected + 1 < self.items.len() {
            self.selected += 1;
        } else {
            self.selected = 0;
        }
    }

    /// Handle left/right for cycling options and numbers
    pub fn adjust_left(&mut self, settings: &mut Settings) {
        self.adjust(settings, false);
    }

    pub fn adjust_right(&mut self, settings: &mut Settings) {
        self.adjust(settings, true);
    }

    fn adjust(&mut self, settings: &mut Settings, forward: bool) {
        if self.rebinding.is_some() {
            return;
        }
        if let Some(item) = self.items.get_mut(self.selected) {
            match &mut item.item_type {
                MenuItemType::Toggle { key, value } => {
                    *value = !*value;
                    apply_setting(settings, *key, &SettingValue::Bool(*value));
                }
                MenuItemType::Cycle { key, options, current } if !options.is_empty() => {
                    *current = if forward {
                        (*current + 1) % options.len()
                    } else if *current == 0 {
                        options.len() - 1
                    } else {
                        *current - 1
                    };
                    apply_setting(settings, *key, &SettingValue::String(options[*current].clone()));
                }
                MenuItemType::Number { key, value, min, max, step } => {
                    *value = if forward {
                        (*value + *step).min(*max)
                    } else {
                        value.saturating_sub(*step).max(*min)
                    };
                    apply_setting(settings, *key, &SettingValue::Number(*value));
                }
                _ => {}
            }
        }
    }

    /// Get the action for the current selection (for Button types)
    pub fn select(&self) -> Option<&MenuAction> {
        if self.rebinding.is_some() {
            return None;
        }
        match &self.items.get(self.selected)?.item_type {
            MenuItemType::Button(action) => Some(action),
            _ => None,
        }
    }

    /// Start rebinding a key
    pub fn start_rebind(&mut self) {
        if self.on_key_bind() {
            self.rebinding = Some(self.selected);
            self.status = None;
        }
    }

    /// Cancel rebinding
    pub fn cancel_rebind(&mut self) {
        self.rebinding = None;
    }

    fn rebinding_action(&self) -> Option<Action> {
        match &self.items.get(self.rebinding?)?.item_type {
            MenuItemType::KeyBind { action, .. } => Some(*action),
            _ => None,
        }
    }

    /// Refresh the displayed keys of every binding from settings
    fn sync_keys(&mut self, settings: &Settings) {
        for item in &mut self.items {
            if let MenuItemType::KeyBind { action, keys } = &mut item.item_type {
                *keys = settings.keys.keys_for(*action).to_vec();
            }
        }
    }

    /// Add a key to the current rebinding action (stays in rebind mode)
    pub fn add_key(&mut self, key_str: &str, settings: &mut Settings) {
        let Some(action) = self.rebinding_action() else {
            return;
        };
        match settings.keys.add_key(action, key_str) {
            Ok(()) => self.status = None,
            Err(e) => self.status = Some(e.to_string()),
        }
        self.sync_keys(settings);
    }

    /// Replace the keys of the current rebinding action and exit rebind mode
    pub fn set_key(&mut self, key_str: &str, settings: &mut Settings) {
        let Some(action) = self.rebinding_action() else {
            return;
        };
        match settings.keys.set_key(action, key_str) {
            Ok(()) => self.status = None,
            Err(e) => self.status = Some(e.to_string()),
        }
        self.sync_keys(settings);
        self.rebinding = None;
    }

    /// Remove every key from the selected binding
    pub fn clear_keys(&mut self, settings: &mut Settings) {
        if let Some(MenuItem {
            item_type: MenuItemType::KeyBind { action, .. },
            ..
        }) = self.items.get(self.selected)
        {
            settings.keys.clear(*action);
            self.sync_keys(settings);
        }
    }

    /// Finish adding keys and exit rebind mode
    pub fn finish_rebind(&mut self) {
        self.rebinding = None;
    }

    pub fn go_to(&mut self, screen: MenuScreen, settings: &Settings) {
        *self = match screen {
            MenuScreen::Main => Self::main_menu(settings),
            MenuScreen::FieldSelect => Self::field_select(),
            MenuScreen::PictureSelect => Self::picture_select(),
            MenuScreen::HighScores => Self::high_scores(),
            MenuScreen::Settings => Self::settings_menu(),
            MenuScreen::SettingsKeys => Self::settings_keys(settings),
            MenuScreen::SettingsVisual => Self::settings_visual(settings),
            MenuScreen::SettingsGameplay => Self::settings_gameplay(settings),
        };
    }

    /// The screen that Back leads to
    pub fn parent(&self) -> MenuScreen {
        match self.screen {
            MenuScreen::Main => MenuScreen::Main,
            MenuScreen::FieldSelect => MenuScreen::Main,
            MenuScreen::PictureSelect => MenuScreen::FieldSelect,
            MenuScreen::HighScores => MenuScreen::Main,
            MenuScreen::Settings => MenuScreen::Main,
            MenuScreen::SettingsKeys => MenuScreen::Settings,
            MenuScreen::SettingsVisual => MenuScreen::Settings,
            MenuScreen::SettingsGameplay => MenuScreen::Settings,
        }
    }

    /// Go back to previous screen
    pub fn go_back(&mut self, settings: &Settings) {
        self.go_to(self.parent(), settings);
    }
}

/// Helper enum for setting values
enum SettingValue {
    Bool(bool),
    String(String),
    Number(u64),
}

/// Apply a setting change to the Settings struct
fn apply_setting(settings: &mut Settings, key: SettingKey, value: &SettingValue) {
    match (key, value) {
        (SettingKey::PlayerName, SettingValue::String(v)) => {
            settings.player_name = v.clone();
        }
        (SettingKey::ShowGhost, SettingValue::Bool(v)) => {
            settings.visual.show_ghost = *v;
        }
        (SettingKey::BlockStyle, SettingValue::String(v)) => {
            settings.visual.block_style = v.clone();
        }
        (SettingKey::DasMs, SettingValue::Number(v)) => {
            settings.gameplay.das_ms = *v;
        }
        (SettingKey::ArrMs, SettingValue::Number(v)) => {
            settings.gameplay.arr_ms = *v;
        }
        (SettingKey::StartingLevel, SettingValue::Number(v)) => {
            settings.gameplay.starting_level = *v as u32;
        }
        (SettingKey::PieceOrder, SettingValue::String(v)) => {
            settings.gameplay.piece_order = if v == PieceOrder::Bag.name() {
                PieceOrder::Bag
            } else {
                PieceOrder::Cycle
            };
        }
        _ => {}
    }
}
