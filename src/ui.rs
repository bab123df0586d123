//! Terminal UI rendering with ratatui

use crate::board::{BOUNDARY_COLOR, Cell, FieldShape};
use crate::game::{Action, Game, GameState};
use crate::highscores::HighScores;
use crate::menu::{Menu, MenuAction, MenuItem, MenuItemType, MenuScreen};
use crate::settings::Settings;
use crate::piece::Piece;
use crate::tetromino::TetrominoType;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

const EMPTY: &str = "  ";
/// Marks picture cells that still need filling
const HINT: &str = " ·";

/// Width of the next piece and stats column
const SIDE_WIDTH: u16 = 20;

/// Render the current menu screen
pub fn render_menu(frame: &mut Frame, menu: &Menu, scores: &HighScores) {
    let area = frame.area();

    let (menu_width, menu_height) = match menu.screen {
        MenuScreen::Main => (48u16, 22u16),
        MenuScreen::FieldSelect | MenuScreen::PictureSelect => (52u16, 20u16),
        MenuScreen::HighScores => (64u16, 22u16),
        MenuScreen::SettingsKeys => (56u16, 20u16),
        _ => (52u16, 19u16),
    };

    let menu_area = center_rect(area, menu_width, menu_height);

    let show_big_title = menu.screen == MenuScreen::Main;
    let title_height = if show_big_title { 6u16 } else { 3u16 };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(title_height), Constraint::Min(8)])
        .split(menu_area);

    if show_big_title {
        let title_style = Style::default().fg(Color::Cyan);
        let title_lines = vec![
            Line::styled("█▀▄ █ █ ▄▀▀ █▄▀ █▀▀ ▀█▀ █▀▄ █ ▄▀▀", title_style),
            Line::styled("█▀▄ █ █ █   █ █ █▀▀  █  █▀▄ █  ▀▄", title_style),
            Line::styled("▀▀   ▀   ▀▀ ▀ ▀ ▀▀▀  ▀  ▀ ▀ ▀ ▀▀ ", title_style),
            Line::raw(""),
            Line::styled("fill the field, mind the walls", Style::default().fg(Color::DarkGray)),
        ];
        let title = Paragraph::new(title_lines).alignment(Alignment::Center);
        frame.render_widget(title, layout[0]);
    } else {
        let screen_title = match menu.screen {
            MenuScreen::FieldSelect => "CHOOSE A FIELD",
            MenuScreen::PictureSelect => "CHOOSE A PICTURE",
            MenuScreen::HighScores => "HIGH SCORES",
            MenuScreen::Settings => "SETTINGS",
            MenuScreen::SettingsKeys => "KEY BINDINGS",
            MenuScreen::SettingsVisual => "VISUAL SETTINGS",
            MenuScreen::SettingsGameplay => "GAMEPLAY SETTINGS",
            MenuScreen::Main => "BUCKETRIS",
        };
        let title_lines = vec![
            Line::raw(""),
            Line::styled(screen_title, Style::default().fg(Color::Cyan).bold()),
        ];
        let title = Paragraph::new(title_lines).alignment(Alignment::Center);
        frame.render_widget(title, layout[0]);
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(layout[1]);
    frame.render_widget(block, layout[1]);

    let mut lines = Vec::new();
    lines.push(Line::raw(""));

    if menu.screen == MenuScreen::HighScores {
        lines.extend(score_table(scores));
        lines.push(Line::raw(""));
    }

    for (i, item) in menu.items.iter().enumerate() {
        let is_selected = i == menu.selected;
        let is_rebinding = menu.rebinding == Some(i);
        lines.push(render_menu_item(item, is_selected, is_rebinding));
        if menu.screen != MenuScreen::SettingsKeys {
            lines.push(Line::raw(""));
        }
    }

    // Describe the field under the cursor
    if let Some(MenuAction::StartGame(mode)) = menu.select() {
        lines.push(Line::styled(mode.description(), Style::default().fg(Color::Gray)));
    }

    if let Some(status) = &menu.status {
        lines.push(Line::raw(""));
        lines.push(Line::styled(status.clone(), Style::default().fg(Color::Red).bold()));
    }

    lines.push(Line::raw(""));
    lines.push(Line::styled(controls_hint(menu), Style::default().fg(Color::DarkGray)));

    let menu_text = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(menu_text, inner);
}

/// Lines of the high score table
fn score_table(scores: &HighScores) -> Vec<Line<'static>> {
    if scores.entries.is_empty() {
        return vec![Line::styled("No scores yet", Style::default().fg(Color::DarkGray))];
    }

    let mut lines = vec![Line::styled(
        format!("{:>2}  {:<12} {:>8} {:>5}  {:<14} {}", "#", "NAME", "SCORE", "LINES", "FIELD", "DATE"),
        Style::default().fg(Color::Gray).bold(),
    )];
    for (i, entry) in scores.entries.iter().enumerate() {
        let color = if i == 0 { Color::Yellow } else { Color::White };
        lines.push(Line::styled(
            format!(
                "{:>2}  {:<12} {:>8} {:>5}  {:<14} {}",
                i + 1,
                entry.name,
                entry.score,
                entry.lines,
                entry.field,
                entry.date
            ),
            Style::default().fg(color),
        ));
    }
    lines
}

/// Render a single menu item based on its type
fn render_menu_item(item: &MenuItem, is_selected: bool, is_rebinding: bool) -> Line<'static> {
    let prefix = if is_selected { "▶ " } else { "  " };

    let base_style = if is_selected {
        Style::default().fg(Color::Yellow).bold()
    } else {
        Style::default().fg(Color::White)
    };
    let label = Span::styled(format!("{}{}: ", prefix, item.label), base_style);

    match &item.item_type {
        MenuItemType::Button(_) => Line::styled(format!("{}{}", prefix, item.label), base_style),
        MenuItemType::Toggle { value, .. } => {
            let value_str = if *value { "ON" } else { "OFF" };
            let value_color = if *value { Color::Green } else { Color::Red };
            Line::from(vec![
                label,
                Span::styled(format!("< {} >", value_str), Style::default().fg(value_color).bold()),
            ])
        }
        MenuItemType::Cycle { options, current, .. } => {
            let value_str = options.get(*current).cloned().unwrap_or_default();
            Line::from(vec![
                label,
                Span::styled(format!("< {} >", value_str), Style::default().fg(Color::Cyan)),
            ])
        }
        MenuItemType::Number { value, .. } => Line::from(vec![
            label,
            Span::styled(format!("< {} >", value), Style::default().fg(Color::Cyan)),
        ]),
        MenuItemType::KeyBind { keys, .. } => {
            if is_rebinding {
                Line::from(vec![
                    label,
                    Span::styled("Press a key...", Style::default().fg(Color::Yellow).bold()),
                ])
            } else {
                let keys_str = if keys.is_empty() {
                    "None".to_string()
                } else {
                    keys.join(", ")
                };
                Line::from(vec![
                    label,
                    Span::styled(format!("[{}]", keys_str), Style::default().fg(Color::Magenta)),
                ])
            }
        }
        MenuItemType::TextInput { value, placeholder, .. } => {
            let display = if value.is_empty() {
                Span::styled(placeholder.clone(), Style::default().fg(Color::DarkGray))
            } else {
                Span::styled(value.clone(), Style::default().fg(Color::Green))
            };
            let cursor = if is_selected { "_" } else { "" };
            Line::from(vec![
                label,
                display,
                Span::styled(cursor.to_string(), Style::default().fg(Color::Yellow)),
            ])
        }
    }
}

/// Get the controls hint based on current menu state
fn controls_hint(menu: &Menu) -> String {
    if menu.rebinding.is_some() {
        return "Key=Set | Shift+Key=Add more | Enter=Done | Esc=Cancel".to_string();
    }

    match menu.items.get(menu.selected).map(|item| &item.item_type) {
        Some(MenuItemType::Toggle { .. } | MenuItemType::Cycle { .. } | MenuItemType::Number { .. }) => {
            "↑↓ Select  ←→ Adjust  Esc Back".to_string()
        }
        Some(MenuItemType::KeyBind { .. }) => "↑↓ Select  Enter Rebind  Del Clear  Esc Back".to_string(),
        Some(MenuItemType::TextInput { .. }) => "Type your name  Backspace Delete  ↑↓ Select".to_string(),
        _ => "↑↓ Select  Enter Confirm  Esc Back".to_string(),
    }
}

/// Render the entire game UI
pub fn render_game(frame: &mut Frame, game: &Game, settings: &Settings, scores: &HighScores) {
    let area = frame.area();
    let (block_char, _) = settings.visual.block_chars();

    // Two characters per cell plus the border: 46 + 20 = 66 wide for a 22 column field
    let board_width = game.board.width() as u16 * 2 + 2;
    let board_height = game.board.height() as u16 + 2;
    let game_area = center_rect(area, board_width + SIDE_WIDTH, board_height);

    // Main layout: board | next + stats
    let main_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(board_width), Constraint::Length(SIDE_WIDTH)])
        .split(game_area);

    render_board(frame, main_layout[0], game, settings);

    let right_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(12)])
        .split(main_layout[1]);

    render_next(frame, right_layout[0], game.next_piece(), block_char);
    render_stats(frame, right_layout[1], game, settings, scores);

    match game.state {
        GameState::Paused => {
            let hint = format!("{} resume, Esc menu", settings.keys.describe(Action::Pause));
            render_overlay(frame, area, "PAUSED", &hint, Color::Yellow);
        }
        GameState::GameOver => {
            let subtitle = if game.board.is_boundary_violated() {
                "Outside the picture!"
            } else {
                "Press any key"
            };
            render_overlay(frame, area, "GAME OVER", subtitle, Color::Red);
        }
        GameState::Victory => {
            let time = game.mode_state.format_time();
            render_overlay(frame, area, "COMPLETE!", &format!("Time: {}", time), Color::Green);
        }
        GameState::Playing | GameState::Abandoned => {}
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

/// Render the next piece preview
fn render_next(frame: &mut Frame, area: Rect, kind: TetrominoType, block_char: &str) {
    let block = Block::default()
        .title(" NEXT ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    render_mini_piece(frame, inner, kind, block_char);
}

/// Render a small piece preview, skipping the empty rows of its bitmap
fn render_mini_piece(frame: &mut Frame, area: Rect, kind: TetrominoType, block_char: &str) {
    if area.height < 1 || area.width < 4 {
        return;
    }

    let piece = Piece::new(kind);
    let color = piece.color();
    let shape = piece.shape();
    let (width, height) = piece.bounding_box();

    let lines: Vec<Line> = (0..height)
        .filter(|&row| (0..width).any(|col| shape.is_filled(row, col)))
        .map(|row| {
            let spans: Vec<Span> = (0..width)
                .map(|col| {
                    if shape.is_filled(row, col) {
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

/// Render the game board
fn render_board(frame: &mut Frame, area: Rect, game: &Game, settings: &Settings) {
    let (block_char, ghost_char) = settings.visual.block_chars();

    let title = format!(" {} ", game.mode().label());
    let block = Block::default()
        .title(title)
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let current: Vec<(i32, i32)> = game
        .current_piece
        .as_ref()
        .map(|piece| piece.blocks().collect())
        .unwrap_or_default();
    let ghost: Vec<(i32, i32)> = if settings.visual.show_ghost {
        game.ghost_piece()
            .map(|piece| piece.blocks().collect())
            .unwrap_or_default()
    } else {
        Vec::new()
    };
    let current_color = game.current_piece.as_ref().map(|piece| piece.color());
    let picture = game.board.as_picture();

    let mut lines: Vec<Line> = Vec::new();
    for (row, cells) in game.board.rows().enumerate() {
        let row = row as i32;
        let spans: Vec<Span> = cells
            .iter()
            .enumerate()
            .map(|(col, cell)| {
                let col = col as i32;
                let (text, style) = match (current_color, *cell) {
                    (Some(color), _) if current.contains(&(row, col)) => (block_char, Style::default().fg(color)),
                    (_, Cell::Wall | Cell::Filled(_)) => {
                        let color = game.board.color(row, col).unwrap_or(BOUNDARY_COLOR);
                        (block_char, Style::default().fg(color))
                    }
                    (Some(color), Cell::Empty) if ghost.contains(&(row, col)) => {
                        (ghost_char, Style::default().fg(color).dim())
                    }
                    (_, Cell::Empty) if picture.is_some_and(|p| p.is_target(row, col) && !p.is_filled(row, col)) => {
                        (HINT, Style::default().fg(Color::DarkGray))
                    }
                    (_, Cell::Empty) => (EMPTY, Style::default()),
                };
                Span::styled(text, style)
            })
            .collect();
        lines.push(Line::from(spans));
    }

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

fn stat(lines: &mut Vec<Line<'static>>, label: &str, value: String, color: Color) {
    lines.push(Line::from(Span::styled(label.to_string(), Style::default().fg(Color::Gray))));
    lines.push(Line::from(Span::styled(value, Style::default().fg(color).bold())));
}

/// Render stats panel
fn render_stats(frame: &mut Frame, area: Rect, game: &Game, settings: &Settings, scores: &HighScores) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = Vec::new();
    stat(&mut lines, "SCORE", game.score.points.to_string(), Color::Yellow);
    if let Some(best) = scores.best() {
        lines.push(Line::styled(format!("best {}", best), Style::default().fg(Color::DarkGray)));
    }
    stat(&mut lines, "LEVEL", game.score.level.to_string(), Color::Cyan);
    stat(&mut lines, "LINES", game.score.lines.to_string(), Color::Green);
    stat(&mut lines, "TIME", game.mode_state.format_time(), Color::White);

    if let FieldShape::Bucket(_) = game.board.shape() {
        let board = &game.board;
        let floor = board.height() as i32 - 2;
        stat(
            &mut lines,
            "WIDTH",
            format!("{} to {}", board.row_valid_width(0), board.row_valid_width(floor)),
            Color::Blue,
        );
    }

    if let Some((filled, total)) = game.picture_progress() {
        let percent = if total == 0 { 100 } else { filled * 100 / total };
        stat(
            &mut lines,
            "PICTURE",
            format!("{}/{} {}%", filled, total, percent),
            Color::Magenta,
        );
    }

    if let Some(action) = &game.last_action {
        lines.push(Line::raw(""));
        lines.push(Line::styled(action.clone(), Style::default().fg(Color::Magenta).bold()));
    }

    lines.push(Line::raw(""));
    lines.push(Line::styled(
        format!("{} pause", settings.keys.describe(Action::Pause)),
        Style::default().fg(Color::DarkGray),
    ));
    lines.push(Line::styled(
        format!("{} quit", settings.keys.describe(Action::Quit)),
        Style::default().fg(Color::DarkGray),
    ));

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

/// Render an overlay (for pause/game over)
fn render_overlay(frame: &mut Frame, area: Rect, title: &str, subtitle: &str, color: Color) {
    let popup_width = 28u16;
    let popup_height = 5u16;
    let popup_area = center_rect(area, popup_width, popup_height);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let text = vec![
        Line::styled(title.to_string(), Style::default().fg(color).bold()),
        Line::raw(""),
        Line::styled(subtitle.to_string(), Style::default().fg(Color::Gray)),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{Terminal, backend::TestBackend};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_center_rect() {
        let area = Rect::new(0, 0, 100, 40);
        assert_eq!(center_rect(area, 20, 10), Rect::new(40, 15, 20, 10));
        // Clamped to small terminals
        assert_eq!(center_rect(Rect::new(0, 0, 10, 5), 20, 10), Rect::new(0, 0, 10, 5));
    }

    #[test]
    fn test_render_game_shows_score_and_field() {
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        let game = Game::default();
        let settings = Settings::default();
        let scores = HighScores::default();
        terminal
            .draw(|frame| render_game(frame, &game, &settings, &scores))
            .unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("SCORE"));
        assert!(text.contains("Standard"));
        assert!(text.contains("NEXT"));
    }

    #[test]
    fn test_render_high_scores() {
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        let mut scores = HighScores::default();
        scores.add("Ada", 1234, 5, 1, "Bucket");
        let menu = Menu::high_scores();
        terminal.draw(|frame| render_menu(frame, &menu, &scores)).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("Ada"));
        assert!(text.contains("1234"));
    }
}
