//! Bucketris - a terminal Tetris with shaped fields
//!
//! Play on the classic rectangle, in a bucket whose walls close in toward
//! the top, or fill a picture outline without spilling over its edge.

mod bag;
mod board;
mod bucket;
mod engine;
mod game;
mod highscores;
mod input;
mod menu;
mod mode;
mod picture;
mod piece;
mod score;
mod settings;
mod tetromino;
mod ui;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use game::{Game, GameState};
use highscores::HighScores;
use input::{InputHandler, key_name};
use menu::{Menu, MenuAction, MenuScreen};
use ratatui::{Terminal, backend::CrosstermBackend};
use settings::Settings;
use std::{
    io::{self, stdout},
    path::PathBuf,
    time::{Duration, Instant},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Target frame rate
const TARGET_FPS: u64 = 60;
const FRAME_DURATION: Duration = Duration::from_micros(1_000_000 / TARGET_FPS);

/// Input delay after game over to prevent accidental menu return
const GAME_OVER_INPUT_DELAY: Duration = Duration::from_secs(2);

/// Application state
enum AppState {
    Menu(Menu),
    Playing(Game, InputHandler),
}

/// Get the bucketris temp directory, creating it if needed
fn temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join("bucketris");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn main() -> io::Result<()> {
    let session_id: u32 = rand::random();
    let log_dir = temp_dir();
    let log_file = format!("{:08x}.log", session_id);

    // Setup tracing to log file
    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bucketris=debug")),
        )
        .with_ansi(false)
        .init();

    info!(
        session = %format!("{:08x}", session_id),
        log = %log_dir.join(&log_file).display(),
        "bucketris starting up"
    );

    let mut settings = Settings::load();
    let mut scores = HighScores::load();

    // Setup terminal
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut settings, &mut scores);

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;

    if let Err(e) = settings.save() {
        warn!(error = %e, "could not save settings");
        eprintln!("Warning: Could not save settings: {}", e);
    }

    match &result {
        Ok(Some(game)) => {
            println!("\nThanks for playing Bucketris!");
            println!("Field: {}", game.mode().label());
            println!("Final Score: {}", game.score.points);
            println!("Level: {} | Lines: {}", game.score.level, game.score.lines);
            println!("Time: {}", game.mode_state.format_time());
            if let Some((filled, total)) = game.picture_progress() {
                println!("Picture: {}/{} cells", filled, total);
            }
        }
        Ok(None) => println!("\nThanks for playing Bucketris!"),
        Err(_) => {}
    }
    info!("bucketris shutting down");

    result.map(|_| ())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    settings: &mut Settings,
    scores: &mut HighScores,
) -> io::Result<Option<Game>> {
    let mut state = AppState::Menu(Menu::main_menu(settings));
    let mut last_game: Option<Game> = None;
    let mut game_over_time: Option<Instant> = None;

    loop {
        terminal.draw(|frame| match &state {
            AppState::Menu(menu) => ui::render_menu(frame, menu, scores),
            AppState::Playing(game, _) => ui::render_game(frame, game, settings, scores),
        })?;

        if event::poll(FRAME_DURATION)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    if let AppState::Playing(_, input) = &mut state {
                        if key.kind == KeyEventKind::Release {
                            input.key_up(key);
                        }
                    }
                    continue;
                }

                match &mut state {
                    AppState::Menu(menu) => {
                        // Handle key rebinding mode
                        if menu.rebinding.is_some() {
                            match key.code {
                                KeyCode::Esc => menu.cancel_rebind(),
                                KeyCode::Enter => menu.finish_rebind(),
                                code => {
                                    // Modifiers and unnamed keys cannot be bound
                                    let Some(key_str) = key_name(code) else {
                                        continue;
                                    };
                                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                                        // Shift+Key adds to existing bindings (keeps rebind mode)
                                        menu.add_key(&key_str, settings);
                                    } else {
                                        menu.set_key(&key_str, settings);
                                    }
                                }
                            }
                            continue;
                        }

                        if menu.on_text_input() {
                            match key.code {
                                KeyCode::Char(c) => {
                                    menu.text_input_char(c, settings);
                                    continue;
                                }
                                KeyCode::Backspace => {
                                    menu.text_input_backspace(settings);
                                    continue;
                                }
                                // Allow navigation to pass through
                                KeyCode::Up | KeyCode::Down | KeyCode::Enter | KeyCode::Esc => {}
                                _ => continue,
                            }
                        }

                        match key.code {
                            KeyCode::Up => menu.move_up(),
                            KeyCode::Down => menu.move_down(),
                            KeyCode::Left => menu.adjust_left(settings),
                            KeyCode::Right => menu.adjust_right(settings),
                            KeyCode::Enter if menu.on_key_bind() => menu.start_rebind(),
                            KeyCode::Enter => {
                                let Some(action) = menu.select().cloned() else {
                                    continue;
                                };
                                match action {
                                    MenuAction::StartGame(mode) => {
                                        let game = Game::new(
                                            mode,
                                            settings.gameplay.piece_order,
                                            settings.starting_level(),
                                        );
                                        let input = InputHandler::from_settings(settings);
                                        state = AppState::Playing(game, input);
                                    }
                                    MenuAction::GoToScreen(screen) => menu.go_to(screen, settings),
                                    MenuAction::Back => menu.go_back(settings),
                                    MenuAction::Quit => return Ok(last_game),
                                    MenuAction::ResetSettings => {
                                        settings.reset();
                                        info!("settings reset to defaults");
                                        menu.status = Some("Settings reset to defaults".to_string());
                                    }
                                }
                            }
                            KeyCode::Delete if menu.on_key_bind() => menu.clear_keys(settings),
                            KeyCode::Char('q') | KeyCode::Esc => {
                                if menu.screen == MenuScreen::Main {
                                    return Ok(last_game);
                                }
                                menu.go_back(settings);
                            }
                            _ => {}
                        }
                    }
                    AppState::Playing(game, input) => match game.state {
                        GameState::GameOver | GameState::Victory => {
                            // Only allow return to menu after delay
                            if game_over_time.is_some_and(|t| t.elapsed() >= GAME_OVER_INPUT_DELAY) {
                                let AppState::Playing(game, _) =
                                    std::mem::replace(&mut state, AppState::Menu(Menu::main_menu(settings)))
                                else {
                                    continue;
                                };
                                last_game = Some(game);
                                game_over_time = None;
                            }
                        }
                        GameState::Paused if key.code == KeyCode::Esc => {
                            game.return_to_menu();
                        }
                        GameState::Paused => {
                            input.clear();
                            for action in input.key_down(key) {
                                game.process_action(action);
                            }
                        }
                        GameState::Playing => {
                            for action in input.key_down(key) {
                                game.process_action(action);
                            }
                        }
                        GameState::Abandoned => {}
                    },
                }
            }
        }

        if matches!(&state, AppState::Playing(game, _) if game.state == GameState::Abandoned) {
            state = AppState::Menu(Menu::main_menu(settings));
            continue;
        }

        if let AppState::Playing(game, input) = &mut state {
            if game.state == GameState::Playing {
                // Process held keys for DAS/ARR
                for action in input.update() {
                    game.process_action(action);
                }
                game.update();
            }

            if matches!(game.state, GameState::GameOver | GameState::Victory) && game_over_time.is_none() {
                game_over_time = Some(Instant::now());
                record_score(game, settings, scores);
            }
        }
    }
}

/// Put a finished game on the high score table if it qualifies
fn record_score(game: &Game, settings: &Settings, scores: &mut HighScores) {
    if !scores.qualifies(game.score.points) {
        return;
    }
    let rank = scores.add(
        &settings.player_name,
        game.score.points,
        game.score.lines,
        game.score.level,
        &game.mode().label(),
    );
    if rank.is_some() {
        if let Err(e) = scores.save() {
            warn!(error = %e, "could not save high scores");
        }
    }
}
