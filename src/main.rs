use std::fs::File;
use std::io::{self, stdout, Stdout};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use env_logger::{Env, Target};
use log::{info, warn};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};

use twenty48::config::Settings;
use twenty48::game::{Game, GameEvent, GameState};
use twenty48::grid::Direction;
use twenty48::stats::StatsStore;

// ============================================================================
// Visual Constants
// ============================================================================

const CELL_WIDTH: u16 = 12;
const CELL_HEIGHT: u16 = 3;

// ============================================================================
// Color Mapping
// ============================================================================

fn tile_color(value: u32) -> Color {
    match value {
        0 => Color::Rgb(60, 58, 50),
        2 => Color::Rgb(238, 228, 218),
        4 => Color::Rgb(237, 224, 200),
        8 => Color::Rgb(242, 177, 121),
        16 => Color::Rgb(245, 149, 99),
        32 => Color::Rgb(246, 124, 95),
        64 => Color::Rgb(246, 94, 59),
        128 => Color::Rgb(237, 207, 114),
        256 => Color::Rgb(237, 204, 97),
        512 => Color::Rgb(237, 200, 80),
        1024 => Color::Rgb(237, 197, 63),
        2048 => Color::Rgb(237, 194, 46),
        _ => Color::Rgb(60, 58, 50),
    }
}

fn text_color(value: u32) -> Color {
    match value {
        2 | 4 => Color::Rgb(119, 110, 101),
        _ => Color::White,
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn render(frame: &mut Frame, game: &Game) {
    let area = frame.size();

    match game.state {
        GameState::Playing => render_game(frame, game, area),
        GameState::GameOver => render_game_over(frame, game, area),
    }
}

fn render_game(frame: &mut Frame, game: &Game, area: Rect) {
    // --size is bounded by MAX_SIZE, so this cannot truncate
    let size = game.grid.size() as u16;
    let board_width = size * CELL_WIDTH + 2;
    let board_height = size * CELL_HEIGHT + 2;
    let info_width = 14;
    let total_width = board_width + info_width + 2;
    let total_height = board_height + 3;

    let main_area = centered_rect(total_width, total_height, area);

    let vertical = Layout::vertical([
        Constraint::Length(board_height),
        Constraint::Fill(1),
    ])
    .split(main_area);

    let game_row = vertical[0];

    // Layout: [Board][Info]
    let horizontal = Layout::horizontal([
        Constraint::Length(board_width),
        Constraint::Length(info_width),
    ])
    .split(game_row);

    render_board(frame, game, horizontal[0]);
    render_info(frame, game, horizontal[1]);

    let controls_area = Rect {
        x: area.x,
        y: game_row.y + game_row.height,
        width: area.width,
        height: 2,
    };

    if controls_area.y + 1 < area.height {
        let controls = Paragraph::new(vec![Line::from(
            "Arrows/WASD/HJKL: Move | R: Restart | Q/ESC: Quit",
        )])
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(controls, controls_area);
    }
}

fn render_board(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" 2048 ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = CELL_WIDTH as usize;
    let blank = " ".repeat(width);
    let mut lines: Vec<Line> = Vec::new();

    for row in 0..game.grid.size() {
        // Each cell is CELL_HEIGHT lines tall with the value on the middle one
        for part in 0..CELL_HEIGHT {
            let spans: Vec<Span> = game
                .grid
                .row(row)
                .iter()
                .map(|&value| {
                    let style = Style::default()
                        .bg(tile_color(value))
                        .fg(text_color(value))
                        .add_modifier(Modifier::BOLD);
                    let text = if part == CELL_HEIGHT / 2 && value != 0 {
                        format!("{:^width$}", value)
                    } else {
                        blank.clone()
                    };
                    Span::styled(text, style)
                })
                .collect();
            lines.push(Line::from(spans));
        }
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_info(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Info ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Score", Style::default().fg(Color::Yellow))),
        Line::from(format!("{}", game.score)),
        Line::from(""),
        Line::from(Span::styled("Best", Style::default().fg(Color::Cyan))),
        Line::from(format!("{}", game.best_score)),
        Line::from(""),
        Line::from(Span::styled("Moves", Style::default().fg(Color::Green))),
        Line::from(format!("{}", game.moves)),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

fn render_game_over(frame: &mut Frame, game: &Game, area: Rect) {
    render_game(frame, game, area);

    let text = vec![
        Line::from(""),
        Line::from(Span::styled("GAME OVER", Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(format!("Score: {}", game.score)),
        Line::from(format!("Best: {}", game.best_score)),
        Line::from(format!("Max tile: {}", game.grid.max_tile())),
        Line::from(""),
        Line::from(Span::styled(
            "R: restart | ESC: quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Game Over ")
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    let popup_area = centered_rect(26, 12, area);
    frame.render_widget(paragraph, popup_area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width.min(area.width)),
        Constraint::Fill(1),
    ])
    .split(area);

    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .split(horizontal[1]);

    vertical[1]
}

// ============================================================================
// Input
// ============================================================================

fn direction_for(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up
        | KeyCode::Char('w')
        | KeyCode::Char('W')
        | KeyCode::Char('k')
        | KeyCode::Char('K') => Some(Direction::Up),
        KeyCode::Down
        | KeyCode::Char('s')
        | KeyCode::Char('S')
        | KeyCode::Char('j')
        | KeyCode::Char('J') => Some(Direction::Down),
        KeyCode::Left
        | KeyCode::Char('a')
        | KeyCode::Char('A')
        | KeyCode::Char('h')
        | KeyCode::Char('H') => Some(Direction::Left),
        KeyCode::Right
        | KeyCode::Char('d')
        | KeyCode::Char('D')
        | KeyCode::Char('l')
        | KeyCode::Char('L') => Some(Direction::Right),
        _ => None,
    }
}

// ============================================================================
// Stats
// ============================================================================

fn record_game(stats: &mut StatsStore, settings: &Settings, game: &Game) {
    if game.moves == 0 {
        return;
    }
    let totals = stats.record_game(&settings.player, game.score);
    info!(
        "recorded {} for {} ({} games, high score {})",
        game.score, settings.player, totals.games_played, totals.high_score
    );
    if let Err(err) = stats.save(&settings.stats_file) {
        warn!("could not save stats: {:#}", err);
    }
}

// ============================================================================
// Main Loop
// ============================================================================

fn init_logging(settings: &Settings) -> Result<()> {
    let Some(path) = &settings.log_file else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    game: &mut Game,
    stats: &mut StatsStore,
    settings: &Settings,
) -> io::Result<()> {
    loop {
        terminal.draw(|frame| render(frame, game))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => {
                if !game.is_game_over() {
                    record_game(stats, settings, game);
                }
                return Ok(());
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                if !game.is_game_over() {
                    record_game(stats, settings, game);
                }
                game.restart();
            }
            code => {
                if let Some(direction) = direction_for(code) {
                    game.play(direction);
                }
            }
        }

        for event in game.take_events() {
            match event {
                GameEvent::GameOver => record_game(stats, settings, game),
                GameEvent::NewBestScore(score) => info!("new best score {}", score),
                _ => {}
            }
        }
    }
}

fn main() -> Result<()> {
    let settings = Settings::parse();
    init_logging(&settings)?;

    let mut stats = StatsStore::load_or_default(&settings.stats_file);
    let best = stats.player(&settings.player).map_or(0, |s| s.high_score);
    let mut game = Game::with_spawner(settings.size, settings.spawner())
        .with_context(|| format!("cannot start a game with --size {}", settings.size))?
        .with_best_score(best);

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let outcome = run(&mut terminal, &mut game, &mut stats, &settings);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    outcome?;
    Ok(())
}
