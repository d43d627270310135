mod display;

use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    style::{self, Color, Print},
    terminal, ExecutableCommand, QueueableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use snake_arena::compute::{init_state, reset, snapshot, steer, tick, toggle_pause};
use snake_arena::config::Config;
use snake_arena::entities::{GameEvent, GamePhase, GameState};
use snake_arena::snake::Direction;

#[derive(Parser, Debug)]
#[command(name = "snake_arena")]
#[command(about = "Terminal snake against patrolling, chasing and evading enemies")]
struct Cli {
    /// JSON file overriding any subset of the default configuration
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for a reproducible session (random otherwise)
    #[arg(long)]
    seed: Option<u64>,
    /// Write tracing output to this file (filtered by RUST_LOG)
    #[arg(long)]
    log: Option<PathBuf>,
    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    print_config: bool,
    /// Keep the configured grid even if the terminal is smaller
    #[arg(long)]
    no_fit: bool,
}

fn init_tracing(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("installing tracing subscriber: {e}"))
}

/// Shrink the grid so the board, its border and the HUD fit the terminal.
fn fit_to_terminal(config: &mut Config, width: u16, height: u16) {
    let columns = (width.saturating_sub(display::CHROME_COLS) / 2) as i32;
    let rows = height.saturating_sub(display::CHROME_ROWS) as i32;
    config.playfield.columns = config.playfield.columns.min(columns);
    config.playfield.rows = config.playfield.rows.min(rows);
}

// ── Best-score persistence ────────────────────────────────────────────────────

#[derive(Debug, Default, Serialize, Deserialize)]
struct BestScore {
    highscore: u32,
}

fn best_score_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".snake_arena_score.json")
}

fn load_best_score() -> u32 {
    std::fs::read_to_string(best_score_path())
        .ok()
        .and_then(|s| serde_json::from_str::<BestScore>(&s).ok())
        .unwrap_or_default()
        .highscore
}

fn save_best_score(highscore: u32) -> Result<()> {
    let path = best_score_path();
    let json = serde_json::to_string(&BestScore { highscore })?;
    std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))
}

// ── Title screen ──────────────────────────────────────────────────────────────

enum MenuResult {
    Start,
    Quit,
}

fn show_menu<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>, best_score: u32) -> Result<MenuResult> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let title = "~~~  SNAKE  ARENA  ~~~";
    out.queue(cursor::MoveTo(cx.saturating_sub(title.chars().count() as u16 / 2), cy.saturating_sub(6)))?;
    out.queue(style::SetForegroundColor(Color::Green))?;
    out.queue(Print(title))?;

    if best_score > 0 {
        let hs_str = format!("Best Score: {}", best_score);
        out.queue(cursor::MoveTo(cx.saturating_sub(hs_str.chars().count() as u16 / 2), cy.saturating_sub(5)))?;
        out.queue(style::SetForegroundColor(Color::Yellow))?;
        out.queue(Print(&hs_str))?;
    }

    let legend: &[(&str, Color, &str)] = &[
        ("()", Color::Red, " food        +10, grow 1"),
        ("<>", Color::Yellow, " bonus food  +50, grow 3"),
        ("◆◆", Color::Grey, " enemy       ram it three times for +100"),
        ("▒▒", Color::Magenta, " boss        every 500 points, +500"),
        ("• ", Color::Magenta, " projectile  one hit ends the run"),
    ];
    for (i, (sym, color, desc)) in legend.iter().enumerate() {
        out.queue(cursor::MoveTo(cx.saturating_sub(20), cy.saturating_sub(3) + i as u16))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(sym))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(*desc))?;
    }

    let prompt = "ENTER / SPACE : Start   Q : Quit";
    out.queue(cursor::MoveTo(cx.saturating_sub(prompt.chars().count() as u16 / 2), cy + 4))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print(prompt))?;

    out.queue(style::ResetColor)?;
    out.flush()?;

    // Block until the user makes a choice
    loop {
        match rx.recv() {
            Ok(Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            })) => match code {
                KeyCode::Enter | KeyCode::Char(' ') => return Ok(MenuResult::Start),
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Ok(MenuResult::Quit),
                _ => {}
            },
            Ok(_) => {}
            Err(_) => return Ok(MenuResult::Quit),
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

fn direction_for(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Direction::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Direction::Down),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Direction::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Direction::Right),
        _ => None,
    }
}

/// Runs until the player quits.  Restarts after a game over stay in here.
fn game_loop<W: Write>(
    out: &mut W,
    state: &mut GameState,
    rx: &mpsc::Receiver<Event>,
    rng: &mut StdRng,
    best_score: &mut u32,
) -> Result<()> {
    let frame = Duration::from_secs_f32(1.0 / state.config.playfield.frame_rate as f32);
    let mut last = Instant::now();

    loop {
        let frame_start = Instant::now();

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            let Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press | KeyEventKind::Repeat,
                modifiers,
                ..
            }) = ev
            else {
                continue;
            };
            match code {
                KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return Ok(()),
                KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::Esc => *state = toggle_pause(state),
                KeyCode::Char('r') | KeyCode::Char('R') if state.phase == GamePhase::GameOver => {
                    info!("restart");
                    *state = reset(state, rng);
                }
                code => {
                    if let Some(direction) = direction_for(code) {
                        *state = steer(state, direction);
                    }
                }
            }
        }

        let dt = last.elapsed().as_secs_f32();
        last = Instant::now();
        let result = tick(state, dt, rng);
        *state = result.state;

        for event in &result.events {
            if let GameEvent::PlayerDied { .. } = event {
                if state.score > *best_score {
                    *best_score = state.score;
                    if let Err(err) = save_best_score(*best_score) {
                        warn!(error = %err, "could not persist best score");
                    }
                }
            }
        }

        display::render(out, &snapshot(state), &state.config, *best_score)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame {
            thread::sleep(frame - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    if let Some(path) = &cli.log {
        init_tracing(path)?;
    }

    if !cli.no_fit {
        let (width, height) = terminal::size().context("querying terminal size")?;
        fit_to_terminal(&mut config, width, height);
        config
            .validate()
            .context("terminal is too small for the configured playfield (try --no-fit)")?;
    }

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    info!(seed = ?cli.seed, columns = config.playfield.columns, rows = config.playfield.rows, "session starting");

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode().context("enabling raw mode")?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break;
            }
        }
    });

    let result = run(&mut out, &rx, config, &mut rng);

    // Always restore the terminal
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn run<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>, config: Config, rng: &mut StdRng) -> Result<()> {
    let mut best_score = load_best_score();

    if let MenuResult::Quit = show_menu(out, rx, best_score)? {
        return Ok(());
    }

    let mut state = init_state(config, rng);
    game_loop(out, &mut state, rx, rng, &mut best_score)?;

    // Quitting mid-run still counts
    if state.score > best_score {
        save_best_score(state.score)?;
    }
    Ok(())
}
