/// Rendering layer.  All terminal I/O lives here.
///
/// Each function receives a mutable writer and an immutable `Snapshot` of
/// the game.  No game logic is performed; this module only translates the
/// snapshot into terminal commands.
///
/// Layout: row 0 is the HUD, row 1 the top border, then one terminal row
/// per grid row.  Every grid cell is two terminal columns wide so the
/// board keeps a roughly square aspect.
use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};
use snake_arena::compute::boss_cells;
use snake_arena::config::Config;
use snake_arena::entities::{AgentState, AgentView, BossView, FoodKind, GamePhase, Snapshot};
use snake_arena::geometry::{cell_of, Cell, Vec2};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_WAVE: Color = Color::Cyan;
const C_SNAKE_HEAD: Color = Color::Green;
const C_SNAKE_BODY: Color = Color::DarkGreen;
const C_FOOD: Color = Color::Red;
const C_FOOD_BONUS: Color = Color::Yellow;
const C_PATROL: Color = Color::Grey;
const C_CHASE: Color = Color::Red;
const C_EVADE: Color = Color::Cyan;
const C_BOSS: Color = Color::Magenta;
const C_PROJECTILE: Color = Color::Magenta;
const C_HINT: Color = Color::DarkGrey;

/// Terminal rows taken by everything except the grid itself.
pub const CHROME_ROWS: u16 = 4;
/// Terminal columns taken by the side walls.
pub const CHROME_COLS: u16 = 2;

/// Terminal position of a grid cell, or `None` when it lies off the board.
fn screen_of(cell: Cell, config: &Config) -> Option<(u16, u16)> {
    let field = &config.playfield;
    cell.in_bounds(field.columns, field.rows)
        .then(|| (1 + 2 * cell.col as u16, 2 + cell.row as u16))
}

fn put<W: Write>(out: &mut W, cell: Cell, config: &Config, color: Color, glyph: &str) -> std::io::Result<()> {
    if let Some((x, y)) = screen_of(cell, config) {
        out.queue(cursor::MoveTo(x, y))?;
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(glyph))?;
    }
    Ok(())
}

fn put_pixel<W: Write>(out: &mut W, pos: Vec2, config: &Config, color: Color, glyph: &str) -> std::io::Result<()> {
    put(out, cell_of(pos, config.playfield.cell_size), config, color, glyph)
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, snap: &Snapshot, config: &Config, best_score: u32) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, config)?;
    draw_hud(out, snap, config, best_score)?;

    draw_food(out, snap, config)?;
    if let Some(boss) = &snap.boss {
        draw_boss(out, boss, config)?;
    }
    for agent in &snap.agents {
        draw_agent(out, agent, config)?;
    }
    for &pos in &snap.projectiles {
        put_pixel(out, pos, config, C_PROJECTILE, "•")?;
    }
    draw_snake(out, snap, config)?;
    draw_controls_hint(out, config)?;

    match snap.phase {
        GamePhase::Paused => draw_banner(out, config, &[("PAUSED", Color::White), ("P - Resume", C_HINT)])?,
        GamePhase::BossIntro => draw_banner(
            out,
            config,
            &[("!! BOSS INCOMING !!", Color::Red), ("Get ready...", C_HINT)],
        )?,
        GamePhase::GameOver => draw_game_over(out, snap, config, best_score)?,
        GamePhase::Playing if snap.boss_defeated => {
            draw_banner(out, config, &[("BOSS DEFEATED!", Color::Yellow)])?
        }
        GamePhase::Playing => {}
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, board_height(config) + CHROME_ROWS - 1))?;
    out.flush()?;
    Ok(())
}

fn board_width(config: &Config) -> u16 {
    2 * config.playfield.columns as u16 + CHROME_COLS
}

fn board_height(config: &Config) -> u16 {
    config.playfield.rows as u16
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, config: &Config) -> std::io::Result<()> {
    let w = board_width(config) as usize;
    let bottom = 2 + board_height(config);

    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, bottom))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..bottom {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(w as u16 - 1, row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, snap: &Snapshot, config: &Config, best_score: u32) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    if best_score > 0 {
        out.queue(Print(format!("Score:{:>6}  Hi:{:>6}", snap.score, best_score)))?;
    } else {
        out.queue(Print(format!("Score:{:>6}", snap.score)))?;
    }

    let wave_str = format!("[ WAVE {} ]", snap.wave);
    let wx = (board_width(config) / 2).saturating_sub(wave_str.len() as u16 / 2);
    out.queue(cursor::MoveTo(wx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_WAVE))?;
    out.queue(Print(&wave_str))?;

    // Boss health bar, right-aligned
    if let Some(boss) = &snap.boss {
        let filled = boss.health as usize * 10 / boss.max_health.max(1) as usize;
        let bar = format!("BOSS {}{}", "█".repeat(filled), "░".repeat(10 - filled));
        let rx = board_width(config).saturating_sub(bar.chars().count() as u16 + 1);
        out.queue(cursor::MoveTo(rx, 0))?;
        out.queue(style::SetForegroundColor(C_BOSS))?;
        out.queue(Print(&bar))?;
    }

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_snake<W: Write>(out: &mut W, snap: &Snapshot, config: &Config) -> std::io::Result<()> {
    // Body first so the head always wins on overlap
    for &cell in snap.snake.iter().skip(1) {
        put(out, cell, config, C_SNAKE_BODY, "▓▓")?;
    }
    if let Some(&head) = snap.snake.first() {
        put(out, head, config, C_SNAKE_HEAD, "██")?;
    }
    Ok(())
}

fn draw_food<W: Write>(out: &mut W, snap: &Snapshot, config: &Config) -> std::io::Result<()> {
    match snap.food.kind {
        FoodKind::Normal => put(out, snap.food.cell, config, C_FOOD, "()"),
        FoodKind::Bonus => put(out, snap.food.cell, config, C_FOOD_BONUS, "<>"),
    }
}

/// Agents are tinted by behaviour:
///   grey: patrolling
///   red:  chasing the snake
///   cyan: evading (and shooting)
fn draw_agent<W: Write>(out: &mut W, agent: &AgentView, config: &Config) -> std::io::Result<()> {
    let color = match agent.state {
        AgentState::Patrol => C_PATROL,
        AgentState::Chase => C_CHASE,
        AgentState::Evade => C_EVADE,
    };
    let glyph = match agent.health {
        0 | 1 => "░░",
        2 => "▒▒",
        _ => "◆◆",
    };
    put_pixel(out, agent.position, config, color, glyph)
}

fn draw_boss<W: Write>(out: &mut W, boss: &BossView, config: &Config) -> std::io::Result<()> {
    for cell in boss_cells(boss.position, config) {
        put(out, cell, config, C_BOSS, "▒▒")?;
    }
    put_pixel(out, boss.position, config, Color::White, "@@")
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, config: &Config) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, board_height(config) + 3))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("← ↑ → ↓ / W A S D : Steer   P : Pause   Q : Quit"))?;
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn draw_banner<W: Write>(out: &mut W, config: &Config, lines: &[(&str, Color)]) -> std::io::Result<()> {
    let cx = board_width(config) / 2;
    let start_row = (2 + board_height(config) / 2).saturating_sub(lines.len() as u16 / 2);

    for (i, (msg, color)) in lines.iter().enumerate() {
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start_row + i as u16))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }
    Ok(())
}

fn draw_game_over<W: Write>(out: &mut W, snap: &Snapshot, config: &Config, best_score: u32) -> std::io::Result<()> {
    let new_best = snap.score >= best_score && snap.score > 0;
    let score_line = format!("Final Score: {:>6}", snap.score);
    let best_line = if new_best {
        format!("★ NEW BEST: {:>6} ★", snap.score)
    } else {
        format!("Best Score:  {:>6}", best_score)
    };
    let best_color = if new_best { Color::Yellow } else { Color::DarkGrey };

    draw_banner(
        out,
        config,
        &[
            ("╔════════════════════╗", Color::Red),
            ("║    GAME  OVER      ║", Color::Red),
            ("╚════════════════════╝", Color::Red),
            (score_line.as_str(), Color::Yellow),
            (best_line.as_str(), best_color),
            ("R - Play Again  Q - Quit", Color::White),
        ],
    )
}
