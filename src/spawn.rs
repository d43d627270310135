/// Spawn Manager: decides when agents appear and where they may be placed,
/// and finds a fresh cell for the food after every pickup.
///
/// Placement is a bounded rejection search.  When the attempt budget runs
/// out the spawn is dropped for this frame and retried on the next one; the
/// frame is never blocked and an invalid position is never forced.
use rand::Rng;
use tracing::{debug, trace};

use crate::ai::sample_patrol_interval;
use crate::compute::boss_cells;
use crate::config::{Config, SpawnPlacement, SpawnPolicy};
use crate::entities::{Agent, AgentState, AgentTimers, Boss, Food, FoodKind, GameEvent, GameState};
use crate::geometry::{cell_of, Cell, Vec2};
use crate::snake::Snake;

// ── Scheduling ───────────────────────────────────────────────────────────────

/// Agents owed by a wave: one more than the number of earlier waves, never
/// more than the free room under the concurrency cap.
pub fn wave_quota(wave_index: u32, alive: usize, cap: usize) -> usize {
    (wave_index as usize + 1).min(cap.saturating_sub(alive))
}

/// Target population under the score-gated policy.
pub fn score_target(score: u32, score_step: u32, cap: usize) -> usize {
    ((score / score_step.max(1)) as usize).min(cap)
}

fn advance_waves(state: &mut GameState, dt: f32, events: &mut Vec<GameEvent>) {
    let spawn = &state.config.spawn;
    state.waves.since_last_wave += dt;

    let due = if state.waves.wave == 0 {
        state.elapsed >= spawn.first_wave_after
    } else {
        state.waves.since_last_wave >= spawn.wave_interval
    };
    if !due {
        return;
    }

    // Agents still owed by an earlier wave carry over into this one.
    let quota = wave_quota(state.waves.wave, state.agents.len(), spawn.max_concurrent);
    let room = spawn.max_concurrent.saturating_sub(state.agents.len());
    state.waves.pending = (state.waves.pending + quota).min(room);
    state.waves.wave += 1;
    state.waves.since_last_wave = 0.0;
    debug!(wave = state.waves.wave, owed = state.waves.pending, "wave started");
    events.push(GameEvent::WaveStarted {
        wave: state.waves.wave,
    });
}

/// Run the configured spawn policy for one frame, placing as many owed
/// agents as the placement search allows.
pub fn run_spawn_policy(state: &mut GameState, dt: f32, rng: &mut impl Rng, events: &mut Vec<GameEvent>) {
    let cap = state.config.spawn.max_concurrent;
    let owed = match state.config.spawn.policy {
        SpawnPolicy::Waves => {
            advance_waves(state, dt, events);
            state.waves.pending
        }
        // One agent per frame until the target is met.
        SpawnPolicy::ScoreTarget => {
            score_target(state.score, state.config.spawn.score_step, cap)
                .saturating_sub(state.agents.len())
                .min(1)
        }
    };

    let head = state.snake.head_position(state.config.playfield.cell_size);
    let mut placed = 0;
    while placed < owed && state.agents.len() < cap {
        let Some(position) = find_spawn_position(head, &state.agents, state.food.cell, &state.config, rng) else {
            trace!(owed = owed - placed, "no valid spawn position this frame");
            break;
        };
        let agent = new_agent(state.next_agent_id, position, &state.config, rng);
        state.next_agent_id += 1;
        state.waves.spawned_total += 1;
        state.agents.push(agent);
        placed += 1;
    }

    if state.config.spawn.policy == SpawnPolicy::Waves {
        state.waves.pending = state.waves.pending.saturating_sub(placed);
    }
}

// ── Placement ────────────────────────────────────────────────────────────────

/// Draw one candidate according to the configured placement.
pub fn sample_candidate(config: &Config, rng: &mut impl Rng) -> Vec2 {
    let (w, h) = (config.playfield.width(), config.playfield.height());
    match config.spawn.placement {
        SpawnPlacement::Edges => {
            let inset = config.spawn.edge_inset;
            match rng.gen_range(0..4) {
                0 => Vec2::new(rng.gen_range(inset..=w - inset), inset),
                1 => Vec2::new(rng.gen_range(inset..=w - inset), h - inset),
                2 => Vec2::new(inset, rng.gen_range(inset..=h - inset)),
                _ => Vec2::new(w - inset, rng.gen_range(inset..=h - inset)),
            }
        }
        SpawnPlacement::Anywhere => {
            let m = config.playfield.wall_margin;
            Vec2::new(rng.gen_range(m..=w - m), rng.gen_range(m..=h - m))
        }
    }
}

/// Far enough from the head and from every live agent, and off the food cell.
pub fn placement_is_valid(candidate: Vec2, head: Vec2, agents: &[Agent], food: Cell, config: &Config) -> bool {
    let spawn = &config.spawn;
    candidate.distance(head) >= spawn.min_player_distance
        && agents
            .iter()
            .all(|a| a.position.distance(candidate) >= spawn.min_agent_distance)
        && cell_of(candidate, config.playfield.cell_size) != food
}

pub fn find_spawn_position(
    head: Vec2,
    agents: &[Agent],
    food: Cell,
    config: &Config,
    rng: &mut impl Rng,
) -> Option<Vec2> {
    for _ in 0..config.spawn.max_attempts {
        let candidate = sample_candidate(config, rng);
        if placement_is_valid(candidate, head, agents, food, config) {
            return Some(candidate);
        }
    }
    None
}

pub fn new_agent(id: u32, position: Vec2, config: &Config, rng: &mut impl Rng) -> Agent {
    Agent {
        id,
        position,
        anchor: position,
        health: config.enemy.max_health,
        state: AgentState::Patrol,
        heading: rng.gen_range(0.0..360.0),
        speed: config.agent_speed(),
        patrol_interval: sample_patrol_interval(&config.enemy, rng),
        timers: AgentTimers::default(),
    }
}

// ── Food ─────────────────────────────────────────────────────────────────────

pub fn make_food(cell: Cell, kind: FoodKind, config: &Config) -> Food {
    let (points, growth) = match kind {
        FoodKind::Normal => (config.food.normal_points, config.food.normal_growth),
        FoodKind::Bonus => (config.food.bonus_points, config.food.bonus_growth),
    };
    Food {
        cell,
        kind,
        points,
        growth,
    }
}

fn random_cell(columns: i32, rows: i32, rng: &mut impl Rng) -> Cell {
    Cell::new(rng.gen_range(0..columns), rng.gen_range(0..rows))
}

/// New food on a cell clear of the snake, of the boss block and of every
/// agent's surroundings.  After `max_attempts` misses an unchecked cell is
/// used instead, which can (very rarely) overlap the snake or the boss.
pub fn respawn_food(
    snake: &Snake,
    agents: &[Agent],
    boss: Option<&Boss>,
    config: &Config,
    rng: &mut impl Rng,
) -> Food {
    let field = &config.playfield;
    let clearance = config.food.agent_clearance;
    let agent_cells: Vec<Cell> = agents
        .iter()
        .map(|a| cell_of(a.position, field.cell_size))
        .collect();
    let blocked: Vec<Cell> = boss
        .map(|b| boss_cells(b.position, config).collect())
        .unwrap_or_default();

    let mut chosen = None;
    for _ in 0..config.food.max_attempts {
        let cell = random_cell(field.columns, field.rows, rng);
        if !snake.occupies(cell)
            && !blocked.contains(&cell)
            && agent_cells.iter().all(|&a| a.chebyshev(cell) >= clearance)
        {
            chosen = Some(cell);
            break;
        }
    }
    let cell = match chosen {
        Some(cell) => cell,
        None => {
            trace!("food placement fell back to an unchecked cell");
            random_cell(field.columns, field.rows, rng)
        }
    };

    let kind = if rng.gen_bool(config.food.bonus_chance) {
        FoodKind::Bonus
    } else {
        FoodKind::Normal
    };
    make_food(cell, kind, config)
}
