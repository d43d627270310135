/// Pure frame-orchestration functions.
///
/// Every public function takes an immutable reference to the current
/// `GameState` (and, where needed, an RNG handle) and returns a brand-new
/// state.  Side effects are limited to the injected RNG.
use rand::Rng;
use tracing::{debug, info};

use crate::ai;
use crate::config::{BossContact, Config};
use crate::entities::{
    AgentView, Boss, BossView, DeathCause, Frame, GameEvent, GamePhase, GameState, Shooter,
    Snapshot, WaveState,
};
use crate::geometry::{cell_of, Cell, Vec2};
use crate::projectile;
use crate::snake::{Direction, Snake};
use crate::spawn;

// ── Constructors ─────────────────────────────────────────────────────────────

/// Build the initial game state for a configuration.
pub fn init_state(config: Config, rng: &mut impl Rng) -> GameState {
    let snake = Snake::new(
        config.playfield.columns,
        config.playfield.rows,
        config.snake.initial_length,
    );
    let food = spawn::respawn_food(&snake, &[], None, &config, rng);
    GameState {
        config,
        snake,
        food,
        agents: Vec::new(),
        boss: None,
        projectiles: Vec::new(),
        waves: WaveState::default(),
        score: 0,
        phase: GamePhase::Playing,
        elapsed: 0.0,
        frame: 0,
        snake_move_timer: 0.0,
        boss_intro_timer: 0.0,
        victory_timer: 0.0,
        next_agent_id: 0,
    }
}

/// Start over with the same configuration.  Every timer, entity list and
/// watermark is rebuilt from scratch.
pub fn reset(state: &GameState, rng: &mut impl Rng) -> GameState {
    init_state(state.config.clone(), rng)
}

pub fn new_boss(config: &Config) -> Boss {
    Boss {
        position: Vec2::new(config.playfield.width() / 2.0, config.playfield.height() / 2.0),
        health: config.boss.max_health,
        max_health: config.boss.max_health,
        speed: config.boss_speed(),
        shoot_timer: 0.0,
        weave_phase: 0.0,
    }
}

// ── Control intents (pure) ───────────────────────────────────────────────────

pub fn steer(state: &GameState, direction: Direction) -> GameState {
    if state.phase != GamePhase::Playing {
        return state.clone();
    }
    let mut snake = state.snake.clone();
    snake.steer(direction);
    GameState {
        snake,
        ..state.clone()
    }
}

pub fn toggle_pause(state: &GameState) -> GameState {
    let phase = match state.phase {
        GamePhase::Playing => GamePhase::Paused,
        GamePhase::Paused => GamePhase::Playing,
        other => other,
    };
    GameState {
        phase,
        ..state.clone()
    }
}

// ── Per-frame tick (RNG is injected) ─────────────────────────────────────────

/// Advance the simulation by `dt` seconds.  All randomness comes through
/// `rng` so callers control determinism (tests use a seeded RNG).
///
/// Paused and finished games are returned unchanged.
pub fn tick(state: &GameState, dt: f32, rng: &mut impl Rng) -> Frame {
    let mut next = state.clone();
    let mut events = Vec::new();
    let dt = dt.max(0.0);

    match state.phase {
        GamePhase::Playing => {
            next.frame += 1;
            play_frame(&mut next, dt, rng, &mut events);
        }
        GamePhase::BossIntro => {
            next.frame += 1;
            advance_boss_intro(&mut next, dt, &mut events);
        }
        GamePhase::Paused | GamePhase::GameOver => {}
    }

    Frame {
        state: next,
        events,
    }
}

/// One `Playing` frame.  The order below is load-bearing: each step sees
/// the state left by the previous one, and a game over ends the frame.
fn play_frame(state: &mut GameState, dt: f32, rng: &mut impl Rng, events: &mut Vec<GameEvent>) {
    state.elapsed += dt;
    state.victory_timer = (state.victory_timer - dt).max(0.0);

    // ── 1. Snake movement, wall and self collision ───────────────────────────
    state.snake_move_timer += dt;
    if state.snake_move_timer >= 1.0 / state.config.snake.moves_per_second {
        state.snake_move_timer = 0.0;
        state.snake.advance();
        let field = &state.config.playfield;
        if let Some(cause) = state.snake.collision(field.columns, field.rows) {
            game_over(state, cause, events);
            return;
        }
    }

    // ── 2. Food ──────────────────────────────────────────────────────────────
    if state.snake.head() == state.food.cell {
        let (points, growth) = (state.food.points, state.food.growth);
        state.snake.grow(growth);
        state.score += points;
        events.push(GameEvent::FoodCollected { points, growth });
        state.food = spawn::respawn_food(
            &state.snake,
            &state.agents,
            state.boss.as_ref(),
            &state.config,
            rng,
        );
    }

    // ── 3. Boss threshold, then spawning while no boss is around ─────────────
    if announce_boss(state, events) {
        return;
    }
    if state.boss.is_none() {
        spawn::run_spawn_policy(state, dt, rng, events);
    }

    // ── 4. Agents ────────────────────────────────────────────────────────────
    update_agents(state, dt, rng, events);

    // ── 5. Boss ──────────────────────────────────────────────────────────────
    update_boss(state, dt, events);

    // ── 6. Projectiles ───────────────────────────────────────────────────────
    let field = &state.config.playfield;
    let head = state.snake.head_position(field.cell_size);
    let step = projectile::advance_all(
        &state.projectiles,
        head,
        &state.config.projectile,
        field.width(),
        field.height(),
        field.cell_size,
    );
    state.projectiles = step.survivors;
    if step.hits > 0 {
        game_over(state, DeathCause::Projectile, events);
    }
}

fn update_agents(state: &mut GameState, dt: f32, rng: &mut impl Rng, events: &mut Vec<GameEvent>) {
    let head = state.snake.head_position(state.config.playfield.cell_size);
    let body_length = state.snake.body_length();
    let melee = state.config.melee_range();

    // Collect shots and kills during the pass; apply them afterwards.
    let mut volley = Vec::new();
    for agent in state.agents.iter_mut() {
        ai::update_agent(agent, head, body_length, dt, &state.config, rng);

        if ai::agent_should_fire(agent, state.config.enemy.shoot_cooldown) {
            volley.push(projectile::aimed(
                agent.position,
                head,
                state.config.projectile.speed,
                Shooter::Agent(agent.id),
            ));
        }

        if agent.position.distance(head) < melee {
            agent.health = agent.health.saturating_sub(1);
        }
    }

    let kill_score = state.config.enemy.kill_score;
    let before = state.agents.len();
    state.agents.retain(|a| a.health > 0);
    for _ in state.agents.len()..before {
        state.score += kill_score;
        events.push(GameEvent::AgentKilled {
            score_value: kill_score,
        });
    }
    if state.agents.len() < before {
        debug!(killed = before - state.agents.len(), score = state.score, "agents destroyed");
    }
    state.projectiles.extend(volley);
}

fn update_boss(state: &mut GameState, dt: f32, events: &mut Vec<GameEvent>) {
    let head = state.snake.head_position(state.config.playfield.cell_size);
    let Some(boss) = state.boss.as_mut() else {
        return;
    };

    ai::update_boss(boss, head, dt, &state.config);

    if ai::boss_should_fire(boss, state.config.boss.shoot_cooldown) {
        state.projectiles.extend(projectile::spread(
            boss.position,
            head,
            state.config.boss.spread_deg,
            state.config.projectile.speed,
            Shooter::Boss,
        ));
    }

    if boss_contact(boss, &state.snake, &state.config) {
        boss.health = boss.health.saturating_sub(1);
    }

    if boss.health == 0 {
        defeat_boss(state, events);
    }
}

// ── Boss lifecycle ───────────────────────────────────────────────────────────

/// Enter the intro when the score crosses a threshold multiple that has not
/// been announced yet.  Returns `true` when the frame should stop here.
fn announce_boss(state: &mut GameState, events: &mut Vec<GameEvent>) -> bool {
    let step = state.config.boss.spawn_score_step;
    if state.boss.is_some() || state.score < step {
        return false;
    }
    let milestone = state.score / step * step;
    if milestone <= state.waves.boss_triggered_at {
        return false;
    }

    state.waves.boss_triggered_at = milestone;
    state.phase = GamePhase::BossIntro;
    state.boss_intro_timer = 0.0;
    info!(score = state.score, milestone, "boss incoming");
    events.push(GameEvent::BossIncoming);
    true
}

fn advance_boss_intro(state: &mut GameState, dt: f32, events: &mut Vec<GameEvent>) {
    state.boss_intro_timer += dt;
    if state.boss_intro_timer < state.config.boss.intro_duration {
        return;
    }

    state.boss = Some(new_boss(&state.config));
    state.agents.clear();
    state.projectiles.clear();
    state.waves.pending = 0;
    state.phase = GamePhase::Playing;
    info!("boss spawned");
    events.push(GameEvent::BossSpawned);
}

/// Award the bonus, drop the boss and wipe every live projectile together.
fn defeat_boss(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let bonus = state.config.boss.defeat_bonus;
    state.score += bonus;
    state.boss = None;
    state.projectiles.clear();
    state.victory_timer = state.config.boss.victory_duration;
    info!(score = state.score, "boss defeated");
    events.push(GameEvent::BossDefeated { bonus });
}

/// Cells covered by the boss: a `size × size` block around its centre cell.
pub fn boss_cells(position: Vec2, config: &Config) -> impl Iterator<Item = Cell> {
    let size = config.boss.size_cells as i32;
    let origin = cell_of(position, config.playfield.cell_size).offset(-(size / 2), -(size / 2));
    (0..size).flat_map(move |dr| (0..size).map(move |dc| origin.offset(dc, dr)))
}

pub fn boss_contact(boss: &Boss, snake: &Snake, config: &Config) -> bool {
    let cell_size = config.playfield.cell_size;
    match config.boss.contact {
        BossContact::Head => {
            let reach = config.boss.half_extent(cell_size) + cell_size / 2.0;
            boss.position.distance(snake.head_position(cell_size)) < reach
        }
        BossContact::Body => boss_cells(boss.position, config).any(|c| snake.occupies(c)),
    }
}

fn game_over(state: &mut GameState, cause: DeathCause, events: &mut Vec<GameEvent>) {
    state.phase = GamePhase::GameOver;
    info!(score = state.score, ?cause, "game over");
    events.push(GameEvent::PlayerDied { cause });
}

// ── Read-only view ───────────────────────────────────────────────────────────

pub fn snapshot(state: &GameState) -> Snapshot {
    Snapshot {
        snake: state.snake.occupied_cells().copied().collect(),
        food: state.food.clone(),
        agents: state
            .agents
            .iter()
            .map(|a| AgentView {
                position: a.position,
                state: a.state,
                health: a.health,
            })
            .collect(),
        boss: state.boss.as_ref().map(|b| BossView {
            position: b.position,
            health: b.health,
            max_health: b.max_health,
        }),
        boss_defeated: state.victory_timer > 0.0,
        projectiles: state.projectiles.iter().map(|p| p.position).collect(),
        score: state.score,
        wave: state.waves.wave,
        phase: state.phase,
    }
}
