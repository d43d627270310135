use snake_arena::compute::*;
use snake_arena::config::{BossContact, Config};
use snake_arena::entities::*;
use snake_arena::geometry::{cell_center, Cell, Vec2};
use snake_arena::snake::{Direction, Snake};
use snake_arena::spawn::make_food;

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Short enough that the snake never moves (it steps every 0.1 s).
const STILL: f32 = 0.01;
/// Exactly one snake step.
const STEP: f32 = 0.1;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

/// Default state with the food parked in a corner, out of the snake's way.
fn make_state() -> GameState {
    let mut s = init_state(Config::default(), &mut seeded_rng());
    s.food = make_food(Cell::new(0, 0), FoodKind::Normal, &s.config);
    s
}

fn head_px(s: &GameState) -> Vec2 {
    s.snake.head_position(s.config.playfield.cell_size)
}

fn make_agent(id: u32, position: Vec2) -> Agent {
    Agent {
        id,
        position,
        anchor: position,
        health: 3,
        state: AgentState::Patrol,
        heading: 0.0,
        speed: 120.0,
        patrol_interval: 2.5,
        timers: AgentTimers::default(),
    }
}

// ── init_state / reset ────────────────────────────────────────────────────────

#[test]
fn init_state_centres_the_snake() {
    let s = init_state(Config::default(), &mut seeded_rng());
    assert_eq!(s.snake.head(), Cell::new(30, 20));
    assert_eq!(s.snake.body_length(), 3);
    assert_eq!(s.snake.direction(), Direction::Right);
    assert!(!s.snake.occupies(s.food.cell));
}

#[test]
fn init_state_empty_collections() {
    let s = make_state();
    assert!(s.agents.is_empty());
    assert!(s.projectiles.is_empty());
    assert!(s.boss.is_none());
    assert_eq!(s.score, 0);
    assert_eq!(s.frame, 0);
    assert_eq!(s.phase, GamePhase::Playing);
}

#[test]
fn reset_clears_score_and_boss_watermark() {
    let mut s = make_state();
    s.score = 700;
    s.waves.boss_triggered_at = 500;
    s.waves.wave = 3;
    s.agents.push(make_agent(0, Vec2::new(100.0, 100.0)));
    s.phase = GamePhase::GameOver;

    let fresh = reset(&s, &mut seeded_rng());
    assert_eq!(fresh.score, 0);
    assert_eq!(fresh.waves, WaveState::default());
    assert!(fresh.agents.is_empty());
    assert_eq!(fresh.phase, GamePhase::Playing);
    assert_eq!(fresh.config, s.config);
}

// ── Snake movement and death ──────────────────────────────────────────────────

#[test]
fn snake_steps_once_per_move_interval() {
    let s = make_state();
    let mut rng = seeded_rng();

    let still = tick(&s, STILL, &mut rng).state;
    assert_eq!(still.snake.head(), Cell::new(30, 20));

    let moved = tick(&s, STEP, &mut rng).state;
    assert_eq!(moved.snake.head(), Cell::new(31, 20));
    assert_eq!(moved.snake.body_length(), 3);
}

#[test]
fn steer_changes_direction_on_next_step() {
    let s = steer(&make_state(), Direction::Up);
    let s2 = tick(&s, STEP, &mut seeded_rng()).state;
    assert_eq!(s2.snake.head(), Cell::new(30, 19));
}

#[test]
fn steer_into_reverse_is_ignored() {
    let s = steer(&make_state(), Direction::Left);
    let s2 = tick(&s, STEP, &mut seeded_rng()).state;
    assert_eq!(s2.snake.head(), Cell::new(31, 20));
}

#[test]
fn leaving_the_grid_is_a_wall_death() {
    let mut s = make_state();
    s.snake = Snake::from_segments(
        [Cell::new(59, 20), Cell::new(58, 20), Cell::new(57, 20)],
        Direction::Right,
    );
    let frame = tick(&s, STEP, &mut seeded_rng());
    assert_eq!(frame.state.phase, GamePhase::GameOver);
    assert!(frame.events.contains(&GameEvent::PlayerDied {
        cause: DeathCause::Wall
    }));
}

#[test]
fn running_into_own_body_is_fatal() {
    let mut s = make_state();
    // Head at (5,5) heading down into (5,6), which stays part of the body.
    s.snake = Snake::from_segments(
        [
            Cell::new(5, 5),
            Cell::new(4, 5),
            Cell::new(4, 6),
            Cell::new(5, 6),
            Cell::new(6, 6),
            Cell::new(6, 5),
        ],
        Direction::Down,
    );
    let frame = tick(&s, STEP, &mut seeded_rng());
    assert_eq!(frame.state.phase, GamePhase::GameOver);
    assert!(frame.events.contains(&GameEvent::PlayerDied {
        cause: DeathCause::SelfCollision
    }));
}

// ── Food ──────────────────────────────────────────────────────────────────────

#[test]
fn eating_food_scores_grows_and_respawns() {
    let mut s = make_state();
    s.food = make_food(Cell::new(31, 20), FoodKind::Normal, &s.config);
    let mut rng = seeded_rng();

    let frame = tick(&s, STEP, &mut rng);
    assert_eq!(frame.state.score, 10);
    assert!(frame.events.contains(&GameEvent::FoodCollected { points: 10, growth: 1 }));
    assert!(!frame.state.snake.occupies(frame.state.food.cell));

    let grown = tick(&frame.state, STEP, &mut rng).state;
    assert_eq!(grown.snake.body_length(), 4);
}

#[test]
fn bonus_food_is_worth_more() {
    let mut s = make_state();
    s.food = make_food(Cell::new(31, 20), FoodKind::Bonus, &s.config);
    let frame = tick(&s, STEP, &mut seeded_rng());
    assert_eq!(frame.state.score, 50);
    assert_eq!(frame.state.snake.pending_growth(), 3);
}

// ── Pause / game over ─────────────────────────────────────────────────────────

#[test]
fn paused_game_does_not_advance() {
    let s = toggle_pause(&make_state());
    assert_eq!(s.phase, GamePhase::Paused);

    let frame = tick(&s, STEP, &mut seeded_rng());
    assert!(frame.events.is_empty());
    assert_eq!(frame.state.frame, s.frame);
    assert_eq!(frame.state.snake.head(), s.snake.head());
    assert_eq!(frame.state.elapsed, s.elapsed);

    assert_eq!(toggle_pause(&s).phase, GamePhase::Playing);
}

#[test]
fn game_over_is_terminal() {
    let mut s = make_state();
    s.phase = GamePhase::GameOver;
    assert_eq!(toggle_pause(&s).phase, GamePhase::GameOver);

    let frame = tick(&s, STEP, &mut seeded_rng());
    assert_eq!(frame.state.phase, GamePhase::GameOver);
    assert_eq!(frame.state.snake.head(), s.snake.head());
}

#[test]
fn negative_dt_is_treated_as_zero() {
    let s = make_state();
    let s2 = tick(&s, -1.0, &mut seeded_rng()).state;
    assert_eq!(s2.elapsed, 0.0);
    assert_eq!(s2.snake_move_timer, 0.0);
}

// ── Agents ────────────────────────────────────────────────────────────────────

#[test]
fn enemy_dies_on_third_melee_hit_and_scores_once() {
    let mut s = make_state();
    let head = head_px(&s);
    s.agents.push(make_agent(0, head));
    let mut rng = seeded_rng();

    let mut kills = 0;
    let mut healths = Vec::new();
    for _ in 0..4 {
        let frame = tick(&s, STILL, &mut rng);
        kills += frame
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::AgentKilled { score_value: 100 }))
            .count();
        s = frame.state;
        healths.push(s.agents.first().map(|a| a.health));
    }

    assert_eq!(healths, vec![Some(2), Some(1), None, None]);
    assert_eq!(kills, 1);
    assert_eq!(s.score, 100);
}

#[test]
fn evading_enemy_fires_when_cooldown_elapses() {
    let mut s = make_state();
    let body: Vec<Cell> = (0..16).map(|i| Cell::new(30 - i, 20)).collect();
    s.snake = Snake::from_segments(body, Direction::Right);
    let mut agent = make_agent(7, Vec2::new(100.0, 100.0));
    agent.timers.shoot = 2.995;
    s.agents.push(agent);

    let s2 = tick(&s, STILL, &mut seeded_rng()).state;
    assert_eq!(s2.agents[0].state, AgentState::Evade);
    assert_eq!(s2.projectiles.len(), 1);
    assert_eq!(s2.projectiles[0].shooter, Shooter::Agent(7));
    assert_eq!(s2.agents[0].timers.shoot, 0.0);
}

#[test]
fn first_wave_arrives_after_ten_seconds() {
    let mut s = make_state();
    let mut rng = seeded_rng();
    s.elapsed = 9.0;

    let early = tick(&s, STILL, &mut rng);
    assert!(early.state.agents.is_empty());
    assert_eq!(early.state.waves.wave, 0);

    s.elapsed = 9.99;
    let frame = tick(&s, 0.02, &mut rng);
    assert!(frame.events.contains(&GameEvent::WaveStarted { wave: 1 }));
    assert_eq!(frame.state.agents.len(), 1);
    assert_eq!(frame.state.waves.pending, 0);
    assert_eq!(frame.state.waves.spawned_total, 1);

    let mut s2 = frame.state;
    s2.waves.since_last_wave = 19.99;
    let frame2 = tick(&s2, 0.02, &mut rng);
    assert!(frame2.events.contains(&GameEvent::WaveStarted { wave: 2 }));
    assert_eq!(frame2.state.agents.len(), 3);
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[test]
fn projectile_hit_ends_the_game() {
    let mut s = make_state();
    let head = head_px(&s);
    s.projectiles.push(Projectile {
        position: Vec2::new(head.x - 10.0, head.y),
        velocity: Vec2::new(5.0, 0.0),
        shooter: Shooter::Boss,
    });
    let frame = tick(&s, STILL, &mut seeded_rng());
    assert_eq!(frame.state.phase, GamePhase::GameOver);
    assert!(frame.state.projectiles.is_empty());
    assert!(frame.events.contains(&GameEvent::PlayerDied {
        cause: DeathCause::Projectile
    }));
}

// ── Boss lifecycle ────────────────────────────────────────────────────────────

#[test]
fn crossing_the_threshold_runs_the_boss_intro() {
    let mut s = make_state();
    s.score = 490;
    s.food = make_food(Cell::new(31, 20), FoodKind::Normal, &s.config);
    let mut rng = seeded_rng();

    let frame = tick(&s, STEP, &mut rng);
    assert_eq!(frame.state.score, 500);
    assert_eq!(frame.state.phase, GamePhase::BossIntro);
    assert_eq!(frame.state.waves.boss_triggered_at, 500);
    assert!(frame.events.contains(&GameEvent::BossIncoming));

    // The world is frozen during the intro.
    let mut intro = frame.state;
    intro.agents.push(make_agent(0, Vec2::new(100.0, 100.0)));
    let still = tick(&intro, STEP, &mut rng).state;
    assert_eq!(still.phase, GamePhase::BossIntro);
    assert_eq!(still.agents[0].position, Vec2::new(100.0, 100.0));
    assert_eq!(still.snake.head(), intro.snake.head());

    let spawned = tick(&still, 3.0, &mut rng);
    assert!(spawned.events.contains(&GameEvent::BossSpawned));
    assert_eq!(spawned.state.phase, GamePhase::Playing);
    assert!(spawned.state.agents.is_empty());
    let boss = spawned.state.boss.as_ref().map(|b| (b.position, b.health));
    assert_eq!(boss, Some((Vec2::new(600.0, 400.0), 20)));
}

#[test]
fn boss_threshold_only_fires_once_per_multiple() {
    let mut s = make_state();
    s.score = 520;
    s.waves.boss_triggered_at = 500;
    let s2 = tick(&s, STILL, &mut seeded_rng()).state;
    assert_eq!(s2.phase, GamePhase::Playing);
}

#[test]
fn live_boss_suspends_waves() {
    let mut s = make_state();
    s.boss = Some(new_boss(&s.config));
    s.elapsed = 9.99;
    let s2 = tick(&s, 0.02, &mut seeded_rng()).state;
    assert_eq!(s2.waves.wave, 0);
    assert!(s2.agents.is_empty());
}

#[test]
fn boss_fires_a_three_way_spread() {
    let mut s = make_state();
    let mut boss = new_boss(&s.config);
    boss.position = Vec2::new(200.0, 200.0);
    boss.shoot_timer = 1.49;
    s.boss = Some(boss);

    let s2 = tick(&s, 0.02, &mut seeded_rng()).state;
    assert_eq!(s2.projectiles.len(), 3);
    assert!(s2.projectiles.iter().all(|p| p.shooter == Shooter::Boss));
    assert_eq!(s2.boss.as_ref().map(|b| b.shoot_timer), Some(0.0));
}

#[test]
fn boss_defeat_clears_projectiles_and_pays_bonus_once() {
    let mut s = make_state();
    s.score = 500;
    s.waves.boss_triggered_at = 500;
    let mut boss = new_boss(&s.config);
    boss.position = head_px(&s);
    boss.health = 1;
    s.boss = Some(boss);
    for i in 0..4 {
        s.projectiles.push(Projectile {
            position: Vec2::new(100.0 + 20.0 * i as f32, 100.0),
            velocity: Vec2::new(0.0, 5.0),
            shooter: Shooter::Boss,
        });
    }

    let frame = tick(&s, STILL, &mut seeded_rng());
    assert!(frame.state.boss.is_none());
    assert!(frame.state.projectiles.is_empty());
    assert_eq!(frame.state.score, 1000);
    assert_eq!(
        frame
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::BossDefeated { bonus: 500 }))
            .count(),
        1
    );
    assert!(snapshot(&frame.state).boss_defeated);
}

#[test]
fn body_contact_hurts_boss_away_from_the_head() {
    let mut config = Config::default();
    let body: Vec<Cell> = (0..11).map(|i| Cell::new(30 - i, 20)).collect();
    let snake = Snake::from_segments(body, Direction::Right);
    let mut boss = new_boss(&config);
    boss.position = cell_center(Cell::new(22, 20), config.playfield.cell_size);

    assert!(!boss_contact(&boss, &snake, &config));
    config.boss.contact = BossContact::Body;
    assert!(boss_contact(&boss, &snake, &config));
}

#[test]
fn boss_covers_a_square_block_of_cells() {
    let config = Config::default();
    let cells: Vec<Cell> = boss_cells(cell_center(Cell::new(10, 10), 20.0), &config).collect();
    assert_eq!(cells.len(), 25);
    assert!(cells.contains(&Cell::new(8, 8)));
    assert!(cells.contains(&Cell::new(12, 12)));
    assert!(!cells.contains(&Cell::new(13, 10)));
}

// ── snapshot ──────────────────────────────────────────────────────────────────

#[test]
fn snapshot_mirrors_the_state() {
    let mut s = make_state();
    s.agents.push(make_agent(0, Vec2::new(100.0, 100.0)));
    s.score = 40;
    s.waves.wave = 2;

    let snap = snapshot(&s);
    assert_eq!(snap.snake.first(), Some(&Cell::new(30, 20)));
    assert_eq!(snap.snake.len(), 3);
    assert_eq!(snap.agents.len(), 1);
    assert_eq!(snap.agents[0].health, 3);
    assert_eq!(snap.score, 40);
    assert_eq!(snap.wave, 2);
    assert!(snap.boss.is_none());
    assert!(!snap.boss_defeated);
    assert_eq!(snap.phase, GamePhase::Playing);
}
