/// Agent decision engine: state classification, the three behaviour
/// controllers, the boss movement pattern and the shoot decisions.
///
/// Controllers only ever change an agent's heading discontinuously; position
/// always advances by at most `speed × dt`, so a state flip between frames
/// never teleports anything.
use rand::Rng;

use crate::config::{Config, EnemyConfig, Movement};
use crate::entities::{Agent, AgentState, Boss};
use crate::geometry::{bearing_deg, cardinal_vector, heading_vector, Vec2};

// ── Classifier ───────────────────────────────────────────────────────────────

/// Strict priority: a long snake forces EVADE regardless of distance, then
/// detection radius decides between CHASE and PATROL.  No hysteresis.
pub fn classify(position: Vec2, head: Vec2, body_length: usize, enemy: &EnemyConfig) -> AgentState {
    if body_length >= enemy.evade_threshold {
        AgentState::Evade
    } else if position.distance(head) < enemy.detection_radius {
        AgentState::Chase
    } else {
        AgentState::Patrol
    }
}

// ── Shared primitives ────────────────────────────────────────────────────────

/// Clamp into `[margin, dimension - margin]` per axis, reflecting the heading
/// on each axis that was clamped.  Both reflections apply in a corner.
pub fn wall_bounce(position: &mut Vec2, heading: &mut f32, margin: f32, width: f32, height: f32) {
    if position.x < margin {
        position.x = margin;
        *heading = 180.0 - *heading;
    } else if position.x > width - margin {
        position.x = width - margin;
        *heading = 180.0 - *heading;
    }

    if position.y < margin {
        position.y = margin;
        *heading = -*heading;
    } else if position.y > height - margin {
        position.y = height - margin;
        *heading = -*heading;
    }
}

fn displace(agent: &mut Agent, distance: f32, movement: Movement) {
    let direction = match movement {
        Movement::Continuous => heading_vector(agent.heading),
        Movement::GridStep => cardinal_vector(agent.heading),
    };
    agent.position += direction * distance;
}

pub fn sample_patrol_interval(enemy: &EnemyConfig, rng: &mut impl Rng) -> f32 {
    rng.gen_range(enemy.patrol_interval_min..=enemy.patrol_interval_max)
}

/// Bearing from `from` to `to`, replaced with probability
/// `mistake_probability` by the bearing plus a uniform offset in
/// `±mistake_max_offset_deg`.
pub fn aim_with_mistakes(from: Vec2, to: Vec2, enemy: &EnemyConfig, rng: &mut impl Rng) -> f32 {
    let exact = bearing_deg(from, to);
    if rng.gen_bool(enemy.mistake_probability) {
        let spread = enemy.mistake_max_offset_deg;
        exact + rng.gen_range(-spread..=spread)
    } else {
        exact
    }
}

// ── Behaviour controllers ────────────────────────────────────────────────────

fn patrol(agent: &mut Agent, dt: f32, enemy: &EnemyConfig, rng: &mut impl Rng) {
    if agent.timers.patrol > agent.patrol_interval {
        agent.heading = rng.gen_range(0.0..360.0);
        agent.patrol_interval = sample_patrol_interval(enemy, rng);
        agent.timers.patrol = 0.0;
    }

    displace(agent, agent.speed * dt, enemy.movement);

    // Checked every frame so the pull-back starts the moment the leash is exceeded.
    if agent.position.distance(agent.anchor) > enemy.patrol_radius {
        agent.heading = bearing_deg(agent.position, agent.anchor);
    }
}

fn chase(agent: &mut Agent, dt: f32, head: Vec2, distance: f32, enemy: &EnemyConfig, rng: &mut impl Rng) {
    // Between decisions the agent keeps its last heading (reaction lag).
    if agent.timers.decision > enemy.reaction_delay {
        agent.timers.decision = 0.0;
        agent.heading = aim_with_mistakes(agent.position, head, enemy, rng);
    }

    let factor = if distance < enemy.close_range {
        enemy.close_range_speed_factor
    } else {
        1.0
    };
    displace(agent, agent.speed * factor * dt, enemy.movement);
}

fn evade(agent: &mut Agent, dt: f32, head: Vec2, distance: f32, enemy: &EnemyConfig) {
    // Sitting exactly on the head leaves no "away"; hold still this frame.
    if distance > 0.0 {
        agent.heading = bearing_deg(head, agent.position);
        displace(agent, agent.speed * dt, enemy.movement);
    }
}

/// Advance one agent by `dt`: timers, classification, behaviour, wall bounce.
pub fn update_agent(
    agent: &mut Agent,
    head: Vec2,
    body_length: usize,
    dt: f32,
    config: &Config,
    rng: &mut impl Rng,
) {
    let enemy = &config.enemy;
    agent.timers.patrol += dt;
    agent.timers.shoot += dt;
    agent.timers.decision += dt;

    let distance = agent.position.distance(head);
    agent.state = classify(agent.position, head, body_length, enemy);

    match agent.state {
        AgentState::Patrol => patrol(agent, dt, enemy, rng),
        AgentState::Chase => chase(agent, dt, head, distance, enemy, rng),
        AgentState::Evade => evade(agent, dt, head, distance, enemy),
    }

    let field = &config.playfield;
    wall_bounce(
        &mut agent.position,
        &mut agent.heading,
        field.wall_margin,
        field.width(),
        field.height(),
    );
}

/// Only an evading agent fires; the cooldown resets exactly when it does.
pub fn agent_should_fire(agent: &mut Agent, cooldown: f32) -> bool {
    if agent.state == AgentState::Evade && agent.timers.shoot >= cooldown {
        agent.timers.shoot = 0.0;
        true
    } else {
        false
    }
}

// ── Boss ─────────────────────────────────────────────────────────────────────

/// Keep the boss inside a `[min, max]` distance band around the head:
/// retreat when too close, approach when too far, otherwise orbit
/// tangentially with a sinusoidal lateral weave.  The boss is pinned at the
/// field edge rather than bounced.
pub fn update_boss(boss: &mut Boss, head: Vec2, dt: f32, config: &Config) {
    let b = &config.boss;
    boss.weave_phase += dt * b.weave_rate;
    boss.shoot_timer += dt;

    let distance = boss.position.distance(head);
    if distance > 0.0 {
        let toward = bearing_deg(boss.position, head);
        let mut step = Vec2::ZERO;
        if distance < b.min_distance {
            step += heading_vector(toward + 180.0) * (boss.speed * dt);
        } else if distance > b.max_distance {
            step += heading_vector(toward) * (boss.speed * dt);
        } else {
            let orbit = toward + 90.0;
            step += heading_vector(orbit) * (boss.speed * dt);
            step += heading_vector(orbit + 90.0) * (boss.weave_phase.sin() * b.weave_amplitude * dt);
        }
        boss.position += step;
    }

    let field = &config.playfield;
    let margin = b.half_extent(field.cell_size) + b.edge_buffer;
    boss.position.x = boss.position.x.clamp(margin, field.width() - margin);
    boss.position.y = boss.position.y.clamp(margin, field.height() - margin);
}

pub fn boss_should_fire(boss: &mut Boss, cooldown: f32) -> bool {
    if boss.shoot_timer >= cooldown {
        boss.shoot_timer = 0.0;
        true
    } else {
        false
    }
}
