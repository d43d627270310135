/// Tunable parameters of the simulation.
///
/// Every section derives serde with `#[serde(default)]`, so a JSON document
/// only needs to name the keys it wants to override.  `Config::default()`
/// reproduces the stock arcade balance.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// ── Policy switches ──────────────────────────────────────────────────────────

/// How new agents are scheduled.  Exactly one policy drives a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnPolicy {
    /// First wave after `first_wave_after` seconds, then one every
    /// `wave_interval`, each adding `wave_index + 1` agents.
    #[default]
    Waves,
    /// Keep `min(score / score_step, max_concurrent)` agents alive.
    ScoreTarget,
}

/// Where spawn candidates are sampled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnPlacement {
    /// On a line `edge_inset` pixels inside a randomly chosen screen edge.
    #[default]
    Edges,
    /// Uniformly over the whole wall-bounded interior.
    Anywhere,
}

/// Granularity of agent displacement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Movement {
    /// Move along the exact heading.
    #[default]
    Continuous,
    /// Move along the cardinal direction nearest to the heading.
    GridStep,
}

/// Which part of the snake can hurt the boss.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BossContact {
    /// Head within `boss radius + half a cell` of the boss centre.
    #[default]
    Head,
    /// Any snake cell overlapping the boss's block of cells.
    Body,
}

// ── Sections ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayfieldConfig {
    pub columns: i32,
    pub rows: i32,
    /// Pixel edge length of one grid cell.
    pub cell_size: f32,
    /// Frames per second the driver is expected to tick at.
    pub frame_rate: u32,
    /// Agents are kept at least this far from every wall.
    pub wall_margin: f32,
}

impl PlayfieldConfig {
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.cell_size
    }

    pub fn height(&self) -> f32 {
        self.rows as f32 * self.cell_size
    }
}

impl Default for PlayfieldConfig {
    fn default() -> Self {
        Self {
            columns: 60,
            rows: 40,
            cell_size: 20.0,
            frame_rate: 60,
            wall_margin: 20.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnakeConfig {
    pub initial_length: usize,
    pub moves_per_second: f32,
}

impl Default for SnakeConfig {
    fn default() -> Self {
        Self {
            initial_length: 3,
            moves_per_second: 10.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodConfig {
    pub normal_points: u32,
    pub normal_growth: u32,
    pub bonus_points: u32,
    pub bonus_growth: u32,
    pub bonus_chance: f64,
    /// Food is not placed within this many cells (per axis) of an agent.
    pub agent_clearance: i32,
    pub max_attempts: u32,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            normal_points: 10,
            normal_growth: 1,
            bonus_points: 50,
            bonus_growth: 3,
            bonus_chance: 0.05,
            agent_clearance: 3,
            max_attempts: 100,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Fraction of the snake's own speed.
    pub speed_multiplier: f32,
    pub max_health: u32,
    pub kill_score: u32,
    pub detection_radius: f32,
    pub close_range: f32,
    pub close_range_speed_factor: f32,
    pub reaction_delay: f32,
    pub mistake_probability: f64,
    pub mistake_max_offset_deg: f32,
    /// Body length at which every agent switches to EVADE.
    pub evade_threshold: usize,
    pub shoot_cooldown: f32,
    pub patrol_radius: f32,
    pub patrol_interval_min: f32,
    pub patrol_interval_max: f32,
    pub movement: Movement,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            speed_multiplier: 0.6,
            max_health: 3,
            kill_score: 100,
            detection_radius: 300.0,
            close_range: 50.0,
            close_range_speed_factor: 0.5,
            reaction_delay: 0.3,
            mistake_probability: 0.2,
            mistake_max_offset_deg: 90.0,
            evade_threshold: 16,
            shoot_cooldown: 3.0,
            patrol_radius: 300.0,
            patrol_interval_min: 2.0,
            patrol_interval_max: 3.0,
            movement: Movement::Continuous,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub policy: SpawnPolicy,
    pub placement: SpawnPlacement,
    pub first_wave_after: f32,
    pub wave_interval: f32,
    pub score_step: u32,
    pub max_concurrent: usize,
    pub min_player_distance: f32,
    pub min_agent_distance: f32,
    pub edge_inset: f32,
    pub max_attempts: u32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            policy: SpawnPolicy::Waves,
            placement: SpawnPlacement::Edges,
            first_wave_after: 10.0,
            wave_interval: 20.0,
            score_step: 50,
            max_concurrent: 5,
            min_player_distance: 300.0,
            min_agent_distance: 100.0,
            edge_inset: 50.0,
            max_attempts: 50,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossConfig {
    /// A boss is announced every time the score crosses a new multiple.
    pub spawn_score_step: u32,
    /// Edge length of the boss in cells.
    pub size_cells: u32,
    pub max_health: u32,
    pub speed_multiplier: f32,
    pub shoot_cooldown: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub spread_deg: f32,
    pub defeat_bonus: u32,
    /// Phase advance of the lateral weave, radians per second.
    pub weave_rate: f32,
    /// Lateral weave amplitude, pixels per second.
    pub weave_amplitude: f32,
    /// Extra clearance beyond the boss's half size when clamping to the field.
    pub edge_buffer: f32,
    pub intro_duration: f32,
    pub victory_duration: f32,
    pub contact: BossContact,
}

impl BossConfig {
    pub fn half_extent(&self, cell_size: f32) -> f32 {
        self.size_cells as f32 * cell_size / 2.0
    }
}

impl Default for BossConfig {
    fn default() -> Self {
        Self {
            spawn_score_step: 500,
            size_cells: 5,
            max_health: 20,
            speed_multiplier: 0.3,
            shoot_cooldown: 1.5,
            min_distance: 150.0,
            max_distance: 400.0,
            spread_deg: 15.0,
            defeat_bonus: 500,
            weave_rate: 2.0,
            weave_amplitude: 50.0,
            edge_buffer: 20.0,
            intro_duration: 3.0,
            victory_duration: 3.0,
            contact: BossContact::Head,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    /// Pixels travelled per frame.
    pub speed: f32,
    pub radius: f32,
    pub offscreen_margin: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            speed: 5.0,
            radius: 5.0,
            offscreen_margin: 50.0,
        }
    }
}

// ── Root ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub playfield: PlayfieldConfig,
    pub snake: SnakeConfig,
    pub food: FoodConfig,
    pub enemy: EnemyConfig,
    pub spawn: SpawnConfig,
    pub boss: BossConfig,
    pub projectile: ProjectileConfig,
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Pixels per second the snake covers; agent speeds are fractions of it.
    pub fn base_speed(&self) -> f32 {
        self.snake.moves_per_second * self.playfield.cell_size
    }

    pub fn agent_speed(&self) -> f32 {
        self.base_speed() * self.enemy.speed_multiplier
    }

    pub fn boss_speed(&self) -> f32 {
        self.base_speed() * self.boss.speed_multiplier
    }

    /// Contact distance between an agent and the snake head: one cell.
    pub fn melee_range(&self) -> f32 {
        self.playfield.cell_size
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.playfield;
        if p.columns <= 0 || p.rows <= 0 {
            return Err(invalid("playfield must have at least one column and row"));
        }
        if p.cell_size <= 0.0 || p.frame_rate == 0 {
            return Err(invalid("cell_size and frame_rate must be positive"));
        }
        if p.wall_margin < 0.0 || 2.0 * p.wall_margin > p.width().min(p.height()) {
            return Err(invalid("wall_margin does not fit inside the playfield"));
        }

        let s = &self.snake;
        if s.initial_length == 0 || s.initial_length as i32 > p.columns / 2 + 1 {
            return Err(invalid("snake initial_length must fit left of the centre column"));
        }
        if s.moves_per_second <= 0.0 {
            return Err(invalid("snake moves_per_second must be positive"));
        }

        if !(0.0..=1.0).contains(&self.food.bonus_chance) {
            return Err(invalid("food bonus_chance must lie in [0, 1]"));
        }
        if self.food.max_attempts == 0 {
            return Err(invalid("food max_attempts must be positive"));
        }

        let e = &self.enemy;
        if !(0.0..=1.0).contains(&e.mistake_probability) {
            return Err(invalid("enemy mistake_probability must lie in [0, 1]"));
        }
        if e.max_health == 0 {
            return Err(invalid("enemy max_health must be positive"));
        }
        if e.reaction_delay < 0.0 || e.shoot_cooldown < 0.0 || e.mistake_max_offset_deg < 0.0 {
            return Err(invalid("enemy timings and offsets cannot be negative"));
        }
        if e.patrol_interval_min < 0.0 || e.patrol_interval_min > e.patrol_interval_max {
            return Err(invalid("enemy patrol interval range is empty"));
        }

        let sp = &self.spawn;
        if sp.max_attempts == 0 || sp.score_step == 0 {
            return Err(invalid("spawn max_attempts and score_step must be positive"));
        }
        if sp.wave_interval <= 0.0 || sp.first_wave_after < 0.0 {
            return Err(invalid("spawn wave timings must be positive"));
        }
        if sp.edge_inset < 0.0 || 2.0 * sp.edge_inset > p.width().min(p.height()) {
            return Err(invalid("spawn edge_inset does not fit inside the playfield"));
        }

        let b = &self.boss;
        if b.spawn_score_step == 0 || b.max_health == 0 || b.size_cells == 0 {
            return Err(invalid("boss spawn_score_step, max_health and size_cells must be positive"));
        }
        if b.min_distance > b.max_distance {
            return Err(invalid("boss min_distance exceeds max_distance"));
        }
        if 2.0 * (b.half_extent(p.cell_size) + b.edge_buffer) > p.width().min(p.height()) {
            return Err(invalid("boss does not fit inside the playfield"));
        }

        if self.projectile.speed <= 0.0 || self.projectile.radius < 0.0 {
            return Err(invalid("projectile speed must be positive"));
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::Invalid(reason.to_string())
}
