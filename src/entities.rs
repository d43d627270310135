/// All simulation entity types: pure data, no logic.
use crate::config::Config;
use crate::geometry::{Cell, Vec2};
use crate::snake::Snake;

// ── Agents ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentState {
    Patrol,
    Chase,
    Evade,
}

/// Per-agent accumulators, all advanced by the frame's `dt` and reset to
/// zero exactly when their action fires.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AgentTimers {
    pub patrol: f32,
    pub shoot: f32,
    pub decision: f32,
}

#[derive(Clone, Debug)]
pub struct Agent {
    pub id: u32,
    pub position: Vec2,
    /// Where the agent spawned; patrol wanders around this point.
    pub anchor: Vec2,
    pub health: u32,
    pub state: AgentState,
    /// Degrees, unnormalised.
    pub heading: f32,
    /// Pixels per second.
    pub speed: f32,
    /// Seconds until the next random patrol heading; resampled on each trigger.
    pub patrol_interval: f32,
    pub timers: AgentTimers,
}

#[derive(Clone, Debug)]
pub struct Boss {
    pub position: Vec2,
    pub health: u32,
    pub max_health: u32,
    pub speed: f32,
    pub shoot_timer: f32,
    /// Monotonic phase of the lateral weave, radians.
    pub weave_phase: f32,
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shooter {
    Agent(u32),
    Boss,
}

#[derive(Clone, Debug)]
pub struct Projectile {
    pub position: Vec2,
    /// Pixels per frame, fixed at spawn.
    pub velocity: Vec2,
    pub shooter: Shooter,
}

// ── Food ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FoodKind {
    Normal,
    Bonus,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Food {
    pub cell: Cell,
    pub kind: FoodKind,
    pub points: u32,
    pub growth: u32,
}

// ── Spawn bookkeeping ─────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq)]
pub struct WaveState {
    /// Number of waves started so far.
    pub wave: u32,
    pub since_last_wave: f32,
    /// Agents owed but not yet placed.  A new wave adds its quota to any
    /// leftover, capped by the free room under the concurrency limit.
    pub pending: usize,
    pub spawned_total: u32,
    /// Highest boss threshold multiple already announced.
    pub boss_triggered_at: u32,
}

// ── Outcomes ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GamePhase {
    Playing,
    Paused,
    BossIntro,
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeathCause {
    Wall,
    SelfCollision,
    Projectile,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    FoodCollected { points: u32, growth: u32 },
    AgentKilled { score_value: u32 },
    BossDefeated { bonus: u32 },
    PlayerDied { cause: DeathCause },
    WaveStarted { wave: u32 },
    BossIncoming,
    BossSpawned,
}

// ── Master game state ─────────────────────────────────────────────────────────

/// The entire simulation state.  Cloneable so the frame update can return a
/// new copy without touching the caller's.
#[derive(Clone, Debug)]
pub struct GameState {
    pub config: Config,
    pub snake: Snake,
    pub food: Food,
    pub agents: Vec<Agent>,
    pub boss: Option<Boss>,
    pub projectiles: Vec<Projectile>,
    pub waves: WaveState,
    pub score: u32,
    pub phase: GamePhase,
    /// Seconds of `Playing` time since the session started.
    pub elapsed: f32,
    pub frame: u64,
    pub snake_move_timer: f32,
    pub boss_intro_timer: f32,
    /// Counts down after a boss defeat while the victory banner is shown.
    pub victory_timer: f32,
    pub next_agent_id: u32,
}

/// Result of one `tick`.
#[derive(Clone, Debug)]
pub struct Frame {
    pub state: GameState,
    pub events: Vec<GameEvent>,
}

// ── Read-only views for renderers ─────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct AgentView {
    pub position: Vec2,
    pub state: AgentState,
    pub health: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BossView {
    pub position: Vec2,
    pub health: u32,
    pub max_health: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub snake: Vec<Cell>,
    pub food: Food,
    pub agents: Vec<AgentView>,
    pub boss: Option<BossView>,
    pub boss_defeated: bool,
    pub projectiles: Vec<Vec2>,
    pub score: u32,
    pub wave: u32,
    pub phase: GamePhase,
}
