//! Simulation constants and tuning parameters.

/// Default simulation tick rate (Hz).
pub const TICK_RATE: u32 = 30;

// --- Movement ---

/// Angular distance per unit of speed per second.
pub const ANGULAR_SCALE: f64 = 0.1;

/// Movement multiplier while frozen.
pub const FREEZE_MOVE_FACTOR: f64 = 0.5;

/// Movement multiplier while blazing.
pub const BLAZE_MOVE_FACTOR: f64 = 2.0;

/// Default chance that a boundary crossing hands the enemy to the neighbour.
pub const TRANSITION_CHANCE: f64 = 0.5;

// --- Damage ---

/// Damage multiplier while decaying.
pub const DECAY_DAMAGE_FACTOR: f64 = 2.0;

/// Damage multiplier while blazing.
pub const BLAZE_DAMAGE_FACTOR: f64 = 4.0;

// --- Stress / health ---

/// Enemy lifetime a single loop tolerates before stress reaches 100%.
pub const STRESS_PER_LOOP: f64 = 10.0;

/// Stress above which health drains.
pub const STRESS_DRAIN_THRESHOLD: f64 = 1.0;

/// Stress level that triggers the anxiety objective.
pub const STRESS_ANXIETY_LEVEL: f64 = 2.0;

// --- Cycles & spawning ---

/// Base seconds per cycle; the actual period is `CYCLE_BASE_SECS + sqrt(cycle)`.
pub const CYCLE_BASE_SECS: f64 = 15.0;

/// Base health of a spawned enemy before cycle scaling.
pub const ENEMY_BASE_HEALTH: f64 = 18.0;

/// Per-cycle health growth of spawned enemies.
pub const ENEMY_HEALTH_GROWTH: f64 = 1.05;

/// Half-width of the random health spread (±10%).
pub const ENEMY_HEALTH_SPREAD: f64 = 0.1;

/// Minimum speed magnitude of a spawned enemy.
pub const ENEMY_MIN_SPEED: f64 = 0.8;

/// Maximum speed magnitude of a spawned enemy, before cycle scaling.
pub const ENEMY_MAX_SPEED: f64 = 1.2;

/// Extra speed per cycle (scaled by the mode exponent).
pub const ENEMY_SPEED_PER_CYCLE: f64 = 0.05;

/// Energy loot carried by every spawned enemy before research.
pub const ENEMY_BASE_ENERGY: f64 = 25.0;

/// Health of the single weak enemy that seeds a run.
pub const SEED_ENEMY_HEALTH: f64 = 20.0;

/// Energy loot carried by the seed enemy.
pub const SEED_ENEMY_ENERGY: f64 = 100.0;

/// The grid expands on every other cycle.
pub const EXPANSION_CYCLE_PERIOD: u32 = 2;

// --- Economy ---

/// Energy every run starts with before hub bonuses.
pub const BASE_STARTING_ENERGY: f64 = 100.0;

/// Growth of building prices per building already owned.
pub const COST_FACTOR_BASE: f64 = 1.1;

/// Share of a placement cost that is refunded on sale.
pub const PLACEMENT_REFUND_RATIO: f64 = 0.75;

/// Share of an upgrade cost that is refunded on sale.
pub const UPGRADE_REFUND_RATIO: f64 = 0.5;

/// Sell cooldown before hub research (seconds).
pub const SELL_COOLDOWN_SECS: f64 = 60.0;

/// Sell cooldown reduction per hub research level (seconds).
pub const SELL_COOLDOWN_PER_LEVEL: f64 = 5.0;

/// Energy value that triggers the wysi objective.
pub const WYSI_ENERGY: f64 = 727.0;

// --- Run lifecycle ---

/// Seconds the stuck condition must hold before the run is ended.
pub const STUCK_GRACE_SECS: f64 = 3.0;

/// Upper bound on the game speed multiplier.
pub const MAX_GAME_SPEED: f64 = 4.0;

// --- Presentation ---

/// Seconds a building→enemy link stays visible after a touch.
pub const CONNECTION_LINGER_SECS: f64 = 0.2;
