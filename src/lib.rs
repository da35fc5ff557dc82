//! Bomber Grid - tile-grid bomb-and-maze action game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (map generation, movement, blasts, enemies, scheduler)
//! - `engine`: Input/output facade for a renderer and a host loop
//! - `persistence`: Progress watermark storage ports
//! - `highscores`: High score, unlock and cosmetic watermarks
//! - `tuning`: Data-driven game balance

pub mod engine;
pub mod error;
pub mod highscores;
pub mod persistence;
pub mod sim;
pub mod tuning;

pub use engine::Engine;
pub use error::{Error, Result};
pub use highscores::{Progress, SkinId};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Grid dimensions (cells)
    pub const GRID_WIDTH: i32 = 15;
    pub const GRID_HEIGHT: i32 = 11;
    /// Player spawn cell
    pub const SPAWN_X: i32 = 1;
    pub const SPAWN_Y: i32 = 1;

    /// Number of levels in the campaign (5 planets x 5 sectors)
    pub const MAX_LEVEL: u32 = 25;
    pub const SECTORS_PER_PLANET: u32 = 5;
    /// Whole-map generation attempts before carving a path
    pub const MAX_GENERATION_ATTEMPTS: u32 = 50;
    pub const MAX_ENEMIES: usize = 12;
    /// Undrained host events kept before the oldest are dropped
    pub const MAX_PENDING_EVENTS: usize = 256;

    /// Hazard/AI scheduler period (ms)
    pub const HAZARD_TICK_MS: u64 = 100;
    /// Elapsed-time clock period (ms)
    pub const CLOCK_TICK_MS: u64 = 1000;

    /// Bomb fuse (ms)
    pub const BOMB_FUSE_MS: u64 = 2500;
    /// Explosion cell lifetime (ms)
    pub const EXPLOSION_MS: u64 = 600;
    pub const SCREEN_SHAKE_MS: u64 = 200;
    /// How long killed enemies stay in the dying set
    pub const ENEMY_DYING_MS: u64 = 600;
    /// Previous-cell hit window after an enemy moves
    pub const ENEMY_GRACE_MS: u64 = 300;

    pub const DEATH_LOCKOUT_MS: u64 = 800;
    pub const MOVE_ANIM_MS: u64 = 150;
    pub const ICE_SLIDE_MS: u64 = 100;
    pub const EXIT_SEQUENCE_MS: u64 = 1500;

    /// Shield windows
    pub const SHIELD_LEVEL_START_MS: u64 = 3000;
    pub const SHIELD_RESPAWN_MS: u64 = 2000;
    pub const SHIELD_VEST_MS: u64 = 10_000;

    /// Score bonuses
    pub const BRICK_SCORE: u64 = 25;
    pub const ENEMY_KILL_SCORE: u64 = 500;

    /// Starting stats
    pub const START_LIVES: u32 = 3;
    pub const START_MAX_BOMBS: u32 = 1;
    pub const START_BLAST_RADIUS: u32 = 1;
    pub const START_MOVE_INTERVAL_MS: u64 = 180;
    pub const START_RADAR_CHARGES: u32 = 3;

    /// Stat caps
    pub const MAX_LIVES: u32 = 5;
    pub const MIN_MOVE_INTERVAL_MS: u64 = 100;
    pub const SPEED_STEP_MS: u64 = 15;
    pub const RADAR_PICKUP_CHARGES: u32 = 5;
}
