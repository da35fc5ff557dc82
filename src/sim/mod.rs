//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Logical time only (milliseconds supplied by the caller)
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod enemy_ai;
pub mod grid;
pub mod hazard;
pub mod level;
pub mod mapgen;
pub mod movement;
pub mod state;
pub mod tick;

pub use enemy_ai::{advance_enemies, eligible_moves};
pub use grid::{Cell, Direction, Grid, Pos, PowerUp};
pub use hazard::{blast_cells, danger_cells, detonate_bomb, detonate_due_bombs};
pub use level::{LevelConfig, Loot, LootTable, Planet, Theme};
pub use mapgen::{GeneratedMap, generate_map, is_reachable, spawn_enemies};
pub use movement::{MoveCause, try_move};
pub use state::{
    BlastKind, Bomb, DyingEnemy, Enemy, EnemyKind, Explosion, GameEvent, GameState, GameStatus,
    Player, PlayerStats,
};
pub use tick::{Due, advance, init_level, next_due, toggle_pause};
