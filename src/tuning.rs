//! Game balance and timing configuration
//!
//! Every duration, score bonus and starting stat the simulation uses. Missing
//! JSON fields fall back to the `consts` defaults, so a tuning file only needs
//! the values it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Scheduler ===
    /// Hazard/AI pass period (ms)
    pub hazard_tick_ms: u64,
    /// Elapsed-time clock period (ms)
    pub clock_tick_ms: u64,

    // === Hazards ===
    pub bomb_fuse_ms: u64,
    pub explosion_ms: u64,
    pub screen_shake_ms: u64,
    pub enemy_dying_ms: u64,
    /// How long an enemy's previous cell stays hittable after it moves
    pub enemy_grace_ms: u64,

    // === Lifecycle ===
    pub death_lockout_ms: u64,
    pub move_anim_ms: u64,
    pub ice_slide_ms: u64,
    pub exit_sequence_ms: u64,
    pub shield_level_start_ms: u64,
    pub shield_respawn_ms: u64,
    pub shield_vest_ms: u64,

    // === Scoring ===
    pub brick_score: u64,
    pub enemy_kill_score: u64,

    // === Starting stats ===
    pub start_lives: u32,
    pub start_max_bombs: u32,
    pub start_blast_radius: u32,
    pub start_move_interval_ms: u64,
    pub start_radar_charges: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            hazard_tick_ms: HAZARD_TICK_MS,
            clock_tick_ms: CLOCK_TICK_MS,

            bomb_fuse_ms: BOMB_FUSE_MS,
            explosion_ms: EXPLOSION_MS,
            screen_shake_ms: SCREEN_SHAKE_MS,
            enemy_dying_ms: ENEMY_DYING_MS,
            enemy_grace_ms: ENEMY_GRACE_MS,

            death_lockout_ms: DEATH_LOCKOUT_MS,
            move_anim_ms: MOVE_ANIM_MS,
            ice_slide_ms: ICE_SLIDE_MS,
            exit_sequence_ms: EXIT_SEQUENCE_MS,
            shield_level_start_ms: SHIELD_LEVEL_START_MS,
            shield_respawn_ms: SHIELD_RESPAWN_MS,
            shield_vest_ms: SHIELD_VEST_MS,

            brick_score: BRICK_SCORE,
            enemy_kill_score: ENEMY_KILL_SCORE,

            start_lives: START_LIVES,
            start_max_bombs: START_MAX_BOMBS,
            start_blast_radius: START_BLAST_RADIUS,
            start_move_interval_ms: START_MOVE_INTERVAL_MS,
            start_radar_charges: START_RADAR_CHARGES,
        }
    }
}

impl Tuning {
    /// Parse from JSON; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let tuning: Tuning = serde_json::from_str(json)?;
        Ok(tuning.sanitized())
    }

    /// Load a JSON tuning file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Zero periods would stall the scheduler
    pub fn sanitized(mut self) -> Self {
        self.hazard_tick_ms = self.hazard_tick_ms.max(1);
        self.clock_tick_ms = self.clock_tick_ms.max(1);
        self.ice_slide_ms = self.ice_slide_ms.max(1);
        self.start_lives = self.start_lives.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "enemy_grace_ms": 120, "start_lives": 5 }"#).unwrap();
        assert_eq!(tuning.enemy_grace_ms, 120);
        assert_eq!(tuning.start_lives, 5);
        assert_eq!(tuning.bomb_fuse_ms, BOMB_FUSE_MS);
    }

    #[test]
    fn test_zero_period_is_clamped() {
        let tuning = Tuning::from_json(r#"{ "hazard_tick_ms": 0 }"#).unwrap();
        assert_eq!(tuning.hazard_tick_ms, 1);
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(Tuning::from_json("{ nope").is_err());
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(Tuning::load("/definitely/not/here/tuning.json").is_err());
    }
}
