//! Player movement and collision resolution
//!
//! A move either applies completely or not at all. Rejections are silent:
//! the caller only sees `false`.

use super::grid::{Cell, Direction};
use super::state::{GameState, IceSlide};
use crate::tuning::Tuning;

/// Where a move request came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveCause {
    /// Player input; subject to the move-interval cooldown
    Input,
    /// Automatic re-move while standing on ICE
    IceSlide,
}

/// Validate and apply one step of the player in `dir`
pub fn try_move(state: &mut GameState, dir: Direction, tuning: &Tuning, now: u64, cause: MoveCause) -> bool {
    // Authoritative lockout flags, never a tick-cadence copy
    if !state.accepts_player_action() {
        return false;
    }
    if cause == MoveCause::Input {
        if let Some(last) = state.player.last_move_at {
            if now.saturating_sub(last) < state.stats.move_interval_ms {
                return false;
            }
        }
    }

    let dest = state.player.pos + dir.delta();
    let Some(cell) = state.grid.get(dest) else {
        return false;
    };
    if matches!(cell, Cell::Wall | Cell::Brick | Cell::Gate) || state.bomb_at(dest).is_some() {
        return false;
    }

    state.move_player_to(dest, dir, tuning, now);
    state.ice_slide = None;

    if cell.is_pickup() {
        state.apply_pickup(dest, tuning, now);
    }

    if cell == Cell::Exit && exit_open(state) {
        state.begin_exit(tuning, now);
        return true;
    }

    if cell == Cell::Lava {
        state.damage_player(tuning, now);
    }
    if state.enemy_at(dest).is_some() {
        state.damage_player(tuning, now);
    }

    if cell == Cell::Ice && !state.is_dying() {
        state.ice_slide = Some(IceSlide {
            at: now + tuning.ice_slide_ms,
            dir,
        });
    }
    true
}

/// All enemies cleared and, on gated levels, the key in hand
fn exit_open(state: &GameState) -> bool {
    state.enemies.is_empty() && (!state.config.requires_key || state.stats.has_key)
}
