//! Tick scheduling and level lifecycle
//!
//! `advance` replays, in deadline order, every periodic pass and one-shot
//! transition due at or before `now`. Each runs to completion at its own
//! deadline, so results do not depend on how often the host polls.

use rand::Rng;

use super::enemy_ai::advance_enemies;
use super::hazard::{detonate_due_bombs, expire};
use super::level::LevelConfig;
use super::mapgen::{generate_map, spawn_enemies};
use super::movement::{MoveCause, try_move};
use super::state::{GameState, GameStatus, PlayerStats};
use crate::tuning::Tuning;

/// Scheduled work, in tie-break order for equal deadlines
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Due {
    DeathLockout,
    ExitSequence,
    IceSlide,
    MoveAnimEnd,
    ShakeEnd,
    HazardTick,
    ClockTick,
}

/// Earliest pending deadline, if any
pub fn next_due(state: &GameState) -> Option<(u64, Due)> {
    let playing = state.status == GameStatus::Playing;
    [
        (state.player.dying_until, Due::DeathLockout),
        (state.exit_at, Due::ExitSequence),
        (state.ice_slide.map(|s| s.at), Due::IceSlide),
        (state.player.moving_until, Due::MoveAnimEnd),
        (state.screen_shake_until, Due::ShakeEnd),
        (playing.then_some(state.next_hazard_tick), Due::HazardTick),
        (playing.then_some(state.next_clock_tick), Due::ClockTick),
    ]
    .into_iter()
    .filter_map(|(at, due)| at.map(|at| (at, due)))
    .min()
}

/// Run everything due at or before `now`. Nothing runs while paused.
pub fn advance<R: Rng>(state: &mut GameState, rng: &mut R, tuning: &Tuning, now: u64) {
    if state.status == GameStatus::Paused {
        return;
    }
    while let Some((at, due)) = next_due(state) {
        if at > now {
            break;
        }
        fire(state, rng, tuning, due, at);
    }
}

fn fire<R: Rng>(state: &mut GameState, rng: &mut R, tuning: &Tuning, due: Due, at: u64) {
    match due {
        Due::DeathLockout => state.finish_death(tuning, at),
        Due::ExitSequence => state.finish_exit(),
        Due::IceSlide => {
            if let Some(slide) = state.ice_slide.take() {
                try_move(state, slide.dir, tuning, at, MoveCause::IceSlide);
            }
        }
        Due::MoveAnimEnd => state.player.moving_until = None,
        Due::ShakeEnd => state.screen_shake_until = None,
        Due::HazardTick => {
            state.next_hazard_tick = at + tuning.hazard_tick_ms;
            hazard_pass(state, rng, tuning, at);
        }
        Due::ClockTick => {
            state.next_clock_tick = at + tuning.clock_tick_ms;
            if !state.is_exiting() {
                state.elapsed_secs += 1;
            }
        }
    }
}

/// One fixed-period pass: expire, detonate (with chains), move enemies
pub fn hazard_pass<R: Rng>(state: &mut GameState, rng: &mut R, tuning: &Tuning, now: u64) {
    expire(state, now);
    let detonated = detonate_due_bombs(state, rng, tuning, now);
    let moved = advance_enemies(state, rng, tuning, now);
    if detonated > 0 || moved > 0 {
        log::trace!("hazard pass @{now}: {detonated} detonated, {moved} enemies moved");
    }
}

/// Toggle between playing and paused. Resuming shifts every deadline by the
/// paused duration, so a zero-length pause changes nothing.
pub fn toggle_pause(state: &mut GameState, now: u64) -> bool {
    match state.status {
        GameStatus::Playing => {
            state.status = GameStatus::Paused;
            state.paused_at = Some(now);
            true
        }
        GameStatus::Paused => {
            let since = state.paused_at.take().unwrap_or(now);
            state.shift_deadlines(now.saturating_sub(since));
            state.status = GameStatus::Playing;
            true
        }
        _ => false,
    }
}

/// Build a fresh session for `level`, discarding everything before it.
///
/// `carry` keeps score and lives from a completed level; `None` starts a new run.
pub fn init_level<R: Rng>(
    level: u32,
    carry: Option<&PlayerStats>,
    rng: &mut R,
    tuning: &Tuning,
    now: u64,
) -> GameState {
    let config = LevelConfig::for_level(level);
    let map = generate_map(&config, rng);
    let enemies = spawn_enemies(&config, &map.grid, rng, 1, now);
    let next_id = 1 + enemies.len() as u32;
    let stats = match carry {
        Some(stats) => stats.carried_into_level(tuning),
        None => PlayerStats::initial(tuning),
    };
    log::info!(
        "Level {} ({}): {} enemies, {} bricks, key gate: {}",
        config.index,
        config.planet.name(),
        enemies.len(),
        map.grid.count(super::grid::Cell::Brick),
        config.requires_key
    );
    GameState::start_level(config, map.grid, map.exit, enemies, stats, next_id, tuning, now)
}
