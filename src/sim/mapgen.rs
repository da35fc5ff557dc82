//! Procedural level generation
//!
//! Lays walls and pillars, fills the interior from the level's densities,
//! hides the exit under a brick and checks the exit is reachable from spawn.
//! Generation is retried a bounded number of times; if every attempt fails a
//! stepped corridor is carved so an unreachable level is never returned.

use std::collections::VecDeque;

use glam::IVec2;
use rand::Rng;

use super::grid::{Cell, Direction, Grid, Pos};
use super::level::LevelConfig;
use super::state::Enemy;
use crate::consts::*;

/// Output of the generator
#[derive(Debug, Clone)]
pub struct GeneratedMap {
    pub grid: Grid,
    /// Exit cell; an EXIT on level 1, a BRICK everywhere else
    pub exit: Pos,
    /// Attempts used (1-based)
    pub attempts: u32,
    /// Whether the fallback corridor was carved
    pub carved: bool,
}

pub fn spawn_pos() -> Pos {
    IVec2::new(SPAWN_X, SPAWN_Y)
}

/// Opposite corner from spawn, used for the visible level-1 exit
pub fn far_corner() -> Pos {
    IVec2::new(GRID_WIDTH - 2, GRID_HEIGHT - 2)
}

/// Cells kept clear around spawn so the first bomb can be escaped
fn in_spawn_clearing(pos: Pos) -> bool {
    let d = pos - spawn_pos();
    (d.x <= 1 && d.y <= 0) || (d.x <= 0 && d.y <= 1)
}

/// Generate a level whose exit is reachable from spawn
pub fn generate_map<R: Rng>(config: &LevelConfig, rng: &mut R) -> GeneratedMap {
    generate_map_with(config, rng, fill_cell::<R>)
}

/// Default interior fill: brick by density, else themed hazard or empty
fn fill_cell<R: Rng>(config: &LevelConfig, rng: &mut R) -> Cell {
    if rng.random::<f64>() < config.brick_density {
        return Cell::Brick;
    }
    match config.theme.hazard_cell() {
        Some(hazard) if rng.random::<f64>() < config.hazard_density => hazard,
        _ => Cell::Empty,
    }
}

pub(crate) fn generate_map_with<R, F>(config: &LevelConfig, rng: &mut R, mut fill: F) -> GeneratedMap
where
    R: Rng,
    F: FnMut(&LevelConfig, &mut R) -> Cell,
{
    let spawn = spawn_pos();
    let mut last = None;

    for attempt in 1..=MAX_GENERATION_ATTEMPTS {
        let (grid, exit) = build_attempt(config, rng, &mut fill);
        if is_reachable(&grid, spawn, exit) {
            if attempt > 1 {
                log::debug!("level {} generated after {} attempts", config.index, attempt);
            }
            return GeneratedMap {
                grid,
                exit,
                attempts: attempt,
                carved: false,
            };
        }
        last = Some((grid, exit));
    }

    let (mut grid, exit) = match last {
        Some(found) => found,
        None => build_attempt(config, rng, &mut fill),
    };
    log::warn!(
        "level {}: exit unreachable after {} attempts, carving a corridor",
        config.index,
        MAX_GENERATION_ATTEMPTS
    );
    carve_path(&mut grid, spawn, exit);
    GeneratedMap {
        grid,
        exit,
        attempts: MAX_GENERATION_ATTEMPTS,
        carved: true,
    }
}

fn build_attempt<R, F>(config: &LevelConfig, rng: &mut R, fill: &mut F) -> (Grid, Pos)
where
    R: Rng,
    F: FnMut(&LevelConfig, &mut R) -> Cell,
{
    let mut grid = Grid::with_pillars(GRID_WIDTH, GRID_HEIGHT);
    let interior: Vec<Pos> = grid.positions_where(|c| c == Cell::Empty);
    for pos in interior {
        if !in_spawn_clearing(pos) {
            let cell = fill(config, rng);
            grid.set(pos, cell);
        }
    }

    let exit = if config.exit_visible() {
        let exit = far_corner();
        grid.set(exit, Cell::Exit);
        exit
    } else {
        let bricks = grid.positions_where(|c| c == Cell::Brick);
        if bricks.is_empty() {
            let exit = far_corner();
            grid.set(exit, Cell::Brick);
            exit
        } else {
            bricks[rng.random_range(0..bricks.len())]
        }
    };
    (grid, exit)
}

/// Breadth-first search over every non-WALL cell.
/// Hazards and bricks count as traversable here.
pub fn is_reachable(grid: &Grid, from: Pos, to: Pos) -> bool {
    if grid.cell(from) == Cell::Wall || grid.cell(to) == Cell::Wall {
        return false;
    }
    let mut seen = vec![false; (grid.width() * grid.height()) as usize];
    let index = |p: Pos| (p.y * grid.width() + p.x) as usize;
    let mut queue = VecDeque::from([from]);
    seen[index(from)] = true;

    while let Some(pos) = queue.pop_front() {
        if pos == to {
            return true;
        }
        for dir in Direction::ALL {
            let next = pos + dir.delta();
            if grid.cell(next) != Cell::Wall && !seen[index(next)] {
                seen[index(next)] = true;
                queue.push_back(next);
            }
        }
    }
    false
}

/// Open a stepped corridor from `from` to `to`.
///
/// Travels along `from`'s row to the nearest odd column at or left of `to`,
/// down that column to `to`'s row, then across. Odd rows and columns hold no
/// pillars, so only non-fixed walls are ever removed.
pub fn carve_path(grid: &mut Grid, from: Pos, to: Pos) {
    let lane_x = if to.x % 2 == 1 { to.x } else { (to.x - 1).max(1) };
    let mut cursor = from;
    let open = |grid: &mut Grid, pos: Pos| {
        if grid.cell(pos) == Cell::Wall && !grid.is_fixed_wall(pos) {
            grid.set(pos, Cell::Empty);
        }
    };

    open(grid, cursor);
    while cursor.x != lane_x {
        cursor.x += (lane_x - cursor.x).signum();
        open(grid, cursor);
    }
    while cursor.y != to.y {
        cursor.y += (to.y - cursor.y).signum();
        open(grid, cursor);
    }
    while cursor.x != to.x {
        cursor.x += (to.x - cursor.x).signum();
        open(grid, cursor);
    }
}

/// Place the level's enemy roster on EMPTY cells away from spawn
pub fn spawn_enemies<R: Rng>(
    config: &LevelConfig,
    grid: &Grid,
    rng: &mut R,
    first_id: u32,
    now: u64,
) -> Vec<Enemy> {
    let spawn = spawn_pos();
    let mut free: Vec<Pos> = grid
        .positions_where(|c| c == Cell::Empty)
        .into_iter()
        .filter(|p| p.x - spawn.x > 3 || p.y - spawn.y > 3)
        .collect();

    let kinds = std::iter::repeat_n(super::state::EnemyKind::Boss, config.bosses)
        .chain(config.roster.iter().copied().cycle())
        .take(config.enemy_count);

    let mut enemies = Vec::with_capacity(config.enemy_count);
    for (i, kind) in kinds.enumerate() {
        if free.is_empty() {
            break;
        }
        let pos = free.swap_remove(rng.random_range(0..free.len()));
        let jitter = rng.random_range(0.9..1.1);
        let interval = (kind.base_interval_ms() as f64 * config.enemy_pace * jitter).round() as u64;
        enemies.push(Enemy {
            id: first_id + i as u32,
            kind,
            pos,
            prev_pos: pos,
            crosses_bricks: kind.crosses_bricks(),
            move_interval_ms: interval.max(HAZARD_TICK_MS * 2),
            last_move_at: now,
        });
    }
    enemies
}
