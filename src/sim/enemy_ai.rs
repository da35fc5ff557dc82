//! Enemy random-walk scheduling
//!
//! Each enemy steps once its own interval has elapsed since its last move,
//! picking uniformly among passable orthogonal neighbors.

use rand::Rng;

use super::grid::{Cell, Direction, Grid, Pos};
use super::state::{Bomb, Enemy, GameState};
use crate::tuning::Tuning;

/// Neighbor cells `enemy` may step onto
pub fn eligible_moves(grid: &Grid, bombs: &[Bomb], enemy: &Enemy) -> Vec<Pos> {
    Direction::ALL
        .iter()
        .map(|d| enemy.pos + d.delta())
        .filter(|&pos| match grid.cell(pos) {
            Cell::Wall => false,
            Cell::Brick => enemy.crosses_bricks,
            _ => true,
        })
        .filter(|&pos| !bombs.iter().any(|b| b.pos == pos))
        .collect()
}

/// Step every enemy whose interval has elapsed; returns how many moved
pub fn advance_enemies<R: Rng>(state: &mut GameState, rng: &mut R, tuning: &Tuning, now: u64) -> usize {
    let mut moved = 0;
    for index in 0..state.enemies.len() {
        let enemy = &state.enemies[index];
        if now.saturating_sub(enemy.last_move_at) < enemy.move_interval_ms {
            continue;
        }
        let options = eligible_moves(&state.grid, &state.bombs, enemy);
        if options.is_empty() {
            continue;
        }
        let to = options[rng.random_range(0..options.len())];
        if state.advance_enemy(index, to, now) {
            state.damage_player(tuning, now);
        }
        moved += 1;
    }
    moved
}
