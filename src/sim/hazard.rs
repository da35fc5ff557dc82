//! Bomb detonation, blast propagation and terrain mutation
//!
//! A blast is a center cell plus four axis rays. A ray stops before the first
//! WALL and on the first BRICK (inclusive). Bricks hit by a ray are resolved
//! into the hidden exit or a loot roll. Other bombs inside the blast are
//! force-armed and go off in the same hazard pass.

use rand::Rng;

use super::grid::{Cell, Direction, Grid, Pos};
use super::level::Loot;
use super::state::{BlastKind, Explosion, GameEvent, GameState};
use crate::tuning::Tuning;

/// Cells covered by a blast of `radius` centered on `origin`
pub fn blast_cells(grid: &Grid, origin: Pos, radius: u32) -> Vec<(Pos, BlastKind)> {
    let mut cells = vec![(origin, BlastKind::Center)];
    for dir in Direction::ALL {
        let kind = if dir.is_vertical() {
            BlastKind::Vertical
        } else {
            BlastKind::Horizontal
        };
        for step in 1..=radius as i32 {
            let pos = origin + dir.delta() * step;
            match grid.cell(pos) {
                Cell::Wall => break,
                Cell::Brick => {
                    cells.push((pos, kind));
                    break;
                }
                _ => cells.push((pos, kind)),
            }
        }
    }
    cells
}

/// Union of blast footprints for bombs planted with a radar charge
pub fn danger_cells(state: &GameState) -> Vec<Pos> {
    let mut cells: Vec<Pos> = state
        .bombs
        .iter()
        .filter(|b| b.show_danger)
        .flat_map(|b| blast_cells(&state.grid, b.pos, b.radius))
        .map(|(pos, _)| pos)
        .collect();
    cells.sort_by_key(|p| (p.y, p.x));
    cells.dedup();
    cells
}

/// Drop explosion cells and dying enemies whose time is up
pub fn expire(state: &mut GameState, now: u64) {
    state.explosions.retain(|e| e.expires_at > now);
    state.dying_enemies.retain(|d| d.remove_at > now);
}

/// Detonate every bomb armed at or before `now`, lowest id first.
///
/// Bombs force-armed by a blast get `arm_at = now` and are picked up by the
/// same loop, so a whole chain resolves inside one pass.
pub fn detonate_due_bombs<R: Rng>(state: &mut GameState, rng: &mut R, tuning: &Tuning, now: u64) -> usize {
    let mut detonated = 0;
    while let Some(id) = state
        .bombs
        .iter()
        .filter(|b| b.arm_at <= now)
        .map(|b| b.id)
        .min()
    {
        if !detonate_bomb(state, rng, tuning, id, now) {
            break;
        }
        detonated += 1;
    }
    detonated
}

/// Detonate one bomb. Returns false if no such bomb is live.
pub fn detonate_bomb<R: Rng>(state: &mut GameState, rng: &mut R, tuning: &Tuning, bomb_id: u32, now: u64) -> bool {
    let Some(index) = state.bombs.iter().position(|b| b.id == bomb_id) else {
        return false;
    };
    let bomb = state.bombs.remove(index);
    let cells = blast_cells(&state.grid, bomb.pos, bomb.radius);
    let in_blast = |pos: Pos| cells.iter().any(|(p, _)| *p == pos);

    for &(pos, _) in &cells {
        if state.grid.cell(pos) == Cell::Brick {
            resolve_brick(state, rng, tuning, pos);
        }
    }

    for &(pos, kind) in &cells {
        let id = state.next_entity_id();
        state.explosions.push(Explosion {
            id,
            pos,
            kind,
            expires_at: now + tuning.explosion_ms,
        });
    }

    for other in state.bombs.iter_mut().filter(|b| in_blast(b.pos)) {
        other.arm_at = other.arm_at.min(now);
    }

    let hit: Vec<u32> = state
        .enemies
        .iter()
        .filter(|e| {
            let recently_left = now.saturating_sub(e.last_move_at) <= tuning.enemy_grace_ms;
            in_blast(e.pos) || (recently_left && in_blast(e.prev_pos))
        })
        .map(|e| e.id)
        .collect();
    for id in hit {
        state.kill_enemy(id, tuning, now);
    }

    if in_blast(state.player.pos) {
        state.damage_player(tuning, now);
    }

    state.screen_shake_until = Some(now + tuning.screen_shake_ms);
    log::debug!("bomb {} at {} detonated over {} cells", bomb.id, bomb.pos, cells.len());
    state.push_event(GameEvent::Exploded {
        bomb_id: bomb.id,
        cells: cells.len(),
    });
    true
}

/// Bricks still able to drop loot (the exit brick never does)
fn loot_bricks_remaining(state: &GameState) -> usize {
    let bricks = state.grid.count(Cell::Brick);
    let exit_hidden = state.grid.cell(state.hidden_exit) == Cell::Brick;
    bricks - usize::from(exit_hidden)
}

fn resolve_brick<R: Rng>(state: &mut GameState, rng: &mut R, tuning: &Tuning, pos: Pos) {
    let revealed = if pos == state.hidden_exit {
        if state.config.requires_key && !state.stats.has_key {
            Cell::Gate
        } else {
            Cell::Exit
        }
    } else {
        let key_eligible = state.key_eligible();
        let loot = if state.config.requires_key && key_eligible && loot_bricks_remaining(state) == 1 {
            // Last chance for the key on a gated level
            Loot::Key
        } else {
            state.config.loot_table(key_eligible).roll(rng)
        };
        loot.cell()
    };
    state.grid.set(pos, revealed);
    state.stats.score += tuning.brick_score;
    state.push_event(GameEvent::BrickDestroyed { pos, revealed });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::LevelConfig;
    use crate::sim::state::tests::{enemy, open_state};
    use glam::IVec2;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(42)
    }

    #[test]
    fn test_radius_one_in_open_space() {
        let grid = Grid::with_pillars(15, 11);
        let cells = blast_cells(&grid, IVec2::new(3, 3), 1);
        assert_eq!(cells.len(), 5);
        assert_eq!(cells[0], (IVec2::new(3, 3), BlastKind::Center));
        assert!(cells.contains(&(IVec2::new(3, 2), BlastKind::Vertical)));
        assert!(cells.contains(&(IVec2::new(4, 3), BlastKind::Horizontal)));
    }

    #[test]
    fn test_radius_one_at_spawn_loses_walled_rays() {
        let grid = Grid::with_pillars(15, 11);
        let cells = blast_cells(&grid, IVec2::new(1, 1), 1);
        assert_eq!(cells.len(), 3);
        assert!(!cells.iter().any(|(p, _)| *p == IVec2::new(0, 1)));
    }

    #[test]
    fn test_ray_stops_on_first_brick() {
        let mut grid = Grid::with_pillars(15, 11);
        grid.set(IVec2::new(4, 1), Cell::Brick);
        grid.set(IVec2::new(5, 1), Cell::Brick);
        let cells = blast_cells(&grid, IVec2::new(1, 1), 6);
        let right: Vec<_> = cells
            .iter()
            .filter(|(p, k)| p.y == 1 && *k == BlastKind::Horizontal)
            .collect();
        assert_eq!(right.len(), 3);
        assert!(!cells.iter().any(|(p, _)| *p == IVec2::new(5, 1)));
    }

    #[test]
    fn test_pillar_blocks_ray() {
        let grid = Grid::with_pillars(15, 11);
        let cells = blast_cells(&grid, IVec2::new(2, 1), 3);
        assert!(!cells.iter().any(|(p, _)| p.y > 1));
    }

    #[test]
    fn test_detonation_spawns_explosions_and_scores_bricks() {
        let tuning = Tuning::default();
        let mut state = open_state(&tuning);
        let mut rng = rng();
        state.grid.set(IVec2::new(5, 3), Cell::Brick);
        state.player.pos = IVec2::new(3, 3);
        state.shield_until = 10_000;
        state.plant_bomb(&tuning, 0).unwrap();
        state.bombs[0].radius = 2;

        let n = detonate_due_bombs(&mut state, &mut rng, &tuning, tuning.bomb_fuse_ms);
        assert_eq!(n, 1);
        assert!(state.bombs.is_empty());
        assert_eq!(state.explosions.len(), 9);
        assert_ne!(state.grid.cell(IVec2::new(5, 3)), Cell::Brick);
        assert_eq!(state.stats.score, tuning.brick_score);
        assert!(state.screen_shake());
        assert_eq!(
            state.explosions[0].expires_at,
            tuning.bomb_fuse_ms + tuning.explosion_ms
        );
    }

    #[test]
    fn test_bomb_not_due_stays() {
        let tuning = Tuning::default();
        let mut state = open_state(&tuning);
        state.plant_bomb(&tuning, 0).unwrap();
        assert_eq!(detonate_due_bombs(&mut state, &mut rng(), &tuning, 100), 0);
        assert_eq!(state.bombs.len(), 1);
    }

    #[test]
    fn test_hidden_exit_revealed() {
        let tuning = Tuning::default();
        let mut state = open_state(&tuning);
        let exit = IVec2::new(3, 4);
        state.hidden_exit = exit;
        state.grid.set(exit, Cell::Brick);
        state.player.pos = IVec2::new(3, 3);
        state.shield_until = 10_000;
        state.plant_bomb(&tuning, 0).unwrap();
        detonate_due_bombs(&mut state, &mut rng(), &tuning, 5000);
        assert_eq!(state.grid.cell(exit), Cell::Exit);
    }

    #[test]
    fn test_gated_exit_revealed_as_gate() {
        let tuning = Tuning::default();
        let mut state = open_state(&tuning);
        state.config = LevelConfig::for_level(17);
        let exit = IVec2::new(3, 4);
        state.hidden_exit = exit;
        state.grid.set(exit, Cell::Brick);
        state.grid.set(IVec2::new(9, 9), Cell::Brick);
        state.player.pos = IVec2::new(3, 3);
        state.shield_until = 10_000;
        state.plant_bomb(&tuning, 0).unwrap();
        detonate_due_bombs(&mut state, &mut rng(), &tuning, 5000);
        assert_eq!(state.grid.cell(exit), Cell::Gate);
    }

    #[test]
    fn test_last_brick_drops_key_on_gated_level() {
        let tuning = Tuning::default();
        let mut state = open_state(&tuning);
        state.config = LevelConfig::for_level(18);
        state.hidden_exit = IVec2::new(9, 9);
        state.grid.set(IVec2::new(9, 9), Cell::Brick);
        state.grid.set(IVec2::new(4, 3), Cell::Brick);
        state.player.pos = IVec2::new(3, 3);
        state.shield_until = 10_000;
        state.plant_bomb(&tuning, 0).unwrap();
        detonate_due_bombs(&mut state, &mut rng(), &tuning, 5000);
        assert_eq!(state.grid.cell(IVec2::new(4, 3)), Cell::Key);
    }

    #[test]
    fn test_chain_reaction_same_pass() {
        let tuning = Tuning::default();
        let mut state = open_state(&tuning);
        state.stats.max_bombs = 2;
        state.stats.blast_radius = 2;
        state.shield_until = 100_000;
        state.player.pos = IVec2::new(3, 1);
        state.plant_bomb(&tuning, 0).unwrap();
        state.player.pos = IVec2::new(5, 1);
        state.plant_bomb(&tuning, 2000).unwrap();

        let n = detonate_due_bombs(&mut state, &mut rng(), &tuning, tuning.bomb_fuse_ms);
        assert_eq!(n, 2, "second bomb chains in the same pass");
        assert!(state.bombs.is_empty());
        assert!(state.explosions.iter().any(|e| e.pos == IVec2::new(7, 1)));
    }

    #[test]
    fn test_enemy_in_blast_dies() {
        let tuning = Tuning::default();
        let mut state = open_state(&tuning);
        state.enemies.push(enemy(50, IVec2::new(4, 3)));
        state.player.pos = IVec2::new(3, 3);
        state.shield_until = 10_000;
        state.plant_bomb(&tuning, 0).unwrap();
        let now = tuning.bomb_fuse_ms;
        detonate_due_bombs(&mut state, &mut rng(), &tuning, now);

        assert!(state.enemies.is_empty());
        assert_eq!(state.dying_enemies.len(), 1);
        assert_eq!(state.dying_enemies[0].enemy.id, 50);
        assert_eq!(state.stats.score, tuning.enemy_kill_score);

        expire(&mut state, now + tuning.enemy_dying_ms);
        assert!(state.dying_enemies.is_empty());
        assert!(state.explosions.is_empty());
    }

    #[test]
    fn test_grace_window_uses_previous_cell() {
        let tuning = Tuning::default();
        let now = tuning.bomb_fuse_ms;
        for (moved_ago, dies) in [(100, true), (tuning.enemy_grace_ms + 1, false)] {
            let mut state = open_state(&tuning);
            let mut e = enemy(9, IVec2::new(5, 3));
            e.prev_pos = IVec2::new(4, 3);
            e.last_move_at = now - moved_ago;
            state.enemies.push(e);
            state.player.pos = IVec2::new(3, 3);
            state.shield_until = 10_000;
            state.plant_bomb(&tuning, 0).unwrap();
            detonate_due_bombs(&mut state, &mut rng(), &tuning, now);
            assert_eq!(state.enemies.is_empty(), dies, "moved {moved_ago}ms ago");
        }
    }

    #[test]
    fn test_player_in_blast() {
        let tuning = Tuning::default();
        let mut state = open_state(&tuning);
        state.plant_bomb(&tuning, 0).unwrap();
        state.shield_until = 0;
        detonate_due_bombs(&mut state, &mut rng(), &tuning, tuning.bomb_fuse_ms);
        assert!(state.is_dying());

        let mut shielded = open_state(&tuning);
        shielded.plant_bomb(&tuning, 0).unwrap();
        shielded.shield_until = tuning.bomb_fuse_ms + 1;
        detonate_due_bombs(&mut shielded, &mut rng(), &tuning, tuning.bomb_fuse_ms);
        assert!(!shielded.is_dying());
        assert_eq!(shielded.stats.lives, tuning.start_lives);
    }

    #[test]
    fn test_danger_cells_only_for_flagged_bombs() {
        let tuning = Tuning::default();
        let mut state = open_state(&tuning);
        state.stats.max_bombs = 2;
        state.stats.radar_charges = 1;
        state.player.pos = IVec2::new(3, 3);
        state.plant_bomb(&tuning, 0).unwrap();
        state.player.pos = IVec2::new(9, 9);
        state.plant_bomb(&tuning, 0).unwrap();
        let danger = danger_cells(&state);
        assert_eq!(danger.len(), 5);
        assert!(danger.contains(&IVec2::new(3, 3)));
        assert!(!danger.contains(&IVec2::new(9, 9)));
    }

    fn arb_grid() -> impl Strategy<Value = Grid> {
        proptest::collection::vec(0u8..4, (15 * 11) as usize).prop_map(|picks| {
            let mut grid = Grid::with_pillars(15, 11);
            let free = grid.positions_where(|c| c == Cell::Empty);
            for (pos, pick) in free.into_iter().zip(picks) {
                let cell = match pick {
                    0 => Cell::Brick,
                    1 => Cell::Ice,
                    _ => Cell::Empty,
                };
                grid.set(pos, cell);
            }
            grid
        })
    }

    proptest! {
        #[test]
        fn rays_stop_at_walls_and_after_bricks(grid in arb_grid(), x in 1i32..14, y in 1i32..10, radius in 1u32..8) {
            let origin = IVec2::new(x, y);
            let cells = blast_cells(&grid, origin, radius);
            for &(pos, kind) in cells.iter().skip(1) {
                prop_assert_ne!(grid.cell(pos), Cell::Wall);
                prop_assert_ne!(kind, BlastKind::Center);
                let step = (pos - origin).signum();
                let mut probe = origin + step;
                while probe != pos {
                    let c = grid.cell(probe);
                    prop_assert!(c != Cell::Wall && c != Cell::Brick);
                    probe += step;
                }
            }
            for dir in Direction::ALL {
                let along: Vec<_> = cells.iter().skip(1)
                    .filter(|(p, _)| (*p - origin).signum() == dir.delta())
                    .collect();
                let mut expected = 0;
                for step in 1..=radius as i32 {
                    match grid.cell(origin + dir.delta() * step) {
                        Cell::Wall => break,
                        Cell::Brick => { expected += 1; break; }
                        _ => expected += 1,
                    }
                }
                prop_assert_eq!(along.len(), expected);
            }
        }
    }
}
