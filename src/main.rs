//! Bomber Grid headless host
//!
//! Drives the engine with logical time and a simple autoplay bot. Useful for
//! soak-testing a seed or a tuning file without a renderer.

use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;

use bomber_grid::persistence::{JsonFileStore, MemoryStore, ProgressStore};
use bomber_grid::sim::{Cell, Direction, GameEvent, GameState, GameStatus, Pos, blast_cells};
use bomber_grid::{Engine, Tuning};
use clap::Parser;

/// Host poll interval (ms)
const STEP_MS: u64 = 16;

#[derive(Parser, Debug)]
#[command(name = "bomber-grid")]
#[command(about = "Headless Bomber Grid session driven by an autoplay bot")]
struct Args {
    /// RNG seed for map generation, enemy moves and loot
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Level to start on (must be unlocked in the save)
    #[arg(long, default_value_t = 1)]
    level: u32,

    /// JSON tuning file
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// JSON progress file; progress is kept in memory when omitted
    #[arg(long)]
    save: Option<PathBuf>,

    /// Logical seconds to simulate
    #[arg(long, default_value_t = 120)]
    seconds: u64,
}

enum Action {
    Move(Direction),
    Plant,
    Wait,
}

fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    let args = Args::parse();

    let tuning = match &args.tuning {
        Some(path) => match Tuning::load(path) {
            Ok(tuning) => tuning,
            Err(err) => {
                log::warn!("Using default tuning: {err}");
                Tuning::default()
            }
        },
        None => Tuning::default(),
    };
    let store: Box<dyn ProgressStore> = match &args.save {
        Some(path) => Box::new(JsonFileStore::new(path)),
        None => Box::new(MemoryStore::default()),
    };

    log::info!("Bomber Grid (headless) starting...");
    let mut engine = Engine::new(args.seed, tuning, store);
    if !engine.select_level(args.level, 0) {
        log::warn!("Level {} is locked, starting at level 1", args.level);
        engine.select_level(1, 0);
    }

    let end = args.seconds * 1000;
    let mut now = 0;
    while now <= end {
        engine.advance(now);
        match engine.status() {
            GameStatus::LevelComplete => {
                if !engine.next_level(now) {
                    break;
                }
            }
            GameStatus::GameOver | GameStatus::Win => break,
            GameStatus::Playing if engine.state().accepts_player_action() => {
                match choose_action(engine.state()) {
                    Action::Move(dir) => {
                        engine.move_player(dir, now);
                    }
                    Action::Plant => {
                        engine.plant_bomb(now);
                    }
                    Action::Wait => {}
                }
            }
            _ => {}
        }
        for event in engine.drain_events() {
            log_event(&event);
        }
        now += STEP_MS;
    }

    let state = engine.state();
    println!(
        "seed {} | level {} | status {:?} | score {} | lives {} | high score {} | unlocked {}",
        engine.seed(),
        state.level,
        state.status,
        state.stats.score,
        state.stats.lives,
        engine.progress().high_score,
        engine.progress().unlocked_level
    );
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::PlayerMoved { .. } | GameEvent::BombPlanted { .. } => log::trace!("{event:?}"),
        GameEvent::LevelStarted { .. }
        | GameEvent::LevelComplete { .. }
        | GameEvent::GameOver
        | GameEvent::CampaignWon => log::info!("{event:?}"),
        _ => log::debug!("{event:?}"),
    }
}

/// Cells every live bomb or explosion will cover
fn threatened(state: &GameState) -> HashSet<Pos> {
    state
        .bombs
        .iter()
        .flat_map(|b| blast_cells(&state.grid, b.pos, b.radius))
        .map(|(pos, _)| pos)
        .chain(state.explosions.iter().map(|e| e.pos))
        .collect()
}

fn walkable(state: &GameState, pos: Pos) -> bool {
    !matches!(
        state.grid.get(pos),
        None | Some(Cell::Wall | Cell::Brick | Cell::Gate | Cell::Lava)
    ) && state.bomb_at(pos).is_none()
        && state.enemy_at(pos).is_none()
}

/// First step of a shortest walk to a cell matching `goal`
fn first_step(state: &GameState, goal: impl Fn(Pos) -> bool, avoid: &HashSet<Pos>) -> Option<Direction> {
    let start = state.player.pos;
    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::new();
    for dir in Direction::ALL {
        let next = start + dir.delta();
        if walkable(state, next) && !avoid.contains(&next) && seen.insert(next) {
            queue.push_back((next, dir));
        }
    }
    while let Some((pos, first)) = queue.pop_front() {
        if goal(pos) {
            return Some(first);
        }
        for dir in Direction::ALL {
            let next = pos + dir.delta();
            if walkable(state, next) && !avoid.contains(&next) && seen.insert(next) {
                queue.push_back((next, first));
            }
        }
    }
    None
}

fn next_to_target(state: &GameState, pos: Pos) -> bool {
    Direction::ALL.iter().any(|d| {
        let n = pos + d.delta();
        state.grid.cell(n) == Cell::Brick || state.enemy_at(n).is_some()
    })
}

fn choose_action(state: &GameState) -> Action {
    let me = state.player.pos;
    let danger = threatened(state);
    let explosions: HashSet<Pos> = state.explosions.iter().map(|e| e.pos).collect();

    if danger.contains(&me) {
        return first_step(state, |p| !danger.contains(&p), &explosions)
            .map_or(Action::Wait, Action::Move);
    }

    if state.bombs.len() < state.stats.max_bombs as usize && next_to_target(state, me) {
        let mut with_bomb = danger.clone();
        with_bomb.extend(
            blast_cells(&state.grid, me, state.stats.blast_radius)
                .into_iter()
                .map(|(pos, _)| pos),
        );
        if first_step(state, |p| !with_bomb.contains(&p), &explosions).is_some() {
            return Action::Plant;
        }
    }

    let exit_ready = state.enemies.is_empty();
    let pickup = |p: Pos| state.grid.cell(p).is_pickup();
    let goal = |p: Pos| {
        (exit_ready && state.grid.cell(p) == Cell::Exit) || pickup(p) || next_to_target(state, p)
    };
    first_step(state, goal, &danger).map_or(Action::Wait, Action::Move)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["bomber-grid"]).unwrap();
        assert_eq!(args.seed, 1);
        assert_eq!(args.level, 1);
        assert_eq!(args.seconds, 120);
        assert!(args.tuning.is_none() && args.save.is_none());
    }

    #[test]
    fn test_args_flags() {
        let args = Args::try_parse_from([
            "bomber-grid",
            "--seed",
            "99",
            "--level",
            "4",
            "--save",
            "progress.json",
            "--seconds",
            "30",
        ])
        .unwrap();
        assert_eq!(args.seed, 99);
        assert_eq!(args.level, 4);
        assert_eq!(args.save, Some(PathBuf::from("progress.json")));
        assert_eq!(args.seconds, 30);
    }

    #[test]
    fn test_args_rejects_bad_input() {
        assert!(Args::try_parse_from(["bomber-grid", "--seed", "x"]).is_err());
        assert!(Args::try_parse_from(["bomber-grid", "--level"]).is_err());
        assert!(Args::try_parse_from(["bomber-grid", "--bogus"]).is_err());
    }
}
