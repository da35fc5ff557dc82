//! Engine facade
//!
//! Owns the authoritative `GameState`, the seeded RNG and the progress store.
//! Hosts feed it player commands and logical time; renderers read snapshots
//! and drain events. Every command first brings the simulation up to `now`,
//! so commands and scheduled work interleave in time order.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::MAX_LEVEL;
use crate::highscores::{Progress, SkinId};
use crate::persistence::ProgressStore;
use crate::sim::grid::{Direction, Pos};
use crate::sim::hazard;
use crate::sim::movement::{MoveCause, try_move};
use crate::sim::state::{GameEvent, GameState, GameStatus};
use crate::sim::tick;
use crate::tuning::Tuning;

pub struct Engine {
    state: GameState,
    rng: Pcg32,
    tuning: Tuning,
    progress: Progress,
    store: Box<dyn ProgressStore>,
    seed: u64,
}

impl Engine {
    /// Create an engine at the menu, loading stored progress.
    ///
    /// A store that fails to load is logged and treated as fresh progress.
    pub fn new(seed: u64, tuning: Tuning, mut store: Box<dyn ProgressStore>) -> Self {
        let tuning = tuning.sanitized();
        let progress = match store.load() {
            Ok(progress) => progress.sanitized(),
            Err(err) => {
                log::warn!("Failed to load progress, starting fresh: {err}");
                Progress::default()
            }
        };
        log::info!("Engine created with seed {seed}");
        Self {
            state: GameState::menu(&tuning),
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            progress,
            store,
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn status(&self) -> GameStatus {
        self.state.status
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Owned copy for renderers that keep a frame around. Pending events are
    /// not copied; take them with `drain_events`.
    pub fn snapshot(&self) -> GameState {
        let mut snapshot = self.state.clone();
        snapshot.events.clear();
        snapshot
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Show the level map from any non-playing screen
    pub fn open_map(&mut self) -> bool {
        match self.state.status {
            GameStatus::Playing | GameStatus::Paused => false,
            _ => {
                self.state.status = GameStatus::MapSelect;
                true
            }
        }
    }

    /// Start `level` if it is unlocked. Score and lives carry over only when
    /// coming straight from a completed level.
    pub fn select_level(&mut self, level: u32, now: u64) -> bool {
        if level == 0 || level > MAX_LEVEL || !self.progress.is_unlocked(level) {
            log::debug!("level {level} is locked");
            return false;
        }
        let carry = (self.state.status == GameStatus::LevelComplete).then(|| self.state.stats.clone());
        self.state = tick::init_level(level, carry.as_ref(), &mut self.rng, &self.tuning, now);
        true
    }

    /// Continue with the level after the one just completed
    pub fn next_level(&mut self, now: u64) -> bool {
        if self.state.status != GameStatus::LevelComplete {
            return false;
        }
        self.select_level(self.state.level + 1, now)
    }

    pub fn move_player(&mut self, dir: Direction, now: u64) -> bool {
        self.advance(now);
        let moved = try_move(&mut self.state, dir, &self.tuning, now, MoveCause::Input);
        self.sync_progress();
        moved
    }

    pub fn plant_bomb(&mut self, now: u64) -> bool {
        self.advance(now);
        self.state.plant_bomb(&self.tuning, now).is_some()
    }

    /// Pause or resume; returns whether the status changed
    pub fn toggle_pause(&mut self, now: u64) -> bool {
        self.advance(now);
        tick::toggle_pause(&mut self.state, now)
    }

    /// Run all scheduled work due at or before `now`
    pub fn advance(&mut self, now: u64) {
        tick::advance(&mut self.state, &mut self.rng, &self.tuning, now);
        self.sync_progress();
    }

    /// Wear an unlocked skin
    pub fn select_skin(&mut self, skin: SkinId) -> bool {
        if !self.progress.select_skin(skin) {
            return false;
        }
        self.persist();
        true
    }

    pub fn shield_remaining(&self, now: u64) -> u64 {
        self.state.shield_remaining(now)
    }

    /// Blast footprints of radar-flagged bombs
    pub fn danger_cells(&self) -> Vec<Pos> {
        hazard::danger_cells(&self.state)
    }

    /// Take pending events; call once per frame
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.state.events)
    }

    /// Raise watermarks from the live session and save if any moved
    fn sync_progress(&mut self) {
        let mut dirty = self.progress.record_score(self.state.stats.score);
        if matches!(self.state.status, GameStatus::LevelComplete | GameStatus::Win) {
            dirty |= self.progress.record_cleared(self.state.level);
        }
        if dirty {
            self.persist();
        }
    }

    fn persist(&mut self) {
        if let Err(err) = self.store.save(&self.progress) {
            log::warn!("Failed to save progress: {err}");
        }
    }
}
