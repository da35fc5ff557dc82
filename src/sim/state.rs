//! Game state and core simulation types
//!
//! `GameState` is the single authoritative snapshot of a level session. Tick
//! passes and player actions mutate it in place through the operations below;
//! renderers get `&GameState` or a clone. Every pending one-shot transition is
//! a deadline field here, so replacing the state on level start cancels them.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::grid::{Cell, Direction, Grid, Pos, PowerUp};
use super::level::LevelConfig;
use crate::consts::*;
use crate::tuning::Tuning;

/// Discrete session status exposed to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Menu,
    MapSelect,
    Playing,
    Paused,
    LevelComplete,
    GameOver,
    Win,
}

/// Explosion cell shape, for presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlastKind {
    Center,
    Vertical,
    Horizontal,
}

/// Who planted a bomb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
}

/// A live bomb
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bomb {
    pub id: u32,
    pub pos: Pos,
    /// Absolute detonation time (ms)
    pub arm_at: u64,
    pub radius: u32,
    pub owner: Owner,
    /// Renderer shows the blast footprint (radar charge spent)
    pub show_danger: bool,
}

/// A transient explosion cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explosion {
    pub id: u32,
    pub pos: Pos,
    pub kind: BlastKind,
    pub expires_at: u64,
}

/// Enemy behavior variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Blob,
    Bat,
    Slider,
    Ghost,
    Mecha,
    Boss,
}

impl EnemyKind {
    /// Move interval before level pacing and jitter (ms)
    pub fn base_interval_ms(self) -> u64 {
        match self {
            EnemyKind::Blob => 800,
            EnemyKind::Bat => 600,
            EnemyKind::Slider => 450,
            EnemyKind::Ghost => 1000,
            EnemyKind::Mecha => 700,
            EnemyKind::Boss => 1200,
        }
    }

    pub fn crosses_bricks(self) -> bool {
        matches!(self, EnemyKind::Ghost | EnemyKind::Boss)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Pos,
    /// Cell before the last move; still hittable inside the grace window
    pub prev_pos: Pos,
    pub crosses_bricks: bool,
    pub move_interval_ms: u64,
    pub last_move_at: u64,
}

/// A killed enemy kept around for its death animation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DyingEnemy {
    pub enemy: Enemy,
    pub remove_at: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub score: u64,
    pub lives: u32,
    pub max_bombs: u32,
    pub blast_radius: u32,
    /// Minimum time between moves (lower = faster)
    pub move_interval_ms: u64,
    pub radar_charges: u32,
    pub has_key: bool,
}

impl PlayerStats {
    pub fn initial(tuning: &Tuning) -> Self {
        Self {
            score: 0,
            lives: tuning.start_lives,
            max_bombs: tuning.start_max_bombs,
            blast_radius: tuning.start_blast_radius,
            move_interval_ms: tuning.start_move_interval_ms,
            radar_charges: tuning.start_radar_charges,
            has_key: false,
        }
    }

    /// Carry score and lives into a new level, reset the rest
    pub fn carried_into_level(&self, tuning: &Tuning) -> Self {
        Self {
            score: self.score,
            lives: self.lives,
            ..Self::initial(tuning)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub pos: Pos,
    /// Presentation only
    pub facing: Direction,
    pub last_move_at: Option<u64>,
    /// Walk animation lock ends here
    pub moving_until: Option<u64>,
    /// Death lockout ends here; authoritative "dying" flag
    pub dying_until: Option<u64>,
}

impl Player {
    fn at(pos: Pos) -> Self {
        Self {
            pos,
            facing: Direction::Right,
            last_move_at: None,
            moving_until: None,
            dying_until: None,
        }
    }
}

/// Pending automatic re-move on ICE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceSlide {
    pub at: u64,
    pub dir: Direction,
}

/// Fire-and-forget notifications for audio/visual hosts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    LevelStarted { level: u32 },
    PlayerMoved { pos: Pos },
    BombPlanted { id: u32, pos: Pos },
    Exploded { bomb_id: u32, cells: usize },
    BrickDestroyed { pos: Pos, revealed: Cell },
    PowerUpCollected { cell: Cell },
    EnemyKilled { id: u32, kind: EnemyKind },
    PlayerHit,
    PlayerRespawned,
    GameOver,
    ExitReached,
    LevelComplete { level: u32 },
    CampaignWon,
}

/// Complete level session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub level: u32,
    pub config: LevelConfig,
    pub grid: Grid,
    /// Exit cell, concealed under a brick until revealed (except level 1)
    pub hidden_exit: Pos,
    pub spawn: Pos,
    pub player: Player,
    pub stats: PlayerStats,
    /// Sorted by id
    pub bombs: Vec<Bomb>,
    pub explosions: Vec<Explosion>,
    /// Sorted by id
    pub enemies: Vec<Enemy>,
    pub dying_enemies: Vec<DyingEnemy>,
    /// Shield active while now < shield_until
    pub shield_until: u64,
    pub shield_duration: u64,
    /// Whole seconds of active play
    pub elapsed_secs: u32,
    pub status: GameStatus,
    pub screen_shake_until: Option<u64>,
    pub ice_slide: Option<IceSlide>,
    /// Exit sequence ends here; authoritative "exiting" flag
    pub exit_at: Option<u64>,
    pub next_hazard_tick: u64,
    pub next_clock_tick: u64,
    pub paused_at: Option<u64>,
    /// Pending notifications, capped at `MAX_PENDING_EVENTS`. Hosts drain
    /// once per frame; snapshots leave it empty.
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Placeholder session shown before any level is selected
    pub fn menu(tuning: &Tuning) -> Self {
        let spawn = IVec2::new(SPAWN_X, SPAWN_Y);
        Self {
            level: 0,
            config: LevelConfig::for_level(1),
            grid: Grid::with_pillars(GRID_WIDTH, GRID_HEIGHT),
            hidden_exit: spawn,
            spawn,
            player: Player::at(spawn),
            stats: PlayerStats::initial(tuning),
            bombs: Vec::new(),
            explosions: Vec::new(),
            enemies: Vec::new(),
            dying_enemies: Vec::new(),
            shield_until: 0,
            shield_duration: 0,
            elapsed_secs: 0,
            status: GameStatus::Menu,
            screen_shake_until: None,
            ice_slide: None,
            exit_at: None,
            next_hazard_tick: 0,
            next_clock_tick: 0,
            paused_at: None,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Fresh playing session for a generated level
    #[allow(clippy::too_many_arguments)]
    pub fn start_level(
        config: LevelConfig,
        grid: Grid,
        hidden_exit: Pos,
        enemies: Vec<Enemy>,
        stats: PlayerStats,
        next_id: u32,
        tuning: &Tuning,
        now: u64,
    ) -> Self {
        let mut state = Self::menu(tuning);
        state.level = config.index;
        state.config = config;
        state.grid = grid;
        state.hidden_exit = hidden_exit;
        state.enemies = enemies;
        state.stats = stats;
        state.next_id = next_id.max(1);
        state.status = GameStatus::Playing;
        state.next_hazard_tick = now + tuning.hazard_tick_ms;
        state.next_clock_tick = now + tuning.clock_tick_ms;
        state.grant_shield(now, tuning.shield_level_start_ms);
        state.push_event(GameEvent::LevelStarted { level: state.level });
        state
    }

    /// Queue a host notification, dropping the oldest past the cap
    pub fn push_event(&mut self, event: GameEvent) {
        if self.events.len() >= MAX_PENDING_EVENTS {
            self.events.remove(0);
        }
        self.events.push(event);
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_dying(&self) -> bool {
        self.player.dying_until.is_some()
    }

    pub fn is_exiting(&self) -> bool {
        self.exit_at.is_some()
    }

    /// Player actions are accepted only here
    pub fn accepts_player_action(&self) -> bool {
        self.status == GameStatus::Playing && !self.is_dying() && !self.is_exiting()
    }

    pub fn shield_active(&self, now: u64) -> bool {
        now < self.shield_until
    }

    pub fn shield_remaining(&self, now: u64) -> u64 {
        self.shield_until.saturating_sub(now)
    }

    pub fn screen_shake(&self) -> bool {
        self.screen_shake_until.is_some()
    }

    pub fn is_moving(&self) -> bool {
        self.player.moving_until.is_some()
    }

    pub fn bomb_at(&self, pos: Pos) -> Option<&Bomb> {
        self.bombs.iter().find(|b| b.pos == pos)
    }

    pub fn enemy_at(&self, pos: Pos) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.pos == pos)
    }

    /// A key may still drop from bricks
    pub fn key_eligible(&self) -> bool {
        !self.stats.has_key && self.grid.count(Cell::Key) == 0
    }

    fn grant_shield(&mut self, now: u64, duration: u64) {
        let until = now + duration;
        if until > self.shield_until {
            self.shield_until = until;
            self.shield_duration = duration;
        }
    }

    /// Plant a bomb under the player
    ///
    /// Rejected while not playing, during a death/exit lockout, at the bomb
    /// cap, or when the cell already holds a bomb.
    pub fn plant_bomb(&mut self, tuning: &Tuning, now: u64) -> Option<u32> {
        if !self.accepts_player_action() {
            return None;
        }
        if self.bombs.len() >= self.stats.max_bombs as usize {
            return None;
        }
        let pos = self.player.pos;
        if self.bomb_at(pos).is_some() {
            return None;
        }

        let show_danger = self.stats.radar_charges > 0;
        if show_danger {
            self.stats.radar_charges -= 1;
        }
        let id = self.next_entity_id();
        self.bombs.push(Bomb {
            id,
            pos,
            arm_at: now + tuning.bomb_fuse_ms,
            radius: self.stats.blast_radius,
            owner: Owner::Player,
            show_danger,
        });
        self.push_event(GameEvent::BombPlanted { id, pos });
        Some(id)
    }

    /// Move the player onto `pos` (destination already validated)
    pub fn move_player_to(&mut self, pos: Pos, dir: Direction, tuning: &Tuning, now: u64) {
        self.player.pos = pos;
        self.player.facing = dir;
        self.player.last_move_at = Some(now);
        self.player.moving_until = Some(now + self.stats.move_interval_ms.min(tuning.move_anim_ms));
        self.push_event(GameEvent::PlayerMoved { pos });
    }

    /// Collect the pickup at `pos`, clearing the cell
    pub fn apply_pickup(&mut self, pos: Pos, tuning: &Tuning, now: u64) -> Option<Cell> {
        let cell = self.grid.get(pos)?;
        let stats = &mut self.stats;
        match cell {
            Cell::PowerUp(PowerUp::ExtraBomb) => {
                stats.max_bombs += 1;
                stats.score += 200;
            }
            Cell::PowerUp(PowerUp::ExtraRange) => {
                stats.blast_radius += 1;
                stats.score += 200;
            }
            Cell::PowerUp(PowerUp::Speed) => {
                stats.move_interval_ms = stats
                    .move_interval_ms
                    .saturating_sub(SPEED_STEP_MS)
                    .max(MIN_MOVE_INTERVAL_MS);
                stats.score += 200;
            }
            Cell::PowerUp(PowerUp::Life) => {
                stats.lives = (stats.lives + 1).min(MAX_LIVES);
                stats.score += 500;
            }
            Cell::PowerUp(PowerUp::Radar) => {
                stats.radar_charges += RADAR_PICKUP_CHARGES;
                stats.score += 300;
            }
            Cell::PowerUp(PowerUp::ShieldVest) => {
                stats.score += 300;
                self.grant_shield(now, tuning.shield_vest_ms);
            }
            Cell::Key => {
                stats.has_key = true;
                stats.score += 100;
                self.grid.replace_all(Cell::Gate, Cell::Exit);
            }
            _ => return None,
        }
        self.grid.set(pos, Cell::Empty);
        self.push_event(GameEvent::PowerUpCollected { cell });
        Some(cell)
    }

    /// Remove a live enemy, award the kill bonus and start its death animation
    pub fn kill_enemy(&mut self, id: u32, tuning: &Tuning, now: u64) -> bool {
        let Some(index) = self.enemies.iter().position(|e| e.id == id) else {
            return false;
        };
        let enemy = self.enemies.remove(index);
        log::debug!("enemy {} ({:?}) killed at {}", enemy.id, enemy.kind, enemy.pos);
        self.stats.score += tuning.enemy_kill_score;
        self.push_event(GameEvent::EnemyKilled {
            id: enemy.id,
            kind: enemy.kind,
        });
        self.dying_enemies.push(DyingEnemy {
            enemy,
            remove_at: now + tuning.enemy_dying_ms,
        });
        true
    }

    /// Lethal hit on the player
    ///
    /// Ignored under an active shield or while a death/exit sequence is in
    /// flight. Otherwise starts the death lockout; lives are settled when it
    /// ends. Returns whether the lockout started.
    pub fn damage_player(&mut self, tuning: &Tuning, now: u64) -> bool {
        if self.status != GameStatus::Playing || self.is_dying() || self.is_exiting() {
            return false;
        }
        if self.shield_active(now) {
            return false;
        }
        log::debug!("player hit at {} (lives {})", self.player.pos, self.stats.lives);
        self.player.dying_until = Some(now + tuning.death_lockout_ms);
        self.ice_slide = None;
        self.push_event(GameEvent::PlayerHit);
        true
    }

    /// Step enemy `index` onto `to`; returns whether it walked into the player
    pub fn advance_enemy(&mut self, index: usize, to: Pos, now: u64) -> bool {
        let enemy = &mut self.enemies[index];
        enemy.prev_pos = enemy.pos;
        enemy.pos = to;
        enemy.last_move_at = now;
        to == self.player.pos
    }

    /// Start the exit sequence from a valid exit cell
    pub fn begin_exit(&mut self, tuning: &Tuning, now: u64) {
        self.exit_at = Some(now + tuning.exit_sequence_ms);
        self.ice_slide = None;
        self.push_event(GameEvent::ExitReached);
    }

    /// End of the death lockout: settle lives, respawn or end the run
    pub fn finish_death(&mut self, tuning: &Tuning, now: u64) {
        self.player.dying_until = None;
        self.stats.lives = self.stats.lives.saturating_sub(1);
        if self.stats.lives == 0 {
            if self.status != GameStatus::GameOver {
                log::info!("game over on level {} with score {}", self.level, self.stats.score);
                self.status = GameStatus::GameOver;
                self.push_event(GameEvent::GameOver);
            }
            return;
        }
        self.player.pos = self.spawn;
        self.player.moving_until = None;
        self.grant_shield(now, tuning.shield_respawn_ms);
        self.push_event(GameEvent::PlayerRespawned);
    }

    /// End of the exit sequence
    pub fn finish_exit(&mut self) {
        self.exit_at = None;
        if self.level >= MAX_LEVEL {
            log::info!("campaign complete with score {}", self.stats.score);
            self.status = GameStatus::Win;
            self.push_event(GameEvent::CampaignWon);
        } else {
            log::info!("level {} complete in {}s", self.level, self.elapsed_secs);
            self.status = GameStatus::LevelComplete;
            self.push_event(GameEvent::LevelComplete { level: self.level });
        }
    }

    /// Push every absolute deadline forward by `delta` (pause compensation)
    pub fn shift_deadlines(&mut self, delta: u64) {
        if delta == 0 {
            return;
        }
        let shift = |t: &mut u64| *t += delta;
        let shift_opt = |t: &mut Option<u64>| {
            if let Some(t) = t {
                *t += delta;
            }
        };

        for bomb in &mut self.bombs {
            shift(&mut bomb.arm_at);
        }
        for explosion in &mut self.explosions {
            shift(&mut explosion.expires_at);
        }
        for enemy in &mut self.enemies {
            shift(&mut enemy.last_move_at);
        }
        for dying in &mut self.dying_enemies {
            shift(&mut dying.remove_at);
        }
        if self.shield_until > 0 {
            shift(&mut self.shield_until);
        }
        shift_opt(&mut self.player.last_move_at);
        shift_opt(&mut self.player.moving_until);
        shift_opt(&mut self.player.dying_until);
        shift_opt(&mut self.screen_shake_until);
        shift_opt(&mut self.exit_at);
        if let Some(slide) = &mut self.ice_slide {
            shift(&mut slide.at);
        }
        shift(&mut self.next_hazard_tick);
        shift(&mut self.next_clock_tick);
    }

    /// Keep iteration order stable by entity ID
    pub fn normalize_order(&mut self) {
        self.bombs.sort_by_key(|b| b.id);
        self.enemies.sort_by_key(|e| e.id);
    }
}
