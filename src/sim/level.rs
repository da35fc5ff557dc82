//! Per-level configuration
//!
//! Levels are grouped into planets of five sectors. The planet decides the
//! terrain theme, the enemy roster and whether the exit is key-gated; the
//! sector index inside the campaign scales density and enemy count.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::grid::{Cell, PowerUp};
use super::state::EnemyKind;
use crate::consts::*;

/// Campaign planet, five sectors each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Planet {
    NeoTerra,
    Cryostation,
    Pyrocore,
    Mechaprime,
    Nexus,
}

impl Planet {
    pub fn for_level(level: u32) -> Self {
        match (level.max(1) - 1) / SECTORS_PER_PLANET {
            0 => Planet::NeoTerra,
            1 => Planet::Cryostation,
            2 => Planet::Pyrocore,
            3 => Planet::Mechaprime,
            _ => Planet::Nexus,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Planet::NeoTerra => "NEO-TERRA",
            Planet::Cryostation => "CRYOSTATION",
            Planet::Pyrocore => "PYROCORE",
            Planet::Mechaprime => "MECHAPRIME",
            Planet::Nexus => "NEXUS",
        }
    }
}

/// Floor hazard theming
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    Plain,
    Ice,
    Lava,
}

impl Theme {
    /// Hazard cell laid by the generator, if any
    pub fn hazard_cell(self) -> Option<Cell> {
        match self {
            Theme::Plain => None,
            Theme::Ice => Some(Cell::Ice),
            Theme::Lava => Some(Cell::Lava),
        }
    }
}

/// Everything the generator and loot rolls need to know about a level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// 1-based level index
    pub index: u32,
    pub planet: Planet,
    pub theme: Theme,
    /// Probability that a free interior cell becomes BRICK
    pub brick_density: f64,
    /// Probability that a non-brick free cell becomes the theme's hazard
    pub hazard_density: f64,
    pub enemy_count: usize,
    /// Kinds spawned round-robin after any bosses
    pub roster: Vec<EnemyKind>,
    pub bosses: usize,
    /// Multiplier applied to enemy base move intervals
    pub enemy_pace: f64,
    /// Exit opens only while the key is held
    pub requires_key: bool,
}

impl LevelConfig {
    pub fn for_level(level: u32) -> Self {
        let index = level.clamp(1, MAX_LEVEL);
        let planet = Planet::for_level(index);
        let sector = (index - 1) % SECTORS_PER_PLANET + 1;

        let (theme, hazard_density, requires_key) = match planet {
            Planet::NeoTerra => (Theme::Plain, 0.0, false),
            Planet::Cryostation => (Theme::Ice, 0.12, false),
            Planet::Pyrocore => (Theme::Lava, 0.06, false),
            Planet::Mechaprime => (Theme::Plain, 0.0, true),
            Planet::Nexus => (Theme::Lava, 0.06, true),
        };

        let roster = match planet {
            Planet::NeoTerra if sector >= 3 => vec![EnemyKind::Blob, EnemyKind::Bat],
            Planet::NeoTerra => vec![EnemyKind::Blob],
            Planet::Cryostation => vec![EnemyKind::Blob, EnemyKind::Slider],
            Planet::Pyrocore => vec![EnemyKind::Bat, EnemyKind::Ghost],
            Planet::Mechaprime => vec![EnemyKind::Mecha, EnemyKind::Blob, EnemyKind::Ghost],
            Planet::Nexus => vec![EnemyKind::Mecha, EnemyKind::Ghost, EnemyKind::Bat],
        };

        Self {
            index,
            planet,
            theme,
            brick_density: (0.60 + 0.01 * (index - 1) as f64).min(0.80),
            hazard_density,
            enemy_count: (2 + index as usize).min(MAX_ENEMIES),
            roster,
            bosses: usize::from(sector == SECTORS_PER_PLANET),
            enemy_pace: (1.0 - 0.015 * (index - 1) as f64).max(0.6),
            requires_key,
        }
    }

    /// Level 1 shows its exit from the start
    pub fn exit_visible(&self) -> bool {
        self.index == 1
    }

    /// Brick-destruction outcome table for this level
    pub fn loot_table(&self, key_eligible: bool) -> LootTable {
        LootTable::new(self.requires_key && key_eligible)
    }
}

/// Outcome of destroying a brick that does not hide the exit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Loot {
    PowerUp(PowerUp),
    Key,
    Nothing,
}

impl Loot {
    pub fn cell(self) -> Cell {
        match self {
            Loot::PowerUp(kind) => Cell::PowerUp(kind),
            Loot::Key => Cell::Key,
            Loot::Nothing => Cell::Empty,
        }
    }
}

/// Weighted loot outcomes in parts per thousand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LootTable {
    entries: Vec<(Loot, u32)>,
}

impl LootTable {
    /// Denominator; weights always sum to this
    pub const SCALE: u32 = 1000;

    const BASE: [(Loot, u32); 6] = [
        (Loot::PowerUp(PowerUp::ExtraBomb), 100),
        (Loot::PowerUp(PowerUp::ExtraRange), 100),
        (Loot::PowerUp(PowerUp::Speed), 50),
        (Loot::PowerUp(PowerUp::Radar), 50),
        (Loot::PowerUp(PowerUp::Life), 20),
        (Loot::PowerUp(PowerUp::ShieldVest), 30),
    ];
    const KEY_WEIGHT: u32 = 100;

    fn new(with_key: bool) -> Self {
        let mut entries: Vec<(Loot, u32)> = Self::BASE.to_vec();
        if with_key {
            entries.push((Loot::Key, Self::KEY_WEIGHT));
        }
        let used: u32 = entries.iter().map(|(_, w)| w).sum();
        entries.push((Loot::Nothing, Self::SCALE - used));
        Self { entries }
    }

    pub fn entries(&self) -> &[(Loot, u32)] {
        &self.entries
    }

    pub fn total(&self) -> u32 {
        self.entries.iter().map(|(_, w)| w).sum()
    }

    /// Probability of a given outcome
    pub fn probability(&self, loot: Loot) -> f64 {
        self.entries
            .iter()
            .filter(|(l, _)| *l == loot)
            .map(|(_, w)| *w as f64 / Self::SCALE as f64)
            .sum()
    }

    /// Pick an outcome by walking cumulative thresholds
    pub fn pick(&self, roll: u32) -> Loot {
        let mut threshold = 0;
        for &(loot, weight) in &self.entries {
            threshold += weight;
            if roll < threshold {
                return loot;
            }
        }
        Loot::Nothing
    }

    pub fn roll<R: Rng>(&self, rng: &mut R) -> Loot {
        self.pick(rng.random_range(0..Self::SCALE))
    }
}
