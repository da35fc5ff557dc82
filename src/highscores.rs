//! High score, level unlock and cosmetic watermarks
//!
//! Each value only moves forward: a lower score never replaces the stored
//! high score and the unlock watermark never shrinks. Skins unlock from the
//! high score.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_LEVEL;

/// Player cosmetic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkinId {
    #[default]
    Classic,
    Emerald,
    Dragon,
    Crimson,
    Gold,
    Void,
}

impl SkinId {
    pub const ALL: [SkinId; 6] = [
        SkinId::Classic,
        SkinId::Emerald,
        SkinId::Dragon,
        SkinId::Crimson,
        SkinId::Gold,
        SkinId::Void,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SkinId::Classic => "classic",
            SkinId::Emerald => "emerald",
            SkinId::Dragon => "dragon",
            SkinId::Crimson => "crimson",
            SkinId::Gold => "gold",
            SkinId::Void => "void",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.to_lowercase();
        Self::ALL.into_iter().find(|skin| skin.as_str() == s)
    }

    /// High score needed to wear this skin
    pub fn required_score(&self) -> u64 {
        match self {
            SkinId::Classic => 0,
            SkinId::Emerald => 5_000,
            SkinId::Dragon => 12_000,
            SkinId::Crimson => 25_000,
            SkinId::Gold => 50_000,
            SkinId::Void => 100_000,
        }
    }
}

/// Persisted progress watermarks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Progress {
    pub high_score: u64,
    /// Highest selectable level (1-based)
    pub unlocked_level: u32,
    pub skin: SkinId,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            high_score: 0,
            unlocked_level: 1,
            skin: SkinId::Classic,
        }
    }
}

impl Progress {
    /// Clamp values read from storage into range
    pub fn sanitized(mut self) -> Self {
        self.unlocked_level = self.unlocked_level.clamp(1, MAX_LEVEL);
        if !self.skin_unlocked(self.skin) {
            self.skin = SkinId::Classic;
        }
        self
    }

    /// Raise the high score; returns whether it improved
    pub fn record_score(&mut self, score: u64) -> bool {
        if score > self.high_score {
            self.high_score = score;
            return true;
        }
        false
    }

    /// Unlock the level after `level`; returns whether the watermark moved
    pub fn record_cleared(&mut self, level: u32) -> bool {
        let next = (level + 1).min(MAX_LEVEL);
        if next > self.unlocked_level {
            self.unlocked_level = next;
            return true;
        }
        false
    }

    pub fn is_unlocked(&self, level: u32) -> bool {
        level >= 1 && level <= self.unlocked_level
    }

    pub fn skin_unlocked(&self, skin: SkinId) -> bool {
        self.high_score >= skin.required_score()
    }

    pub fn unlocked_skins(&self) -> Vec<SkinId> {
        SkinId::ALL
            .into_iter()
            .filter(|s| self.skin_unlocked(*s))
            .collect()
    }

    /// Wear `skin` if unlocked; returns whether the selection changed
    pub fn select_skin(&mut self, skin: SkinId) -> bool {
        if !self.skin_unlocked(skin) || self.skin == skin {
            return false;
        }
        self.skin = skin;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_score_only_rises() {
        let mut progress = Progress::default();
        assert!(progress.record_score(300));
        assert!(!progress.record_score(200));
        assert!(!progress.record_score(300));
        assert_eq!(progress.high_score, 300);
    }

    #[test]
    fn test_unlock_watermark() {
        let mut progress = Progress::default();
        assert!(progress.is_unlocked(1));
        assert!(!progress.is_unlocked(2));
        assert!(progress.record_cleared(1));
        assert!(progress.is_unlocked(2));
        assert!(!progress.record_cleared(1), "replaying an old level");
        progress.unlocked_level = MAX_LEVEL;
        assert!(!progress.record_cleared(MAX_LEVEL));
        assert!(!progress.is_unlocked(0));
    }

    #[test]
    fn test_skins_follow_high_score() {
        let mut progress = Progress::default();
        assert!(!progress.select_skin(SkinId::Emerald));
        progress.record_score(12_000);
        assert_eq!(
            progress.unlocked_skins(),
            vec![SkinId::Classic, SkinId::Emerald, SkinId::Dragon]
        );
        assert!(progress.select_skin(SkinId::Dragon));
        assert!(!progress.select_skin(SkinId::Dragon));
        assert!(!progress.select_skin(SkinId::Void));
    }

    #[test]
    fn test_sanitize_stored_values() {
        let stored = Progress {
            high_score: 10,
            unlocked_level: 99,
            skin: SkinId::Gold,
        };
        let clean = stored.sanitized();
        assert_eq!(clean.unlocked_level, MAX_LEVEL);
        assert_eq!(clean.skin, SkinId::Classic);
    }

    #[test]
    fn test_skin_parse() {
        assert_eq!(SkinId::parse("Dragon"), Some(SkinId::Dragon));
        assert_eq!(SkinId::parse("nope"), None);
    }
}
