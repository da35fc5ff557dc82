//! Progress persistence ports
//!
//! The engine loads progress once at construction and saves only when a
//! watermark improves or the skin changes. Failures are the host's concern:
//! the engine logs them and keeps playing.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::Result;
use crate::highscores::Progress;

/// Storage for the progress watermarks
pub trait ProgressStore {
    fn load(&mut self) -> Result<Progress>;
    fn save(&mut self, progress: &Progress) -> Result<()>;
}

/// In-memory store; clones share the same slot
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Rc<RefCell<Slot>>,
}

#[derive(Debug, Default)]
struct Slot {
    progress: Option<Progress>,
    saves: usize,
}

impl MemoryStore {
    pub fn with_progress(progress: Progress) -> Self {
        let store = Self::default();
        store.slot.borrow_mut().progress = Some(progress);
        store
    }

    /// Last saved (or seeded) progress
    pub fn stored(&self) -> Option<Progress> {
        self.slot.borrow().progress.clone()
    }

    /// Number of save calls
    pub fn saves(&self) -> usize {
        self.slot.borrow().saves
    }
}

impl ProgressStore for MemoryStore {
    fn load(&mut self) -> Result<Progress> {
        Ok(self.stored().unwrap_or_default())
    }

    fn save(&mut self, progress: &Progress) -> Result<()> {
        let mut slot = self.slot.borrow_mut();
        slot.progress = Some(progress.clone());
        slot.saves += 1;
        Ok(())
    }
}

/// JSON file store. Writes go to a temp file that is then renamed over the
/// save, so a crash mid-write leaves the previous save intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

impl ProgressStore for JsonFileStore {
    fn load(&mut self) -> Result<Progress> {
        if !self.path.exists() {
            log::info!("No progress at {}, starting fresh", self.path.display());
            return Ok(Progress::default());
        }
        let json = std::fs::read_to_string(&self.path)?;
        let progress: Progress = serde_json::from_str(&json)?;
        log::info!(
            "Loaded progress: high score {}, unlocked level {}",
            progress.high_score,
            progress.unlocked_level
        );
        Ok(progress.sanitized())
    }

    fn save(&mut self, progress: &Progress) -> Result<()> {
        let json = serde_json::to_string_pretty(progress)?;
        let tmp = self.tmp_path();
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        log::debug!("Progress saved to {}", self.path.display());
        Ok(())
    }
}
