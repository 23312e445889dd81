use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use anyhow::{anyhow, Result};

use crate::models::UserRecord;

use super::{CachedData, MirrorStore};

/// In-process mirror. Clones share the same slot, so a second controller
/// built from a clone sees what the first one wrote.
///
/// The snapshot is kept as serialized JSON to behave like real storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryMirror {
    slot: Arc<Mutex<Option<String>>>,
    writes: Arc<AtomicUsize>,
}

impl MemoryMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the slot with raw contents, bypassing serialization.
    pub fn with_raw(contents: impl Into<String>) -> Self {
        let mirror = Self::default();
        if let Ok(mut slot) = mirror.slot.lock() {
            *slot = Some(contents.into());
        }
        mirror
    }

    /// Number of successful `save` calls across all clones.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl MirrorStore for MemoryMirror {
    fn load(&self) -> Result<Option<CachedData<Vec<UserRecord>>>> {
        let slot = self.slot.lock().map_err(|_| anyhow!("Mirror slot lock poisoned"))?;
        match slot.as_deref() {
            Some(contents) => Ok(Some(serde_json::from_str(contents)?)),
            None => Ok(None),
        }
    }

    fn save(&self, users: &[UserRecord]) -> Result<()> {
        let contents = serde_json::to_string(&CachedData::new(users))?;
        let mut slot = self.slot.lock().map_err(|_| anyhow!("Mirror slot lock poisoned"))?;
        *slot = Some(contents);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Mirror for the variant that keeps nothing between sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMirror;

impl MirrorStore for NoMirror {
    fn load(&self) -> Result<Option<CachedData<Vec<UserRecord>>>> {
        Ok(None)
    }

    fn save(&self, _users: &[UserRecord]) -> Result<()> {
        Ok(())
    }
}
