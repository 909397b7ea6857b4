use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::snapshot::ResponseSnapshot;

/// Single global slot holding the last computed snapshot. Last write wins.
#[derive(Debug)]
pub struct SnapshotCache {
    ttl: Duration,
    slot: Mutex<Option<CachedSnapshot>>,
}

#[derive(Debug)]
struct CachedSnapshot {
    snapshot: Arc<ResponseSnapshot>,
    stored_at: Instant,
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Snapshot and its age, while younger than the TTL.
    pub fn get(&self) -> Option<(Arc<ResponseSnapshot>, Duration)> {
        let guard = self.lock();
        let cached = guard.as_ref()?;
        let age = cached.stored_at.elapsed();
        if age >= self.ttl {
            return None;
        }
        Some((Arc::clone(&cached.snapshot), age))
    }

    pub fn set(&self, snapshot: Arc<ResponseSnapshot>) {
        *self.lock() = Some(CachedSnapshot {
            snapshot,
            stored_at: Instant::now(),
        });
    }

    pub fn clear(&self) {
        *self.lock() = None;
    }

    fn lock(&self) -> MutexGuard<'_, Option<CachedSnapshot>> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
