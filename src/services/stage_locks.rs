//! Per-(kegiatan, tahap) async locks
//!
//! Updates run find -> mutate -> save; holding the key's lock across the
//! whole sequence keeps concurrent writes to different subtahap of the same
//! tahap from overwriting each other. Different keys never contend.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::trace;

use crate::models::StageNumber;

/// Registry size above which idle entries are dropped on the next acquire
const PRUNE_THRESHOLD: usize = 1024;

type StageKey = (i64, StageNumber);

#[derive(Debug, Default)]
pub struct StageLocks {
    entries: Mutex<HashMap<StageKey, Arc<Mutex<()>>>>,
}

impl StageLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `(kegiatan_id, stage)`
    pub async fn acquire(&self, kegiatan_id: i64, stage: StageNumber) -> OwnedMutexGuard<()> {
        let lock = {
            let mut entries = self.entries.lock().await;
            if entries.len() >= PRUNE_THRESHOLD {
                let before = entries.len();
                // Only the registry holds an idle entry
                entries.retain(|_, lock| Arc::strong_count(lock) > 1);
                trace!("Pruned {} idle stage locks", before - entries.len());
            }
            entries.entry((kegiatan_id, stage)).or_default().clone()
        };
        lock.lock_owned().await
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}
