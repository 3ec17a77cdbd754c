//! Repository trait definitions
//!
//! The progress engine only ever needs two storage operations: read the
//! record for one (kegiatan, tahap) and persist it back.

use async_trait::async_trait;

use crate::errors::RepositoryResult;
use crate::models::{StageNumber, StageRecord};

/// Storage seam for per-stage progress records
///
/// # Returns
///
/// * `Ok(None)` from `find_by_activity` - no record yet, which is a valid state
/// * `Err(RepositoryError)` - infrastructure failure, never to be read as "empty"
#[async_trait]
pub trait StageRepository: Send + Sync {
    /// Fetch the record of `kegiatan_id` for `stage`, if one was ever written
    async fn find_by_activity(
        &self,
        kegiatan_id: i64,
        stage: StageNumber,
    ) -> RepositoryResult<Option<StageRecord>>;

    /// Create or replace the record keyed by `(kegiatan_id, tahap)`
    async fn save(&self, record: StageRecord) -> RepositoryResult<StageRecord>;
}
