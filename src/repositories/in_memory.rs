//! In-memory stage repository
//!
//! Same keying and upsert semantics as the SeaORM repository, without
//! durability. Used by tests and embedders.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::errors::RepositoryResult;
use crate::models::{StageNumber, StageRecord};
use crate::repositories::traits::StageRepository;

#[derive(Debug, Default)]
pub struct InMemoryStageRepository {
    records: RwLock<HashMap<(i64, StageNumber), StageRecord>>,
}

impl InMemoryStageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl StageRepository for InMemoryStageRepository {
    async fn find_by_activity(
        &self,
        kegiatan_id: i64,
        stage: StageNumber,
    ) -> RepositoryResult<Option<StageRecord>> {
        Ok(self.records.read().await.get(&(kegiatan_id, stage)).cloned())
    }

    async fn save(&self, mut record: StageRecord) -> RepositoryResult<StageRecord> {
        let mut records = self.records.write().await;
        let key = (record.kegiatan_id, record.tahap);
        if let Some(existing) = records.get(&key) {
            record.created_at = existing.created_at;
        }
        records.insert(key, record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_then_find_by_key() {
        let repo = InMemoryStageRepository::new();
        let stage = StageNumber::new(3).unwrap();
        assert!(repo.find_by_activity(7, stage).await.unwrap().is_none());

        let mut record = StageRecord::empty(7, stage, 6);
        record.subtasks[0].completed = true;
        repo.save(record.clone()).await.unwrap();

        let found = repo.find_by_activity(7, stage).await.unwrap().unwrap();
        assert_eq!(found.subtasks, record.subtasks);
        assert!(
            repo.find_by_activity(7, StageNumber::new(4).unwrap())
                .await
                .unwrap()
                .is_none()
        );
        assert!(repo.find_by_activity(8, stage).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn resave_keeps_creation_time() {
        let repo = InMemoryStageRepository::new();
        let stage = StageNumber::new(1).unwrap();
        let first = repo.save(StageRecord::empty(1, stage, 6)).await.unwrap();

        let mut later = StageRecord::empty(1, stage, 6);
        later.created_at = first.created_at + chrono::Duration::hours(1);
        let saved = repo.save(later).await.unwrap();

        assert_eq!(saved.created_at, first.created_at);
        assert_eq!(repo.len().await, 1);
    }
}
