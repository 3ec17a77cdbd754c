//! SeaORM-based stage record repository
//!
//! Rows are keyed by `(kegiatan_id, tahap)`; `save` is a single
//! insert-or-update so two racing first writes cannot create two rows.

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};
use std::sync::Arc;
use tracing::debug;

use crate::entities::{prelude::TahapProgress, tahap_progress};
use crate::errors::{RepositoryError, RepositoryResult};
use crate::models::{StageNumber, StageRecord, SubtaskState};
use crate::repositories::StageRepository;

const TABLE: &str = "tahap_progress";

/// SeaORM-based repository for per-stage progress records
#[derive(Clone)]
pub struct TahapProgressSeaOrmRepository {
    connection: Arc<DatabaseConnection>,
}

impl TahapProgressSeaOrmRepository {
    /// Create a new repository instance
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }

    /// Convert SeaORM model to domain model
    fn model_to_domain(&self, model: tahap_progress::Model) -> RepositoryResult<StageRecord> {
        let tahap = StageNumber::new(model.tahap as i64).map_err(|_| {
            RepositoryError::corrupt(
                TABLE,
                format!(
                    "kegiatan {} has out-of-range tahap {}",
                    model.kegiatan_id, model.tahap
                ),
            )
        })?;
        let subtasks: Vec<SubtaskState> = serde_json::from_str(&model.subtasks)?;

        Ok(StageRecord {
            kegiatan_id: model.kegiatan_id,
            tahap,
            subtasks,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[async_trait]
impl StageRepository for TahapProgressSeaOrmRepository {
    async fn find_by_activity(
        &self,
        kegiatan_id: i64,
        stage: StageNumber,
    ) -> RepositoryResult<Option<StageRecord>> {
        let model = TahapProgress::find_by_id((kegiatan_id, stage.get() as i32))
            .one(&*self.connection)
            .await?;

        match model {
            Some(m) => Ok(Some(self.model_to_domain(m)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, record: StageRecord) -> RepositoryResult<StageRecord> {
        let subtasks = serde_json::to_string(&record.subtasks)?;
        let active_model = tahap_progress::ActiveModel {
            kegiatan_id: Set(record.kegiatan_id),
            tahap: Set(record.tahap.get() as i32),
            subtasks: Set(subtasks),
            created_at: Set(record.created_at),
            updated_at: Set(record.updated_at),
        };

        TahapProgress::insert(active_model)
            .on_conflict(
                OnConflict::columns([
                    tahap_progress::Column::KegiatanId,
                    tahap_progress::Column::Tahap,
                ])
                .update_columns([
                    tahap_progress::Column::Subtasks,
                    tahap_progress::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(&*self.connection)
            .await?;

        debug!(
            "Saved tahap_progress row kegiatan_id={} tahap={}",
            record.kegiatan_id, record.tahap
        );

        self.find_by_activity(record.kegiatan_id, record.tahap)
            .await?
            .ok_or_else(|| {
                RepositoryError::corrupt(
                    TABLE,
                    format!(
                        "row kegiatan {} tahap {} missing after upsert",
                        record.kegiatan_id, record.tahap
                    ),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::migrations::Migrator;
    use sea_orm::{ActiveModelTrait, ConnectOptions};
    use sea_orm_migration::MigratorTrait;

    async fn setup() -> Arc<DatabaseConnection> {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1);
        let connection = sea_orm::Database::connect(options).await.unwrap();
        Migrator::up(&connection, None).await.unwrap();
        Arc::new(connection)
    }

    #[tokio::test]
    async fn absent_row_is_none() {
        let repo = TahapProgressSeaOrmRepository::new(setup().await);
        let found = repo
            .find_by_activity(1, StageNumber::new(1).unwrap())
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn save_inserts_then_updates_same_row() {
        let connection = setup().await;
        let repo = TahapProgressSeaOrmRepository::new(connection.clone());
        let stage = StageNumber::new(2).unwrap();

        let mut record = StageRecord::empty(42, stage, 6);
        record.subtasks[1].completed = true;
        let first = repo.save(record.clone()).await.unwrap();
        assert!(first.subtasks[1].completed);

        record.subtasks[1].tanggal_realisasi = chrono::NaiveDate::from_ymd_opt(2025, 3, 1);
        record.created_at = record.created_at + chrono::Duration::days(1);
        let second = repo.save(record).await.unwrap();

        assert_eq!(second.created_at, first.created_at);
        assert_eq!(
            second.subtasks[1].tanggal_realisasi,
            chrono::NaiveDate::from_ymd_opt(2025, 3, 1)
        );

        let rows = TahapProgress::find().all(&*connection).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn stages_are_stored_independently() {
        let repo = TahapProgressSeaOrmRepository::new(setup().await);
        let one = StageNumber::new(1).unwrap();
        let two = StageNumber::new(2).unwrap();

        let mut record = StageRecord::empty(5, one, 6);
        record.subtasks[0].completed = true;
        repo.save(record).await.unwrap();

        assert!(repo.find_by_activity(5, two).await.unwrap().is_none());
        assert!(repo.find_by_activity(6, one).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn undecodable_subtasks_are_an_error_not_empty() {
        let connection = setup().await;
        let now = chrono::Utc::now();
        tahap_progress::ActiveModel {
            kegiatan_id: Set(9),
            tahap: Set(1),
            subtasks: Set("not json".to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*connection)
        .await
        .unwrap();

        let repo = TahapProgressSeaOrmRepository::new(connection);
        let result = repo.find_by_activity(9, StageNumber::new(1).unwrap()).await;
        assert!(matches!(result, Err(RepositoryError::SerializationFailed(_))));
    }

    #[tokio::test]
    async fn out_of_range_tahap_row_is_corrupt() {
        let connection = setup().await;
        let now = chrono::Utc::now();
        tahap_progress::ActiveModel {
            kegiatan_id: Set(9),
            tahap: Set(0),
            subtasks: Set("[]".to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*connection)
        .await
        .unwrap();

        let repo = TahapProgressSeaOrmRepository::new(connection);
        let model = TahapProgress::find_by_id((9, 0))
            .one(&*repo.connection)
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(
            repo.model_to_domain(model),
            Err(RepositoryError::CorruptRecord { .. })
        ));
    }
}
