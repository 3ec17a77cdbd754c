//! Tahap progress engine
//!
//! Answers completion queries, computes per-tahap percentages and upserts
//! subtahap state. Reads are lenient: an absent record is "0% complete".
//! Writes are strict: the tahap and subtahap are validated before anything
//! is created. Storage failures always surface as errors.

use chrono::{NaiveDate, Utc};
use opentelemetry::KeyValue;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::config::ProgressConfig;
use crate::errors::{AppError, RepositoryResult, TahapError, TahapResult};
use crate::models::{
    StageNumber, StageRecord, StageSchema, SubtahapDetail, SubtaskIndex, SubtaskState,
    TahapDetail, TahapPercentage, TahapStatus,
};
use crate::observability::AppObservability;
use crate::repositories::StageRepository;
use crate::services::stage_locks::StageLocks;

pub struct ProgressEngine {
    repository: Arc<dyn StageRepository>,
    schema: StageSchema,
    locks: StageLocks,
    storage_timeout: Duration,
    observability: AppObservability,
}

impl ProgressEngine {
    pub fn new(
        repository: Arc<dyn StageRepository>,
        schema: StageSchema,
        storage_timeout: Duration,
        observability: AppObservability,
    ) -> Self {
        Self {
            repository,
            schema,
            locks: StageLocks::new(),
            storage_timeout,
            observability,
        }
    }

    /// Build an engine from the `[progress]` configuration section
    pub fn from_config(
        repository: Arc<dyn StageRepository>,
        config: &ProgressConfig,
        observability: AppObservability,
    ) -> Result<Self, AppError> {
        let schema = StageSchema::from_config(config)?;
        Ok(Self::new(
            repository,
            schema,
            config.storage_timeout,
            observability,
        ))
    }

    pub fn schema(&self) -> &StageSchema {
        &self.schema
    }

    /// Whether a subtahap is marked complete; `false` when no record exists
    pub async fn is_subtask_completed(
        &self,
        kegiatan_id: i64,
        tahap: i64,
        subtahap: i64,
    ) -> TahapResult<bool> {
        let result: TahapResult<bool> = async {
            let (stage, subtask) = self.validate(tahap, subtahap)?;
            let record = self.load(kegiatan_id, stage).await?;
            Ok(record.is_some_and(|r| r.subtask(subtask).completed))
        }
        .await;
        self.count_read("is_subtask_completed", result)
    }

    /// Truncated completion percentage of one tahap; 0 when no record exists
    pub async fn get_tahap_completion_percentage(
        &self,
        kegiatan_id: i64,
        tahap: i64,
    ) -> TahapResult<u8> {
        let result: TahapResult<u8> = async {
            let stage = StageNumber::new(tahap)?;
            self.percentage_of(kegiatan_id, stage).await
        }
        .await;
        self.count_read("get_tahap_completion_percentage", result)
    }

    /// Percentages of all 8 tahap. Any storage failure fails the whole call.
    pub async fn get_tahap_status(&self, kegiatan_id: i64) -> TahapResult<TahapStatus> {
        let result: TahapResult<TahapStatus> = async {
            let mut tahap = Vec::with_capacity(StageNumber::COUNT);
            for stage in StageNumber::all() {
                let persentase = self.percentage_of(kegiatan_id, stage).await?;
                tahap.push(TahapPercentage {
                    tahap: stage.get(),
                    persentase,
                });
            }
            Ok(TahapStatus { kegiatan_id, tahap })
        }
        .await;
        self.count_read("get_tahap_status", result)
    }

    /// Every subtahap of one tahap with its percentage
    pub async fn get_tahap_detail(&self, kegiatan_id: i64, tahap: i64) -> TahapResult<TahapDetail> {
        let result: TahapResult<TahapDetail> = async {
            let stage = StageNumber::new(tahap)?;
            let record = self.load(kegiatan_id, stage).await?;
            let count = self.schema.subtask_count(stage);

            let subtahap = self
                .schema
                .subtasks(stage)
                .map(|subtask| self.detail_of(kegiatan_id, stage, subtask, record.as_ref()))
                .collect();
            let persentase = record
                .as_ref()
                .map_or(0, |r| r.completion_percentage(count));

            Ok(TahapDetail {
                kegiatan_id,
                tahap: stage.get(),
                persentase,
                subtahap,
            })
        }
        .await;
        self.count_read("get_tahap_detail", result)
    }

    /// Detail of one subtahap; defaults when no record exists
    pub async fn get_subtahap_detail(
        &self,
        kegiatan_id: i64,
        tahap: i64,
        subtahap: i64,
    ) -> TahapResult<SubtahapDetail> {
        let result: TahapResult<SubtahapDetail> = async {
            let (stage, subtask) = self.validate(tahap, subtahap)?;
            let record = self.load(kegiatan_id, stage).await?;
            Ok(self.detail_of(kegiatan_id, stage, subtask, record.as_ref()))
        }
        .await;
        self.count_read("get_subtahap_detail", result)
    }

    /// Set the completion flag of a subtahap, creating the record on first write
    pub async fn update_subtask_status(
        &self,
        kegiatan_id: i64,
        tahap: i64,
        subtahap: i64,
        completed: bool,
    ) -> TahapResult<SubtahapDetail> {
        let result: TahapResult<SubtahapDetail> = async {
            let (stage, subtask) = self.validate(tahap, subtahap)?;
            let detail = self
                .modify(kegiatan_id, stage, subtask, |state| state.completed = completed)
                .await?;
            info!(
                kegiatan_id,
                tahap = %stage,
                subtahap = %subtask,
                completed,
                "Updated subtahap status"
            );
            Ok(detail)
        }
        .await;
        self.count_write(
            "update_subtask_status",
            &self.observability.subtask_status_updates,
            result,
        )
    }

    /// Set the planned date of a date-bearing subtahap
    pub async fn update_subtahap_tanggal_perencanaan(
        &self,
        kegiatan_id: i64,
        tahap: i64,
        subtahap: i64,
        tanggal: NaiveDate,
    ) -> TahapResult<SubtahapDetail> {
        let result: TahapResult<SubtahapDetail> = async {
            let (stage, subtask) = self.validate_dated(tahap, subtahap)?;
            let detail = self
                .modify(kegiatan_id, stage, subtask, |state| {
                    state.tanggal_perencanaan = Some(tanggal)
                })
                .await?;
            info!(
                kegiatan_id,
                tahap = %stage,
                subtahap = %subtask,
                %tanggal,
                "Updated subtahap tanggal perencanaan"
            );
            Ok(detail)
        }
        .await;
        self.count_write(
            "update_subtahap_tanggal_perencanaan",
            &self.observability.date_updates,
            result,
        )
    }

    /// Set the realized date of a date-bearing subtahap
    pub async fn update_subtahap_tanggal_realisasi(
        &self,
        kegiatan_id: i64,
        tahap: i64,
        subtahap: i64,
        tanggal: NaiveDate,
    ) -> TahapResult<SubtahapDetail> {
        let result: TahapResult<SubtahapDetail> = async {
            let (stage, subtask) = self.validate_dated(tahap, subtahap)?;
            let detail = self
                .modify(kegiatan_id, stage, subtask, |state| {
                    state.tanggal_realisasi = Some(tanggal)
                })
                .await?;
            info!(
                kegiatan_id,
                tahap = %stage,
                subtahap = %subtask,
                %tanggal,
                "Updated subtahap tanggal realisasi"
            );
            Ok(detail)
        }
        .await;
        self.count_write(
            "update_subtahap_tanggal_realisasi",
            &self.observability.date_updates,
            result,
        )
    }

    // Tahap is always checked before subtahap so a bad pair reports the tahap.
    fn validate(&self, tahap: i64, subtahap: i64) -> TahapResult<(StageNumber, SubtaskIndex)> {
        let stage = StageNumber::new(tahap)?;
        let subtask = self.schema.subtask(stage, subtahap)?;
        Ok((stage, subtask))
    }

    fn validate_dated(
        &self,
        tahap: i64,
        subtahap: i64,
    ) -> TahapResult<(StageNumber, SubtaskIndex)> {
        let (stage, subtask) = self.validate(tahap, subtahap)?;
        if !self.schema.has_dates(stage, subtask) {
            return Err(TahapError::InvalidSubtask(subtahap));
        }
        Ok((stage, subtask))
    }

    async fn percentage_of(&self, kegiatan_id: i64, stage: StageNumber) -> TahapResult<u8> {
        let count = self.schema.subtask_count(stage);
        let record = self.load(kegiatan_id, stage).await?;
        Ok(record.map_or(0, |r| r.completion_percentage(count)))
    }

    fn detail_of(
        &self,
        kegiatan_id: i64,
        stage: StageNumber,
        subtask: SubtaskIndex,
        record: Option<&StageRecord>,
    ) -> SubtahapDetail {
        let has_dates = self.schema.has_dates(stage, subtask);
        let state = record.map(|r| r.subtask(subtask)).unwrap_or_default();
        SubtahapDetail {
            kegiatan_id,
            tahap: stage.get(),
            subtahap: subtask.get(),
            completed: state.completed,
            tanggal_perencanaan: state.tanggal_perencanaan.filter(|_| has_dates),
            tanggal_realisasi: state.tanggal_realisasi.filter(|_| has_dates),
            has_dates,
        }
    }

    /// Read-modify-write of one subtahap under the (kegiatan, tahap) lock
    async fn modify<F>(
        &self,
        kegiatan_id: i64,
        stage: StageNumber,
        subtask: SubtaskIndex,
        mutate: F,
    ) -> TahapResult<SubtahapDetail>
    where
        F: FnOnce(&mut SubtaskState),
    {
        let _guard = self.locks.acquire(kegiatan_id, stage).await;

        let mut record = match self.load(kegiatan_id, stage).await? {
            Some(record) => record,
            None => {
                debug!(kegiatan_id, tahap = %stage, "Creating tahap record on first write");
                StageRecord::empty(kegiatan_id, stage, self.schema.subtask_count(stage))
            }
        };

        mutate(record.subtask_mut(subtask));
        record.updated_at = Utc::now();

        let saved = self.bounded("save", self.repository.save(record)).await?;
        Ok(self.detail_of(kegiatan_id, stage, subtask, Some(&saved)))
    }

    async fn load(&self, kegiatan_id: i64, stage: StageNumber) -> TahapResult<Option<StageRecord>> {
        let record = self
            .bounded(
                "find_by_activity",
                self.repository.find_by_activity(kegiatan_id, stage),
            )
            .await?;
        debug!(
            kegiatan_id,
            tahap = %stage,
            found = record.is_some(),
            "Loaded tahap record"
        );
        Ok(record)
    }

    /// Run a storage call under the configured timeout
    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> TahapResult<T>
    where
        F: Future<Output = RepositoryResult<T>>,
    {
        let started = Instant::now();
        let outcome = tokio::time::timeout(self.storage_timeout, call).await;
        self.observability.storage_duration.record(
            started.elapsed().as_secs_f64(),
            &[KeyValue::new("operation", operation)],
        );

        match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                error!("Storage operation '{}' failed: {}", operation, e);
                Err(TahapError::Repository(e))
            }
            Err(_) => {
                error!(
                    "Storage operation '{}' timed out after {:?}",
                    operation, self.storage_timeout
                );
                Err(TahapError::StorageTimeout {
                    operation,
                    after: self.storage_timeout,
                })
            }
        }
    }

    fn count_read<T>(&self, operation: &'static str, result: TahapResult<T>) -> TahapResult<T> {
        match &result {
            Ok(_) => self
                .observability
                .status_queries
                .add(1, &[KeyValue::new("operation", operation)]),
            Err(e) => self.reject_or_fail(operation, e),
        }
        result
    }

    fn count_write<T>(
        &self,
        operation: &'static str,
        counter: &opentelemetry::metrics::Counter<u64>,
        result: TahapResult<T>,
    ) -> TahapResult<T> {
        match &result {
            Ok(_) => counter.add(1, &[KeyValue::new("operation", operation)]),
            Err(e) => self.reject_or_fail(operation, e),
        }
        result
    }

    fn reject_or_fail(&self, operation: &'static str, error: &TahapError) {
        if error.is_client_error() {
            warn!("Rejected {}: {}", operation, error);
        }
        self.observability.record_failure(operation, error);
    }
}
