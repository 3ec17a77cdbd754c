//! Tahap (stage) progress domain types
//!
//! A [`StageRecord`] holds the subtask state of one kegiatan within one tahap.
//! Records are created lazily on first write; an absent record is the valid
//! "0% complete" state.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::{TahapError, TahapResult};

/// Validated stage number in `1..=8`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StageNumber(u8);

impl StageNumber {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 8;
    pub const COUNT: usize = Self::MAX as usize;

    /// Validate a raw stage number, failing with `Invalid tahap: <n>`
    pub fn new(raw: i64) -> TahapResult<Self> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&raw) {
            Ok(Self(raw as u8))
        } else {
            Err(TahapError::InvalidStage(raw))
        }
    }

    /// All stages in ascending order
    pub fn all() -> impl Iterator<Item = StageNumber> {
        (Self::MIN..=Self::MAX).map(StageNumber)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based position, for table lookups
    pub(crate) fn offset(self) -> usize {
        (self.0 - Self::MIN) as usize
    }
}

impl std::fmt::Display for StageNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Subtask index already validated against the stage's subtask count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SubtaskIndex(u8);

impl SubtaskIndex {
    /// Validate a raw 1-based index against `subtask_count`,
    /// failing with `Invalid subtahap: <n>`
    pub fn new(raw: i64, subtask_count: u8) -> TahapResult<Self> {
        if (1..=subtask_count as i64).contains(&raw) {
            Ok(Self(raw as u8))
        } else {
            Err(TahapError::InvalidSubtask(raw))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub(crate) fn offset(self) -> usize {
        (self.0 - 1) as usize
    }
}

impl std::fmt::Display for SubtaskIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stored state of one subtahap
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtaskState {
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tanggal_perencanaan: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tanggal_realisasi: Option<NaiveDate>,
}

/// Persisted progress of one kegiatan within one tahap
#[derive(Debug, Clone, PartialEq)]
pub struct StageRecord {
    pub kegiatan_id: i64,
    pub tahap: StageNumber,
    pub subtasks: Vec<SubtaskState>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StageRecord {
    /// A fresh record with every subtask incomplete and undated
    pub fn empty(kegiatan_id: i64, tahap: StageNumber, subtask_count: u8) -> Self {
        let now = Utc::now();
        Self {
            kegiatan_id,
            tahap,
            subtasks: vec![SubtaskState::default(); subtask_count as usize],
            created_at: now,
            updated_at: now,
        }
    }

    /// State of a subtask; entries missing from a shorter stored vector read as default
    pub fn subtask(&self, index: SubtaskIndex) -> SubtaskState {
        self.subtasks
            .get(index.offset())
            .cloned()
            .unwrap_or_default()
    }

    /// Mutable access to a subtask, growing the vector when needed
    pub fn subtask_mut(&mut self, index: SubtaskIndex) -> &mut SubtaskState {
        let offset = index.offset();
        if self.subtasks.len() <= offset {
            self.subtasks.resize(offset + 1, SubtaskState::default());
        }
        &mut self.subtasks[offset]
    }

    /// Number of completed subtasks among the first `subtask_count` entries
    pub fn completed_count(&self, subtask_count: u8) -> usize {
        self.subtasks
            .iter()
            .take(subtask_count as usize)
            .filter(|s| s.completed)
            .count()
    }

    /// Completion percentage with integer truncation (2 of 6 -> 33)
    pub fn completion_percentage(&self, subtask_count: u8) -> u8 {
        truncated_percentage(self.completed_count(subtask_count), subtask_count)
    }
}

pub(crate) fn truncated_percentage(completed: usize, total: u8) -> u8 {
    if total == 0 {
        return 0;
    }
    ((completed.min(total as usize) * 100) / total as usize) as u8
}

/// Completion percentage of one tahap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TahapPercentage {
    pub tahap: u8,
    pub persentase: u8,
}

/// Snapshot of all 8 tahap percentages for one kegiatan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TahapStatus {
    pub kegiatan_id: i64,
    pub tahap: Vec<TahapPercentage>,
}

impl TahapStatus {
    pub fn percentage(&self, stage: StageNumber) -> u8 {
        self.tahap
            .iter()
            .find(|p| p.tahap == stage.get())
            .map(|p| p.persentase)
            .unwrap_or(0)
    }

    pub fn percentages(&self) -> Vec<u8> {
        self.tahap.iter().map(|p| p.persentase).collect()
    }
}

/// Detail of one subtahap; defaults when no record exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SubtahapDetail {
    pub kegiatan_id: i64,
    pub tahap: u8,
    pub subtahap: u8,
    pub completed: bool,
    #[schema(value_type = Option<String>, format = Date)]
    pub tanggal_perencanaan: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub tanggal_realisasi: Option<NaiveDate>,
    /// Whether this subtahap accepts planned/realized dates
    pub has_dates: bool,
}

/// Every subtahap of one tahap plus its percentage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TahapDetail {
    pub kegiatan_id: i64,
    pub tahap: u8,
    pub persentase: u8,
    pub subtahap: Vec<SubtahapDetail>,
}
