//! Stage schema: how many subtahap each tahap has and which of them carry dates

use serde::Serialize;
use utoipa::ToSchema;

use crate::config::defaults::{DEFAULT_SUBTASKS_PER_STAGE, MAX_SUBTASKS_PER_STAGE};
use crate::config::{ProgressConfig, StageDefinition};
use crate::errors::{AppError, TahapResult};
use crate::models::tahap::{StageNumber, SubtaskIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StageShape {
    subtask_count: u8,
    /// Bit `n - 1` set means subtahap `n` is date-bearing
    dated_mask: u32,
}

impl StageShape {
    fn all_dated(subtask_count: u8) -> Self {
        let dated_mask = if subtask_count as u32 >= u32::BITS {
            u32::MAX
        } else {
            (1u32 << subtask_count) - 1
        };
        Self {
            subtask_count,
            dated_mask,
        }
    }
}

/// Fixed shape of all 8 tahap, resolved once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSchema {
    stages: [StageShape; StageNumber::COUNT],
}

impl Default for StageSchema {
    fn default() -> Self {
        Self::standard()
    }
}

impl StageSchema {
    /// 8 tahap with 6 subtahap each, every subtahap date-bearing
    pub fn standard() -> Self {
        Self {
            stages: [StageShape::all_dated(DEFAULT_SUBTASKS_PER_STAGE); StageNumber::COUNT],
        }
    }

    pub fn from_config(config: &ProgressConfig) -> Result<Self, AppError> {
        if config.stages.is_empty() {
            return Ok(Self::standard());
        }
        Self::from_definitions(&config.stages)
    }

    /// Build a schema from exactly 8 stage definitions
    pub fn from_definitions(definitions: &[StageDefinition]) -> Result<Self, AppError> {
        if definitions.len() != StageNumber::COUNT {
            return Err(AppError::configuration(format!(
                "progress.stages must list exactly {} tahap, got {}",
                StageNumber::COUNT,
                definitions.len()
            )));
        }

        let mut stages = [StageShape::all_dated(DEFAULT_SUBTASKS_PER_STAGE); StageNumber::COUNT];
        for (position, definition) in definitions.iter().enumerate() {
            let tahap = position + 1;
            let count = definition.subtask_count;
            if count == 0 || count > MAX_SUBTASKS_PER_STAGE {
                let max = MAX_SUBTASKS_PER_STAGE;
                return Err(AppError::configuration(format!(
                    "tahap {tahap}: subtask_count must be within 1..={max}, got {count}"
                )));
            }

            stages[position] = match &definition.dated_subtasks {
                None => StageShape::all_dated(count),
                Some(indices) => {
                    let mut dated_mask = 0u32;
                    for &index in indices {
                        if index == 0 || index > count {
                            return Err(AppError::configuration(format!(
                                "tahap {tahap}: dated subtahap {index} is outside 1..={count}"
                            )));
                        }
                        dated_mask |= 1 << (index - 1);
                    }
                    StageShape {
                        subtask_count: count,
                        dated_mask,
                    }
                }
            };
        }

        Ok(Self { stages })
    }

    pub fn subtask_count(&self, stage: StageNumber) -> u8 {
        self.stages[stage.offset()].subtask_count
    }

    pub fn has_dates(&self, stage: StageNumber, subtask: SubtaskIndex) -> bool {
        self.stages[stage.offset()].dated_mask & (1 << subtask.offset()) != 0
    }

    /// 1-based indices of the date-bearing subtahap of a tahap
    pub fn dated_subtasks(&self, stage: StageNumber) -> Vec<u8> {
        let shape = self.stages[stage.offset()];
        (1..=shape.subtask_count)
            .filter(|n| shape.dated_mask & (1 << (n - 1)) != 0)
            .collect()
    }

    /// Validate a raw subtahap index against the given tahap
    pub fn subtask(&self, stage: StageNumber, raw: i64) -> TahapResult<SubtaskIndex> {
        SubtaskIndex::new(raw, self.subtask_count(stage))
    }

    /// Every valid subtahap of a tahap, ascending
    pub fn subtasks(&self, stage: StageNumber) -> impl Iterator<Item = SubtaskIndex> + '_ {
        let count = self.subtask_count(stage);
        (1..=count as i64).filter_map(move |n| SubtaskIndex::new(n, count).ok())
    }

    pub fn view(&self) -> StageSchemaView {
        StageSchemaView {
            tahap: StageNumber::all()
                .map(|stage| StageShapeView {
                    tahap: stage.get(),
                    subtask_count: self.subtask_count(stage),
                    dated_subtasks: self.dated_subtasks(stage),
                })
                .collect(),
        }
    }
}

/// Read-only rendering of the schema for the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StageSchemaView {
    pub tahap: Vec<StageShapeView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StageShapeView {
    pub tahap: u8,
    pub subtask_count: u8,
    pub dated_subtasks: Vec<u8>,
}
