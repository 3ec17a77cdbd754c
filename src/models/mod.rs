//! Domain models

pub mod stage_schema;
pub mod tahap;

pub use stage_schema::{StageSchema, StageSchemaView, StageShapeView};
pub use tahap::{
    StageNumber, StageRecord, SubtahapDetail, SubtaskIndex, SubtaskState, TahapDetail,
    TahapPercentage, TahapStatus,
};
