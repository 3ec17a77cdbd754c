//! `tahap_progress` table: one row per (kegiatan, tahap)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "tahap_progress")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub kegiatan_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub tahap: i32,
    /// JSON array of subtahap states, index 0 is subtahap 1
    #[sea_orm(column_type = "Text")]
    pub subtasks: String,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
