//! Create the tahap_progress table
//!
//! One row per (kegiatan_id, tahap). Subtahap state lives in a JSON text
//! column so that the subtahap count can change without a schema migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TahapProgress::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TahapProgress::KegiatanId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TahapProgress::Tahap).integer().not_null())
                    .col(ColumnDef::new(TahapProgress::Subtasks).text().not_null())
                    .col(Self::create_timestamp_column(
                        manager,
                        TahapProgress::CreatedAt,
                    ))
                    .col(Self::create_timestamp_column(
                        manager,
                        TahapProgress::UpdatedAt,
                    ))
                    .primary_key(
                        Index::create()
                            .col(TahapProgress::KegiatanId)
                            .col(TahapProgress::Tahap),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tahap_progress_updated_at")
                    .table(TahapProgress::Table)
                    .col(TahapProgress::UpdatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TahapProgress::Table).to_owned())
            .await
    }
}

impl Migration {
    /// Create timestamp column with database-specific types
    fn create_timestamp_column(
        manager: &SchemaManager<'_>,
        column_name: impl sea_orm::Iden + 'static,
    ) -> ColumnDef {
        match manager.get_database_backend() {
            sea_orm::DatabaseBackend::Postgres => ColumnDef::new(column_name)
                .timestamp_with_time_zone()
                .not_null()
                .to_owned(),
            _ => ColumnDef::new(column_name).timestamp().not_null().to_owned(),
        }
    }
}

#[derive(DeriveIden)]
enum TahapProgress {
    Table,
    KegiatanId,
    Tahap,
    Subtasks,
    CreatedAt,
    UpdatedAt,
}
