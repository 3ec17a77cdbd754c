//! SeaORM migrations
//!
//! Migrations are database-agnostic and run unchanged on SQLite, PostgreSQL and MySQL.

use sea_orm_migration::prelude::*;

pub mod m20251018_000001_create_tahap_progress;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20251018_000001_create_tahap_progress::Migration)]
    }
}
