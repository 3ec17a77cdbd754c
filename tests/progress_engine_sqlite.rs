//! Progress engine against a migrated SQLite database
//!
//! Exercises the full stack below the web layer: engine, SeaORM repository,
//! entity and migration.

use anyhow::Result;
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;

use kegiatan_tahap::{
    config::Config,
    database::{Database, repositories::TahapProgressSeaOrmRepository},
    errors::TahapError,
    models::StageSchema,
    observability::AppObservability,
    services::ProgressEngine,
};

async fn create_engine() -> Result<Arc<ProgressEngine>> {
    let mut config = Config::default();
    config.database.url = "sqlite::memory:".to_string();

    let database = Database::new(&config.database).await?;
    database.migrate().await?;

    let repository = Arc::new(TahapProgressSeaOrmRepository::new(database.connection()));
    Ok(Arc::new(ProgressEngine::new(
        repository,
        StageSchema::standard(),
        Duration::from_secs(5),
        AppObservability::from_global(),
    )))
}

#[tokio::test]
async fn test_unseen_kegiatan_is_all_zero() -> Result<()> {
    let engine = create_engine().await?;

    let status = engine.get_tahap_status(1001).await?;
    assert_eq!(status.kegiatan_id, 1001);
    assert_eq!(status.percentages(), vec![0; 8]);
    assert!(!engine.is_subtask_completed(1001, 8, 6).await?);

    let detail = engine.get_tahap_detail(1001, 3).await?;
    assert_eq!(detail.persentase, 0);
    assert_eq!(detail.subtahap.len(), 6);
    assert!(detail.subtahap.iter().all(|s| !s.completed));
    Ok(())
}

#[tokio::test]
async fn test_updates_persist_across_reads() -> Result<()> {
    let engine = create_engine().await?;

    for subtahap in [1, 3, 5] {
        engine.update_subtask_status(7, 1, subtahap, true).await?;
    }
    assert_eq!(engine.get_tahap_completion_percentage(7, 1).await?, 50);

    engine.update_subtask_status(7, 2, 1, true).await?;
    engine.update_subtask_status(7, 2, 2, true).await?;
    assert_eq!(engine.get_tahap_completion_percentage(7, 2).await?, 33);

    let status = engine.get_tahap_status(7).await?;
    assert_eq!(status.percentages(), vec![50, 33, 0, 0, 0, 0, 0, 0]);
    Ok(())
}

#[tokio::test]
async fn test_dates_round_trip_through_json_column() -> Result<()> {
    let engine = create_engine().await?;
    let planned = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
    let realized = NaiveDate::from_ymd_opt(2025, 4, 20).unwrap();

    engine
        .update_subtahap_tanggal_perencanaan(42, 6, 2, planned)
        .await?;
    engine
        .update_subtahap_tanggal_realisasi(42, 6, 2, realized)
        .await?;

    let detail = engine.get_subtahap_detail(42, 6, 2).await?;
    assert!(!detail.completed);
    assert_eq!(detail.tanggal_perencanaan, Some(planned));
    assert_eq!(detail.tanggal_realisasi, Some(realized));
    assert_eq!(engine.get_tahap_completion_percentage(42, 6).await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_invalid_indices_are_rejected() -> Result<()> {
    let engine = create_engine().await?;

    assert!(matches!(
        engine.update_subtask_status(1, 9, 1, true).await,
        Err(TahapError::InvalidStage(9))
    ));
    assert!(matches!(
        engine.update_subtask_status(1, 1, 7, true).await,
        Err(TahapError::InvalidSubtask(7))
    ));
    assert_eq!(engine.get_tahap_status(1).await?.percentages(), vec![0; 8]);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_first_writes_keep_every_subtahap() -> Result<()> {
    let engine = create_engine().await?;

    let handles: Vec<_> = (1..=6)
        .map(|subtahap| {
            let engine = engine.clone();
            tokio::spawn(async move { engine.update_subtask_status(99, 4, subtahap, true).await })
        })
        .collect();
    for handle in handles {
        handle.await??;
    }

    assert_eq!(engine.get_tahap_completion_percentage(99, 4).await?, 100);
    Ok(())
}
