//! REST surface tests using axum-test
//!
//! Runs the real router over an in-memory repository, plus a SQLite-backed
//! server for the health probes.

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

use kegiatan_tahap::{
    config::Config,
    database::{Database, repositories::TahapProgressSeaOrmRepository},
    models::StageSchema,
    observability::AppObservability,
    repositories::InMemoryStageRepository,
    services::ProgressEngine,
    web::{AppState, WebServer},
};

fn create_test_server() -> TestServer {
    let engine = ProgressEngine::new(
        Arc::new(InMemoryStageRepository::new()),
        StageSchema::standard(),
        Duration::from_secs(5),
        AppObservability::from_global(),
    );
    let state = AppState::new(Arc::new(engine), None);
    TestServer::new(WebServer::router(state, Duration::from_secs(30)))
        .expect("Failed to create test server")
}

async fn create_sqlite_server() -> TestServer {
    let mut config = Config::default();
    config.database.url = "sqlite::memory:".to_string();
    let database = Database::new(&config.database)
        .await
        .expect("Failed to create test database");
    database.migrate().await.expect("Failed to run migrations");

    let repository = Arc::new(TahapProgressSeaOrmRepository::new(database.connection()));
    let engine = ProgressEngine::from_config(
        repository,
        &config.progress,
        AppObservability::from_global(),
    )
    .expect("Failed to build engine");
    let state = AppState::new(Arc::new(engine), Some(database));
    TestServer::new(WebServer::router(state, Duration::from_secs(30)))
        .expect("Failed to create test server")
}

#[tokio::test]
async fn test_status_of_unseen_kegiatan() {
    let server = create_test_server();

    let response = server.get("/api/v1/kegiatan/5/tahap").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["kegiatan_id"], 5);
    let tahap = body["data"]["tahap"].as_array().unwrap();
    assert_eq!(tahap.len(), 8);
    assert!(tahap.iter().all(|t| t["persentase"] == 0));
}

#[tokio::test]
async fn test_update_status_then_read_back() {
    let server = create_test_server();

    for subtahap in [1, 3, 5] {
        let response = server
            .put(&format!("/api/v1/kegiatan/1/tahap/1/subtahap/{subtahap}/status"))
            .json(&json!({ "completed": true }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["completed"], true);
        assert_eq!(body["data"]["subtahap"], subtahap);
    }

    let body: Value = server
        .get("/api/v1/kegiatan/1/tahap/1/persentase")
        .await
        .json();
    assert_eq!(body["data"]["persentase"], 50);

    let body: Value = server
        .get("/api/v1/kegiatan/1/tahap/1/subtahap/3/selesai")
        .await
        .json();
    assert_eq!(body["data"]["completed"], true);

    let body: Value = server.get("/api/v1/kegiatan/1/tahap/1").await.json();
    assert_eq!(body["data"]["persentase"], 50);
    assert_eq!(body["data"]["subtahap"].as_array().unwrap().len(), 6);

    let body: Value = server.get("/api/v1/kegiatan/1/tahap").await.json();
    assert_eq!(body["data"]["tahap"][0]["persentase"], 50);
    assert_eq!(body["data"]["tahap"][1]["persentase"], 0);
}

#[tokio::test]
async fn test_dates_do_not_touch_completion() {
    let server = create_test_server();

    server
        .put("/api/v1/kegiatan/2/tahap/7/subtahap/1/tanggal-perencanaan")
        .json(&json!({ "tanggal": "2025-05-01" }))
        .await
        .assert_status_ok();
    server
        .put("/api/v1/kegiatan/2/tahap/7/subtahap/1/tanggal-realisasi")
        .json(&json!({ "tanggal": "2025-05-09" }))
        .await
        .assert_status_ok();

    let body: Value = server
        .get("/api/v1/kegiatan/2/tahap/7/subtahap/1")
        .await
        .json();
    assert_eq!(body["data"]["completed"], false);
    assert_eq!(body["data"]["tanggal_perencanaan"], "2025-05-01");
    assert_eq!(body["data"]["tanggal_realisasi"], "2025-05-09");
}

#[tokio::test]
async fn test_out_of_range_indices_are_bad_requests() {
    let server = create_test_server();

    let response = server
        .put("/api/v1/kegiatan/1/tahap/9/subtahap/1/status")
        .json(&json!({ "completed": true }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Invalid tahap: 9");

    let response = server.get("/api/v1/kegiatan/1/tahap/1/subtahap/7").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid subtahap: 7");

    let response = server.get("/api/v1/kegiatan/1/tahap/0/persentase").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_input_is_rejected() {
    let server = create_test_server();

    let response = server.get("/api/v1/kegiatan/abc/tahap").await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .put("/api/v1/kegiatan/1/tahap/1/subtahap/1/tanggal-realisasi")
        .json(&json!({ "tanggal": "31-12-2025" }))
        .await;
    assert!(response.status_code().is_client_error());
}

#[tokio::test]
async fn test_schema_endpoint() {
    let server = create_test_server();

    let body: Value = server.get("/api/v1/tahap/schema").await.json();
    let tahap = body["data"]["tahap"].as_array().unwrap();
    assert_eq!(tahap.len(), 8);
    assert_eq!(tahap[0]["subtask_count"], 6);
    assert_eq!(tahap[0]["dated_subtasks"], json!([1, 2, 3, 4, 5, 6]));
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let server = create_test_server();

    let response = server.get("/api/openapi.json").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["paths"]["/kegiatan/{id}/tahap"].is_object());
}

#[tokio::test]
async fn test_health_probes_with_database() {
    let server = create_sqlite_server().await;

    let body: Value = server.get("/health").await.json();
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["database"], "connected");

    server.get("/ready").await.assert_status_ok();
    server.get("/live").await.assert_status_ok();

    server
        .put("/api/v1/kegiatan/3/tahap/8/subtahap/6/status")
        .json(&json!({ "completed": true }))
        .await
        .assert_status_ok();
    let body: Value = server.get("/api/v1/kegiatan/3/tahap").await.json();
    assert_eq!(body["data"]["tahap"][7]["persentase"], 16);
}

#[tokio::test]
async fn test_health_without_database() {
    let server = create_test_server();

    let body: Value = server.get("/health").await.json();
    assert_eq!(body["data"]["database"], "not_configured");
    server.get("/ready").await.assert_status_ok();
}

#[tokio::test]
async fn test_health_with_closed_database() {
    let mut config = Config::default();
    config.database.url = "sqlite::memory:".to_string();
    let database = Database::new(&config.database)
        .await
        .expect("Failed to create test database");
    let engine = ProgressEngine::new(
        Arc::new(InMemoryStageRepository::new()),
        StageSchema::standard(),
        Duration::from_secs(5),
        AppObservability::from_global(),
    );
    database
        .connection()
        .as_ref()
        .clone()
        .close()
        .await
        .expect("Failed to close pool");

    let state = AppState::new(Arc::new(engine), Some(database));
    let server = TestServer::new(WebServer::router(state, Duration::from_secs(30)))
        .expect("Failed to create test server");

    let body: Value = server.get("/health").await.json();
    assert_eq!(body["data"]["status"], "unhealthy");
    assert_eq!(body["data"]["database"], "disconnected");
    server
        .get("/ready")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
}
