//! Tahap progress HTTP handlers
//!
//! Thin wrappers over [`ProgressEngine`](crate::services::ProgressEngine):
//! path segments are passed through raw so that range validation happens in
//! exactly one place.

use axum::{
    Json,
    extract::{Path, State},
    response::Response,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::{AppError, TahapResult};
use crate::models::{StageSchemaView, SubtahapDetail, TahapDetail, TahapStatus};
use crate::web::{
    AppState,
    extractors::RequestContext,
    responses::{ApiResponse, handle_result},
    utils::log_request,
};

/// Completion flag of one subtahap
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubtahapSelesaiResponse {
    pub kegiatan_id: i64,
    pub tahap: i64,
    pub subtahap: i64,
    pub completed: bool,
}

/// Completion percentage of one tahap
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TahapPersentaseResponse {
    pub kegiatan_id: i64,
    pub tahap: i64,
    pub persentase: u8,
}

/// Request body for setting a subtahap completion flag
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateSubtahapStatusRequest {
    pub completed: bool,
}

/// Request body for setting a planned or realized date
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateTanggalRequest {
    #[schema(value_type = String, format = Date, example = "2025-03-31")]
    pub tanggal: NaiveDate,
}

fn respond<T: Serialize>(result: TahapResult<T>) -> Response {
    handle_result(result.map_err(AppError::from))
}

/// Get the completion percentage of all 8 tahap
#[utoipa::path(
    get,
    path = "/kegiatan/{id}/tahap",
    tag = "tahap",
    params(
        ("id" = i64, Path, description = "Kegiatan ID"),
    ),
    responses(
        (status = 200, description = "Percentages of all tahap", body = ApiResponse<TahapStatus>),
        (status = 500, description = "Storage failure"),
        (status = 504, description = "Storage timeout"),
    )
)]
pub async fn get_tahap_status(
    State(state): State<AppState>,
    Path(kegiatan_id): Path<i64>,
    context: RequestContext,
) -> Response {
    log_request(&context);
    respond(state.engine.get_tahap_status(kegiatan_id).await)
}

/// Get every subtahap of one tahap with its percentage
#[utoipa::path(
    get,
    path = "/kegiatan/{id}/tahap/{tahap}",
    tag = "tahap",
    params(
        ("id" = i64, Path, description = "Kegiatan ID"),
        ("tahap" = i64, Path, description = "Tahap number (1-8)"),
    ),
    responses(
        (status = 200, description = "Tahap detail", body = ApiResponse<TahapDetail>),
        (status = 400, description = "Invalid tahap"),
        (status = 500, description = "Storage failure"),
        (status = 504, description = "Storage timeout"),
    )
)]
pub async fn get_tahap_detail(
    State(state): State<AppState>,
    Path((kegiatan_id, tahap)): Path<(i64, i64)>,
    context: RequestContext,
) -> Response {
    log_request(&context);
    respond(state.engine.get_tahap_detail(kegiatan_id, tahap).await)
}

/// Get the completion percentage of one tahap
#[utoipa::path(
    get,
    path = "/kegiatan/{id}/tahap/{tahap}/persentase",
    tag = "tahap",
    params(
        ("id" = i64, Path, description = "Kegiatan ID"),
        ("tahap" = i64, Path, description = "Tahap number (1-8)"),
    ),
    responses(
        (status = 200, description = "Tahap percentage", body = ApiResponse<TahapPersentaseResponse>),
        (status = 400, description = "Invalid tahap"),
        (status = 500, description = "Storage failure"),
        (status = 504, description = "Storage timeout"),
    )
)]
pub async fn get_tahap_persentase(
    State(state): State<AppState>,
    Path((kegiatan_id, tahap)): Path<(i64, i64)>,
    context: RequestContext,
) -> Response {
    log_request(&context);
    let result = state
        .engine
        .get_tahap_completion_percentage(kegiatan_id, tahap)
        .await
        .map(|persentase| TahapPersentaseResponse {
            kegiatan_id,
            tahap,
            persentase,
        });
    respond(result)
}

/// Get one subtahap's completion flag and dates
#[utoipa::path(
    get,
    path = "/kegiatan/{id}/tahap/{tahap}/subtahap/{subtahap}",
    tag = "tahap",
    params(
        ("id" = i64, Path, description = "Kegiatan ID"),
        ("tahap" = i64, Path, description = "Tahap number (1-8)"),
        ("subtahap" = i64, Path, description = "Subtahap number within the tahap"),
    ),
    responses(
        (status = 200, description = "Subtahap detail", body = ApiResponse<SubtahapDetail>),
        (status = 400, description = "Invalid tahap or subtahap"),
        (status = 500, description = "Storage failure"),
        (status = 504, description = "Storage timeout"),
    )
)]
pub async fn get_subtahap_detail(
    State(state): State<AppState>,
    Path((kegiatan_id, tahap, subtahap)): Path<(i64, i64, i64)>,
    context: RequestContext,
) -> Response {
    log_request(&context);
    respond(
        state
            .engine
            .get_subtahap_detail(kegiatan_id, tahap, subtahap)
            .await,
    )
}

/// Whether one subtahap is complete
#[utoipa::path(
    get,
    path = "/kegiatan/{id}/tahap/{tahap}/subtahap/{subtahap}/selesai",
    tag = "tahap",
    params(
        ("id" = i64, Path, description = "Kegiatan ID"),
        ("tahap" = i64, Path, description = "Tahap number (1-8)"),
        ("subtahap" = i64, Path, description = "Subtahap number within the tahap"),
    ),
    responses(
        (status = 200, description = "Completion flag", body = ApiResponse<SubtahapSelesaiResponse>),
        (status = 400, description = "Invalid tahap or subtahap"),
        (status = 500, description = "Storage failure"),
        (status = 504, description = "Storage timeout"),
    )
)]
pub async fn get_subtahap_selesai(
    State(state): State<AppState>,
    Path((kegiatan_id, tahap, subtahap)): Path<(i64, i64, i64)>,
    context: RequestContext,
) -> Response {
    log_request(&context);
    let result = state
        .engine
        .is_subtask_completed(kegiatan_id, tahap, subtahap)
        .await
        .map(|completed| SubtahapSelesaiResponse {
            kegiatan_id,
            tahap,
            subtahap,
            completed,
        });
    respond(result)
}

/// Mark a subtahap complete or incomplete
#[utoipa::path(
    put,
    path = "/kegiatan/{id}/tahap/{tahap}/subtahap/{subtahap}/status",
    tag = "tahap",
    params(
        ("id" = i64, Path, description = "Kegiatan ID"),
        ("tahap" = i64, Path, description = "Tahap number (1-8)"),
        ("subtahap" = i64, Path, description = "Subtahap number within the tahap"),
    ),
    request_body = UpdateSubtahapStatusRequest,
    responses(
        (status = 200, description = "Updated subtahap", body = ApiResponse<SubtahapDetail>),
        (status = 400, description = "Invalid tahap, subtahap or body"),
        (status = 500, description = "Storage failure"),
        (status = 504, description = "Storage timeout"),
    )
)]
pub async fn update_subtahap_status(
    State(state): State<AppState>,
    Path((kegiatan_id, tahap, subtahap)): Path<(i64, i64, i64)>,
    context: RequestContext,
    Json(request): Json<UpdateSubtahapStatusRequest>,
) -> Response {
    log_request(&context);
    respond(
        state
            .engine
            .update_subtask_status(kegiatan_id, tahap, subtahap, request.completed)
            .await,
    )
}

/// Set the planned date of a subtahap
#[utoipa::path(
    put,
    path = "/kegiatan/{id}/tahap/{tahap}/subtahap/{subtahap}/tanggal-perencanaan",
    tag = "tahap",
    params(
        ("id" = i64, Path, description = "Kegiatan ID"),
        ("tahap" = i64, Path, description = "Tahap number (1-8)"),
        ("subtahap" = i64, Path, description = "Subtahap number within the tahap"),
    ),
    request_body = UpdateTanggalRequest,
    responses(
        (status = 200, description = "Updated subtahap", body = ApiResponse<SubtahapDetail>),
        (status = 400, description = "Invalid tahap, subtahap or date"),
        (status = 500, description = "Storage failure"),
        (status = 504, description = "Storage timeout"),
    )
)]
pub async fn update_tanggal_perencanaan(
    State(state): State<AppState>,
    Path((kegiatan_id, tahap, subtahap)): Path<(i64, i64, i64)>,
    context: RequestContext,
    Json(request): Json<UpdateTanggalRequest>,
) -> Response {
    log_request(&context);
    respond(
        state
            .engine
            .update_subtahap_tanggal_perencanaan(kegiatan_id, tahap, subtahap, request.tanggal)
            .await,
    )
}

/// Set the realized date of a subtahap
#[utoipa::path(
    put,
    path = "/kegiatan/{id}/tahap/{tahap}/subtahap/{subtahap}/tanggal-realisasi",
    tag = "tahap",
    params(
        ("id" = i64, Path, description = "Kegiatan ID"),
        ("tahap" = i64, Path, description = "Tahap number (1-8)"),
        ("subtahap" = i64, Path, description = "Subtahap number within the tahap"),
    ),
    request_body = UpdateTanggalRequest,
    responses(
        (status = 200, description = "Updated subtahap", body = ApiResponse<SubtahapDetail>),
        (status = 400, description = "Invalid tahap, subtahap or date"),
        (status = 500, description = "Storage failure"),
        (status = 504, description = "Storage timeout"),
    )
)]
pub async fn update_tanggal_realisasi(
    State(state): State<AppState>,
    Path((kegiatan_id, tahap, subtahap)): Path<(i64, i64, i64)>,
    context: RequestContext,
    Json(request): Json<UpdateTanggalRequest>,
) -> Response {
    log_request(&context);
    respond(
        state
            .engine
            .update_subtahap_tanggal_realisasi(kegiatan_id, tahap, subtahap, request.tanggal)
            .await,
    )
}

/// Subtahap count and date-bearing subtahap of every tahap
#[utoipa::path(
    get,
    path = "/tahap/schema",
    tag = "tahap",
    responses(
        (status = 200, description = "Stage schema", body = ApiResponse<StageSchemaView>),
    )
)]
pub async fn get_stage_schema(State(state): State<AppState>, context: RequestContext) -> Response {
    log_request(&context);
    handle_result(Ok(state.engine.schema().view()))
}
