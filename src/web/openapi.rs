//! OpenAPI documentation generation using utoipa
//!
//! Handler functions carry `#[utoipa::path]` annotations; this module
//! gathers them into one document served by Swagger UI at `/docs`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Kegiatan Tahap API",
        description = "Progress tracking for the 8 tahap of each kegiatan.

Reads never fail for a kegiatan without records: they report 0% and
incomplete subtahap. An out-of-range tahap or subtahap is rejected with 400.
Storage failures are reported as 5xx and never as 0%.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "/api/v1", description = "API Version 1"),
    ),
    tags(
        (name = "tahap", description = "Tahap and subtahap progress"),
    ),
    components(
        schemas(
            crate::models::TahapStatus,
            crate::models::TahapPercentage,
            crate::models::TahapDetail,
            crate::models::SubtahapDetail,
            crate::models::StageSchemaView,
            crate::models::StageShapeView,
            crate::web::handlers::tahap::SubtahapSelesaiResponse,
            crate::web::handlers::tahap::TahapPersentaseResponse,
            crate::web::handlers::tahap::UpdateSubtahapStatusRequest,
            crate::web::handlers::tahap::UpdateTanggalRequest,
        )
    ),
    paths(
        crate::web::handlers::tahap::get_tahap_status,
        crate::web::handlers::tahap::get_tahap_detail,
        crate::web::handlers::tahap::get_tahap_persentase,
        crate::web::handlers::tahap::get_subtahap_detail,
        crate::web::handlers::tahap::get_subtahap_selesai,
        crate::web::handlers::tahap::update_subtahap_status,
        crate::web::handlers::tahap::update_tanggal_perencanaan,
        crate::web::handlers::tahap::update_tanggal_realisasi,
        crate::web::handlers::tahap::get_stage_schema,
    )
)]
pub struct ApiDoc;

/// OpenAPI document with the crate version filled in
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    let mut openapi = ApiDoc::openapi();
    openapi.info.version = env!("CARGO_PKG_VERSION").to_string();
    openapi
}
