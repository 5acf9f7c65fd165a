//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use crate::setup::routes::health;
use natalis_core::models;

/// Returns the OpenAPI document served at `/api/openapi.json`.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Natalis API",
        version = "0.1.0",
        description = "Birth registration intake: submit, search and purge records"
    ),
    paths(
        handlers::landing::landing,
        handlers::records::save_data,
        handlers::records::search,
        handlers::records::delete_old_entries,
        health::liveness_check,
        health::readiness_check,
    ),
    components(
        schemas(
            models::IdType,
            models::BirthRecord,
            models::BirthRecordSubmission,
            handlers::records::SaveResponse,
            handlers::records::SearchResponse,
            handlers::records::PurgeResponse,
            handlers::records::PurgeDetails,
            health::LivenessResponse,
            health::ReadinessResponse,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "landing", description = "Registration form"),
        (name = "records", description = "Birth record intake, lookup and retention"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_public_paths() {
        let spec = get_openapi_spec();
        for path in ["/", "/save-data/", "/search/", "/delete-old-entries/", "/health/ready"] {
            assert!(spec.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
