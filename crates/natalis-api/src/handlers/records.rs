use crate::error::{ErrorResponse, HttpAppError, ValidatedJson, ValidatedQuery};
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use natalis_core::validation::validate_submission;
use natalis_core::{AppError, BirthRecord, BirthRecordSubmission};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SaveResponse {
    pub message: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Father identifier
    pub father_id: i64,
    /// Mother identifier
    pub mother_id: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SearchResponse {
    pub data: Vec<BirthRecord>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PurgeDetails {
    pub deleted_count: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PurgeResponse {
    pub message: String,
    pub details: PurgeDetails,
}

#[utoipa::path(
    post,
    path = "/save-data/",
    tag = "records",
    request_body = BirthRecordSubmission,
    responses(
        (status = 200, description = "Record saved", body = SaveResponse),
        (status = 400, description = "Invalid field or parent pair already registered", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, submission), fields(operation = "save_data"))]
pub async fn save_data(
    State(state): State<Arc<AppState>>,
    ValidatedJson(submission): ValidatedJson<BirthRecordSubmission>,
) -> Result<impl IntoResponse, HttpAppError> {
    let record = validate_submission(submission)?;
    let created = state.repository.insert(&record).await?;

    tracing::info!(
        record_id = created.id,
        father_id = created.father_id,
        mother_id = created.mother_id,
        hospital_name = %created.hospital_name,
        "Birth record saved"
    );

    Ok(Json(SaveResponse {
        message: "saved".to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/search/",
    tag = "records",
    params(SearchParams),
    responses(
        (status = 200, description = "Records registered for the parent pair", body = SearchResponse),
        (status = 400, description = "Missing or non-integer identifiers", body = ErrorResponse),
        (status = 404, description = "No records found", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state),
    fields(father_id = params.father_id, mother_id = params.mother_id, operation = "search")
)]
pub async fn search(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(params): ValidatedQuery<SearchParams>,
) -> Result<impl IntoResponse, HttpAppError> {
    let records = state
        .repository
        .find_by_parents(params.father_id, params.mother_id)
        .await?;

    if records.is_empty() {
        return Err(AppError::NotFound("No records found".to_string()).into());
    }

    tracing::debug!(count = records.len(), "Search matched records");

    Ok(Json(SearchResponse { data: records }))
}

#[utoipa::path(
    delete,
    path = "/delete-old-entries/",
    tag = "records",
    responses(
        (status = 200, description = "Expired records deleted", body = PurgeResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "delete_old_entries"))]
pub async fn delete_old_entries(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let deleted_count = state.retention.purge_expired().await?;

    Ok(Json(PurgeResponse {
        message: format!("Deleted {} old entries", deleted_count),
        details: PurgeDetails { deleted_count },
    }))
}
