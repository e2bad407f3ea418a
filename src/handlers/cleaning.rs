use super::common::{created_response, map_service_error, success_response, validate_input};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::cleaning::{CleaningJobPatch, CleaningJobStatus, NewCleaningJob},
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCleaningJobRequest {
    pub raw_material_id: Uuid,
    pub from_warehouse_id: Uuid,
    pub to_warehouse_id: Uuid,
    pub quantity: Decimal,
    /// Sent or In-Progress; finalizing statuses are not valid at creation
    pub status: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCleaningJobRequest {
    pub status: Option<String>,
    pub quantity: Option<Decimal>,
    pub to_warehouse_id: Option<Uuid>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Waste recorded with the finalizing transition
    pub leftover_quantity: Option<Decimal>,
    pub leftover_reason: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCleaningLogRequest {
    #[validate(length(min = 1, max = 1000))]
    pub message: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct CleaningListParams {
    pub status: Option<String>,
}

fn parse_status(raw: &str) -> Result<CleaningJobStatus, ApiError> {
    CleaningJobStatus::from_str(raw)
        .map_err(|_| ApiError::ValidationError(format!("unknown cleaning status '{}'", raw)))
}

/// Create a cleaning job, reserving stock at the source warehouse
#[utoipa::path(
    post,
    path = "/raw/cleaning",
    request_body = CreateCleaningJobRequest,
    responses(
        (status = 201, description = "Job created and quantity reserved"),
        (status = 422, description = "Insufficient stock", body = crate::errors::ErrorResponse)
    ),
    tag = "cleaning"
)]
pub async fn create_cleaning_job(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateCleaningJobRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let status = match payload.status.as_deref() {
        Some(raw) => parse_status(raw)?,
        None => CleaningJobStatus::Sent,
    };

    let job = state
        .services
        .cleaning
        .create_job(NewCleaningJob {
            raw_material_id: payload.raw_material_id,
            from_warehouse_id: payload.from_warehouse_id,
            to_warehouse_id: payload.to_warehouse_id,
            quantity: payload.quantity,
            status,
            started_at: payload.started_at.unwrap_or_else(Utc::now),
        })
        .await
        .map_err(map_service_error)?;

    info!(job_number = %job.job_number, "cleaning job created");
    Ok(created_response(job))
}

/// List cleaning jobs
#[utoipa::path(
    get,
    path = "/raw/cleaning",
    params(CleaningListParams),
    responses((status = 200, description = "Cleaning jobs, newest first")),
    tag = "cleaning"
)]
pub async fn list_cleaning_jobs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CleaningListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let jobs = state
        .services
        .cleaning
        .list_jobs(params.status)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(jobs))
}

/// Get a cleaning job
#[utoipa::path(
    get,
    path = "/raw/cleaning/{id}",
    params(("id" = Uuid, Path, description = "Cleaning job id")),
    responses(
        (status = 200, description = "Job found"),
        (status = 404, description = "Job not found", body = crate::errors::ErrorResponse)
    ),
    tag = "cleaning"
)]
pub async fn get_cleaning_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let job = state
        .services
        .cleaning
        .get_job(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(job))
}

/// Update a cleaning job; transition into Cleaned/Finished finalizes it
#[utoipa::path(
    put,
    path = "/raw/cleaning/{id}",
    params(("id" = Uuid, Path, description = "Cleaning job id")),
    request_body = UpdateCleaningJobRequest,
    responses(
        (status = 200, description = "Job updated"),
        (status = 422, description = "Leftover exceeds job quantity", body = crate::errors::ErrorResponse)
    ),
    tag = "cleaning"
)]
pub async fn update_cleaning_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCleaningJobRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let status = payload.status.as_deref().map(parse_status).transpose()?;

    let job = state
        .services
        .cleaning
        .update_job(
            id,
            CleaningJobPatch {
                status,
                quantity: payload.quantity,
                to_warehouse_id: payload.to_warehouse_id,
                finished_at: payload.finished_at,
                leftover_quantity: payload.leftover_quantity,
                leftover_reason: payload.leftover_reason,
            },
        )
        .await
        .map_err(map_service_error)?;
    Ok(success_response(job))
}

/// Cancel a cleaning job, releasing its reservation
#[utoipa::path(
    post,
    path = "/raw/cleaning/{id}/cancel",
    params(("id" = Uuid, Path, description = "Cleaning job id")),
    responses(
        (status = 200, description = "Job cancelled, reservation released"),
        (status = 400, description = "Job already finalized", body = crate::errors::ErrorResponse)
    ),
    tag = "cleaning"
)]
pub async fn cancel_cleaning_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let job = state
        .services
        .cleaning
        .cancel_job(id)
        .await
        .map_err(map_service_error)?;

    info!(job_number = %job.job_number, "cleaning job cancelled");
    Ok(success_response(job))
}

/// Append a log line to a cleaning job
#[utoipa::path(
    post,
    path = "/raw/cleaning/{id}/logs",
    params(("id" = Uuid, Path, description = "Cleaning job id")),
    request_body = CreateCleaningLogRequest,
    responses((status = 201, description = "Log recorded")),
    tag = "cleaning"
)]
pub async fn add_cleaning_log(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateCleaningLogRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let log = state
        .services
        .cleaning
        .add_log(id, payload.message)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(log))
}

/// List a cleaning job's log lines
#[utoipa::path(
    get,
    path = "/raw/cleaning/{id}/logs",
    params(("id" = Uuid, Path, description = "Cleaning job id")),
    responses((status = 200, description = "Log lines in order")),
    tag = "cleaning"
)]
pub async fn list_cleaning_logs(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let logs = state
        .services
        .cleaning
        .logs(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(logs))
}

/// Derived cleaned-material availability per (material, warehouse)
#[utoipa::path(
    get,
    path = "/raw/cleaned-materials",
    responses((status = 200, description = "Cleaned pools with processing subtraction")),
    tag = "cleaning"
)]
pub async fn cleaned_materials(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state
        .services
        .cleaning
        .cleaned_materials()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(rows))
}

pub fn cleaning_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_cleaning_job))
        .route("/", get(list_cleaning_jobs))
        .route("/:id", get(get_cleaning_job))
        .route("/:id", put(update_cleaning_job))
        .route("/:id/cancel", post(cancel_cleaning_job))
        .route("/:id/logs", post(add_cleaning_log))
        .route("/:id/logs", get(list_cleaning_logs))
}
