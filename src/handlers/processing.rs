use super::common::{created_response, map_service_error, success_response, validate_input};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::processing::{
        NewByProduct, NewProcessingJob, ProcessingJobPatch, ProcessingJobStatus,
    },
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
pub struct CreateProcessingJobRequest {
    pub input_raw_material_id: Uuid,
    pub source_warehouse_id: Uuid,
    pub quantity_input: Decimal,
    pub started_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ByProductRequest {
    #[validate(length(min = 1, max = 64))]
    pub sku_code: String,
    pub quantity: Decimal,
    pub warehouse_id: Uuid,
    pub tag: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProcessingJobRequest {
    pub quantity_input: Option<Decimal>,
    pub status: Option<String>,
    /// Replace semantics: the supplied set becomes the complete list
    pub by_products: Option<Vec<ByProductRequest>>,
    pub finished_warehouse_id: Option<Uuid>,
    pub finished_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ProcessingListParams {
    pub status: Option<String>,
}

fn parse_status(raw: &str) -> Result<ProcessingJobStatus, ApiError> {
    ProcessingJobStatus::from_str(raw)
        .map_err(|_| ApiError::ValidationError(format!("unknown processing status '{}'", raw)))
}

/// Create a processing job drawing from a warehouse's cleaned pool
#[utoipa::path(
    post,
    path = "/raw/processing",
    request_body = CreateProcessingJobRequest,
    responses(
        (status = 201, description = "Job created"),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse)
    ),
    tag = "processing"
)]
pub async fn create_processing_job(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateProcessingJobRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let job = state
        .services
        .processing
        .create_job(NewProcessingJob {
            input_raw_material_id: payload.input_raw_material_id,
            source_warehouse_id: payload.source_warehouse_id,
            quantity_input: payload.quantity_input,
            started_at: payload.started_at.unwrap_or_else(Utc::now),
        })
        .await
        .map_err(map_service_error)?;

    info!(job_number = %job.job_number, "processing job created");
    Ok(created_response(job))
}

/// List processing jobs
#[utoipa::path(
    get,
    path = "/raw/processing",
    params(ProcessingListParams),
    responses((status = 200, description = "Processing jobs, newest first")),
    tag = "processing"
)]
pub async fn list_processing_jobs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProcessingListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let jobs = state
        .services
        .processing
        .list_jobs(params.status)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(jobs))
}

/// Get a processing job with by-products and finished good
#[utoipa::path(
    get,
    path = "/raw/processing/{id}",
    params(("id" = Uuid, Path, description = "Processing job id")),
    responses(
        (status = 200, description = "Job detail"),
        (status = 404, description = "Job not found", body = crate::errors::ErrorResponse)
    ),
    tag = "processing"
)]
pub async fn get_processing_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = state
        .services
        .processing
        .get_job(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(serde_json::json!({
        "job": detail.job,
        "by_products": detail.by_products,
        "finished_good": detail.finished_good,
    })))
}

/// Update a processing job; transition into Finished/Completed mints the
/// finished good
#[utoipa::path(
    put,
    path = "/raw/processing/{id}",
    params(("id" = Uuid, Path, description = "Processing job id")),
    request_body = UpdateProcessingJobRequest,
    responses(
        (status = 200, description = "Job updated"),
        (status = 409, description = "Job already finished", body = crate::errors::ErrorResponse),
        (status = 422, description = "By-products exceed input", body = crate::errors::ErrorResponse)
    ),
    tag = "processing"
)]
pub async fn update_processing_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProcessingJobRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let status = payload.status.as_deref().map(parse_status).transpose()?;
    let by_products = payload.by_products.map(|rows| {
        rows.into_iter()
            .map(|row| NewByProduct {
                sku_code: row.sku_code,
                quantity: row.quantity,
                warehouse_id: row.warehouse_id,
                tag: row.tag,
                reason: row.reason,
            })
            .collect()
    });

    let detail = state
        .services
        .processing
        .update_job(
            id,
            ProcessingJobPatch {
                quantity_input: payload.quantity_input,
                status,
                by_products,
                finished_warehouse_id: payload.finished_warehouse_id,
                finished_at: payload.finished_at,
            },
        )
        .await
        .map_err(map_service_error)?;

    Ok(success_response(serde_json::json!({
        "job": detail.job,
        "by_products": detail.by_products,
        "finished_good": detail.finished_good,
    })))
}

/// Cancel a processing job
#[utoipa::path(
    post,
    path = "/raw/processing/{id}/cancel",
    params(("id" = Uuid, Path, description = "Processing job id")),
    responses(
        (status = 200, description = "Job cancelled"),
        (status = 400, description = "Job already finished", body = crate::errors::ErrorResponse)
    ),
    tag = "processing"
)]
pub async fn cancel_processing_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let job = state
        .services
        .processing
        .cancel_job(id)
        .await
        .map_err(map_service_error)?;

    info!(job_number = %job.job_number, "processing job cancelled");
    Ok(success_response(job))
}

pub fn processing_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_processing_job))
        .route("/", get(list_processing_jobs))
        .route("/:id", get(get_processing_job))
        .route("/:id", put(update_processing_job))
        .route("/:id/cancel", post(cancel_processing_job))
}
