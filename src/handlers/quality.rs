use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::quality::{
        NewQualityParameter, NewQualityReport, QualityReportFilter, QualityReportPatch,
    },
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct QualityParameterRequest {
    #[validate(length(min = 1, max = 100))]
    pub parameter: String,
    #[validate(length(min = 1, max = 255))]
    pub standard: String,
    #[validate(length(min = 1, max = 255))]
    pub result: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateQualityReportRequest {
    #[validate(length(min = 1, max = 150))]
    pub raw_material_name: String,
    pub variety: Option<String>,
    pub supplier: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub grn: String,
    pub created_by: Option<Uuid>,
    pub parameters: Vec<QualityParameterRequest>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateQualityReportRequest {
    #[validate(length(min = 1, max = 150))]
    pub raw_material_name: Option<String>,
    pub variety: Option<String>,
    pub supplier: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub grn: Option<String>,
    pub parameters: Option<Vec<QualityParameterRequest>>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct QualityListParams {
    pub raw_material_name: Option<String>,
    pub supplier: Option<String>,
    pub grn: Option<String>,
}

fn to_parameters(rows: Vec<QualityParameterRequest>) -> Vec<NewQualityParameter> {
    rows.into_iter()
        .map(|row| NewQualityParameter {
            parameter: row.parameter,
            standard: row.standard,
            result: row.result,
        })
        .collect()
}

/// File a quality report with its parameters
#[utoipa::path(
    post,
    path = "/raw/quality",
    request_body = CreateQualityReportRequest,
    responses(
        (status = 201, description = "Report filed"),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse)
    ),
    tag = "quality"
)]
pub async fn create_quality_report(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateQualityReportRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let created = state
        .services
        .quality
        .create_report(NewQualityReport {
            raw_material_name: payload.raw_material_name,
            variety: payload.variety,
            supplier: payload.supplier,
            grn: payload.grn,
            created_by: payload.created_by,
            parameters: to_parameters(payload.parameters),
        })
        .await
        .map_err(map_service_error)?;

    info!(report_id = %created.report.id, grn = %created.report.grn, "quality report filed");
    Ok(created_response(serde_json::json!({
        "report": created.report,
        "parameters": created.parameters,
    })))
}

/// List quality reports
#[utoipa::path(
    get,
    path = "/raw/quality",
    params(QualityListParams),
    responses((status = 200, description = "Quality reports, newest first")),
    tag = "quality"
)]
pub async fn list_quality_reports(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QualityListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let reports = state
        .services
        .quality
        .list_reports(QualityReportFilter {
            raw_material_name: params.raw_material_name,
            supplier: params.supplier,
            grn: params.grn,
        })
        .await
        .map_err(map_service_error)?;
    Ok(success_response(reports))
}

/// Get a quality report with its parameters
#[utoipa::path(
    get,
    path = "/raw/quality/{id}",
    params(("id" = Uuid, Path, description = "Report id")),
    responses(
        (status = 200, description = "Report with parameters"),
        (status = 404, description = "Report not found", body = crate::errors::ErrorResponse)
    ),
    tag = "quality"
)]
pub async fn get_quality_report(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let found = state
        .services
        .quality
        .get_report(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(serde_json::json!({
        "report": found.report,
        "parameters": found.parameters,
    })))
}

/// Update a quality report; supplied parameters replace the prior set
#[utoipa::path(
    put,
    path = "/raw/quality/{id}",
    params(("id" = Uuid, Path, description = "Report id")),
    request_body = UpdateQualityReportRequest,
    responses(
        (status = 200, description = "Report updated"),
        (status = 404, description = "Report not found", body = crate::errors::ErrorResponse)
    ),
    tag = "quality"
)]
pub async fn update_quality_report(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateQualityReportRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let updated = state
        .services
        .quality
        .update_report(
            id,
            QualityReportPatch {
                raw_material_name: payload.raw_material_name,
                variety: payload.variety,
                supplier: payload.supplier,
                grn: payload.grn,
                parameters: payload.parameters.map(to_parameters),
            },
        )
        .await
        .map_err(map_service_error)?;

    Ok(success_response(serde_json::json!({
        "report": updated.report,
        "parameters": updated.parameters,
    })))
}

/// Delete a quality report and its parameters
#[utoipa::path(
    delete,
    path = "/raw/quality/{id}",
    params(("id" = Uuid, Path, description = "Report id")),
    responses(
        (status = 204, description = "Report deleted"),
        (status = 404, description = "Report not found", body = crate::errors::ErrorResponse)
    ),
    tag = "quality"
)]
pub async fn delete_quality_report(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .quality
        .delete_report(id)
        .await
        .map_err(map_service_error)?;

    info!(report_id = %id, "quality report deleted");
    Ok(no_content_response())
}

pub fn quality_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_quality_report))
        .route("/", get(list_quality_reports))
        .route("/:id", get(get_quality_report))
        .route("/:id", put(update_quality_report))
        .route("/:id", delete(delete_quality_report))
}
