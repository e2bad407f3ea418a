use super::common::{map_service_error, success_response};
use crate::{
    errors::ApiError,
    handlers::AppState,
    queries::{
        dashboard::{
            LowStockAlertsQuery, PendingPurchaseOrderItemsQuery, StockInProcessingQuery,
            StockUnderCleaningQuery, TotalStockQuery, WasteStockQuery,
        },
        Query,
    },
};
use axum::{extract::State, response::IntoResponse, routing::get, Router};
use std::sync::Arc;

/// Total stock across all warehouses
#[utoipa::path(
    get,
    path = "/raw/dashboard/total-stock",
    responses((status = 200, description = "Total and per-row balances")),
    tag = "dashboard"
)]
pub async fn total_stock(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let summary = TotalStockQuery {}
        .execute(&state.db)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(summary))
}

/// Purchase order items not yet fully received
#[utoipa::path(
    get,
    path = "/raw/dashboard/pending-pos",
    responses((status = 200, description = "Pending purchase order items")),
    tag = "dashboard"
)]
pub async fn pending_pos(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let rows = PendingPurchaseOrderItemsQuery {}
        .execute(&state.db)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(rows))
}

/// Stock held by in-flight cleaning jobs
#[utoipa::path(
    get,
    path = "/raw/dashboard/under-cleaning",
    responses((status = 200, description = "Gross quantity under cleaning")),
    tag = "dashboard"
)]
pub async fn under_cleaning(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = StockUnderCleaningQuery {}
        .execute(&state.db)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(summary))
}

/// Stock held by in-progress processing jobs
#[utoipa::path(
    get,
    path = "/raw/dashboard/in-processing",
    responses((status = 200, description = "Input quantity in processing")),
    tag = "dashboard"
)]
pub async fn in_processing(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = StockInProcessingQuery {}
        .execute(&state.db)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(summary))
}

/// Materials below their reorder level
#[utoipa::path(
    get,
    path = "/raw/dashboard/low-stock",
    responses((status = 200, description = "Low-stock alerts")),
    tag = "dashboard"
)]
pub async fn low_stock(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let rows = LowStockAlertsQuery {}
        .execute(&state.db)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(rows))
}

/// Waste recorded across both pipelines
#[utoipa::path(
    get,
    path = "/raw/dashboard/waste-stock",
    responses((status = 200, description = "Unfinished and by-product waste")),
    tag = "dashboard"
)]
pub async fn waste_stock(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let summary = WasteStockQuery {}
        .execute(&state.db)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(summary))
}

pub fn dashboard_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/total-stock", get(total_stock))
        .route("/pending-pos", get(pending_pos))
        .route("/under-cleaning", get(under_cleaning))
        .route("/in-processing", get(in_processing))
        .route("/low-stock", get(low_stock))
        .route("/waste-stock", get(waste_stock))
}
