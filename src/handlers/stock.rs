use super::common::{created_response, map_service_error, success_response, validate_input};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::stock_entries::{EntryType, NewStockEntry, StockEntryFilter, StockEntryPatch},
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
pub struct CreateStockEntryRequest {
    pub raw_material_id: Uuid,
    pub warehouse_id: Uuid,
    pub quantity: Decimal,
    /// IN, OUT, RESERVED or RELEASED
    pub entry_type: String,
    pub reference_id: Option<Uuid>,
    #[validate(length(min = 1, max = 40))]
    pub status: String,
    pub reason_code: Option<String>,
    pub batch_number: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStockEntryRequest {
    #[validate(length(min = 1, max = 40))]
    pub status: Option<String>,
    pub reason_code: Option<String>,
    pub quantity: Option<Decimal>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct StockEntryListParams {
    pub raw_material_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    pub entry_type: Option<String>,
    pub status: Option<String>,
}

fn parse_entry_type(raw: &str) -> Result<EntryType, ApiError> {
    EntryType::from_str(raw).map_err(|_| {
        ApiError::ValidationError(format!(
            "entry_type must be IN, OUT, RESERVED or RELEASED, got '{}'",
            raw
        ))
    })
}

/// Record a manual ledger entry
#[utoipa::path(
    post,
    path = "/raw/stock",
    request_body = CreateStockEntryRequest,
    responses(
        (status = 201, description = "Entry recorded"),
        (status = 400, description = "Invalid entry", body = crate::errors::ErrorResponse)
    ),
    tag = "stock"
)]
pub async fn create_stock_entry(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateStockEntryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let entry_type = parse_entry_type(&payload.entry_type)?;

    let entry = state
        .services
        .stock_entries
        .record_entry(NewStockEntry {
            raw_material_id: payload.raw_material_id,
            warehouse_id: payload.warehouse_id,
            quantity: payload.quantity,
            entry_type,
            reference_id: payload.reference_id,
            status: payload.status,
            reason_code: payload.reason_code,
            batch_number: payload.batch_number,
            expiry_date: payload.expiry_date,
        })
        .await
        .map_err(map_service_error)?;

    info!(entry_id = %entry.id, entry_type = %entry.entry_type, "stock entry recorded");
    Ok(created_response(entry))
}

/// List ledger entries
#[utoipa::path(
    get,
    path = "/raw/stock",
    params(StockEntryListParams),
    responses((status = 200, description = "Ledger entries, newest first")),
    tag = "stock"
)]
pub async fn list_stock_entries(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StockEntryListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let entry_type = params
        .entry_type
        .as_deref()
        .map(parse_entry_type)
        .transpose()?;

    let entries = state
        .services
        .stock_entries
        .list(StockEntryFilter {
            raw_material_id: params.raw_material_id,
            warehouse_id: params.warehouse_id,
            entry_type,
            status: params.status,
        })
        .await
        .map_err(map_service_error)?;
    Ok(success_response(entries))
}

/// Correct entry metadata (does not reconcile the aggregate)
#[utoipa::path(
    put,
    path = "/raw/stock/{id}",
    params(("id" = Uuid, Path, description = "Stock entry id")),
    request_body = UpdateStockEntryRequest,
    responses(
        (status = 200, description = "Entry updated"),
        (status = 404, description = "Entry not found", body = crate::errors::ErrorResponse)
    ),
    tag = "stock"
)]
pub async fn update_stock_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStockEntryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let entry = state
        .services
        .stock_entries
        .update_entry(
            id,
            StockEntryPatch {
                status: payload.status,
                reason_code: payload.reason_code,
                quantity: payload.quantity,
            },
        )
        .await
        .map_err(map_service_error)?;
    Ok(success_response(entry))
}

/// Current balances across all warehouses with material details
#[utoipa::path(
    get,
    path = "/raw/stock/distribution",
    responses((status = 200, description = "Per (material, warehouse) balances")),
    tag = "stock"
)]
pub async fn stock_distribution(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state
        .services
        .current_stock
        .list_with_details()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(rows))
}

pub fn stock_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_stock_entry))
        .route("/", get(list_stock_entries))
        .route("/distribution", get(stock_distribution))
        .route("/:id", put(update_stock_entry))
}
