use super::common::{created_response, map_service_error, success_response, validate_input};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::purchase_orders::{NewPurchaseOrder, NewPurchaseOrderItem, PurchaseOrderFilter},
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

// Serialize is required by the length validation on the parent's `items`.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePurchaseOrderItemRequest {
    pub raw_material_id: Uuid,
    pub quantity_ordered: Decimal,
    pub rate: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePurchaseOrderRequest {
    pub vendor_id: Uuid,
    pub order_date: DateTime<Utc>,
    pub expected_date: DateTime<Utc>,
    #[validate(length(min = 1))]
    pub items: Vec<CreatePurchaseOrderItemRequest>,
}

/// Receive body. `delta_received` is a delta on top of what has already
/// arrived, never a cumulative total.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReceiveItemRequest {
    pub delta_received: Decimal,
    pub warehouse_id: Uuid,
    pub batch_number: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PurchaseOrderListParams {
    pub vendor_id: Option<Uuid>,
    pub status: Option<String>,
}

/// Create a purchase order with line items
#[utoipa::path(
    post,
    path = "/raw/purchase",
    request_body = CreatePurchaseOrderRequest,
    responses(
        (status = 201, description = "Purchase order created"),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
        (status = 404, description = "Vendor or material not found", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn create_purchase_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreatePurchaseOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let created = state
        .services
        .purchase_orders
        .create_purchase_order(NewPurchaseOrder {
            vendor_id: payload.vendor_id,
            order_date: payload.order_date,
            expected_date: payload.expected_date,
            items: payload
                .items
                .into_iter()
                .map(|item| NewPurchaseOrderItem {
                    raw_material_id: item.raw_material_id,
                    quantity_ordered: item.quantity_ordered,
                    rate: item.rate,
                })
                .collect(),
        })
        .await
        .map_err(map_service_error)?;

    info!(po_number = %created.order.po_number, "purchase order created");
    Ok(created_response(serde_json::json!({
        "order": created.order,
        "items": created.items,
    })))
}

/// List purchase orders
#[utoipa::path(
    get,
    path = "/raw/purchase",
    params(PurchaseOrderListParams),
    responses((status = 200, description = "Purchase orders")),
    tag = "purchase-orders"
)]
pub async fn list_purchase_orders(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PurchaseOrderListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let orders = state
        .services
        .purchase_orders
        .list_purchase_orders(PurchaseOrderFilter {
            vendor_id: params.vendor_id,
            status: params.status,
        })
        .await
        .map_err(map_service_error)?;
    Ok(success_response(orders))
}

/// Get a purchase order with its items
#[utoipa::path(
    get,
    path = "/raw/purchase/{id}",
    params(("id" = Uuid, Path, description = "Purchase order id")),
    responses(
        (status = 200, description = "Purchase order with items"),
        (status = 404, description = "Purchase order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn get_purchase_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let found = state
        .services
        .purchase_orders
        .get_purchase_order(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(serde_json::json!({
        "order": found.order,
        "items": found.items,
    })))
}

/// Receive a delta quantity against a line item
#[utoipa::path(
    put,
    path = "/raw/purchase/item/{item_id}",
    params(("item_id" = Uuid, Path, description = "Purchase order item id")),
    request_body = ReceiveItemRequest,
    responses(
        (status = 200, description = "Receipt recorded"),
        (status = 400, description = "Non-positive delta", body = crate::errors::ErrorResponse),
        (status = 404, description = "Item or warehouse not found", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn receive_item(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<ReceiveItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let item = state
        .services
        .purchase_orders
        .receive_item(
            item_id,
            payload.delta_received,
            payload.warehouse_id,
            payload.batch_number,
            payload.expiry_date,
        )
        .await
        .map_err(map_service_error)?;

    info!(item_id = %item.id, received = %item.quantity_received, "purchase item received");
    Ok(success_response(item))
}

pub fn purchase_order_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_purchase_order))
        .route("/", get(list_purchase_orders))
        .route("/:id", get(get_purchase_order))
        .route("/item/:item_id", put(receive_item))
}
