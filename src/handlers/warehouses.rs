use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::warehouses::{NewWarehouse, WarehousePatch},
};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateWarehouseRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(min = 1, max = 255))]
    pub location: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateWarehouseRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub location: Option<String>,
}

/// Create a warehouse
#[utoipa::path(
    post,
    path = "/raw/warehouse",
    request_body = CreateWarehouseRequest,
    responses(
        (status = 201, description = "Warehouse created"),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse)
    ),
    tag = "warehouses"
)]
pub async fn create_warehouse(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateWarehouseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let warehouse = state
        .services
        .warehouses
        .create_warehouse(NewWarehouse {
            name: payload.name,
            location: payload.location,
        })
        .await
        .map_err(map_service_error)?;

    info!(warehouse_id = %warehouse.id, "warehouse created");
    Ok(created_response(warehouse))
}

/// List warehouses
#[utoipa::path(
    get,
    path = "/raw/warehouse",
    responses((status = 200, description = "All warehouses")),
    tag = "warehouses"
)]
pub async fn list_warehouses(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let warehouses = state
        .services
        .warehouses
        .list_warehouses()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(warehouses))
}

/// Get a warehouse by id
#[utoipa::path(
    get,
    path = "/raw/warehouse/{id}",
    params(("id" = Uuid, Path, description = "Warehouse id")),
    responses(
        (status = 200, description = "Warehouse found"),
        (status = 404, description = "Warehouse not found", body = crate::errors::ErrorResponse)
    ),
    tag = "warehouses"
)]
pub async fn get_warehouse(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let warehouse = state
        .services
        .warehouses
        .get_warehouse(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(warehouse))
}

/// Update a warehouse
#[utoipa::path(
    put,
    path = "/raw/warehouse/{id}",
    params(("id" = Uuid, Path, description = "Warehouse id")),
    request_body = UpdateWarehouseRequest,
    responses(
        (status = 200, description = "Warehouse updated"),
        (status = 404, description = "Warehouse not found", body = crate::errors::ErrorResponse)
    ),
    tag = "warehouses"
)]
pub async fn update_warehouse(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateWarehouseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let warehouse = state
        .services
        .warehouses
        .update_warehouse(
            id,
            WarehousePatch {
                name: payload.name,
                location: payload.location,
            },
        )
        .await
        .map_err(map_service_error)?;
    Ok(success_response(warehouse))
}

/// Delete a warehouse (rejected while referenced by stock or jobs)
#[utoipa::path(
    delete,
    path = "/raw/warehouse/{id}",
    params(("id" = Uuid, Path, description = "Warehouse id")),
    responses(
        (status = 204, description = "Warehouse deleted"),
        (status = 409, description = "Warehouse still referenced", body = crate::errors::ErrorResponse)
    ),
    tag = "warehouses"
)]
pub async fn delete_warehouse(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .warehouses
        .delete_warehouse(id)
        .await
        .map_err(map_service_error)?;

    info!(warehouse_id = %id, "warehouse deleted");
    Ok(no_content_response())
}

pub fn warehouse_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_warehouse))
        .route("/", get(list_warehouses))
        .route("/:id", get(get_warehouse))
        .route("/:id", put(update_warehouse))
        .route("/:id", delete(delete_warehouse))
}
