use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::products::{NewProduct, ProductPatch},
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 64))]
    pub sku_code: String,
    #[validate(length(min = 1, max = 150))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[validate(length(min = 1, max = 20))]
    pub unit_of_measurement: String,
    pub min_reorder_level: Decimal,
    pub vendor_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 150))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub unit_of_measurement: Option<String>,
    pub min_reorder_level: Option<Decimal>,
    pub vendor_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ProductListParams {
    pub category: Option<String>,
}

/// Create a raw-material SKU
#[utoipa::path(
    post,
    path = "/raw/product",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created"),
        (status = 409, description = "SKU code already exists", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let product = state
        .services
        .products
        .create_product(NewProduct {
            sku_code: payload.sku_code,
            name: payload.name,
            category: payload.category,
            unit_of_measurement: payload.unit_of_measurement,
            min_reorder_level: payload.min_reorder_level,
            vendor_id: payload.vendor_id,
        })
        .await
        .map_err(map_service_error)?;

    info!(product_id = %product.id, sku = %product.sku_code, "product created");
    Ok(created_response(product))
}

/// List raw-material SKUs
#[utoipa::path(
    get,
    path = "/raw/product",
    params(ProductListParams),
    responses((status = 200, description = "All products")),
    tag = "products"
)]
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProductListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let products = state
        .services
        .products
        .list_products(params.category)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(products))
}

/// Get a SKU by id
#[utoipa::path(
    get,
    path = "/raw/product/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product found"),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .services
        .products
        .get_product(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(product))
}

/// Update a SKU
#[utoipa::path(
    put,
    path = "/raw/product/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated"),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let product = state
        .services
        .products
        .update_product(
            id,
            ProductPatch {
                name: payload.name,
                category: payload.category,
                unit_of_measurement: payload.unit_of_measurement,
                min_reorder_level: payload.min_reorder_level,
                vendor_id: payload.vendor_id,
            },
        )
        .await
        .map_err(map_service_error)?;
    Ok(success_response(product))
}

/// Delete a SKU (rejected while stock history exists)
#[utoipa::path(
    delete,
    path = "/raw/product/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 409, description = "Product has stock history", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .products
        .delete_product(id)
        .await
        .map_err(map_service_error)?;

    info!(product_id = %id, "product deleted");
    Ok(no_content_response())
}

pub fn product_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_product))
        .route("/", get(list_products))
        .route("/:id", get(get_product))
        .route("/:id", put(update_product))
        .route("/:id", delete(delete_product))
}
