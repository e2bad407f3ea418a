use super::common::{created_response, map_service_error, success_response, validate_input};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::vendors::{NewVendor, VendorPatch},
};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateVendorRequest {
    #[validate(length(min = 1, max = 150))]
    pub name: String,
    pub address: Option<String>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    #[validate(email)]
    pub contact_email: Option<String>,
    pub gstin: Option<String>,
    pub bank_details: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateVendorRequest {
    #[validate(length(min = 1, max = 150))]
    pub name: Option<String>,
    pub address: Option<String>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    #[validate(email)]
    pub contact_email: Option<String>,
    pub gstin: Option<String>,
    pub bank_details: Option<String>,
    pub enabled: Option<bool>,
}

/// Create a vendor with a generated VND code
#[utoipa::path(
    post,
    path = "/raw/vendor",
    request_body = CreateVendorRequest,
    responses(
        (status = 201, description = "Vendor created"),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse)
    ),
    tag = "vendors"
)]
pub async fn create_vendor(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateVendorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let vendor = state
        .services
        .vendors
        .create_vendor(NewVendor {
            name: payload.name,
            address: payload.address,
            contact_name: payload.contact_name,
            contact_phone: payload.contact_phone,
            contact_email: payload.contact_email,
            gstin: payload.gstin,
            bank_details: payload.bank_details,
        })
        .await
        .map_err(map_service_error)?;

    info!(vendor_id = %vendor.id, vendor_code = %vendor.vendor_code, "vendor created");
    Ok(created_response(vendor))
}

/// List vendors
#[utoipa::path(
    get,
    path = "/raw/vendor",
    responses((status = 200, description = "All vendors")),
    tag = "vendors"
)]
pub async fn list_vendors(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let vendors = state
        .services
        .vendors
        .list_vendors()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(vendors))
}

/// Get a vendor by id
#[utoipa::path(
    get,
    path = "/raw/vendor/{id}",
    params(("id" = Uuid, Path, description = "Vendor id")),
    responses(
        (status = 200, description = "Vendor found"),
        (status = 404, description = "Vendor not found", body = crate::errors::ErrorResponse)
    ),
    tag = "vendors"
)]
pub async fn get_vendor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let vendor = state
        .services
        .vendors
        .get_vendor(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(vendor))
}

/// Update a vendor (including the enabled toggle)
#[utoipa::path(
    put,
    path = "/raw/vendor/{id}",
    params(("id" = Uuid, Path, description = "Vendor id")),
    request_body = UpdateVendorRequest,
    responses(
        (status = 200, description = "Vendor updated"),
        (status = 404, description = "Vendor not found", body = crate::errors::ErrorResponse)
    ),
    tag = "vendors"
)]
pub async fn update_vendor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateVendorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let vendor = state
        .services
        .vendors
        .update_vendor(
            id,
            VendorPatch {
                name: payload.name,
                address: payload.address,
                contact_name: payload.contact_name,
                contact_phone: payload.contact_phone,
                contact_email: payload.contact_email,
                gstin: payload.gstin,
                bank_details: payload.bank_details,
                enabled: payload.enabled,
            },
        )
        .await
        .map_err(map_service_error)?;
    Ok(success_response(vendor))
}

pub fn vendor_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_vendor))
        .route("/", get(list_vendors))
        .route("/:id", get(get_vendor))
        .route("/:id", put(update_vendor))
}
