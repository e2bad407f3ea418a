//! Rawstock API Library
//!
//! Raw-material inventory backend built around an append-only stock
//! conservation ledger, with purchase receiving, cleaning and processing
//! pipelines, quality reports, and dashboard aggregations.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod queries;
pub mod request_id;
pub mod services;

use axum::{routing::get, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Shared application state passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: services::AppServices,
}

impl AppState {
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        event_sender: events::EventSender,
    ) -> Self {
        let services = services::AppServices::new(db.clone(), event_sender.clone());
        Self {
            db,
            config,
            event_sender,
            services,
        }
    }
}

/// The full API surface nested under `/raw`.
pub fn raw_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/warehouse", handlers::warehouses::warehouse_routes())
        .nest("/vendor", handlers::vendors::vendor_routes())
        .nest("/product", handlers::products::product_routes())
        .nest("/purchase", handlers::purchase_orders::purchase_order_routes())
        .nest("/stock", handlers::stock::stock_routes())
        .nest("/cleaning", handlers::cleaning::cleaning_routes())
        .route(
            "/cleaned-materials",
            get(handlers::cleaning::cleaned_materials),
        )
        .nest("/processing", handlers::processing::processing_routes())
        .nest("/dashboard", handlers::dashboard::dashboard_routes())
        .nest("/quality", handlers::quality::quality_routes())
}

/// Root router: liveness string, health probes, the `/raw` API and swagger.
pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "rawstock-api up" }))
        .merge(handlers::health::health_routes())
        .nest("/raw", raw_routes())
        .merge(openapi::swagger_ui())
        .layer(request_id::configure_http_tracing())
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .with_state(state)
}
