//! Shared harness for integration tests: an in-memory SQLite database with
//! the full schema, the real router, and JSON helpers over `oneshot`.
#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    Router,
};
use chrono::Utc;
use http::{header, Method, Request, StatusCode};
use rawstock_api::{
    app_router,
    config::AppConfig,
    events,
    migrator::Migrator,
    services::AppServices,
    AppState,
};
use rust_decimal::Decimal;
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub struct TestApp {
    pub db: Arc<DatabaseConnection>,
    pub router: Router,
    pub services: AppServices,
}

fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "test".to_string(),
        log_level: "warn".to_string(),
        log_json: false,
        auto_migrate: true,
        db_max_connections: 1,
        db_min_connections: 1,
        cors_allowed_origins: None,
        cors_allow_any_origin: true,
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("connect in-memory sqlite");
        Migrator::up(&db, None).await.expect("run migrations");

        let db = Arc::new(db);
        let (event_sender, event_rx) = events::channel(256);
        tokio::spawn(events::process_events(event_rx));

        let state = Arc::new(AppState::new(db.clone(), test_config(), event_sender));
        TestApp {
            db,
            router: app_router(state.clone()),
            services: state.services.clone(),
        }
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(path);
        let request = match body {
            Some(value) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(value.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router never fails");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        self.request(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, path, None).await
    }

    // --- seed helpers ----------------------------------------------------

    pub async fn seed_warehouse(&self, name: &str) -> Uuid {
        let (status, body) = self
            .post(
                "/raw/warehouse",
                json!({ "name": name, "location": format!("{} district", name) }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "seed warehouse: {}", body);
        id_of(&body)
    }

    pub async fn seed_vendor(&self, name: &str) -> Uuid {
        let (status, body) = self
            .post("/raw/vendor", json!({ "name": name }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "seed vendor: {}", body);
        id_of(&body)
    }

    pub async fn seed_product(&self, sku: &str, min_reorder_level: &str) -> Uuid {
        let (status, body) = self
            .post(
                "/raw/product",
                json!({
                    "sku_code": sku,
                    "name": format!("Material {}", sku),
                    "category": "Grain",
                    "unit_of_measurement": "kg",
                    "min_reorder_level": min_reorder_level,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "seed product: {}", body);
        id_of(&body)
    }

    /// Creates a single-item purchase order and receives the full quantity
    /// into `warehouse_id`, putting `quantity` on the ledger as an IN entry.
    pub async fn receive_stock(
        &self,
        vendor_id: Uuid,
        raw_material_id: Uuid,
        warehouse_id: Uuid,
        quantity: &str,
    ) -> Uuid {
        let (status, body) = self
            .post(
                "/raw/purchase",
                json!({
                    "vendor_id": vendor_id,
                    "order_date": Utc::now(),
                    "expected_date": Utc::now(),
                    "items": [{
                        "raw_material_id": raw_material_id,
                        "quantity_ordered": quantity,
                        "rate": "10.00",
                    }],
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "seed purchase order: {}", body);
        let item_id = id_of(&body["items"][0]);

        let (status, body) = self
            .put(
                &format!("/raw/purchase/item/{}", item_id),
                json!({ "delta_received": quantity, "warehouse_id": warehouse_id }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "receive stock: {}", body);
        item_id
    }

    pub async fn balance(&self, raw_material_id: Uuid, warehouse_id: Uuid) -> Decimal {
        self.services
            .current_stock
            .balance(raw_material_id, warehouse_id)
            .await
            .expect("balance")
    }

    pub async fn replayed_balance(&self, raw_material_id: Uuid, warehouse_id: Uuid) -> Decimal {
        self.services
            .stock_entries
            .replay_balance(raw_material_id, warehouse_id)
            .await
            .expect("replay balance")
    }
}

/// Extracts the `id` field from a created JSON payload.
pub fn id_of(value: &Value) -> Uuid {
    value["id"]
        .as_str()
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .unwrap_or_else(|| panic!("payload without id: {}", value))
}

/// Reads a decimal field that may serialize as a JSON string or number.
pub fn dec_field(value: &Value, key: &str) -> Decimal {
    match &value[key] {
        Value::String(raw) => Decimal::from_str(raw).expect("decimal string"),
        Value::Number(n) => Decimal::from_str(&n.to_string()).expect("decimal number"),
        other => panic!("field '{}' is not a decimal: {}", key, other),
    }
}
