//! Per (material, warehouse) balance cache over the stock-entry ledger.
//!
//! Every mutation is a single atomic SQL statement so concurrent receipts and
//! reservations against the same key cannot lose updates. Callers compose the
//! statements with ledger appends inside one transaction.

use crate::{
    db::DbPool,
    entities::{current_stock, raw_material_product, warehouse},
    errors::ServiceError,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Statement,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

/// One balance row joined with display names for the dashboard.
#[derive(Debug, Clone, Serialize, FromQueryResult, ToSchema)]
pub struct StockDistributionRow {
    pub raw_material_id: Uuid,
    pub sku_code: String,
    pub material_name: String,
    pub unit_of_measurement: String,
    pub warehouse_id: Uuid,
    pub warehouse_name: String,
    pub current_quantity: Decimal,
}

#[derive(Clone)]
pub struct CurrentStockService {
    db_pool: Arc<DbPool>,
}

impl CurrentStockService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Returns the stored balance for a key, zero when no row exists.
    #[instrument(skip(self))]
    pub async fn balance(
        &self,
        raw_material_id: Uuid,
        warehouse_id: Uuid,
    ) -> Result<Decimal, ServiceError> {
        balance_on(&*self.db_pool, raw_material_id, warehouse_id).await
    }

    /// All balances joined with material and warehouse names.
    #[instrument(skip(self))]
    pub async fn list_with_details(&self) -> Result<Vec<StockDistributionRow>, ServiceError> {
        let rows = current_stock::Entity::find()
            .select_only()
            .column(current_stock::Column::RawMaterialId)
            .column_as(raw_material_product::Column::SkuCode, "sku_code")
            .column_as(raw_material_product::Column::Name, "material_name")
            .column(raw_material_product::Column::UnitOfMeasurement)
            .column(current_stock::Column::WarehouseId)
            .column_as(warehouse::Column::Name, "warehouse_name")
            .column(current_stock::Column::CurrentQuantity)
            .join(
                JoinType::InnerJoin,
                current_stock::Relation::RawMaterialProduct.def(),
            )
            .join(JoinType::InnerJoin, current_stock::Relation::Warehouse.def())
            .order_by_asc(raw_material_product::Column::SkuCode)
            .into_model::<StockDistributionRow>()
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(rows)
    }
}

/// Reads the balance on an arbitrary connection (pool or transaction).
pub async fn balance_on<C: ConnectionTrait>(
    conn: &C,
    raw_material_id: Uuid,
    warehouse_id: Uuid,
) -> Result<Decimal, ServiceError> {
    let row = current_stock::Entity::find()
        .filter(current_stock::Column::RawMaterialId.eq(raw_material_id))
        .filter(current_stock::Column::WarehouseId.eq(warehouse_id))
        .one(conn)
        .await
        .map_err(ServiceError::DatabaseError)?;

    Ok(row.map(|r| r.current_quantity).unwrap_or_default())
}

/// Adds `delta` to the balance with a single upsert statement; creates the
/// row when absent. `delta` may be negative for compensating releases that
/// are known not to underflow.
pub async fn apply_delta<C: ConnectionTrait>(
    conn: &C,
    raw_material_id: Uuid,
    warehouse_id: Uuid,
    delta: Decimal,
) -> Result<(), ServiceError> {
    let backend = conn.get_database_backend();
    let stmt = Statement::from_sql_and_values(
        backend,
        "INSERT INTO current_stocks (id, raw_material_id, warehouse_id, current_quantity, last_updated) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT(raw_material_id, warehouse_id) DO UPDATE SET \
         current_quantity = current_stocks.current_quantity + excluded.current_quantity, \
         last_updated = excluded.last_updated",
        [
            Uuid::new_v4().into(),
            raw_material_id.into(),
            warehouse_id.into(),
            delta.into(),
            Utc::now().into(),
        ],
    );

    conn.execute(stmt)
        .await
        .map_err(ServiceError::DatabaseError)?;
    Ok(())
}

/// Subtracts `quantity` only when the balance covers it. The guard rides in
/// the UPDATE's WHERE clause, so two concurrent withdrawals cannot both
/// succeed against the same units.
pub async fn withdraw<C: ConnectionTrait>(
    conn: &C,
    raw_material_id: Uuid,
    warehouse_id: Uuid,
    quantity: Decimal,
) -> Result<(), ServiceError> {
    let backend = conn.get_database_backend();
    let stmt = Statement::from_sql_and_values(
        backend,
        "UPDATE current_stocks SET \
         current_quantity = current_quantity - $3, last_updated = $4 \
         WHERE raw_material_id = $1 AND warehouse_id = $2 AND current_quantity >= $3",
        [
            raw_material_id.into(),
            warehouse_id.into(),
            quantity.into(),
            Utc::now().into(),
        ],
    );

    let result = conn
        .execute(stmt)
        .await
        .map_err(ServiceError::DatabaseError)?;

    if result.rows_affected() == 0 {
        let available = balance_on(conn, raw_material_id, warehouse_id).await?;
        return Err(ServiceError::InsufficientStock(format!(
            "{} available at warehouse {}, {} requested",
            available, warehouse_id, quantity
        )));
    }

    Ok(())
}
