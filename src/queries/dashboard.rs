//! Dashboard aggregations. All of these fold over small result sets in
//! application code; sums over Decimal columns stay exact instead of passing
//! through driver-dependent SQL aggregate types.

use crate::{
    entities::{
        by_product, cleaning_job, current_stock, processing_job, purchase_order,
        purchase_order_item, raw_material_product, unfinished_stock, warehouse,
    },
    errors::ServiceError,
    queries::Query,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TotalStockRow {
    pub raw_material_id: Uuid,
    pub sku_code: String,
    pub material_name: String,
    pub warehouse_id: Uuid,
    pub warehouse_name: String,
    pub current_quantity: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TotalStockSummary {
    pub total_quantity: Decimal,
    pub rows: Vec<TotalStockRow>,
}

/// Σ current_quantity across every (material, warehouse) balance.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TotalStockQuery {}

#[async_trait]
impl Query for TotalStockQuery {
    type Result = TotalStockSummary;

    async fn execute(&self, db_pool: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        let balances = current_stock::Entity::find()
            .all(db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        let materials = material_index(db_pool).await?;
        let warehouses = warehouse_index(db_pool).await?;

        let mut total = Decimal::ZERO;
        let mut rows = Vec::with_capacity(balances.len());
        for balance in balances {
            total += balance.current_quantity;
            rows.push(TotalStockRow {
                raw_material_id: balance.raw_material_id,
                sku_code: materials
                    .get(&balance.raw_material_id)
                    .map(|m| m.sku_code.clone())
                    .unwrap_or_default(),
                material_name: materials
                    .get(&balance.raw_material_id)
                    .map(|m| m.name.clone())
                    .unwrap_or_default(),
                warehouse_id: balance.warehouse_id,
                warehouse_name: warehouses
                    .get(&balance.warehouse_id)
                    .map(|w| w.name.clone())
                    .unwrap_or_default(),
                current_quantity: balance.current_quantity,
            });
        }
        rows.sort_by(|a, b| a.sku_code.cmp(&b.sku_code));

        Ok(TotalStockSummary {
            total_quantity: total,
            rows,
        })
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PendingItemRow {
    pub item_id: Uuid,
    pub po_number: String,
    pub raw_material_id: Uuid,
    pub material_name: String,
    pub quantity_ordered: Decimal,
    pub quantity_received: Decimal,
    pub quantity_pending: Decimal,
    pub status: String,
}

/// Purchase order items not yet fully received.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PendingPurchaseOrderItemsQuery {}

#[async_trait]
impl Query for PendingPurchaseOrderItemsQuery {
    type Result = Vec<PendingItemRow>;

    async fn execute(&self, db_pool: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        let items = purchase_order_item::Entity::find()
            .filter(purchase_order_item::Column::Status.ne("Received"))
            .order_by_asc(purchase_order_item::Column::CreatedAt)
            .all(db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        let orders: HashMap<Uuid, purchase_order::Model> = purchase_order::Entity::find()
            .all(db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?
            .into_iter()
            .map(|o| (o.id, o))
            .collect();
        let materials = material_index(db_pool).await?;

        Ok(items
            .into_iter()
            .map(|item| PendingItemRow {
                item_id: item.id,
                po_number: orders
                    .get(&item.purchase_order_id)
                    .map(|o| o.po_number.clone())
                    .unwrap_or_default(),
                raw_material_id: item.raw_material_id,
                material_name: materials
                    .get(&item.raw_material_id)
                    .map(|m| m.name.clone())
                    .unwrap_or_default(),
                quantity_ordered: item.quantity_ordered,
                quantity_received: item.quantity_received,
                quantity_pending: (item.quantity_ordered - item.quantity_received)
                    .max(Decimal::ZERO),
                status: item.status,
            })
            .collect())
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StockUnderCleaningSummary {
    pub total_quantity: Decimal,
    pub job_count: u64,
}

/// Gross quantity held by cleaning jobs still in flight (Sent, In-Progress).
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StockUnderCleaningQuery {}

#[async_trait]
impl Query for StockUnderCleaningQuery {
    type Result = StockUnderCleaningSummary;

    async fn execute(&self, db_pool: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        let jobs = cleaning_job::Entity::find()
            .filter(cleaning_job::Column::Status.is_in(["Sent", "In-Progress"]))
            .all(db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(StockUnderCleaningSummary {
            total_quantity: jobs.iter().map(|j| j.quantity).sum(),
            job_count: jobs.len() as u64,
        })
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StockInProcessingSummary {
    pub total_quantity: Decimal,
    pub job_count: u64,
}

/// Input quantity held by processing jobs still in progress.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StockInProcessingQuery {}

#[async_trait]
impl Query for StockInProcessingQuery {
    type Result = StockInProcessingSummary;

    async fn execute(&self, db_pool: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        let jobs = processing_job::Entity::find()
            .filter(processing_job::Column::Status.eq("In-Progress"))
            .all(db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(StockInProcessingSummary {
            total_quantity: jobs.iter().map(|j| j.quantity_input).sum(),
            job_count: jobs.len() as u64,
        })
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LowStockAlertRow {
    pub raw_material_id: Uuid,
    pub sku_code: String,
    pub material_name: String,
    pub total_quantity: Decimal,
    pub min_reorder_level: Decimal,
}

/// Materials whose total across all warehouses is strictly below their
/// reorder level. A total exactly at the level is not flagged.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LowStockAlertsQuery {}

#[async_trait]
impl Query for LowStockAlertsQuery {
    type Result = Vec<LowStockAlertRow>;

    async fn execute(&self, db_pool: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        let balances = current_stock::Entity::find()
            .all(db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        let mut totals: HashMap<Uuid, Decimal> = HashMap::new();
        for balance in balances {
            *totals.entry(balance.raw_material_id).or_default() += balance.current_quantity;
        }

        let materials = raw_material_product::Entity::find()
            .order_by_asc(raw_material_product::Column::SkuCode)
            .all(db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(materials
            .into_iter()
            .filter_map(|m| {
                let total = totals.get(&m.id).copied().unwrap_or_default();
                if total < m.min_reorder_level {
                    Some(LowStockAlertRow {
                        raw_material_id: m.id,
                        sku_code: m.sku_code,
                        material_name: m.name,
                        total_quantity: total,
                        min_reorder_level: m.min_reorder_level,
                    })
                } else {
                    None
                }
            })
            .collect())
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WasteStockSummary {
    pub unfinished_quantity: Decimal,
    pub by_product_quantity: Decimal,
    pub total_quantity: Decimal,
}

/// Waste recorded across both pipelines: unfinished-stock rows plus
/// by-product output.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct WasteStockQuery {}

#[async_trait]
impl Query for WasteStockQuery {
    type Result = WasteStockSummary;

    async fn execute(&self, db_pool: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        let unfinished: Decimal = unfinished_stock::Entity::find()
            .all(db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?
            .iter()
            .map(|r| r.quantity)
            .sum();
        let by_products: Decimal = by_product::Entity::find()
            .all(db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?
            .iter()
            .map(|r| r.quantity)
            .sum();

        Ok(WasteStockSummary {
            unfinished_quantity: unfinished,
            by_product_quantity: by_products,
            total_quantity: unfinished + by_products,
        })
    }
}

async fn material_index(
    db_pool: &DatabaseConnection,
) -> Result<HashMap<Uuid, raw_material_product::Model>, ServiceError> {
    Ok(raw_material_product::Entity::find()
        .all(db_pool)
        .await
        .map_err(ServiceError::DatabaseError)?
        .into_iter()
        .map(|m| (m.id, m))
        .collect())
}

async fn warehouse_index(
    db_pool: &DatabaseConnection,
) -> Result<HashMap<Uuid, warehouse::Model>, ServiceError> {
    Ok(warehouse::Entity::find()
        .all(db_pool)
        .await
        .map_err(ServiceError::DatabaseError)?
        .into_iter()
        .map(|w| (w.id, w))
        .collect())
}
