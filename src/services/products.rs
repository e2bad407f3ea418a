//! Raw-material SKU master data.

use crate::{
    db::DbPool,
    entities::{current_stock, raw_material_product, stock_entry, vendor},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{instrument, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub sku_code: String,
    pub name: String,
    pub category: String,
    pub unit_of_measurement: String,
    pub min_reorder_level: Decimal,
    pub vendor_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub unit_of_measurement: Option<String>,
    pub min_reorder_level: Option<Decimal>,
    pub vendor_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct ProductService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl ProductService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, input))]
    pub async fn create_product(
        &self,
        input: NewProduct,
    ) -> Result<raw_material_product::Model, ServiceError> {
        if input.min_reorder_level < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "min_reorder_level cannot be negative".to_string(),
            ));
        }

        let duplicate = raw_material_product::Entity::find()
            .filter(raw_material_product::Column::SkuCode.eq(input.sku_code.clone()))
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if duplicate.is_some() {
            return Err(ServiceError::Conflict(format!(
                "SKU code {} already exists",
                input.sku_code
            )));
        }

        if let Some(vendor_id) = input.vendor_id {
            vendor::Entity::find_by_id(vendor_id)
                .one(&*self.db_pool)
                .await
                .map_err(ServiceError::DatabaseError)?
                .ok_or_else(|| ServiceError::NotFound(format!("Vendor {} not found", vendor_id)))?;
        }

        let now = Utc::now();
        let model = raw_material_product::ActiveModel {
            id: Set(Uuid::new_v4()),
            sku_code: Set(input.sku_code),
            name: Set(input.name),
            category: Set(input.category),
            unit_of_measurement: Set(input.unit_of_measurement),
            min_reorder_level: Set(input.min_reorder_level),
            vendor_id: Set(input.vendor_id),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db_pool)
        .await
        .map_err(ServiceError::DatabaseError)?;

        if let Err(e) = self
            .event_sender
            .send(Event::RawMaterialCreated(model.id))
            .await
        {
            warn!(error = %e, "failed to publish raw material event");
        }

        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get_product(
        &self,
        id: Uuid,
    ) -> Result<raw_material_product::Model, ServiceError> {
        raw_material_product::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Raw material {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        category: Option<String>,
    ) -> Result<Vec<raw_material_product::Model>, ServiceError> {
        let mut query = raw_material_product::Entity::find();
        if let Some(category) = category {
            query = query.filter(raw_material_product::Column::Category.eq(category));
        }
        query
            .order_by_asc(raw_material_product::Column::SkuCode)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self, patch))]
    pub async fn update_product(
        &self,
        id: Uuid,
        patch: ProductPatch,
    ) -> Result<raw_material_product::Model, ServiceError> {
        let existing = self.get_product(id).await?;

        if let Some(level) = patch.min_reorder_level {
            if level < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "min_reorder_level cannot be negative".to_string(),
                ));
            }
        }
        if let Some(vendor_id) = patch.vendor_id {
            vendor::Entity::find_by_id(vendor_id)
                .one(&*self.db_pool)
                .await
                .map_err(ServiceError::DatabaseError)?
                .ok_or_else(|| ServiceError::NotFound(format!("Vendor {} not found", vendor_id)))?;
        }

        let mut active: raw_material_product::ActiveModel = existing.into();
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(category) = patch.category {
            active.category = Set(category);
        }
        if let Some(unit) = patch.unit_of_measurement {
            active.unit_of_measurement = Set(unit);
        }
        if let Some(level) = patch.min_reorder_level {
            active.min_reorder_level = Set(level);
        }
        if let Some(vendor_id) = patch.vendor_id {
            active.vendor_id = Set(Some(vendor_id));
        }
        active.updated_at = Set(Utc::now());

        active
            .update(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Deletes a SKU. Rejected while any ledger entry or balance row exists
    /// against it.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get_product(id).await?;

        let entry_refs = stock_entry::Entity::find()
            .filter(stock_entry::Column::RawMaterialId.eq(id))
            .count(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        let balance_refs = current_stock::Entity::find()
            .filter(current_stock::Column::RawMaterialId.eq(id))
            .count(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if entry_refs + balance_refs > 0 {
            return Err(ServiceError::Conflict(format!(
                "SKU {} has stock history and cannot be deleted",
                existing.sku_code
            )));
        }

        raw_material_product::Entity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(())
    }
}
