//! Warehouse master data.

use crate::{
    db::DbPool,
    entities::{cleaning_job, current_stock, processing_job, stock_entry, warehouse},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use sea_orm::sea_query::Condition;
use std::sync::Arc;
use tracing::{instrument, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewWarehouse {
    pub name: String,
    pub location: String,
}

#[derive(Debug, Clone, Default)]
pub struct WarehousePatch {
    pub name: Option<String>,
    pub location: Option<String>,
}

#[derive(Clone)]
pub struct WarehouseService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl WarehouseService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, input))]
    pub async fn create_warehouse(
        &self,
        input: NewWarehouse,
    ) -> Result<warehouse::Model, ServiceError> {
        let now = Utc::now();
        let model = warehouse::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            location: Set(input.location),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db_pool)
        .await
        .map_err(ServiceError::DatabaseError)?;

        if let Err(e) = self
            .event_sender
            .send(Event::WarehouseCreated(model.id))
            .await
        {
            warn!(error = %e, "failed to publish warehouse event");
        }

        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get_warehouse(&self, id: Uuid) -> Result<warehouse::Model, ServiceError> {
        warehouse::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Warehouse {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn list_warehouses(&self) -> Result<Vec<warehouse::Model>, ServiceError> {
        warehouse::Entity::find()
            .order_by_asc(warehouse::Column::Name)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self, patch))]
    pub async fn update_warehouse(
        &self,
        id: Uuid,
        patch: WarehousePatch,
    ) -> Result<warehouse::Model, ServiceError> {
        let existing = self.get_warehouse(id).await?;

        let mut active: warehouse::ActiveModel = existing.into();
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(location) = patch.location {
            active.location = Set(location);
        }
        active.updated_at = Set(Utc::now());

        active
            .update(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Deletes a warehouse. Rejected while any ledger entry, balance row, or
    /// workflow job still references it; history must stay resolvable.
    #[instrument(skip(self))]
    pub async fn delete_warehouse(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get_warehouse(id).await?;

        let entry_refs = stock_entry::Entity::find()
            .filter(stock_entry::Column::WarehouseId.eq(id))
            .count(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        let balance_refs = current_stock::Entity::find()
            .filter(current_stock::Column::WarehouseId.eq(id))
            .count(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        let cleaning_refs = cleaning_job::Entity::find()
            .filter(
                Condition::any()
                    .add(cleaning_job::Column::FromWarehouseId.eq(id))
                    .add(cleaning_job::Column::ToWarehouseId.eq(id)),
            )
            .count(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        let processing_refs = processing_job::Entity::find()
            .filter(processing_job::Column::SourceWarehouseId.eq(id))
            .count(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let total = entry_refs + balance_refs + cleaning_refs + processing_refs;
        if total > 0 {
            return Err(ServiceError::Conflict(format!(
                "Warehouse {} is referenced by {} record(s) and cannot be deleted",
                existing.name, total
            )));
        }

        warehouse::Entity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(())
    }
}
