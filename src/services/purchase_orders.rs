//! Purchase orders and the inbound receiving path.
//!
//! Receiving is the only way quantity enters the ledger. The receive
//! transaction bumps the line item, appends an IN entry, and increments the
//! current-stock aggregate together, so a failure anywhere leaves no partial
//! receipt behind.

use crate::{
    db::DbPool,
    entities::{purchase_order, purchase_order_item, raw_material_product, vendor, warehouse},
    errors::ServiceError,
    events::{Event, EventSender},
    services::{current_stock, sequences, stock_entries},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::sync::Arc;
use strum::{Display, EnumString};
use tracing::{instrument, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum PurchaseOrderStatus {
    Pending,
    #[strum(serialize = "Partially-Received")]
    PartiallyReceived,
    Received,
}

#[derive(Debug, Clone)]
pub struct NewPurchaseOrderItem {
    pub raw_material_id: Uuid,
    pub quantity_ordered: Decimal,
    pub rate: Decimal,
}

#[derive(Debug, Clone)]
pub struct NewPurchaseOrder {
    pub vendor_id: Uuid,
    pub order_date: DateTime<Utc>,
    pub expected_date: DateTime<Utc>,
    pub items: Vec<NewPurchaseOrderItem>,
}

#[derive(Debug, Clone)]
pub struct PurchaseOrderWithItems {
    pub order: purchase_order::Model,
    pub items: Vec<purchase_order_item::Model>,
}

#[derive(Debug, Clone, Default)]
pub struct PurchaseOrderFilter {
    pub vendor_id: Option<Uuid>,
    pub status: Option<String>,
}

#[derive(Clone)]
pub struct PurchaseOrderService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl PurchaseOrderService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a purchase order with its line items in one transaction.
    #[instrument(skip(self, input))]
    pub async fn create_purchase_order(
        &self,
        input: NewPurchaseOrder,
    ) -> Result<PurchaseOrderWithItems, ServiceError> {
        if input.items.is_empty() {
            return Err(ServiceError::ValidationError(
                "purchase order requires at least one item".to_string(),
            ));
        }
        for item in &input.items {
            if item.quantity_ordered <= Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "item quantity_ordered must be positive".to_string(),
                ));
            }
        }

        let vendor = vendor::Entity::find_by_id(input.vendor_id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Vendor {} not found", input.vendor_id))
            })?;
        if !vendor.enabled {
            return Err(ServiceError::InvalidOperation(format!(
                "Vendor {} is disabled",
                vendor.vendor_code
            )));
        }

        let material_ids: Vec<Uuid> = input.items.iter().map(|i| i.raw_material_id).collect();
        let known = raw_material_product::Entity::find()
            .filter(raw_material_product::Column::Id.is_in(material_ids.clone()))
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        for id in &material_ids {
            if !known.iter().any(|m| m.id == *id) {
                return Err(ServiceError::NotFound(format!(
                    "Raw material {} not found",
                    id
                )));
            }
        }

        let created = self
            .db_pool
            .transaction::<_, PurchaseOrderWithItems, ServiceError>(|txn| {
                Box::pin(async move {
                    let sequence = sequences::next_value(txn, "purchase_order").await?;
                    let now = Utc::now();
                    let po_number =
                        format!("PO-{}-{:04}", input.order_date.format("%Y%m%d"), sequence);

                    let order = purchase_order::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        po_number: Set(po_number),
                        vendor_id: Set(input.vendor_id),
                        order_date: Set(input.order_date),
                        expected_date: Set(input.expected_date),
                        status: Set(PurchaseOrderStatus::Pending.to_string()),
                        created_at: Set(now),
                        updated_at: Set(now),
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::DatabaseError)?;

                    let mut items = Vec::with_capacity(input.items.len());
                    for item in input.items {
                        let model = purchase_order_item::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            purchase_order_id: Set(order.id),
                            raw_material_id: Set(item.raw_material_id),
                            quantity_ordered: Set(item.quantity_ordered),
                            quantity_received: Set(Decimal::ZERO),
                            rate: Set(item.rate),
                            status: Set(PurchaseOrderStatus::Pending.to_string()),
                            created_at: Set(now),
                            updated_at: Set(now),
                        }
                        .insert(txn)
                        .await
                        .map_err(ServiceError::DatabaseError)?;
                        items.push(model);
                    }

                    Ok(PurchaseOrderWithItems { order, items })
                })
            })
            .await
            .map_err(ServiceError::from)?;

        if let Err(e) = self
            .event_sender
            .send(Event::PurchaseOrderCreated(created.order.id))
            .await
        {
            warn!(error = %e, "failed to publish purchase order event");
        }

        Ok(created)
    }

    /// Receives a delta quantity against a line item. `delta_received` is a
    /// delta, never a cumulative total; two receipts of 30 and 20 leave
    /// quantity_received at 50.
    #[instrument(skip(self))]
    pub async fn receive_item(
        &self,
        item_id: Uuid,
        delta_received: Decimal,
        warehouse_id: Uuid,
        batch_number: Option<String>,
        expiry_date: Option<DateTime<Utc>>,
    ) -> Result<purchase_order_item::Model, ServiceError> {
        if delta_received <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "delta_received must be positive".to_string(),
            ));
        }

        warehouse::Entity::find_by_id(warehouse_id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Warehouse {} not found", warehouse_id)))?;

        let (updated, entry_id) = self
            .db_pool
            .transaction::<_, (purchase_order_item::Model, Uuid), ServiceError>(|txn| {
                Box::pin(async move {
                    let item = purchase_order_item::Entity::find_by_id(item_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::DatabaseError)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!(
                                "Purchase order item {} not found",
                                item_id
                            ))
                        })?;

                    let new_received = item.quantity_received + delta_received;
                    let item_status = if new_received >= item.quantity_ordered {
                        PurchaseOrderStatus::Received
                    } else {
                        PurchaseOrderStatus::PartiallyReceived
                    };

                    let raw_material_id = item.raw_material_id;
                    let order_id = item.purchase_order_id;

                    let mut active: purchase_order_item::ActiveModel = item.into();
                    active.quantity_received = Set(new_received);
                    active.status = Set(item_status.to_string());
                    active.updated_at = Set(Utc::now());
                    let updated = active
                        .update(txn)
                        .await
                        .map_err(ServiceError::DatabaseError)?;

                    let entry = stock_entries::append(
                        txn,
                        stock_entries::NewStockEntry {
                            raw_material_id,
                            warehouse_id,
                            quantity: delta_received,
                            entry_type: stock_entries::EntryType::In,
                            reference_id: Some(item_id),
                            status: "Completed".to_string(),
                            reason_code: Some("PO_RECEIPT".to_string()),
                            batch_number,
                            expiry_date,
                        },
                    )
                    .await?;

                    current_stock::apply_delta(txn, raw_material_id, warehouse_id, delta_received)
                        .await?;

                    roll_up_order_status(txn, order_id).await?;

                    Ok((updated, entry.id))
                })
            })
            .await
            .map_err(ServiceError::from)?;

        let event = Event::PurchaseOrderItemReceived {
            item_id,
            raw_material_id: updated.raw_material_id,
            warehouse_id,
            delta_received,
            stock_entry_id: entry_id,
        };
        if let Err(e) = self.event_sender.send(event).await {
            warn!(error = %e, "failed to publish receive event");
        }

        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn get_purchase_order(
        &self,
        id: Uuid,
    ) -> Result<PurchaseOrderWithItems, ServiceError> {
        let order = purchase_order::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Purchase order {} not found", id)))?;

        let items = purchase_order_item::Entity::find()
            .filter(purchase_order_item::Column::PurchaseOrderId.eq(id))
            .order_by_asc(purchase_order_item::Column::CreatedAt)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(PurchaseOrderWithItems { order, items })
    }

    #[instrument(skip(self))]
    pub async fn list_purchase_orders(
        &self,
        filter: PurchaseOrderFilter,
    ) -> Result<Vec<purchase_order::Model>, ServiceError> {
        let mut query = purchase_order::Entity::find();
        if let Some(vendor_id) = filter.vendor_id {
            query = query.filter(purchase_order::Column::VendorId.eq(vendor_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(purchase_order::Column::Status.eq(status));
        }

        query
            .order_by_desc(purchase_order::Column::OrderDate)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Line items not yet fully received, across all orders.
    #[instrument(skip(self))]
    pub async fn pending_items(&self) -> Result<Vec<purchase_order_item::Model>, ServiceError> {
        purchase_order_item::Entity::find()
            .filter(
                purchase_order_item::Column::Status
                    .ne(PurchaseOrderStatus::Received.to_string()),
            )
            .order_by_asc(purchase_order_item::Column::CreatedAt)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)
    }
}

/// Recomputes the order status from its items: Received when every item is
/// fully received, Partially-Received when any quantity has landed.
async fn roll_up_order_status<C: sea_orm::ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
) -> Result<(), ServiceError> {
    let items = purchase_order_item::Entity::find()
        .filter(purchase_order_item::Column::PurchaseOrderId.eq(order_id))
        .all(conn)
        .await
        .map_err(ServiceError::DatabaseError)?;

    let all_received = items
        .iter()
        .all(|i| i.status == PurchaseOrderStatus::Received.to_string());
    let any_received = items.iter().any(|i| i.quantity_received > Decimal::ZERO);

    let status = if all_received {
        PurchaseOrderStatus::Received
    } else if any_received {
        PurchaseOrderStatus::PartiallyReceived
    } else {
        PurchaseOrderStatus::Pending
    };

    let order = purchase_order::Entity::find_by_id(order_id)
        .one(conn)
        .await
        .map_err(ServiceError::DatabaseError)?
        .ok_or_else(|| ServiceError::NotFound(format!("Purchase order {} not found", order_id)))?;

    if order.status != status.to_string() {
        let mut active: purchase_order::ActiveModel = order.into();
        active.status = Set(status.to_string());
        active.updated_at = Set(Utc::now());
        active
            .update(conn)
            .await
            .map_err(ServiceError::DatabaseError)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_serializes_with_hyphen() {
        assert_eq!(
            PurchaseOrderStatus::PartiallyReceived.to_string(),
            "Partially-Received"
        );
        assert_eq!(
            PurchaseOrderStatus::from_str("Partially-Received").unwrap(),
            PurchaseOrderStatus::PartiallyReceived
        );
    }
}
