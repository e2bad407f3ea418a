//! Append-only stock-entry ledger.
//!
//! The ledger is the source of truth for every quantity movement; nothing is
//! ever mutated to undo a movement. Corrections are new entries, and the
//! current-stock aggregate can always be rebuilt with `replay_balance`.

use crate::{
    db::DbPool,
    entities::stock_entry,
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::str::FromStr;
use std::sync::Arc;
use strum::{Display, EnumString};
use tracing::{instrument, warn};
use uuid::Uuid;

/// Ledger entry vocabulary. RESERVED/RELEASED implement the two-phase
/// reservation used by workflow jobs: a reservation withdraws the aggregate
/// without being a completed movement yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum EntryType {
    #[strum(serialize = "IN")]
    In,
    #[strum(serialize = "OUT")]
    Out,
    #[strum(serialize = "RESERVED")]
    Reserved,
    #[strum(serialize = "RELEASED")]
    Released,
}

impl EntryType {
    /// Contribution of one unit of this entry type to the replayed balance.
    pub fn sign(self) -> i32 {
        match self {
            EntryType::In | EntryType::Released => 1,
            EntryType::Out | EntryType::Reserved => -1,
        }
    }
}

/// Input for a ledger append.
#[derive(Debug, Clone)]
pub struct NewStockEntry {
    pub raw_material_id: Uuid,
    pub warehouse_id: Uuid,
    pub quantity: Decimal,
    pub entry_type: EntryType,
    pub reference_id: Option<Uuid>,
    pub status: String,
    pub reason_code: Option<String>,
    pub batch_number: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,
}

/// Administrative metadata correction. Does NOT reconcile the current-stock
/// aggregate; callers needing the aggregate adjusted must move stock through
/// new entries.
#[derive(Debug, Clone, Default)]
pub struct StockEntryPatch {
    pub status: Option<String>,
    pub reason_code: Option<String>,
    pub quantity: Option<Decimal>,
}

#[derive(Debug, Clone, Default)]
pub struct StockEntryFilter {
    pub raw_material_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    pub entry_type: Option<EntryType>,
    pub status: Option<String>,
}

#[derive(Clone)]
pub struct StockEntryService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl StockEntryService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Appends a ledger entry. The aggregate is not touched here; movement
    /// paths (PO receipt, cleaning jobs) pair the append with an aggregate
    /// update inside their own transaction.
    #[instrument(skip(self, entry))]
    pub async fn record_entry(
        &self,
        entry: NewStockEntry,
    ) -> Result<stock_entry::Model, ServiceError> {
        let model = append(&*self.db_pool, entry).await?;

        let event = Event::StockEntryRecorded {
            entry_id: model.id,
            raw_material_id: model.raw_material_id,
            warehouse_id: model.warehouse_id,
            entry_type: model.entry_type.clone(),
            quantity: model.quantity,
        };
        if let Err(e) = self.event_sender.send(event).await {
            warn!(error = %e, "failed to publish stock entry event");
        }

        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get_entry(&self, id: Uuid) -> Result<stock_entry::Model, ServiceError> {
        stock_entry::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Stock entry {} not found", id)))
    }

    /// Administrative correction of entry metadata.
    #[instrument(skip(self, patch))]
    pub async fn update_entry(
        &self,
        id: Uuid,
        patch: StockEntryPatch,
    ) -> Result<stock_entry::Model, ServiceError> {
        let existing = self.get_entry(id).await?;

        if let Some(quantity) = patch.quantity {
            if quantity <= Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "quantity must be positive".to_string(),
                ));
            }
        }

        let mut active: stock_entry::ActiveModel = existing.into();
        if let Some(status) = patch.status {
            active.status = Set(status);
        }
        if let Some(reason_code) = patch.reason_code {
            active.reason_code = Set(Some(reason_code));
        }
        if let Some(quantity) = patch.quantity {
            active.quantity = Set(quantity);
        }

        active
            .update(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Lists ledger entries, newest first.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: StockEntryFilter,
    ) -> Result<Vec<stock_entry::Model>, ServiceError> {
        let mut query = stock_entry::Entity::find();
        if let Some(material) = filter.raw_material_id {
            query = query.filter(stock_entry::Column::RawMaterialId.eq(material));
        }
        if let Some(warehouse) = filter.warehouse_id {
            query = query.filter(stock_entry::Column::WarehouseId.eq(warehouse));
        }
        if let Some(entry_type) = filter.entry_type {
            query = query.filter(stock_entry::Column::EntryType.eq(entry_type.to_string()));
        }
        if let Some(status) = filter.status {
            query = query.filter(stock_entry::Column::Status.eq(status));
        }

        query
            .order_by_desc(stock_entry::Column::CreatedAt)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Rebuilds the balance for a key from the full ledger. At rest this must
    /// equal the stored current-stock aggregate for the same key.
    #[instrument(skip(self))]
    pub async fn replay_balance(
        &self,
        raw_material_id: Uuid,
        warehouse_id: Uuid,
    ) -> Result<Decimal, ServiceError> {
        let entries = stock_entry::Entity::find()
            .filter(stock_entry::Column::RawMaterialId.eq(raw_material_id))
            .filter(stock_entry::Column::WarehouseId.eq(warehouse_id))
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(replay(&entries))
    }
}

/// Appends a ledger entry on an arbitrary connection (pool or transaction).
pub async fn append<C: ConnectionTrait>(
    conn: &C,
    entry: NewStockEntry,
) -> Result<stock_entry::Model, ServiceError> {
    if entry.quantity <= Decimal::ZERO {
        return Err(ServiceError::ValidationError(
            "stock entry quantity must be positive".to_string(),
        ));
    }

    let model = stock_entry::ActiveModel {
        id: Set(Uuid::new_v4()),
        raw_material_id: Set(entry.raw_material_id),
        warehouse_id: Set(entry.warehouse_id),
        batch_number: Set(entry.batch_number),
        expiry_date: Set(entry.expiry_date),
        quantity: Set(entry.quantity),
        entry_type: Set(entry.entry_type.to_string()),
        reference_id: Set(entry.reference_id),
        status: Set(entry.status),
        reason_code: Set(entry.reason_code),
        created_at: Set(Utc::now()),
    };

    model
        .insert(conn)
        .await
        .map_err(ServiceError::DatabaseError)
}

/// Folds a set of ledger entries into a balance:
/// IN + RELEASED - OUT - RESERVED.
pub fn replay(entries: &[stock_entry::Model]) -> Decimal {
    entries
        .iter()
        .map(|e| {
            let sign = EntryType::from_str(&e.entry_type)
                .map(EntryType::sign)
                .unwrap_or(0);
            e.quantity * Decimal::from(sign)
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn entry(entry_type: EntryType, quantity: Decimal) -> stock_entry::Model {
        stock_entry::Model {
            id: Uuid::new_v4(),
            raw_material_id: Uuid::nil(),
            warehouse_id: Uuid::nil(),
            batch_number: None,
            expiry_date: None,
            quantity,
            entry_type: entry_type.to_string(),
            reference_id: None,
            status: "Completed".to_string(),
            reason_code: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn replay_sums_in_minus_out() {
        let entries = vec![
            entry(EntryType::In, dec!(100)),
            entry(EntryType::Out, dec!(30)),
            entry(EntryType::In, dec!(5)),
        ];
        assert_eq!(replay(&entries), dec!(75));
    }

    #[test]
    fn reservation_lifecycle_nets_to_zero() {
        // reserve then finalize: RESERVED(-q) + RELEASED(+q) + OUT(-q)
        let entries = vec![
            entry(EntryType::In, dec!(100)),
            entry(EntryType::Reserved, dec!(100)),
            entry(EntryType::Released, dec!(100)),
            entry(EntryType::Out, dec!(100)),
        ];
        assert_eq!(replay(&entries), dec!(0));
    }

    #[test]
    fn cancelled_reservation_restores_balance() {
        let entries = vec![
            entry(EntryType::In, dec!(40)),
            entry(EntryType::Reserved, dec!(40)),
            entry(EntryType::Released, dec!(40)),
        ];
        assert_eq!(replay(&entries), dec!(40));
    }

    #[test]
    fn unknown_entry_types_are_ignored_in_replay() {
        let mut bogus = entry(EntryType::In, dec!(10));
        bogus.entry_type = "MYSTERY".to_string();
        assert_eq!(replay(&[bogus]), dec!(0));
    }

    #[test]
    fn entry_type_roundtrips_through_strings() {
        for et in [
            EntryType::In,
            EntryType::Out,
            EntryType::Reserved,
            EntryType::Released,
        ] {
            assert_eq!(EntryType::from_str(&et.to_string()).unwrap(), et);
        }
    }
}
