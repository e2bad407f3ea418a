//! Cleaning job pipeline.
//!
//! Creating a job reserves stock at the source warehouse: the aggregate drops
//! immediately and a RESERVED ledger entry records the hold. The reservation
//! resolves exactly once, either by finalization (first transition into
//! Cleaned or Finished, which appends a RELEASED/OUT pair so the ledger shows
//! the completed movement without touching the aggregate again) or by
//! cancellation (RELEASED plus an aggregate re-increment, netting the whole
//! job to zero).

use crate::{
    db::DbPool,
    entities::{
        cleaning_job, cleaning_log, processing_job, raw_material_product, unfinished_stock,
        warehouse,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{current_stock, sequences, stock_entries},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use strum::{Display, EnumString};
use tracing::{instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum CleaningJobStatus {
    Sent,
    #[strum(serialize = "In-Progress")]
    InProgress,
    Cleaned,
    Finished,
    Cancelled,
}

impl CleaningJobStatus {
    /// Statuses that finalize the reservation when first entered.
    pub fn finalizes(self) -> bool {
        matches!(self, CleaningJobStatus::Cleaned | CleaningJobStatus::Finished)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, CleaningJobStatus::Finished | CleaningJobStatus::Cancelled)
    }
}

#[derive(Debug, Clone)]
pub struct NewCleaningJob {
    pub raw_material_id: Uuid,
    pub from_warehouse_id: Uuid,
    pub to_warehouse_id: Uuid,
    pub quantity: Decimal,
    pub status: CleaningJobStatus,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct CleaningJobPatch {
    pub status: Option<CleaningJobStatus>,
    pub quantity: Option<Decimal>,
    pub to_warehouse_id: Option<Uuid>,
    pub finished_at: Option<DateTime<Utc>>,
    pub leftover_quantity: Option<Decimal>,
    pub leftover_reason: Option<String>,
}

/// Derived per (material, destination warehouse) availability of cleaned
/// material. `available` is clamped at zero; the pool is informational, not
/// an authoritative gate.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CleanedMaterialRow {
    pub raw_material_id: Uuid,
    pub sku_code: String,
    pub material_name: String,
    pub warehouse_id: Uuid,
    pub warehouse_name: String,
    pub cleaned_quantity: Decimal,
    pub waste_quantity: Decimal,
    pub in_processing: Decimal,
    pub available: Decimal,
}

#[derive(Clone)]
pub struct CleaningService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl CleaningService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a cleaning job and reserves its quantity at the source
    /// warehouse. Insufficient stock fails the whole transaction; no job row
    /// is left behind.
    #[instrument(skip(self, input))]
    pub async fn create_job(
        &self,
        input: NewCleaningJob,
    ) -> Result<cleaning_job::Model, ServiceError> {
        if input.quantity <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "cleaning quantity must be positive".to_string(),
            ));
        }
        if input.status.finalizes() || input.status == CleaningJobStatus::Cancelled {
            return Err(ServiceError::ValidationError(format!(
                "cleaning job cannot be created in status {}",
                input.status
            )));
        }
        if input.from_warehouse_id == input.to_warehouse_id {
            return Err(ServiceError::ValidationError(
                "source and destination warehouse must differ".to_string(),
            ));
        }

        for warehouse_id in [input.from_warehouse_id, input.to_warehouse_id] {
            warehouse::Entity::find_by_id(warehouse_id)
                .one(&*self.db_pool)
                .await
                .map_err(ServiceError::DatabaseError)?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Warehouse {} not found", warehouse_id))
                })?;
        }
        raw_material_product::Entity::find_by_id(input.raw_material_id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Raw material {} not found", input.raw_material_id))
            })?;

        let job = self
            .db_pool
            .transaction::<_, cleaning_job::Model, ServiceError>(|txn| {
                Box::pin(async move {
                    let job_number =
                        sequences::next_display_number(txn, "cleaning_job", "CJ", 5).await?;
                    let now = Utc::now();

                    let job = cleaning_job::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        job_number: Set(job_number),
                        raw_material_id: Set(input.raw_material_id),
                        from_warehouse_id: Set(input.from_warehouse_id),
                        to_warehouse_id: Set(input.to_warehouse_id),
                        quantity: Set(input.quantity),
                        status: Set(input.status.to_string()),
                        started_at: Set(input.started_at),
                        finished_at: Set(None),
                        created_at: Set(now),
                        updated_at: Set(now),
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::DatabaseError)?;

                    current_stock::withdraw(
                        txn,
                        input.raw_material_id,
                        input.from_warehouse_id,
                        input.quantity,
                    )
                    .await?;

                    stock_entries::append(
                        txn,
                        stock_entries::NewStockEntry {
                            raw_material_id: input.raw_material_id,
                            warehouse_id: input.from_warehouse_id,
                            quantity: input.quantity,
                            entry_type: stock_entries::EntryType::Reserved,
                            reference_id: Some(job.id),
                            status: "Reserved".to_string(),
                            reason_code: Some("CLEANING_RESERVE".to_string()),
                            batch_number: None,
                            expiry_date: None,
                        },
                    )
                    .await?;

                    Ok(job)
                })
            })
            .await
            .map_err(ServiceError::from)?;

        let event = Event::CleaningJobCreated {
            job_id: job.id,
            job_number: job.job_number.clone(),
            reserved_quantity: job.quantity,
        };
        if let Err(e) = self.event_sender.send(event).await {
            warn!(error = %e, "failed to publish cleaning job event");
        }

        Ok(job)
    }

    /// Updates a job. Quantity changes adjust the reservation by the delta.
    /// The first transition into Cleaned or Finished finalizes the
    /// reservation and records any leftover as waste.
    #[instrument(skip(self, patch))]
    pub async fn update_job(
        &self,
        id: Uuid,
        patch: CleaningJobPatch,
    ) -> Result<cleaning_job::Model, ServiceError> {
        let updated = self
            .db_pool
            .transaction::<_, cleaning_job::Model, ServiceError>(|txn| {
                Box::pin(async move { apply_update(txn, id, patch).await })
            })
            .await
            .map_err(ServiceError::from)?;

        if CleaningJobStatus::try_from_str(&updated.status)
            .map(CleaningJobStatus::finalizes)
            .unwrap_or(false)
        {
            let waste = waste_for_job(&*self.db_pool, updated.id).await.unwrap_or_default();
            let event = Event::CleaningJobResolved {
                job_id: updated.id,
                status: updated.status.clone(),
                wastage_quantity: waste,
            };
            if let Err(e) = self.event_sender.send(event).await {
                warn!(error = %e, "failed to publish cleaning resolution event");
            }
        }

        Ok(updated)
    }

    /// Cancels a job before finalization, restoring the reserved quantity to
    /// the source warehouse. Create followed by cancel nets to zero in both
    /// the ledger and the aggregate.
    #[instrument(skip(self))]
    pub async fn cancel_job(&self, id: Uuid) -> Result<cleaning_job::Model, ServiceError> {
        let cancelled = self
            .db_pool
            .transaction::<_, cleaning_job::Model, ServiceError>(|txn| {
                Box::pin(async move {
                    let job = find_job(txn, id).await?;
                    let status = CleaningJobStatus::try_from_str(&job.status)?;

                    if status == CleaningJobStatus::Cancelled {
                        return Err(ServiceError::InvalidOperation(format!(
                            "Cleaning job {} is already cancelled",
                            job.job_number
                        )));
                    }
                    if is_finalized(txn, job.id).await? || status.finalizes() {
                        return Err(ServiceError::InvalidOperation(format!(
                            "Cleaning job {} has been finalized and cannot be cancelled",
                            job.job_number
                        )));
                    }

                    stock_entries::append(
                        txn,
                        stock_entries::NewStockEntry {
                            raw_material_id: job.raw_material_id,
                            warehouse_id: job.from_warehouse_id,
                            quantity: job.quantity,
                            entry_type: stock_entries::EntryType::Released,
                            reference_id: Some(job.id),
                            status: "Released".to_string(),
                            reason_code: Some("CLEANING_CANCEL".to_string()),
                            batch_number: None,
                            expiry_date: None,
                        },
                    )
                    .await?;

                    current_stock::apply_delta(
                        txn,
                        job.raw_material_id,
                        job.from_warehouse_id,
                        job.quantity,
                    )
                    .await?;

                    let mut active: cleaning_job::ActiveModel = job.into();
                    active.status = Set(CleaningJobStatus::Cancelled.to_string());
                    active.finished_at = Set(Some(Utc::now()));
                    active.updated_at = Set(Utc::now());
                    active
                        .update(txn)
                        .await
                        .map_err(ServiceError::DatabaseError)
                })
            })
            .await
            .map_err(ServiceError::from)?;

        let event = Event::CleaningJobCancelled {
            job_id: cancelled.id,
            released_quantity: cancelled.quantity,
        };
        if let Err(e) = self.event_sender.send(event).await {
            warn!(error = %e, "failed to publish cleaning cancellation event");
        }

        Ok(cancelled)
    }

    #[instrument(skip(self))]
    pub async fn get_job(&self, id: Uuid) -> Result<cleaning_job::Model, ServiceError> {
        find_job(&*self.db_pool, id).await
    }

    #[instrument(skip(self))]
    pub async fn list_jobs(
        &self,
        status: Option<String>,
    ) -> Result<Vec<cleaning_job::Model>, ServiceError> {
        let mut query = cleaning_job::Entity::find();
        if let Some(status) = status {
            query = query.filter(cleaning_job::Column::Status.eq(status));
        }
        query
            .order_by_desc(cleaning_job::Column::CreatedAt)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self, message))]
    pub async fn add_log(
        &self,
        job_id: Uuid,
        message: String,
    ) -> Result<cleaning_log::Model, ServiceError> {
        find_job(&*self.db_pool, job_id).await?;

        cleaning_log::ActiveModel {
            id: Set(Uuid::new_v4()),
            cleaning_job_id: Set(job_id),
            message: Set(message),
            logged_at: Set(Utc::now()),
        }
        .insert(&*self.db_pool)
        .await
        .map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self))]
    pub async fn logs(&self, job_id: Uuid) -> Result<Vec<cleaning_log::Model>, ServiceError> {
        find_job(&*self.db_pool, job_id).await?;

        cleaning_log::Entity::find()
            .filter(cleaning_log::Column::CleaningJobId.eq(job_id))
            .order_by_asc(cleaning_log::Column::LoggedAt)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Derived cleaned-material availability per (material, destination
    /// warehouse). Consumption by processing jobs is scoped to the warehouse
    /// the job draws from, so one warehouse's processing cannot drain
    /// another's pool.
    #[instrument(skip(self))]
    pub async fn cleaned_materials(&self) -> Result<Vec<CleanedMaterialRow>, ServiceError> {
        let cleaned_jobs = cleaning_job::Entity::find()
            .filter(cleaning_job::Column::Status.eq(CleaningJobStatus::Cleaned.to_string()))
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if cleaned_jobs.is_empty() {
            return Ok(Vec::new());
        }

        let job_ids: Vec<Uuid> = cleaned_jobs.iter().map(|j| j.id).collect();
        let waste_rows = unfinished_stock::Entity::find()
            .filter(unfinished_stock::Column::CleaningJobId.is_in(job_ids))
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let mut waste_by_job: HashMap<Uuid, Decimal> = HashMap::new();
        for row in &waste_rows {
            if let Some(job_id) = row.cleaning_job_id {
                *waste_by_job.entry(job_id).or_default() += row.quantity;
            }
        }

        // (material, destination warehouse) -> (net cleaned, waste)
        let mut pools: HashMap<(Uuid, Uuid), (Decimal, Decimal)> = HashMap::new();
        for job in &cleaned_jobs {
            let waste = waste_by_job.get(&job.id).copied().unwrap_or_default();
            let net = job.quantity - waste;
            let slot = pools
                .entry((job.raw_material_id, job.to_warehouse_id))
                .or_default();
            slot.0 += net;
            slot.1 += waste;
        }

        let processing_jobs = processing_job::Entity::find()
            .filter(processing_job::Column::Status.ne("Cancelled"))
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let mut consumed: HashMap<(Uuid, Uuid), Decimal> = HashMap::new();
        for job in &processing_jobs {
            *consumed
                .entry((job.input_raw_material_id, job.source_warehouse_id))
                .or_default() += job.quantity_input;
        }

        let materials: HashMap<Uuid, raw_material_product::Model> =
            raw_material_product::Entity::find()
                .all(&*self.db_pool)
                .await
                .map_err(ServiceError::DatabaseError)?
                .into_iter()
                .map(|m| (m.id, m))
                .collect();
        let warehouses: HashMap<Uuid, warehouse::Model> = warehouse::Entity::find()
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?
            .into_iter()
            .map(|w| (w.id, w))
            .collect();

        let mut rows: Vec<CleanedMaterialRow> = pools
            .into_iter()
            .map(|((material_id, warehouse_id), (cleaned, waste))| {
                let in_processing = consumed
                    .get(&(material_id, warehouse_id))
                    .copied()
                    .unwrap_or_default();
                let available = (cleaned - in_processing).max(Decimal::ZERO);
                CleanedMaterialRow {
                    raw_material_id: material_id,
                    sku_code: materials
                        .get(&material_id)
                        .map(|m| m.sku_code.clone())
                        .unwrap_or_default(),
                    material_name: materials
                        .get(&material_id)
                        .map(|m| m.name.clone())
                        .unwrap_or_default(),
                    warehouse_id,
                    warehouse_name: warehouses
                        .get(&warehouse_id)
                        .map(|w| w.name.clone())
                        .unwrap_or_default(),
                    cleaned_quantity: cleaned,
                    waste_quantity: waste,
                    in_processing,
                    available,
                }
            })
            .collect();

        rows.sort_by(|a, b| {
            a.sku_code
                .cmp(&b.sku_code)
                .then_with(|| a.warehouse_name.cmp(&b.warehouse_name))
        });

        Ok(rows)
    }
}

impl CleaningJobStatus {
    fn try_from_str(s: &str) -> Result<Self, ServiceError> {
        use std::str::FromStr;
        Self::from_str(s).map_err(|_| {
            ServiceError::InternalError(format!("unknown cleaning job status '{}'", s))
        })
    }
}

async fn find_job<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<cleaning_job::Model, ServiceError> {
    cleaning_job::Entity::find_by_id(id)
        .one(conn)
        .await
        .map_err(ServiceError::DatabaseError)?
        .ok_or_else(|| ServiceError::NotFound(format!("Cleaning job {} not found", id)))
}

/// A job is finalized once an OUT entry references it; finalization happens
/// at most once no matter how often the status is re-saved.
async fn is_finalized<C: ConnectionTrait>(conn: &C, job_id: Uuid) -> Result<bool, ServiceError> {
    use crate::entities::stock_entry;

    let existing = stock_entry::Entity::find()
        .filter(stock_entry::Column::ReferenceId.eq(job_id))
        .filter(stock_entry::Column::EntryType.eq(stock_entries::EntryType::Out.to_string()))
        .one(conn)
        .await
        .map_err(ServiceError::DatabaseError)?;

    Ok(existing.is_some())
}

async fn waste_for_job<C: ConnectionTrait>(
    conn: &C,
    job_id: Uuid,
) -> Result<Decimal, ServiceError> {
    let rows = unfinished_stock::Entity::find()
        .filter(unfinished_stock::Column::CleaningJobId.eq(job_id))
        .all(conn)
        .await
        .map_err(ServiceError::DatabaseError)?;

    Ok(rows.iter().map(|r| r.quantity).sum())
}

async fn apply_update<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
    patch: CleaningJobPatch,
) -> Result<cleaning_job::Model, ServiceError> {
    let job = find_job(conn, id).await?;
    let current_status = CleaningJobStatus::try_from_str(&job.status)?;

    if current_status.is_terminal() {
        return Err(ServiceError::InvalidOperation(format!(
            "Cleaning job {} is {} and cannot be updated",
            job.job_number, job.status
        )));
    }

    let finalized = is_finalized(conn, job.id).await?;
    let target_status = patch.status.unwrap_or(current_status);

    if target_status == CleaningJobStatus::Cancelled {
        return Err(ServiceError::InvalidOperation(
            "use the cancel operation to cancel a cleaning job".to_string(),
        ));
    }

    // Reservation delta on quantity change, only while the hold is open.
    let mut quantity = job.quantity;
    if let Some(new_quantity) = patch.quantity {
        if new_quantity <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "cleaning quantity must be positive".to_string(),
            ));
        }
        if finalized {
            return Err(ServiceError::InvalidOperation(format!(
                "Cleaning job {} is finalized; quantity cannot change",
                job.job_number
            )));
        }
        if new_quantity > quantity {
            let extra = new_quantity - quantity;
            current_stock::withdraw(conn, job.raw_material_id, job.from_warehouse_id, extra)
                .await?;
            stock_entries::append(
                conn,
                stock_entries::NewStockEntry {
                    raw_material_id: job.raw_material_id,
                    warehouse_id: job.from_warehouse_id,
                    quantity: extra,
                    entry_type: stock_entries::EntryType::Reserved,
                    reference_id: Some(job.id),
                    status: "Reserved".to_string(),
                    reason_code: Some("CLEANING_RESERVE_DELTA".to_string()),
                    batch_number: None,
                    expiry_date: None,
                },
            )
            .await?;
        } else if new_quantity < quantity {
            let released = quantity - new_quantity;
            stock_entries::append(
                conn,
                stock_entries::NewStockEntry {
                    raw_material_id: job.raw_material_id,
                    warehouse_id: job.from_warehouse_id,
                    quantity: released,
                    entry_type: stock_entries::EntryType::Released,
                    reference_id: Some(job.id),
                    status: "Released".to_string(),
                    reason_code: Some("CLEANING_RESERVE_DELTA".to_string()),
                    batch_number: None,
                    expiry_date: None,
                },
            )
            .await?;
            current_stock::apply_delta(
                conn,
                job.raw_material_id,
                job.from_warehouse_id,
                released,
            )
            .await?;
        }
        quantity = new_quantity;
    }

    // Leftover waste may only land with the finalizing transition.
    if let Some(leftover) = patch.leftover_quantity {
        if leftover < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "leftover_quantity cannot be negative".to_string(),
            ));
        }
        if leftover > quantity {
            return Err(ServiceError::ConservationViolation(format!(
                "leftover {} exceeds job quantity {}",
                leftover, quantity
            )));
        }
        if !target_status.finalizes() {
            return Err(ServiceError::ValidationError(
                "leftover_quantity requires a transition to Cleaned or Finished".to_string(),
            ));
        }
        if finalized {
            return Err(ServiceError::InvalidOperation(format!(
                "job {} is already finalized; its waste figure cannot be changed",
                job.job_number
            )));
        }
    }

    let to_warehouse_id = patch.to_warehouse_id.unwrap_or(job.to_warehouse_id);
    if patch.to_warehouse_id.is_some() {
        warehouse::Entity::find_by_id(to_warehouse_id)
            .one(conn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Warehouse {} not found", to_warehouse_id))
            })?;
    }

    let finalizing_now = target_status.finalizes() && !finalized;
    if finalizing_now {
        stock_entries::append(
            conn,
            stock_entries::NewStockEntry {
                raw_material_id: job.raw_material_id,
                warehouse_id: job.from_warehouse_id,
                quantity,
                entry_type: stock_entries::EntryType::Released,
                reference_id: Some(job.id),
                status: "Released".to_string(),
                reason_code: Some("CLEANING_FINALIZE".to_string()),
                batch_number: None,
                expiry_date: None,
            },
        )
        .await?;
        stock_entries::append(
            conn,
            stock_entries::NewStockEntry {
                raw_material_id: job.raw_material_id,
                warehouse_id: job.from_warehouse_id,
                quantity,
                entry_type: stock_entries::EntryType::Out,
                reference_id: Some(job.id),
                status: "Completed".to_string(),
                reason_code: Some("CLEANING_FINALIZE".to_string()),
                batch_number: None,
                expiry_date: None,
            },
        )
        .await?;

        if let Some(leftover) = patch.leftover_quantity {
            if leftover > Decimal::ZERO {
                let material =
                    raw_material_product::Entity::find_by_id(job.raw_material_id)
                        .one(conn)
                        .await
                        .map_err(ServiceError::DatabaseError)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!(
                                "Raw material {} not found",
                                job.raw_material_id
                            ))
                        })?;
                unfinished_stock::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    cleaning_job_id: Set(Some(job.id)),
                    processing_job_id: Set(None),
                    sku_code: Set(format!(
                        "{}-UNF-{}",
                        material.sku_code,
                        Utc::now().timestamp()
                    )),
                    quantity: Set(leftover),
                    reason_code: Set(patch.leftover_reason.clone()),
                    warehouse_id: Set(to_warehouse_id),
                    created_at: Set(Utc::now()),
                }
                .insert(conn)
                .await
                .map_err(ServiceError::DatabaseError)?;
            }
        }
    }

    let now = Utc::now();
    let mut active: cleaning_job::ActiveModel = job.into();
    active.status = Set(target_status.to_string());
    active.quantity = Set(quantity);
    active.to_warehouse_id = Set(to_warehouse_id);
    if let Some(finished_at) = patch.finished_at {
        active.finished_at = Set(Some(finished_at));
    } else if finalizing_now {
        active.finished_at = Set(Some(now));
    }
    active.updated_at = Set(now);

    active
        .update(conn)
        .await
        .map_err(ServiceError::DatabaseError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_roundtrips_with_hyphenated_in_progress() {
        assert_eq!(CleaningJobStatus::InProgress.to_string(), "In-Progress");
        assert_eq!(
            CleaningJobStatus::from_str("In-Progress").unwrap(),
            CleaningJobStatus::InProgress
        );
    }

    #[test]
    fn finalizing_and_terminal_sets() {
        assert!(CleaningJobStatus::Cleaned.finalizes());
        assert!(CleaningJobStatus::Finished.finalizes());
        assert!(!CleaningJobStatus::Sent.finalizes());
        assert!(CleaningJobStatus::Cancelled.is_terminal());
        assert!(!CleaningJobStatus::Cleaned.is_terminal());
    }
}
