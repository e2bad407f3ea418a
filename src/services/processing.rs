//! Processing job pipeline.
//!
//! Processing consumes the derived cleaned-material pool, not the raw
//! current-stock aggregate. The pool is informational: creating a job that
//! exceeds the derived availability logs a warning but is not blocked. Output
//! conservation is enforced instead: by-products can never exceed the input
//! and the single finished good takes exactly the remainder.

use crate::{
    db::DbPool,
    entities::{
        by_product, cleaning_job, finished_good, processing_job, raw_material_product,
        unfinished_stock, warehouse,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::sequences,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use std::sync::Arc;
use strum::{Display, EnumString};
use tracing::{instrument, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum ProcessingJobStatus {
    #[strum(serialize = "In-Progress")]
    InProgress,
    Finished,
    Completed,
    Cancelled,
}

impl ProcessingJobStatus {
    /// Statuses that produce the finished good when first entered.
    pub fn finishes(self) -> bool {
        matches!(
            self,
            ProcessingJobStatus::Finished | ProcessingJobStatus::Completed
        )
    }
}

#[derive(Debug, Clone)]
pub struct NewProcessingJob {
    pub input_raw_material_id: Uuid,
    pub source_warehouse_id: Uuid,
    pub quantity_input: Decimal,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewByProduct {
    pub sku_code: String,
    pub quantity: Decimal,
    pub warehouse_id: Uuid,
    pub tag: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProcessingJobPatch {
    pub quantity_input: Option<Decimal>,
    pub status: Option<ProcessingJobStatus>,
    pub by_products: Option<Vec<NewByProduct>>,
    pub finished_warehouse_id: Option<Uuid>,
    pub finished_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct ProcessingJobDetail {
    pub job: processing_job::Model,
    pub by_products: Vec<by_product::Model>,
    pub finished_good: Option<finished_good::Model>,
}

#[derive(Clone)]
pub struct ProcessingService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl ProcessingService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a processing job drawing from one warehouse's cleaned pool.
    #[instrument(skip(self, input))]
    pub async fn create_job(
        &self,
        input: NewProcessingJob,
    ) -> Result<processing_job::Model, ServiceError> {
        if input.quantity_input <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "quantity_input must be positive".to_string(),
            ));
        }

        raw_material_product::Entity::find_by_id(input.input_raw_material_id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Raw material {} not found",
                    input.input_raw_material_id
                ))
            })?;
        warehouse::Entity::find_by_id(input.source_warehouse_id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Warehouse {} not found",
                    input.source_warehouse_id
                ))
            })?;

        let available = cleaned_availability(
            &*self.db_pool,
            input.input_raw_material_id,
            input.source_warehouse_id,
        )
        .await?;
        if input.quantity_input > available {
            warn!(
                requested = %input.quantity_input,
                available = %available,
                material = %input.input_raw_material_id,
                warehouse = %input.source_warehouse_id,
                "processing job exceeds derived cleaned availability"
            );
        }

        let job = self
            .db_pool
            .transaction::<_, processing_job::Model, ServiceError>(|txn| {
                Box::pin(async move {
                    let job_number =
                        sequences::next_display_number(txn, "processing_job", "PJ", 5).await?;
                    let now = Utc::now();

                    processing_job::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        job_number: Set(job_number),
                        input_raw_material_id: Set(input.input_raw_material_id),
                        source_warehouse_id: Set(input.source_warehouse_id),
                        quantity_input: Set(input.quantity_input),
                        status: Set(ProcessingJobStatus::InProgress.to_string()),
                        started_at: Set(input.started_at),
                        finished_at: Set(None),
                        created_at: Set(now),
                        updated_at: Set(now),
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::DatabaseError)
                })
            })
            .await
            .map_err(ServiceError::from)?;

        let event = Event::ProcessingJobCreated {
            job_id: job.id,
            job_number: job.job_number.clone(),
            quantity_input: job.quantity_input,
        };
        if let Err(e) = self.event_sender.send(event).await {
            warn!(error = %e, "failed to publish processing job event");
        }

        Ok(job)
    }

    /// Updates a job. Supplied by-products replace all prior rows. The first
    /// transition into Finished or Completed mints the finished good.
    #[instrument(skip(self, patch))]
    pub async fn update_job(
        &self,
        id: Uuid,
        patch: ProcessingJobPatch,
    ) -> Result<ProcessingJobDetail, ServiceError> {
        let detail = self
            .db_pool
            .transaction::<_, ProcessingJobDetail, ServiceError>(|txn| {
                Box::pin(async move { apply_update(txn, id, patch).await })
            })
            .await
            .map_err(ServiceError::from)?;

        if let Some(finished) = &detail.finished_good {
            let by_product_quantity: Decimal =
                detail.by_products.iter().map(|b| b.quantity).sum();
            let event = Event::ProcessingJobFinished {
                job_id: detail.job.id,
                finished_good_id: finished.id,
                finished_quantity: finished.quantity,
                by_product_quantity,
            };
            if let Err(e) = self.event_sender.send(event).await {
                warn!(error = %e, "failed to publish processing finish event");
            }
        }

        Ok(detail)
    }

    /// Cancels a job; its input no longer counts against the cleaned pool.
    #[instrument(skip(self))]
    pub async fn cancel_job(&self, id: Uuid) -> Result<processing_job::Model, ServiceError> {
        let cancelled = self
            .db_pool
            .transaction::<_, processing_job::Model, ServiceError>(|txn| {
                Box::pin(async move {
                    let job = find_job(txn, id).await?;
                    let status = parse_status(&job.status)?;

                    if status == ProcessingJobStatus::Cancelled {
                        return Err(ServiceError::InvalidOperation(format!(
                            "Processing job {} is already cancelled",
                            job.job_number
                        )));
                    }
                    if status.finishes() || finished_good_for(txn, job.id).await?.is_some() {
                        return Err(ServiceError::InvalidOperation(format!(
                            "Processing job {} is finished and cannot be cancelled",
                            job.job_number
                        )));
                    }

                    let mut active: processing_job::ActiveModel = job.into();
                    active.status = Set(ProcessingJobStatus::Cancelled.to_string());
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

        if let Err(e) = self
            .event_sender
            .send(Event::ProcessingJobCancelled(cancelled.id))
            .await
        {
            warn!(error = %e, "failed to publish processing cancellation event");
        }

        Ok(cancelled)
    }

    #[instrument(skip(self))]
    pub async fn get_job(&self, id: Uuid) -> Result<ProcessingJobDetail, ServiceError> {
        let job = find_job(&*self.db_pool, id).await?;
        let by_products = by_products_for(&*self.db_pool, id).await?;
        let finished_good = finished_good_for(&*self.db_pool, id).await?;
        Ok(ProcessingJobDetail {
            job,
            by_products,
            finished_good,
        })
    }

    #[instrument(skip(self))]
    pub async fn list_jobs(
        &self,
        status: Option<String>,
    ) -> Result<Vec<processing_job::Model>, ServiceError> {
        let mut query = processing_job::Entity::find();
        if let Some(status) = status {
            query = query.filter(processing_job::Column::Status.eq(status));
        }
        query
            .order_by_desc(processing_job::Column::CreatedAt)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)
    }
}

fn parse_status(s: &str) -> Result<ProcessingJobStatus, ServiceError> {
    use std::str::FromStr;
    ProcessingJobStatus::from_str(s).map_err(|_| {
        ServiceError::InternalError(format!("unknown processing job status '{}'", s))
    })
}

async fn find_job<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<processing_job::Model, ServiceError> {
    processing_job::Entity::find_by_id(id)
        .one(conn)
        .await
        .map_err(ServiceError::DatabaseError)?
        .ok_or_else(|| ServiceError::NotFound(format!("Processing job {} not found", id)))
}

async fn by_products_for<C: ConnectionTrait>(
    conn: &C,
    job_id: Uuid,
) -> Result<Vec<by_product::Model>, ServiceError> {
    by_product::Entity::find()
        .filter(by_product::Column::ProcessingJobId.eq(job_id))
        .order_by_asc(by_product::Column::CreatedAt)
        .all(conn)
        .await
        .map_err(ServiceError::DatabaseError)
}

async fn finished_good_for<C: ConnectionTrait>(
    conn: &C,
    job_id: Uuid,
) -> Result<Option<finished_good::Model>, ServiceError> {
    finished_good::Entity::find()
        .filter(finished_good::Column::ProcessingJobId.eq(job_id))
        .one(conn)
        .await
        .map_err(ServiceError::DatabaseError)
}

/// Derived cleaned availability for one (material, warehouse) pool:
/// Σ net cleaned output landing at the warehouse minus Σ input of
/// non-cancelled processing jobs drawing from it, clamped at zero.
async fn cleaned_availability<C: ConnectionTrait>(
    conn: &C,
    raw_material_id: Uuid,
    warehouse_id: Uuid,
) -> Result<Decimal, ServiceError> {
    let cleaned_jobs = cleaning_job::Entity::find()
        .filter(cleaning_job::Column::RawMaterialId.eq(raw_material_id))
        .filter(cleaning_job::Column::ToWarehouseId.eq(warehouse_id))
        .filter(cleaning_job::Column::Status.eq("Cleaned"))
        .all(conn)
        .await
        .map_err(ServiceError::DatabaseError)?;

    let mut cleaned = Decimal::ZERO;
    for job in &cleaned_jobs {
        let waste: Decimal = unfinished_stock::Entity::find()
            .filter(unfinished_stock::Column::CleaningJobId.eq(job.id))
            .all(conn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .iter()
            .map(|r| r.quantity)
            .sum();
        cleaned += job.quantity - waste;
    }

    let consuming = processing_job::Entity::find()
        .filter(processing_job::Column::InputRawMaterialId.eq(raw_material_id))
        .filter(processing_job::Column::SourceWarehouseId.eq(warehouse_id))
        .filter(processing_job::Column::Status.ne(ProcessingJobStatus::Cancelled.to_string()))
        .all(conn)
        .await
        .map_err(ServiceError::DatabaseError)?;
    let consumed: Decimal = consuming.iter().map(|j| j.quantity_input).sum();

    Ok((cleaned - consumed).max(Decimal::ZERO))
}

async fn apply_update<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
    patch: ProcessingJobPatch,
) -> Result<ProcessingJobDetail, ServiceError> {
    let job = find_job(conn, id).await?;
    let current_status = parse_status(&job.status)?;

    if current_status == ProcessingJobStatus::Cancelled {
        return Err(ServiceError::InvalidOperation(format!(
            "Processing job {} is cancelled and cannot be updated",
            job.job_number
        )));
    }

    let target_status = patch.status.unwrap_or(current_status);
    if target_status == ProcessingJobStatus::Cancelled {
        return Err(ServiceError::InvalidOperation(
            "use the cancel operation to cancel a processing job".to_string(),
        ));
    }

    let already_finished = finished_good_for(conn, job.id).await?.is_some();
    if target_status.finishes() && already_finished {
        return Err(ServiceError::Conflict(format!(
            "Processing job {} already has a finished good",
            job.job_number
        )));
    }
    if already_finished && (patch.quantity_input.is_some() || patch.by_products.is_some()) {
        return Err(ServiceError::InvalidOperation(format!(
            "Processing job {} is finished; inputs and by-products cannot change",
            job.job_number
        )));
    }

    let quantity_input = match patch.quantity_input {
        Some(q) if q <= Decimal::ZERO => {
            return Err(ServiceError::ValidationError(
                "quantity_input must be positive".to_string(),
            ));
        }
        Some(q) => q,
        None => job.quantity_input,
    };

    // Replace semantics: supplied rows are the complete new set.
    let by_products = if let Some(new_rows) = patch.by_products {
        for row in &new_rows {
            if row.quantity <= Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "by-product quantity must be positive".to_string(),
                ));
            }
            warehouse::Entity::find_by_id(row.warehouse_id)
                .one(conn)
                .await
                .map_err(ServiceError::DatabaseError)?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Warehouse {} not found", row.warehouse_id))
                })?;
        }

        by_product::Entity::delete_many()
            .filter(by_product::Column::ProcessingJobId.eq(job.id))
            .exec(conn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let mut created = Vec::with_capacity(new_rows.len());
        for row in new_rows {
            let model = by_product::ActiveModel {
                id: Set(Uuid::new_v4()),
                processing_job_id: Set(job.id),
                sku_code: Set(row.sku_code),
                quantity: Set(row.quantity),
                warehouse_id: Set(row.warehouse_id),
                tag: Set(row.tag),
                reason: Set(row.reason),
                created_at: Set(Utc::now()),
            }
            .insert(conn)
            .await
            .map_err(ServiceError::DatabaseError)?;
            created.push(model);
        }
        created
    } else {
        by_products_for(conn, job.id).await?
    };

    let by_product_total: Decimal = by_products.iter().map(|b| b.quantity).sum();
    if by_product_total > quantity_input {
        return Err(ServiceError::ConservationViolation(format!(
            "by-products total {} exceeds quantity_input {}",
            by_product_total, quantity_input
        )));
    }

    let finishing_now = target_status.finishes() && !already_finished;
    let finished = if finishing_now {
        let destination = patch
            .finished_warehouse_id
            .or_else(|| by_products.last().map(|b| b.warehouse_id))
            .ok_or_else(|| {
                ServiceError::ValidationError(
                    "finished_warehouse_id is required when no by-products name a warehouse"
                        .to_string(),
                )
            })?;
        warehouse::Entity::find_by_id(destination)
            .one(conn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Warehouse {} not found", destination))
            })?;

        let material = raw_material_product::Entity::find_by_id(job.input_raw_material_id)
            .one(conn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Raw material {} not found",
                    job.input_raw_material_id
                ))
            })?;

        let model = finished_good::ActiveModel {
            id: Set(Uuid::new_v4()),
            processing_job_id: Set(job.id),
            sku_code: Set(format!("{}-FIN", material.sku_code)),
            name: Set(material.name),
            category: Set(material.category),
            unit_of_measurement: Set(material.unit_of_measurement),
            quantity: Set(quantity_input - by_product_total),
            warehouse_id: Set(destination),
            created_at: Set(Utc::now()),
        }
        .insert(conn)
        .await
        .map_err(ServiceError::DatabaseError)?;
        Some(model)
    } else {
        finished_good_for(conn, job.id).await?
    };

    let now = Utc::now();
    let mut active: processing_job::ActiveModel = job.into();
    active.status = Set(target_status.to_string());
    active.quantity_input = Set(quantity_input);
    if let Some(finished_at) = patch.finished_at {
        active.finished_at = Set(Some(finished_at));
    } else if finishing_now {
        active.finished_at = Set(Some(now));
    }
    active.updated_at = Set(now);

    let job = active
        .update(conn)
        .await
        .map_err(ServiceError::DatabaseError)?;

    Ok(ProcessingJobDetail {
        job,
        by_products,
        finished_good: finished,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_roundtrips() {
        assert_eq!(ProcessingJobStatus::InProgress.to_string(), "In-Progress");
        assert_eq!(
            ProcessingJobStatus::from_str("Completed").unwrap(),
            ProcessingJobStatus::Completed
        );
    }

    #[test]
    fn finishing_statuses() {
        assert!(ProcessingJobStatus::Finished.finishes());
        assert!(ProcessingJobStatus::Completed.finishes());
        assert!(!ProcessingJobStatus::InProgress.finishes());
        assert!(!ProcessingJobStatus::Cancelled.finishes());
    }
}
