//! Raw-material quality reports. Free-standing records keyed by GRN string;
//! they never touch the stock ledger.

use crate::{
    db::DbPool,
    entities::{rm_quality_parameter, rm_quality_report},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::sync::Arc;
use tracing::{instrument, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewQualityParameter {
    pub parameter: String,
    pub standard: String,
    pub result: String,
}

#[derive(Debug, Clone)]
pub struct NewQualityReport {
    pub raw_material_name: String,
    pub variety: Option<String>,
    pub supplier: Option<String>,
    pub grn: String,
    pub created_by: Option<Uuid>,
    pub parameters: Vec<NewQualityParameter>,
}

#[derive(Debug, Clone, Default)]
pub struct QualityReportPatch {
    pub raw_material_name: Option<String>,
    pub variety: Option<String>,
    pub supplier: Option<String>,
    pub grn: Option<String>,
    /// Replace semantics, like by-products: the supplied set becomes the
    /// complete parameter list.
    pub parameters: Option<Vec<NewQualityParameter>>,
}

#[derive(Debug, Clone)]
pub struct QualityReportWithParameters {
    pub report: rm_quality_report::Model,
    pub parameters: Vec<rm_quality_parameter::Model>,
}

#[derive(Debug, Clone, Default)]
pub struct QualityReportFilter {
    pub raw_material_name: Option<String>,
    pub supplier: Option<String>,
    pub grn: Option<String>,
}

#[derive(Clone)]
pub struct QualityService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl QualityService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a report with its parameters atomically.
    #[instrument(skip(self, input))]
    pub async fn create_report(
        &self,
        input: NewQualityReport,
    ) -> Result<QualityReportWithParameters, ServiceError> {
        if input.grn.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "grn cannot be empty".to_string(),
            ));
        }

        let created = self
            .db_pool
            .transaction::<_, QualityReportWithParameters, ServiceError>(|txn| {
                Box::pin(async move {
                    let now = Utc::now();
                    let report = rm_quality_report::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        raw_material_name: Set(input.raw_material_name),
                        variety: Set(input.variety),
                        supplier: Set(input.supplier),
                        grn: Set(input.grn),
                        created_by: Set(input.created_by),
                        created_at: Set(now),
                        updated_at: Set(now),
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::DatabaseError)?;

                    let parameters =
                        insert_parameters(txn, report.id, input.parameters).await?;

                    Ok(QualityReportWithParameters { report, parameters })
                })
            })
            .await
            .map_err(ServiceError::from)?;

        let event = Event::QualityReportFiled {
            report_id: created.report.id,
            grn: created.report.grn.clone(),
            filed_at: created.report.created_at,
        };
        if let Err(e) = self.event_sender.send(event).await {
            warn!(error = %e, "failed to publish quality report event");
        }

        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_report(
        &self,
        id: Uuid,
    ) -> Result<QualityReportWithParameters, ServiceError> {
        let report = rm_quality_report::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Quality report {} not found", id)))?;

        let parameters = rm_quality_parameter::Entity::find()
            .filter(rm_quality_parameter::Column::ReportId.eq(id))
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(QualityReportWithParameters { report, parameters })
    }

    #[instrument(skip(self))]
    pub async fn list_reports(
        &self,
        filter: QualityReportFilter,
    ) -> Result<Vec<rm_quality_report::Model>, ServiceError> {
        let mut query = rm_quality_report::Entity::find();
        if let Some(name) = filter.raw_material_name {
            query = query.filter(rm_quality_report::Column::RawMaterialName.contains(&name));
        }
        if let Some(supplier) = filter.supplier {
            query = query.filter(rm_quality_report::Column::Supplier.contains(&supplier));
        }
        if let Some(grn) = filter.grn {
            query = query.filter(rm_quality_report::Column::Grn.eq(grn));
        }

        query
            .order_by_desc(rm_quality_report::Column::CreatedAt)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self, patch))]
    pub async fn update_report(
        &self,
        id: Uuid,
        patch: QualityReportPatch,
    ) -> Result<QualityReportWithParameters, ServiceError> {
        self.get_report(id).await?;

        let updated = self
            .db_pool
            .transaction::<_, QualityReportWithParameters, ServiceError>(|txn| {
                Box::pin(async move {
                    let report = rm_quality_report::Entity::find_by_id(id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::DatabaseError)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Quality report {} not found", id))
                        })?;

                    let mut active: rm_quality_report::ActiveModel = report.into();
                    if let Some(name) = patch.raw_material_name {
                        active.raw_material_name = Set(name);
                    }
                    if let Some(variety) = patch.variety {
                        active.variety = Set(Some(variety));
                    }
                    if let Some(supplier) = patch.supplier {
                        active.supplier = Set(Some(supplier));
                    }
                    if let Some(grn) = patch.grn {
                        if grn.trim().is_empty() {
                            return Err(ServiceError::ValidationError(
                                "grn cannot be empty".to_string(),
                            ));
                        }
                        active.grn = Set(grn);
                    }
                    active.updated_at = Set(Utc::now());
                    let report = active
                        .update(txn)
                        .await
                        .map_err(ServiceError::DatabaseError)?;

                    let parameters = if let Some(new_params) = patch.parameters {
                        rm_quality_parameter::Entity::delete_many()
                            .filter(rm_quality_parameter::Column::ReportId.eq(id))
                            .exec(txn)
                            .await
                            .map_err(ServiceError::DatabaseError)?;
                        insert_parameters(txn, id, new_params).await?
                    } else {
                        rm_quality_parameter::Entity::find()
                            .filter(rm_quality_parameter::Column::ReportId.eq(id))
                            .all(txn)
                            .await
                            .map_err(ServiceError::DatabaseError)?
                    };

                    Ok(QualityReportWithParameters { report, parameters })
                })
            })
            .await
            .map_err(ServiceError::from)?;

        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_report(&self, id: Uuid) -> Result<(), ServiceError> {
        self.get_report(id).await?;

        self.db_pool
            .transaction::<_, (), ServiceError>(|txn| {
                Box::pin(async move {
                    rm_quality_parameter::Entity::delete_many()
                        .filter(rm_quality_parameter::Column::ReportId.eq(id))
                        .exec(txn)
                        .await
                        .map_err(ServiceError::DatabaseError)?;
                    rm_quality_report::Entity::delete_by_id(id)
                        .exec(txn)
                        .await
                        .map_err(ServiceError::DatabaseError)?;
                    Ok(())
                })
            })
            .await
            .map_err(ServiceError::from)
    }
}

async fn insert_parameters<C: sea_orm::ConnectionTrait>(
    conn: &C,
    report_id: Uuid,
    parameters: Vec<NewQualityParameter>,
) -> Result<Vec<rm_quality_parameter::Model>, ServiceError> {
    let mut created = Vec::with_capacity(parameters.len());
    for param in parameters {
        let model = rm_quality_parameter::ActiveModel {
            id: Set(Uuid::new_v4()),
            report_id: Set(report_id),
            parameter: Set(param.parameter),
            standard: Set(param.standard),
            result: Set(param.result),
        }
        .insert(conn)
        .await
        .map_err(ServiceError::DatabaseError)?;
        created.push(model);
    }
    Ok(created)
}
