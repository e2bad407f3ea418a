use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Waste or reject quantity attributed to a specific workflow job. Exactly
/// one of `cleaning_job_id` / `processing_job_id` is set.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "unfinished_stocks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub cleaning_job_id: Option<Uuid>,
    pub processing_job_id: Option<Uuid>,
    pub sku_code: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity: Decimal,
    pub reason_code: Option<String>,
    pub warehouse_id: Uuid,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cleaning_job::Entity",
        from = "Column::CleaningJobId",
        to = "super::cleaning_job::Column::Id"
    )]
    CleaningJob,
    #[sea_orm(
        belongs_to = "super::processing_job::Entity",
        from = "Column::ProcessingJobId",
        to = "super::processing_job::Column::Id"
    )]
    ProcessingJob,
    #[sea_orm(
        belongs_to = "super::warehouse::Entity",
        from = "Column::WarehouseId",
        to = "super::warehouse::Column::Id"
    )]
    Warehouse,
}

impl Related<super::cleaning_job::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CleaningJob.def()
    }
}

impl Related<super::processing_job::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProcessingJob.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
