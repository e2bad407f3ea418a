use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Terminal output of a processing job; exactly one per finished job.
/// quantity = job.quantity_input - sum of by-product quantities.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "finished_goods")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub processing_job_id: Uuid,
    pub sku_code: String,
    pub name: String,
    pub category: String,
    pub unit_of_measurement: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity: Decimal,
    pub warehouse_id: Uuid,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
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

impl Related<super::processing_job::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProcessingJob.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
