use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Cleaning workflow stage moving raw material between warehouses. Creating a
/// job reserves `quantity` at the source warehouse via a RESERVED ledger
/// entry; the reservation is finalized (or released on cancel) later.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cleaning_jobs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub job_number: String,
    pub raw_material_id: Uuid,
    pub from_warehouse_id: Uuid,
    pub to_warehouse_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity: Decimal,
    pub status: String,
    pub started_at: DateTimeUtc,
    pub finished_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::raw_material_product::Entity",
        from = "Column::RawMaterialId",
        to = "super::raw_material_product::Column::Id"
    )]
    RawMaterialProduct,
    #[sea_orm(has_many = "super::cleaning_log::Entity")]
    Logs,
    #[sea_orm(has_many = "super::unfinished_stock::Entity")]
    UnfinishedStock,
}

impl Related<super::raw_material_product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RawMaterialProduct.def()
    }
}

impl Related<super::cleaning_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Logs.def()
    }
}

impl Related<super::unfinished_stock::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UnfinishedStock.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
