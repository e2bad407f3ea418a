use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only ledger of every quantity movement. Entries are never mutated
/// to undo a movement; corrections are new entries. `entry_type` is one of
/// IN, OUT, RESERVED, RELEASED (see services::stock_entries::EntryType).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub raw_material_id: Uuid,
    pub warehouse_id: Uuid,
    pub batch_number: Option<String>,
    pub expiry_date: Option<DateTimeUtc>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity: Decimal,
    pub entry_type: String,
    /// Links back to the originating PO item, cleaning job, etc.
    pub reference_id: Option<Uuid>,
    pub status: String,
    pub reason_code: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::raw_material_product::Entity",
        from = "Column::RawMaterialId",
        to = "super::raw_material_product::Column::Id"
    )]
    RawMaterialProduct,
    #[sea_orm(
        belongs_to = "super::warehouse::Entity",
        from = "Column::WarehouseId",
        to = "super::warehouse::Column::Id"
    )]
    Warehouse,
}

impl Related<super::raw_material_product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RawMaterialProduct.def()
    }
}

impl Related<super::warehouse::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Warehouse.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
