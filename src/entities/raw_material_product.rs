use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Raw-material SKU master record. Identity is effectively immutable once
/// stock exists against the SKU, though edits remain possible.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "raw_material_products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub sku_code: String,
    pub name: String,
    pub category: String,
    pub unit_of_measurement: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub min_reorder_level: Decimal,
    pub vendor_id: Option<Uuid>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vendor::Entity",
        from = "Column::VendorId",
        to = "super::vendor::Column::Id"
    )]
    Vendor,
    #[sea_orm(has_many = "super::current_stock::Entity")]
    CurrentStock,
    #[sea_orm(has_many = "super::stock_entry::Entity")]
    StockEntry,
}

impl Related<super::vendor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vendor.def()
    }
}

impl Related<super::current_stock::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CurrentStock.def()
    }
}

impl Related<super::stock_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockEntry.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
