use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Processing workflow stage consuming cleaned material. The source
/// warehouse scopes which cleaned pool the job draws from, so per-warehouse
/// availability stays conserved.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "processing_jobs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub job_number: String,
    pub input_raw_material_id: Uuid,
    pub source_warehouse_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity_input: Decimal,
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
        from = "Column::InputRawMaterialId",
        to = "super::raw_material_product::Column::Id"
    )]
    RawMaterialProduct,
    #[sea_orm(has_many = "super::by_product::Entity")]
    ByProducts,
    #[sea_orm(has_one = "super::finished_good::Entity")]
    FinishedGood,
}

impl Related<super::raw_material_product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RawMaterialProduct.def()
    }
}

impl Related<super::by_product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ByProducts.def()
    }
}

impl Related<super::finished_good::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinishedGood.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
