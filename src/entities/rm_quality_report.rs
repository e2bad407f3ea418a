use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Free-standing quality record keyed to a GRN string, independent of the
/// stock ledger.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rm_quality_reports")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub raw_material_name: String,
    pub variety: Option<String>,
    pub supplier: Option<String>,
    pub grn: String,
    pub created_by: Option<Uuid>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::rm_quality_parameter::Entity")]
    Parameters,
}

impl Related<super::rm_quality_parameter::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Parameters.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
