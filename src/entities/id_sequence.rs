use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Named atomic counters backing human-readable display numbers
/// (CJ#####, PJ#####, VND#####). Incremented with a single upsert-returning
/// statement inside the creating transaction, never find-max-then-increment.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "id_sequences")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,
    pub value: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
