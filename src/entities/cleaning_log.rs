use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cleaning_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub cleaning_job_id: Uuid,
    pub message: String,
    pub logged_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cleaning_job::Entity",
        from = "Column::CleaningJobId",
        to = "super::cleaning_job::Column::Id"
    )]
    CleaningJob,
}

impl Related<super::cleaning_job::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CleaningJob.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
