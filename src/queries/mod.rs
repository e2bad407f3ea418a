pub mod dashboard;

use crate::errors::ServiceError;
use async_trait::async_trait;
use sea_orm::DatabaseConnection;

/// Read-only query object. Dashboard queries tolerate empty data sets and
/// return zeros or empty lists, never errors.
#[async_trait]
pub trait Query: Send + Sync {
    type Result: Send + Sync;

    async fn execute(&self, db_pool: &DatabaseConnection) -> Result<Self::Result, ServiceError>;
}
