//! Named atomic counters for human-readable display numbers.
//!
//! Display ids like `CJ00001` must never come from "find the last id and add
//! one" in application code; that races under concurrent creation. The
//! counter row is bumped with a single upsert-returning statement, executed
//! inside the transaction that creates the numbered record.

use crate::errors::ServiceError;
use sea_orm::{ConnectionTrait, Statement};

/// Atomically increments the named counter and returns its new value.
pub async fn next_value<C: ConnectionTrait>(conn: &C, name: &str) -> Result<i64, ServiceError> {
    let backend = conn.get_database_backend();
    let stmt = Statement::from_sql_and_values(
        backend,
        "INSERT INTO id_sequences (name, value) VALUES ($1, 1) \
         ON CONFLICT(name) DO UPDATE SET value = id_sequences.value + 1 \
         RETURNING value",
        [name.into()],
    );

    let row = conn
        .query_one(stmt)
        .await
        .map_err(ServiceError::DatabaseError)?
        .ok_or_else(|| {
            ServiceError::InternalError(format!("sequence '{}' returned no row", name))
        })?;

    row.try_get::<i64>("", "value")
        .map_err(ServiceError::DatabaseError)
}

/// Returns the next display number for a sequence, e.g. `CJ00042`.
pub async fn next_display_number<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    prefix: &str,
    width: usize,
) -> Result<String, ServiceError> {
    let value = next_value(conn, name).await?;
    Ok(format_display_number(prefix, value, width))
}

fn format_display_number(prefix: &str, value: i64, width: usize) -> String {
    format!("{}{:0width$}", prefix, value, width = width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_to_requested_width() {
        assert_eq!(format_display_number("CJ", 1, 5), "CJ00001");
        assert_eq!(format_display_number("PJ", 42, 5), "PJ00042");
        assert_eq!(format_display_number("VND", 7, 5), "VND00007");
    }

    #[test]
    fn wide_values_are_not_truncated() {
        assert_eq!(format_display_number("CJ", 1_234_567, 5), "CJ1234567");
    }
}
