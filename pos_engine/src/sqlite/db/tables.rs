use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db_types::{DiningTable, TableRef},
    traits::OrderFlowError,
};

pub async fn fetch_table(table: TableRef, conn: &mut SqliteConnection) -> Result<Option<DiningTable>, sqlx::Error> {
    let result = match table {
        TableRef::Id(id) => {
            sqlx::query_as("SELECT * FROM dining_tables WHERE id = $1").bind(id).fetch_optional(conn).await?
        },
        TableRef::Number(n) => {
            sqlx::query_as("SELECT * FROM dining_tables WHERE table_number = $1").bind(n).fetch_optional(conn).await?
        },
    };
    Ok(result)
}

pub async fn insert_table(
    table_number: i64,
    capacity: i64,
    conn: &mut SqliteConnection,
) -> Result<DiningTable, OrderFlowError> {
    let table = sqlx::query_as(
        "INSERT INTO dining_tables (table_number, capacity) VALUES ($1, $2) RETURNING *",
    )
    .bind(table_number)
    .bind(capacity)
    .fetch_one(conn)
    .await?;
    Ok(table)
}

/// Marks the table OCCUPIED. Occupying an already-OCCUPIED table is a no-op; multiple open orders may share one
/// table.
pub async fn occupy(table_id: i64, conn: &mut SqliteConnection) -> Result<(), OrderFlowError> {
    sqlx::query("UPDATE dining_tables SET status = 'OCCUPIED', updated_at = CURRENT_TIMESTAMP WHERE id = $1")
        .bind(table_id)
        .execute(conn)
        .await?;
    trace!("🪑️ Table #{table_id} marked OCCUPIED");
    Ok(())
}

/// Releases the table back to AVAILABLE, but only once no non-terminal order still occupies it. Releasing an
/// already-AVAILABLE table is a no-op, since several completion paths can race to release the same table.
///
/// Returns `true` if the table was actually released.
pub async fn release_if_idle(table_id: i64, conn: &mut SqliteConnection) -> Result<bool, OrderFlowError> {
    let result = sqlx::query(
        r#"
        UPDATE dining_tables SET status = 'AVAILABLE', updated_at = CURRENT_TIMESTAMP
        WHERE id = $1
          AND NOT EXISTS (
            SELECT 1 FROM orders
            WHERE table_id = $1 AND status NOT IN ('PAID', 'COMPLETED', 'CANCELLED')
          )
        "#,
    )
    .bind(table_id)
    .execute(conn)
    .await?;
    let released = result.rows_affected() > 0;
    if released {
        trace!("🪑️ Table #{table_id} released to AVAILABLE");
    } else {
        trace!("🪑️ Table #{table_id} still has active orders; not released");
    }
    Ok(released)
}
