use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::Payment,
    traits::{OrderFlowError, Settlement},
};

/// Inserts the payment row in PAID status. The partial unique index on `payments (order_id) WHERE status = 'PAID'`
/// backs up the conditional order update: a second PAID insert for the same order fails as a unique violation and is
/// mapped to `AlreadyPaid`.
pub async fn insert_paid(settlement: &Settlement, conn: &mut SqliteConnection) -> Result<Payment, OrderFlowError> {
    let payment: Payment = sqlx::query_as(
        r#"
            INSERT INTO payments (order_id, method, amount_paid, change_given, bank_txid, card_last4, status,
                                  cashier_id, notes)
            VALUES ($1, $2, $3, $4, $5, $6, 'PAID', $7, $8)
            RETURNING *;
        "#,
    )
    .bind(settlement.order_id)
    .bind(settlement.method)
    .bind(settlement.amount_paid)
    .bind(settlement.change_given)
    .bind(settlement.bank_txid.as_deref())
    .bind(settlement.card_last4.as_deref())
    .bind(settlement.cashier_id)
    .bind(settlement.notes.as_deref())
    .fetch_one(conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(err) if err.is_unique_violation() => {
            OrderFlowError::AlreadyPaid { order_id: settlement.order_id }
        },
        _ => OrderFlowError::from(e),
    })?;
    debug!("💰️ Payment #{} recorded for order #{} ({})", payment.id, payment.order_id, payment.method);
    Ok(payment)
}

pub async fn fetch_paid_for_order(
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM payments WHERE order_id = $1 AND status = 'PAID'")
        .bind(order_id)
        .fetch_optional(conn)
        .await
}

/// Moves the order's PAID payment to REFUNDED. Returns `None` when no PAID payment exists for the order.
pub async fn mark_refunded(order_id: i64, conn: &mut SqliteConnection) -> Result<Option<Payment>, OrderFlowError> {
    let payment: Option<Payment> = sqlx::query_as(
        "UPDATE payments SET status = 'REFUNDED' WHERE order_id = $1 AND status = 'PAID' RETURNING *",
    )
    .bind(order_id)
    .fetch_optional(conn)
    .await?;
    Ok(payment)
}
