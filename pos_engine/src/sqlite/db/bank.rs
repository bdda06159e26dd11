use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{BankTransaction, BankTxStatus},
    traits::{NewBankTransaction, OrderFlowError},
};

pub async fn fetch_transaction(
    txid: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<BankTransaction>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM bank_transactions WHERE txid = $1").bind(txid).fetch_optional(conn).await
}

pub async fn insert_transaction(
    tx: NewBankTransaction,
    conn: &mut SqliteConnection,
) -> Result<BankTransaction, OrderFlowError> {
    let txid = tx.txid.clone();
    let record: BankTransaction = sqlx::query_as(
        r#"
            INSERT INTO bank_transactions (txid, amount, description, occurred_at, status)
            VALUES ($1, $2, $3, $4, 'PENDING')
            RETURNING *;
        "#,
    )
    .bind(tx.txid)
    .bind(tx.amount)
    .bind(tx.description)
    .bind(tx.occurred_at)
    .fetch_one(conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(err) if err.is_unique_violation() => {
            OrderFlowError::DatabaseError(format!("Bank transaction [{txid}] is already recorded"))
        },
        _ => OrderFlowError::from(e),
    })?;
    trace!("🏦️ Bank transaction [{}] recorded at {}", record.txid, record.amount);
    Ok(record)
}

/// Consumes the transaction for the given order: status to VERIFIED, `used_for_order_id` bound. The conditional
/// write only matches a PENDING, unbound transaction, so a transaction can be consumed at most once; when zero rows
/// match, the current row is re-read to name the precise reason.
pub async fn consume_transaction(
    txid: &str,
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<BankTransaction, OrderFlowError> {
    let consumed: Option<BankTransaction> = sqlx::query_as(
        r#"
        UPDATE bank_transactions SET status = 'VERIFIED', used_for_order_id = $1
        WHERE txid = $2 AND status = 'PENDING' AND used_for_order_id IS NULL
        RETURNING *
        "#,
    )
    .bind(order_id)
    .bind(txid)
    .fetch_optional(&mut *conn)
    .await?;
    match consumed {
        Some(record) => {
            debug!("🏦️ Bank transaction [{txid}] consumed by order #{order_id}");
            Ok(record)
        },
        None => {
            let current = fetch_transaction(txid, conn).await?;
            Err(classify_unconsumable(txid, current))
        },
    }
}

/// Names the reason a transaction could not be consumed, in the fixed precondition order.
pub fn classify_unconsumable(txid: &str, current: Option<BankTransaction>) -> OrderFlowError {
    match current {
        None => OrderFlowError::TransactionNotFound(txid.to_string()),
        Some(tx) => {
            if let Some(order_id) = tx.used_for_order_id {
                OrderFlowError::TransactionAlreadyUsed { txid: txid.to_string(), order_id }
            } else if tx.status != BankTxStatus::Pending {
                OrderFlowError::TransactionNotPending { txid: txid.to_string(), status: tx.status }
            } else {
                // The conditional write can only have missed because another connection changed the row between our
                // two statements; surface it as a retryable failure.
                OrderFlowError::DatabaseError(format!("Bank transaction [{txid}] changed mid-verification"))
            }
        },
    }
}
