use log::*;
use pos_common::Money;

use crate::{
    db_types::{BankTransaction, BankTxStatus},
    helpers::BANK_AMOUNT_TOLERANCE,
    traits::{NewBankTransaction, OrderFlowError, PosDatabase},
};

/// The bank-feed API: recording incoming transfer notifications and checking a transaction against an expected
/// amount. Verification here is read-only; a transaction is only consumed (bound to an order, at most once) inside
/// the settlement unit of work.
pub struct BankFeedApi<B> {
    db: B,
}

impl<B: std::fmt::Debug> std::fmt::Debug for BankFeedApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BankFeedApi ({:?})", self.db)
    }
}

impl<B> BankFeedApi<B>
where B: PosDatabase
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    /// Records a transaction from the bank notification feed. Recording the same txid twice is an error.
    pub async fn record_transaction(&self, tx: NewBankTransaction) -> Result<BankTransaction, OrderFlowError> {
        let record = self.db.record_bank_transaction(tx).await?;
        info!("🏦️ Bank transaction [{}] recorded for {}", record.txid, record.amount);
        Ok(record)
    }

    pub async fn fetch_transaction(&self, txid: &str) -> Result<BankTransaction, OrderFlowError> {
        self.db
            .fetch_bank_transaction(txid)
            .await?
            .ok_or_else(|| OrderFlowError::TransactionNotFound(txid.to_string()))
    }

    /// Checks that the named transaction exists, is unused, is still PENDING and matches the expected amount to
    /// within the tolerance. Returns the transaction without touching it.
    pub async fn verify(&self, txid: &str, expected: Money) -> Result<BankTransaction, OrderFlowError> {
        let tx = self.fetch_transaction(txid).await?;
        check_usable(&tx, expected)?;
        debug!("🏦️ Bank transaction [{txid}] matches the expected {expected}");
        Ok(tx)
    }
}

/// The read-only half of transaction matching, shared with the settlement flow. The checks run in a fixed order so
/// the most specific failure is always the one reported: already used, then not pending, then amount.
pub(crate) fn check_usable(tx: &BankTransaction, expected: Money) -> Result<(), OrderFlowError> {
    if let Some(order_id) = tx.used_for_order_id {
        return Err(OrderFlowError::TransactionAlreadyUsed { txid: tx.txid.clone(), order_id });
    }
    if tx.status != BankTxStatus::Pending {
        return Err(OrderFlowError::TransactionNotPending { txid: tx.txid.clone(), status: tx.status });
    }
    if tx.amount.abs_diff(expected) > BANK_AMOUNT_TOLERANCE {
        return Err(OrderFlowError::AmountMismatch {
            expected,
            actual: tx.amount,
            tolerance: BANK_AMOUNT_TOLERANCE,
        });
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use chrono::Utc;
    use pos_common::Money;

    use super::check_usable;
    use crate::{
        db_types::{BankTransaction, BankTxStatus},
        traits::OrderFlowError,
    };

    fn pending_tx(amount: i64) -> BankTransaction {
        BankTransaction {
            txid: "FT20260826001".to_string(),
            amount: Money::from_minor(amount),
            description: None,
            status: BankTxStatus::Pending,
            used_for_order_id: None,
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn matches_within_tolerance() {
        let tx = pending_tx(63_000);
        assert!(check_usable(&tx, Money::from_minor(63_250)).is_ok());
        // Exactly at the edge is still a match.
        assert!(check_usable(&tx, Money::from_minor(68_000)).is_ok());
    }

    #[test]
    fn rejects_beyond_tolerance() {
        let tx = pending_tx(56_250);
        let err = check_usable(&tx, Money::from_minor(63_250)).unwrap_err();
        assert!(matches!(err, OrderFlowError::AmountMismatch { .. }));
    }

    #[test]
    fn used_wins_over_amount() {
        let mut tx = pending_tx(1);
        tx.used_for_order_id = Some(42);
        let err = check_usable(&tx, Money::from_minor(63_250)).unwrap_err();
        assert!(matches!(err, OrderFlowError::TransactionAlreadyUsed { order_id: 42, .. }));
    }

    #[test]
    fn non_pending_is_rejected() {
        let mut tx = pending_tx(63_250);
        tx.status = BankTxStatus::Verified;
        let err = check_usable(&tx, Money::from_minor(63_250)).unwrap_err();
        assert!(matches!(err, OrderFlowError::TransactionNotPending { status: BankTxStatus::Verified, .. }));
    }
}
