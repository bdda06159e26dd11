use pos_common::Money;
use thiserror::Error;

use crate::db_types::{BankTxStatus, PaymentMethod, TableRef};

/// Every failure mode of the order, kitchen, payment and bank-matching flows. Each variant carries enough context
/// for the staff-facing UI to explain the rejection; a generic failure is never surfaced for a validation problem.
#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("Order #{0} does not exist")]
    OrderNotFound(i64),
    #[error("No dining table with {0} exists")]
    TableNotFound(TableRef),
    #[error("Kitchen ticket #{0} does not exist")]
    TicketNotFound(i64),
    #[error("Bank transaction [{0}] does not exist")]
    TransactionNotFound(String),
    #[error("Invalid status value: {0}")]
    InvalidStatus(String),
    #[error("Invalid order line: {0}")]
    InvalidOrderLine(String),
    #[error("{0}")]
    InvalidStateTransition(String),
    #[error("Order #{order_id} has already been paid")]
    AlreadyPaid { order_id: i64 },
    #[error("Cash tendered is {shortfall} short: {tendered} received against {total} due")]
    InsufficientPayment { tendered: Money, total: Money, shortfall: Money },
    #[error("Amount {actual} is more than {tolerance} away from the expected {expected}")]
    AmountMismatch { expected: Money, actual: Money, tolerance: Money },
    #[error("Bank transaction [{txid}] was already used for order #{order_id}")]
    TransactionAlreadyUsed { txid: String, order_id: i64 },
    #[error("Bank transaction [{txid}] has status {status}, not PENDING")]
    TransactionNotPending { txid: String, status: BankTxStatus },
    #[error("A bank transaction id is required for {0} payments")]
    BankTransactionRequired(PaymentMethod),
    #[error("Split count must be at least 2, got {0}")]
    InvalidSplitCount(u32),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl OrderFlowError {
    /// True for the one failure class that the caller may blindly retry. Validation failures are final until the
    /// underlying state changes.
    pub fn is_retryable(&self) -> bool {
        matches!(self, OrderFlowError::DatabaseError(_))
    }
}

impl From<sqlx::Error> for OrderFlowError {
    fn from(e: sqlx::Error) -> Self {
        OrderFlowError::DatabaseError(e.to_string())
    }
}
