use chrono::{DateTime, Utc};
use pos_common::Money;
use serde::Serialize;

use crate::db_types::{OrderStatus, PaymentMethod};

/// The audit record returned by status-changing operations.
#[derive(Debug, Clone, Serialize)]
pub struct OrderChanged {
    pub order_id: i64,
    pub table_id: i64,
    pub previous_status: OrderStatus,
    pub new_status: OrderStatus,
}

/// A fully validated settlement, ready to be written in one unit of work. Built by the cashier API after the
/// tendered amount and (for non-cash methods) the bank transaction have been checked.
#[derive(Debug, Clone)]
pub struct Settlement {
    pub order_id: i64,
    pub method: PaymentMethod,
    pub amount_paid: Money,
    pub change_given: Money,
    pub bank_txid: Option<String>,
    pub card_last4: Option<String>,
    pub cashier_id: Option<i64>,
    pub notes: Option<String>,
}

/// The result of reversing a settled order.
#[derive(Debug, Clone)]
pub struct RefundOutcome {
    pub order_id: i64,
    pub amount: Money,
}

/// A bank feed record as handed over by the feed integration. Ingestion itself lives outside the engine; this type
/// exists so integrations and tests can register transactions for matching.
#[derive(Debug, Clone)]
pub struct NewBankTransaction {
    pub txid: String,
    pub amount: Money,
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl NewBankTransaction {
    pub fn new(txid: impl Into<String>, amount: Money) -> Self {
        Self { txid: txid.into(), amount, description: None, occurred_at: Utc::now() }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
