use pos_common::Money;
use serde::Serialize;

use crate::{
    db_types::{Order, PaymentMethod},
    helpers::PaymentBreakdown,
};

/// A settlement request as it arrives from the cashier terminal, before any validation.
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub order_id: i64,
    pub method: PaymentMethod,
    pub amount_tendered: Money,
    pub bank_txid: Option<String>,
    pub card_last4: Option<String>,
    pub cashier_id: Option<i64>,
    pub notes: Option<String>,
}

impl PaymentRequest {
    pub fn new(order_id: i64, method: PaymentMethod, amount_tendered: Money) -> Self {
        Self { order_id, method, amount_tendered, bank_txid: None, card_last4: None, cashier_id: None, notes: None }
    }

    pub fn with_bank_txid(mut self, txid: impl Into<String>) -> Self {
        self.bank_txid = Some(txid.into());
        self
    }

    pub fn with_card_last4(mut self, last4: impl Into<String>) -> Self {
        self.card_last4 = Some(last4.into());
        self
    }

    pub fn with_cashier(mut self, cashier_id: i64) -> Self {
        self.cashier_id = Some(cashier_id);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// What the cashier gets back after a successful settlement.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentReceipt {
    pub payment_id: i64,
    pub breakdown: PaymentBreakdown,
    pub change: Money,
    pub order: Order,
}

/// The even-split plan for a group bill. The last share absorbs the rounding remainder, so the shares always sum to
/// exactly `total`.
#[derive(Debug, Clone, Serialize)]
pub struct SplitPlan {
    pub order_id: i64,
    pub total: Money,
    pub share_count: u32,
    pub shares: Vec<Money>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefundReceipt {
    pub order_id: i64,
    pub amount: Money,
    pub reason: String,
}
