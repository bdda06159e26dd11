use log::*;
use pos_common::Money;

use crate::{
    api::{
        bank_api::check_usable,
        objects::{PaymentReceipt, PaymentRequest, RefundReceipt, SplitPlan},
    },
    db_types::OrderStatus,
    helpers::{payment_breakdown, split_shares, BANK_AMOUNT_TOLERANCE},
    traits::{OrderFlowError, PosDatabase, Settlement},
};

/// The cashier-terminal API: taking payment, computing split plans and issuing refunds. The tender validation (cash
/// sufficiency, non-cash tolerance, bank-feed matching) happens here; the at-most-once settlement itself is a
/// single unit of work in the backend.
pub struct CashierApi<B> {
    db: B,
}

impl<B: std::fmt::Debug> std::fmt::Debug for CashierApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CashierApi ({:?})", self.db)
    }
}

impl<B> CashierApi<B>
where B: PosDatabase
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    /// Settles an order.
    ///
    /// The amount due is the breakdown total of the order's stored amount, never a caller-supplied figure. Cash must
    /// cover the total and the difference comes back as change; any other method must land within
    /// [`BANK_AMOUNT_TOLERANCE`] of the total and gives no change. Bank-feed methods additionally name a PENDING,
    /// unused transaction, which is consumed inside the settlement so it can never pay for two orders.
    pub async fn process_payment(&self, request: PaymentRequest) -> Result<PaymentReceipt, OrderFlowError> {
        let order_id = request.order_id;
        let order = self.db.fetch_order(order_id).await?.ok_or(OrderFlowError::OrderNotFound(order_id))?;
        match order.status {
            OrderStatus::Cancelled => {
                return Err(OrderFlowError::InvalidStateTransition(format!(
                    "Order #{order_id} is CANCELLED and cannot be paid"
                )))
            },
            OrderStatus::Paid | OrderStatus::Completed => return Err(OrderFlowError::AlreadyPaid { order_id }),
            _ => {},
        }
        let breakdown = payment_breakdown(order.total_amount);
        let total = breakdown.total;
        let tendered = request.amount_tendered;
        let change = if request.method.is_cash() {
            if tendered < total {
                return Err(OrderFlowError::InsufficientPayment { tendered, total, shortfall: total - tendered });
            }
            tendered - total
        } else {
            if tendered.abs_diff(total) > BANK_AMOUNT_TOLERANCE {
                return Err(OrderFlowError::AmountMismatch {
                    expected: total,
                    actual: tendered,
                    tolerance: BANK_AMOUNT_TOLERANCE,
                });
            }
            Money::zero()
        };
        if request.method.requires_bank_txid() {
            let txid = request
                .bank_txid
                .as_deref()
                .ok_or(OrderFlowError::BankTransactionRequired(request.method))?;
            // Read-only pre-check so a doomed settlement fails before any writes. The authoritative, race-safe
            // consumption happens inside the settlement transaction.
            let tx = self
                .db
                .fetch_bank_transaction(txid)
                .await?
                .ok_or_else(|| OrderFlowError::TransactionNotFound(txid.to_string()))?;
            check_usable(&tx, total)?;
        }
        let settlement = Settlement {
            order_id,
            method: request.method,
            amount_paid: tendered,
            change_given: change,
            bank_txid: request.bank_txid,
            card_last4: request.card_last4,
            cashier_id: request.cashier_id,
            notes: request.notes,
        };
        let (payment, order) = self.db.settle_order(settlement).await?;
        info!(
            "💰️ Order #{order_id} paid {tendered} by {} (change {change}, payment #{})",
            payment.method, payment.id
        );
        Ok(PaymentReceipt { payment_id: payment.id, breakdown, change, order })
    }

    /// Computes an even split of an order's bill into `share_count` shares that sum to exactly the breakdown total.
    /// A plan can only be drawn up for an order that is still payable.
    pub async fn compute_split(&self, order_id: i64, share_count: u32) -> Result<SplitPlan, OrderFlowError> {
        if share_count < 2 {
            return Err(OrderFlowError::InvalidSplitCount(share_count));
        }
        let order = self.db.fetch_order(order_id).await?.ok_or(OrderFlowError::OrderNotFound(order_id))?;
        if matches!(order.status, OrderStatus::Paid | OrderStatus::Completed) {
            return Err(OrderFlowError::AlreadyPaid { order_id });
        }
        if order.status == OrderStatus::Cancelled {
            return Err(OrderFlowError::InvalidStateTransition(format!(
                "Order #{order_id} is CANCELLED; there is nothing to split"
            )));
        }
        let total = payment_breakdown(order.total_amount).total;
        let shares = split_shares(total, share_count);
        debug!("💰️ Order #{order_id} bill of {total} split {share_count} ways");
        Ok(SplitPlan { order_id, total, share_count, shares })
    }

    /// Refunds a settled order. The order goes to CANCELLED, its payment row to REFUNDED, and the amount returned
    /// is what the house actually kept. An explicit override caps a partial refund.
    pub async fn refund_payment(
        &self,
        order_id: i64,
        amount_override: Option<Money>,
        reason: &str,
    ) -> Result<RefundReceipt, OrderFlowError> {
        let outcome = self.db.refund_order(order_id, reason).await?;
        let amount = match amount_override {
            Some(requested) if requested < outcome.amount => requested,
            _ => outcome.amount,
        };
        info!("💰️ Order #{order_id} refunded {amount}: {reason}");
        Ok(RefundReceipt { order_id, amount, reason: reason.to_string() })
    }
}
