use crate::{
    db_types::{
        BankTransaction,
        DiningTable,
        KitchenTicket,
        NewOrder,
        Order,
        OrderLine,
        OrderStatus,
        Payment,
        TableRef,
        TicketStatus,
    },
    traits::{NewBankTransaction, OrderChanged, OrderFlowError, RefundOutcome, Settlement},
};

/// The storage contract for the order lifecycle coordinator.
///
/// Multi-entity methods ([`Self::create_order`], [`Self::cancel_order`], [`Self::settle_order`],
/// [`Self::refund_order`], [`Self::set_ticket_status`]) must each execute as one atomic unit of work. Within a unit,
/// writes are issued in a fixed order (order, then table, then ticket, then payment/bank transaction), but it is the
/// atomicity that matters: partial visibility must never occur.
#[allow(async_fn_in_trait)]
pub trait PosDatabase: Clone {
    /// The URL of the backing store.
    fn url(&self) -> &str;

    async fn fetch_table(&self, table: TableRef) -> Result<Option<DiningTable>, OrderFlowError>;

    /// Creates an order in one atomic unit: inserts the order row in PENDING with its lines, sets the table to
    /// OCCUPIED, and opens a kitchen ticket in WAITING.
    ///
    /// The table must resolve, or `TableNotFound` is returned and nothing is written. An OCCUPIED table is
    /// permitted; multiple open orders per table are not prevented here.
    async fn create_order(&self, table: TableRef, order: NewOrder) -> Result<Order, OrderFlowError>;

    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, OrderFlowError>;

    async fn fetch_order_lines(&self, order_id: i64) -> Result<Vec<OrderLine>, OrderFlowError>;

    /// Sets the order status on the generic staff path. If the target status is terminal, the table is released
    /// (provided no other active order still occupies it). No other ordering constraint is enforced here.
    async fn update_order_status(&self, order_id: i64, status: OrderStatus) -> Result<Order, OrderFlowError>;

    /// Cancels an order that is still cancellable, releasing its table and cancelling its kitchen ticket in the same
    /// unit of work. Returns the previous and new status for audit.
    ///
    /// The status check and the status write happen inside one transaction, so a cancel racing a settlement cannot
    /// both succeed.
    async fn cancel_order(&self, order_id: i64) -> Result<OrderChanged, OrderFlowError>;

    async fn fetch_ticket(&self, ticket_id: i64) -> Result<Option<KitchenTicket>, OrderFlowError>;

    async fn fetch_ticket_for_order(&self, order_id: i64) -> Result<Option<KitchenTicket>, OrderFlowError>;

    /// Sets the kitchen ticket status and mirrors it onto the parent order: READY pushes the order to READY;
    /// PREPARING pushes the order to PREPARING only while it is still PENDING.
    async fn set_ticket_status(&self, ticket_id: i64, status: TicketStatus) -> Result<KitchenTicket, OrderFlowError>;

    /// Writes a validated settlement in one atomic unit: inserts the PAID payment row, consumes the bank transaction
    /// if one was used, flips the order to PAID via a conditional update, releases the table, and completes the
    /// kitchen ticket.
    ///
    /// The conditional update (`status` must still be settleable at write time) is the at-most-one-paid guarantee:
    /// of two racing settlements for the same order, exactly one commits and the other gets `AlreadyPaid`.
    async fn settle_order(&self, settlement: Settlement) -> Result<(Payment, Order), OrderFlowError>;

    /// Reverses a settled order: order status to CANCELLED, its PAID payment to REFUNDED. The table and ticket stay
    /// closed; a refund does not reopen service.
    async fn refund_order(&self, order_id: i64, reason: &str) -> Result<RefundOutcome, OrderFlowError>;

    async fn fetch_bank_transaction(&self, txid: &str) -> Result<Option<BankTransaction>, OrderFlowError>;

    /// Registers a bank feed record for later matching. For use by the feed integration and tests.
    async fn record_bank_transaction(&self, tx: NewBankTransaction) -> Result<BankTransaction, OrderFlowError>;

    /// Closes the connection to the backing store.
    async fn close(&mut self) -> Result<(), OrderFlowError> {
        Ok(())
    }
}
