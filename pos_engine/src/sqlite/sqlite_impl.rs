//! `SqliteDatabase` is the concrete SQLite backend for the order lifecycle coordinator.
//!
//! Every multi-entity operation below is one transaction: begin, perform all reads and writes, commit. On any error
//! path the transaction is dropped and rolled back, so the order, table, ticket and payment records never diverge.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{bank, db_url, new_pool, orders, payments, tables, tickets};
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
    helpers::payment_breakdown,
    traits::{NewBankTransaction, OrderChanged, OrderFlowError, PosDatabase, RefundOutcome, Settlement},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl PosDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn fetch_table(&self, table: TableRef) -> Result<Option<DiningTable>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let result = tables::fetch_table(table, &mut conn).await?;
        Ok(result)
    }

    async fn create_order(&self, table: TableRef, order: NewOrder) -> Result<Order, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let dining_table =
            tables::fetch_table(table, &mut tx).await?.ok_or(OrderFlowError::TableNotFound(table))?;
        let total = order.total();
        let created =
            orders::insert_order(dining_table.id, &order.channel, total, order.notes.as_deref(), &mut tx).await?;
        orders::insert_order_lines(created.id, &order.lines, &mut tx).await?;
        tables::occupy(dining_table.id, &mut tx).await?;
        tickets::insert_ticket(created.id, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order #{} created on table {} at {total}", created.id, dining_table.table_number);
        Ok(created)
    }

    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_lines(&self, order_id: i64) -> Result<Vec<OrderLine>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let lines = orders::fetch_order_lines(order_id, &mut conn).await?;
        Ok(lines)
    }

    async fn update_order_status(&self, order_id: i64, status: OrderStatus) -> Result<Order, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::update_status(order_id, status, &mut tx).await?;
        if status.is_terminal() {
            tables::release_if_idle(order.table_id, &mut tx).await?;
        }
        tx.commit().await?;
        debug!("🗃️ Order #{order_id} status set to {status}");
        Ok(order)
    }

    async fn cancel_order(&self, order_id: i64) -> Result<OrderChanged, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let order =
            orders::fetch_order(order_id, &mut tx).await?.ok_or(OrderFlowError::OrderNotFound(order_id))?;
        let cancelled = orders::mark_cancelled_if_cancellable(order_id, &mut tx).await?.ok_or_else(|| {
            OrderFlowError::InvalidStateTransition(format!(
                "Order #{order_id} cannot be cancelled while it is {}",
                order.status
            ))
        })?;
        tables::release_if_idle(cancelled.table_id, &mut tx).await?;
        tickets::close_for_order(order_id, TicketStatus::Cancelled, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order #{order_id} cancelled (was {})", order.status);
        Ok(OrderChanged {
            order_id,
            table_id: cancelled.table_id,
            previous_status: order.status,
            new_status: cancelled.status,
        })
    }

    async fn fetch_ticket(&self, ticket_id: i64) -> Result<Option<KitchenTicket>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let ticket = tickets::fetch_ticket(ticket_id, &mut conn).await?;
        Ok(ticket)
    }

    async fn fetch_ticket_for_order(&self, order_id: i64) -> Result<Option<KitchenTicket>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let ticket = tickets::fetch_ticket_for_order(order_id, &mut conn).await?;
        Ok(ticket)
    }

    async fn set_ticket_status(
        &self,
        ticket_id: i64,
        status: TicketStatus,
    ) -> Result<KitchenTicket, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let ticket = tickets::set_status(ticket_id, status, &mut tx).await?;
        // The ticket is a projection of the order; keep the parent in step.
        match status {
            TicketStatus::Ready => {
                orders::update_status(ticket.order_id, OrderStatus::Ready, &mut tx).await?;
            },
            TicketStatus::Preparing => {
                orders::advance_to_preparing_if_pending(ticket.order_id, &mut tx).await?;
            },
            _ => {},
        }
        tx.commit().await?;
        debug!("🗃️ Ticket #{ticket_id} set to {status}");
        Ok(ticket)
    }

    async fn settle_order(&self, settlement: Settlement) -> Result<(Payment, Order), OrderFlowError> {
        let order_id = settlement.order_id;
        let mut tx = self.pool.begin().await?;
        let order =
            orders::fetch_order(order_id, &mut tx).await?.ok_or(OrderFlowError::OrderNotFound(order_id))?;
        if order.status == OrderStatus::Cancelled {
            return Err(OrderFlowError::InvalidStateTransition(format!(
                "Order #{order_id} is CANCELLED and cannot be paid"
            )));
        }
        let paid = orders::mark_paid_if_settleable(order_id, &mut tx).await?.ok_or_else(|| {
            // The conditional update missed: a concurrent settlement or completion won the race.
            OrderFlowError::AlreadyPaid { order_id }
        })?;
        tables::release_if_idle(paid.table_id, &mut tx).await?;
        tickets::close_for_order(order_id, TicketStatus::Completed, &mut tx).await?;
        let payment = payments::insert_paid(&settlement, &mut tx).await?;
        if let Some(txid) = settlement.bank_txid.as_deref() {
            bank::consume_transaction(txid, order_id, &mut tx).await?;
        }
        tx.commit().await?;
        debug!("🗃️ Order #{order_id} settled by payment #{} ({})", payment.id, payment.method);
        Ok((payment, paid))
    }

    async fn refund_order(&self, order_id: i64, reason: &str) -> Result<RefundOutcome, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let order =
            orders::fetch_order(order_id, &mut tx).await?.ok_or(OrderFlowError::OrderNotFound(order_id))?;
        if !matches!(order.status, OrderStatus::Paid | OrderStatus::Completed) {
            return Err(OrderFlowError::InvalidStateTransition(format!(
                "Only settled orders can be refunded; order #{order_id} is {}",
                order.status
            )));
        }
        orders::update_status(order_id, OrderStatus::Cancelled, &mut tx).await?;
        // The amount actually kept by the house: what was tendered less the change handed back. Orders closed
        // without a payment row fall back to the billed total.
        let amount = match payments::mark_refunded(order_id, &mut tx).await? {
            Some(payment) => payment.amount_paid - payment.change_given,
            None => payment_breakdown(order.total_amount).total,
        };
        tx.commit().await?;
        info!("🗃️ Order #{order_id} refunded {amount}: {reason}");
        Ok(RefundOutcome { order_id, amount })
    }

    async fn fetch_bank_transaction(&self, txid: &str) -> Result<Option<BankTransaction>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let tx = bank::fetch_transaction(txid, &mut conn).await?;
        Ok(tx)
    }

    async fn record_bank_transaction(&self, tx: NewBankTransaction) -> Result<BankTransaction, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        bank::insert_transaction(tx, &mut conn).await
    }

    async fn close(&mut self) -> Result<(), OrderFlowError> {
        self.pool.close().await;
        Ok(())
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL from the environment.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
