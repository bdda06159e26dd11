use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db_types::{KitchenTicket, TicketStatus},
    traits::OrderFlowError,
};

pub async fn insert_ticket(order_id: i64, conn: &mut SqliteConnection) -> Result<KitchenTicket, OrderFlowError> {
    let ticket = sqlx::query_as("INSERT INTO kitchen_tickets (order_id, status) VALUES ($1, 'WAITING') RETURNING *")
        .bind(order_id)
        .fetch_one(conn)
        .await?;
    trace!("🍳️ Kitchen ticket opened for order #{order_id}");
    Ok(ticket)
}

pub async fn fetch_ticket(ticket_id: i64, conn: &mut SqliteConnection) -> Result<Option<KitchenTicket>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM kitchen_tickets WHERE id = $1").bind(ticket_id).fetch_optional(conn).await
}

pub async fn fetch_ticket_for_order(
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<KitchenTicket>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM kitchen_tickets WHERE order_id = $1").bind(order_id).fetch_optional(conn).await
}

pub async fn set_status(
    ticket_id: i64,
    status: TicketStatus,
    conn: &mut SqliteConnection,
) -> Result<KitchenTicket, OrderFlowError> {
    let result: Option<KitchenTicket> = sqlx::query_as(
        "UPDATE kitchen_tickets SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *",
    )
    .bind(status)
    .bind(ticket_id)
    .fetch_optional(conn)
    .await?;
    result.ok_or(OrderFlowError::TicketNotFound(ticket_id))
}

/// Closes the ticket with the given terminal status as a side effect of the parent order closing. A ticket that is
/// already terminal is left untouched, so racing completion paths stay idempotent.
pub async fn close_for_order(
    order_id: i64,
    terminal: TicketStatus,
    conn: &mut SqliteConnection,
) -> Result<(), OrderFlowError> {
    debug_assert!(terminal.is_terminal());
    sqlx::query(
        r#"
        UPDATE kitchen_tickets SET status = $1, updated_at = CURRENT_TIMESTAMP
        WHERE order_id = $2 AND status NOT IN ('COMPLETED', 'CANCELLED')
        "#,
    )
    .bind(terminal)
    .bind(order_id)
    .execute(conn)
    .await?;
    trace!("🍳️ Ticket for order #{order_id} closed as {terminal}");
    Ok(())
}
