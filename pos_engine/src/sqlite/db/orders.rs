use log::{debug, trace};
use pos_common::Money;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrderLine, Order, OrderChannel, OrderLine, OrderStatus},
    traits::OrderFlowError,
};

/// Inserts a new order row in PENDING. This is not atomic on its own; callers embed it in a transaction together
/// with the line inserts and the table/ticket side effects, passing `&mut *tx` as the connection argument.
pub async fn insert_order(
    table_id: i64,
    channel: &OrderChannel,
    total: Money,
    notes: Option<&str>,
    conn: &mut SqliteConnection,
) -> Result<Order, OrderFlowError> {
    let (employee_id, customer_id, customer_name) = match channel {
        OrderChannel::Staff { employee_id, customer_id } => (Some(*employee_id), *customer_id, None),
        OrderChannel::TableSide { customer_name } => (None, None, Some(customer_name.as_str())),
    };
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (table_id, employee_id, customer_id, customer_name, total_amount, status, notes)
            VALUES ($1, $2, $3, $4, $5, 'PENDING', $6)
            RETURNING *;
        "#,
    )
    .bind(table_id)
    .bind(employee_id)
    .bind(customer_id)
    .bind(customer_name)
    .bind(total)
    .bind(notes)
    .fetch_one(conn)
    .await?;
    debug!("📝️ Order #{} inserted for table #{table_id} at {total}", order.id);
    Ok(order)
}

pub async fn insert_order_lines(
    order_id: i64,
    lines: &[NewOrderLine],
    conn: &mut SqliteConnection,
) -> Result<(), OrderFlowError> {
    for line in lines {
        sqlx::query(
            r#"
                INSERT INTO order_items (order_id, item_id, quantity, unit_price, subtotal)
                VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(order_id)
        .bind(line.item_id)
        .bind(i64::from(line.quantity))
        .bind(line.unit_price)
        .bind(line.subtotal())
        .execute(&mut *conn)
        .await?;
    }
    trace!("📝️ {} lines added to order #{order_id}", lines.len());
    Ok(())
}

pub async fn fetch_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(order_id).fetch_optional(conn).await
}

pub async fn fetch_order_lines(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderLine>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id ASC")
        .bind(order_id)
        .fetch_all(conn)
        .await
}

/// Unconditionally sets the order status. Transition rules belong to the callers; this is the generic staff path.
pub async fn update_status(
    order_id: i64,
    status: OrderStatus,
    conn: &mut SqliteConnection,
) -> Result<Order, OrderFlowError> {
    let result: Option<Order> =
        sqlx::query_as("UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *")
            .bind(status)
            .bind(order_id)
            .fetch_optional(conn)
            .await?;
    result.ok_or(OrderFlowError::OrderNotFound(order_id))
}

/// Flips the order to PAID, but only while it is still settleable. A zero-row update means a concurrent settlement
/// (or a cancellation) got there first; the caller maps that to the precise error.
///
/// Returns `None` when the conditional write matched no row.
pub async fn mark_paid_if_settleable(
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, OrderFlowError> {
    let result: Option<Order> = sqlx::query_as(
        r#"
        UPDATE orders SET status = 'PAID', updated_at = CURRENT_TIMESTAMP
        WHERE id = $1 AND status NOT IN ('PAID', 'COMPLETED', 'CANCELLED')
        RETURNING *
        "#,
    )
    .bind(order_id)
    .fetch_optional(conn)
    .await?;
    Ok(result)
}

/// Flips the order to CANCELLED, but only from a still-cancellable status. Returns `None` when the conditional
/// write matched no row (already started, settled or cancelled).
pub async fn mark_cancelled_if_cancellable(
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, OrderFlowError> {
    let result: Option<Order> = sqlx::query_as(
        r#"
        UPDATE orders SET status = 'CANCELLED', updated_at = CURRENT_TIMESTAMP
        WHERE id = $1 AND status IN ('PENDING', 'PREPARING')
        RETURNING *
        "#,
    )
    .bind(order_id)
    .fetch_optional(conn)
    .await?;
    Ok(result)
}

/// Pushes a PENDING order to PREPARING when the kitchen starts on it. Orders that are already further along are
/// left untouched.
pub async fn advance_to_preparing_if_pending(
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<(), OrderFlowError> {
    sqlx::query(
        "UPDATE orders SET status = 'PREPARING', updated_at = CURRENT_TIMESTAMP WHERE id = $1 AND status = 'PENDING'",
    )
    .bind(order_id)
    .execute(conn)
    .await?;
    Ok(())
}
