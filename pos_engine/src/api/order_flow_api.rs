use log::*;

use crate::{
    db_types::{NewOrder, Order, OrderLine, OrderStatus, TableRef},
    traits::{OrderChanged, OrderFlowError, PosDatabase},
};

/// The high-level API for the front-of-house order flow: opening orders, moving them through their lifecycle and
/// cancelling them. The state machine itself lives in the backend; this layer validates the request shape and
/// normalizes free-text status values.
pub struct OrderFlowApi<B> {
    db: B,
}

impl<B: std::fmt::Debug> std::fmt::Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi ({:?})", self.db)
    }
}

impl<B> OrderFlowApi<B>
where B: PosDatabase
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    /// Opens a new order on the table with the given primary key. The table is occupied, a kitchen ticket is queued
    /// and the order starts out PENDING, all in one unit of work.
    pub async fn create_order(&self, table_id: i64, order: NewOrder) -> Result<Order, OrderFlowError> {
        validate_lines(&order)?;
        let created = self.db.create_order(TableRef::Id(table_id), order).await?;
        info!("📝️ Order #{} opened on table id {table_id} for {}", created.id, created.total_amount);
        Ok(created)
    }

    /// Opens an order placed table-side, where the caller only knows the printed table number.
    pub async fn create_public_order(&self, table_number: i64, order: NewOrder) -> Result<Order, OrderFlowError> {
        validate_lines(&order)?;
        let created = self.db.create_order(TableRef::Number(table_number), order).await?;
        info!("📝️ Table-side order #{} opened on table {table_number} for {}", created.id, created.total_amount);
        Ok(created)
    }

    pub async fn fetch_order(&self, order_id: i64) -> Result<Order, OrderFlowError> {
        self.db.fetch_order(order_id).await?.ok_or(OrderFlowError::OrderNotFound(order_id))
    }

    /// Fetches an order together with its lines, for receipts and order detail views.
    pub async fn order_with_lines(&self, order_id: i64) -> Result<(Order, Vec<OrderLine>), OrderFlowError> {
        let order = self.fetch_order(order_id).await?;
        let lines = self.db.fetch_order_lines(order_id).await?;
        Ok((order, lines))
    }

    /// Sets an order's status from a free-text value, as submitted by staff clients. The value is matched
    /// case-insensitively; anything that is not a known status is rejected up front.
    pub async fn update_order_status(&self, order_id: i64, status: &str) -> Result<Order, OrderFlowError> {
        let status = status.parse::<OrderStatus>().map_err(|e| OrderFlowError::InvalidStatus(e.to_string()))?;
        let order = self.db.update_order_status(order_id, status).await?;
        info!("📝️ Order #{order_id} moved to {status}");
        Ok(order)
    }

    /// Cancels an order. Only PENDING and PREPARING orders can be cancelled; the table is released when no other
    /// live order holds it and the kitchen ticket is voided in the same unit of work.
    pub async fn cancel_order(&self, order_id: i64) -> Result<OrderChanged, OrderFlowError> {
        let change = self.db.cancel_order(order_id).await?;
        info!("📝️ Order #{order_id} cancelled (was {})", change.previous_status);
        Ok(change)
    }
}

/// An order must carry at least one line, with a positive quantity and a non-negative unit price on each.
fn validate_lines(order: &NewOrder) -> Result<(), OrderFlowError> {
    if order.lines.is_empty() {
        return Err(OrderFlowError::InvalidOrderLine("An order must contain at least one item".to_string()));
    }
    for line in &order.lines {
        if line.quantity < 1 {
            return Err(OrderFlowError::InvalidOrderLine(format!(
                "Item #{} has quantity {}; it must be at least 1",
                line.item_id, line.quantity
            )));
        }
        if line.unit_price.is_negative() {
            return Err(OrderFlowError::InvalidOrderLine(format!(
                "Item #{} has a negative unit price ({})",
                line.item_id, line.unit_price
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use pos_common::Money;

    use super::validate_lines;
    use crate::{
        db_types::{NewOrder, NewOrderLine, OrderChannel},
        traits::OrderFlowError,
    };

    fn order_with(lines: Vec<NewOrderLine>) -> NewOrder {
        NewOrder::new(OrderChannel::Staff { employee_id: 1, customer_id: None }, lines)
    }

    #[test]
    fn empty_orders_are_rejected() {
        let err = validate_lines(&order_with(vec![])).unwrap_err();
        assert!(matches!(err, OrderFlowError::InvalidOrderLine(_)));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let lines = vec![NewOrderLine { item_id: 7, quantity: 0, unit_price: Money::from_minor(20_000) }];
        let err = validate_lines(&order_with(lines)).unwrap_err();
        assert!(err.to_string().contains("quantity"));
    }

    #[test]
    fn negative_price_is_rejected() {
        let lines = vec![NewOrderLine { item_id: 7, quantity: 1, unit_price: Money::from_minor(-5) }];
        let err = validate_lines(&order_with(lines)).unwrap_err();
        assert!(err.to_string().contains("negative unit price"));
    }

    #[test]
    fn well_formed_lines_pass() {
        let lines = vec![
            NewOrderLine { item_id: 1, quantity: 2, unit_price: Money::from_minor(20_000) },
            NewOrderLine { item_id: 2, quantity: 1, unit_price: Money::from_minor(15_000) },
        ];
        assert!(validate_lines(&order_with(lines)).is_ok());
    }
}
