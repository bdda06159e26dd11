use log::*;

use crate::{
    db_types::{KitchenTicket, TicketStatus},
    traits::{OrderFlowError, PosDatabase},
};

/// The kitchen display API. Cooks move tickets through WAITING → PREPARING → READY; the backend mirrors PREPARING
/// and READY onto the parent order in the same unit of work. Voiding a ticket is not a kitchen action; tickets are
/// cancelled only as a side effect of cancelling the order.
pub struct KitchenApi<B> {
    db: B,
}

impl<B: std::fmt::Debug> std::fmt::Debug for KitchenApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KitchenApi ({:?})", self.db)
    }
}

impl<B> KitchenApi<B>
where B: PosDatabase
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub async fn fetch_ticket(&self, ticket_id: i64) -> Result<KitchenTicket, OrderFlowError> {
        self.db.fetch_ticket(ticket_id).await?.ok_or(OrderFlowError::TicketNotFound(ticket_id))
    }

    pub async fn ticket_for_order(&self, order_id: i64) -> Result<KitchenTicket, OrderFlowError> {
        self.db.fetch_ticket_for_order(order_id).await?.ok_or(OrderFlowError::OrderNotFound(order_id))
    }

    /// Sets a ticket's status from a free-text value submitted by the kitchen display. CANCELLED is refused here;
    /// it is reserved for the order-cancellation flow.
    pub async fn set_ticket_status(&self, ticket_id: i64, status: &str) -> Result<KitchenTicket, OrderFlowError> {
        let status = status.parse::<TicketStatus>().map_err(|e| OrderFlowError::InvalidStatus(e.to_string()))?;
        if !status.is_kitchen_settable() {
            return Err(OrderFlowError::InvalidStatus(format!(
                "The kitchen cannot set a ticket to {status}; cancel the order instead"
            )));
        }
        let ticket = self.db.set_ticket_status(ticket_id, status).await?;
        info!("🍳️ Ticket #{ticket_id} set to {status} (order #{})", ticket.order_id);
        Ok(ticket)
    }

    /// Marks a ticket as being cooked. The parent order advances from PENDING to PREPARING if it has not moved on
    /// already.
    pub async fn start_preparing(&self, ticket_id: i64) -> Result<KitchenTicket, OrderFlowError> {
        let ticket = self.db.set_ticket_status(ticket_id, TicketStatus::Preparing).await?;
        info!("🍳️ Ticket #{ticket_id} is being prepared (order #{})", ticket.order_id);
        Ok(ticket)
    }

    /// Marks a ticket as done in the kitchen, meaning the food is ready for the pass. The parent order goes to
    /// READY; delivery to the table is recorded separately by the floor staff.
    pub async fn mark_ready(&self, ticket_id: i64) -> Result<KitchenTicket, OrderFlowError> {
        let ticket = self.db.set_ticket_status(ticket_id, TicketStatus::Ready).await?;
        info!("🍳️ Ticket #{ticket_id} is ready for the pass (order #{})", ticket.order_id);
        Ok(ticket)
    }
}
