use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use pos_common::Money;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid status value: {0}")]
pub struct StatusConversionError(pub String);

//--------------------------------------    OrderStatus      ---------------------------------------------------------
/// The lifecycle status of an order.
///
/// `PENDING → {CONFIRMED, PREPARING} → {READY, DELIVERED} → {PAID, COMPLETED}`, with `CANCELLED` reachable from any
/// non-terminal status. Orders are never deleted; they end their life in a terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Newly created; the kitchen has not acknowledged it yet.
    Pending,
    /// Acknowledged by staff.
    Confirmed,
    /// The kitchen has started on it.
    Preparing,
    /// Ready to be served.
    Ready,
    /// Served to the table, awaiting settlement.
    Delivered,
    /// Settled through the cashier.
    Paid,
    /// Closed without going through the payment processor.
    Completed,
    /// Cancelled by staff before it became un-cancellable.
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Whether staff may still cancel an order in this status. Once an order is READY or further along, the food is
    /// made and the order can only be settled or refunded.
    pub fn is_cancellable(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Preparing)
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "PENDING"),
            OrderStatus::Confirmed => write!(f, "CONFIRMED"),
            OrderStatus::Preparing => write!(f, "PREPARING"),
            OrderStatus::Ready => write!(f, "READY"),
            OrderStatus::Delivered => write!(f, "DELIVERED"),
            OrderStatus::Paid => write!(f, "PAID"),
            OrderStatus::Completed => write!(f, "COMPLETED"),
            OrderStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = StatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "CONFIRMED" => Ok(Self::Confirmed),
            "PREPARING" => Ok(Self::Preparing),
            "READY" => Ok(Self::Ready),
            "DELIVERED" => Ok(Self::Delivered),
            "PAID" => Ok(Self::Paid),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(StatusConversionError(s.to_string())),
        }
    }
}

//--------------------------------------    TableStatus      ---------------------------------------------------------
/// A dining table is OCCUPIED exactly while it has at least one order in a non-terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableStatus {
    Available,
    Occupied,
}

impl Display for TableStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableStatus::Available => write!(f, "AVAILABLE"),
            TableStatus::Occupied => write!(f, "OCCUPIED"),
        }
    }
}

impl FromStr for TableStatus {
    type Err = StatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AVAILABLE" => Ok(Self::Available),
            "OCCUPIED" => Ok(Self::Occupied),
            _ => Err(StatusConversionError(s.to_string())),
        }
    }
}

//--------------------------------------    TicketStatus     ---------------------------------------------------------
/// The kitchen's view of an order's preparation progress.
///
/// Note the kitchen vocabulary: "complete" on a ticket means "ready to serve", not "order finished". The ticket only
/// reaches COMPLETED when its parent order reaches a terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Waiting,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl TicketStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TicketStatus::Completed | TicketStatus::Cancelled)
    }

    /// Whether kitchen staff may set this status directly. CANCELLED is reachable only through order cancellation.
    pub fn is_kitchen_settable(&self) -> bool {
        !matches!(self, TicketStatus::Cancelled)
    }
}

impl Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TicketStatus::Waiting => write!(f, "WAITING"),
            TicketStatus::Preparing => write!(f, "PREPARING"),
            TicketStatus::Ready => write!(f, "READY"),
            TicketStatus::Completed => write!(f, "COMPLETED"),
            TicketStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

impl FromStr for TicketStatus {
    type Err = StatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "WAITING" => Ok(Self::Waiting),
            "PREPARING" => Ok(Self::Preparing),
            "READY" => Ok(Self::Ready),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(StatusConversionError(s.to_string())),
        }
    }
}

//--------------------------------------   PaymentMethod     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
    QrCode,
    Card,
}

impl PaymentMethod {
    /// Non-cash settlements are matched against an external record rather than counted out of a drawer, so the
    /// tendered amount must match the bill within tolerance and no change is given.
    pub fn is_cash(&self) -> bool {
        matches!(self, PaymentMethod::Cash)
    }

    /// Whether this method settles against the bank feed and therefore requires a transaction id.
    pub fn requires_bank_txid(&self) -> bool {
        matches!(self, PaymentMethod::BankTransfer | PaymentMethod::QrCode)
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "CASH"),
            PaymentMethod::BankTransfer => write!(f, "BANK_TRANSFER"),
            PaymentMethod::QrCode => write!(f, "QR_CODE"),
            PaymentMethod::Card => write!(f, "CARD"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = StatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CASH" => Ok(Self::Cash),
            "BANK_TRANSFER" => Ok(Self::BankTransfer),
            "QR_CODE" => Ok(Self::QrCode),
            "CARD" => Ok(Self::Card),
            _ => Err(StatusConversionError(s.to_string())),
        }
    }
}

//--------------------------------------   PaymentStatus     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Partial,
    Refunded,
    Cancelled,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "PENDING"),
            PaymentStatus::Paid => write!(f, "PAID"),
            PaymentStatus::Partial => write!(f, "PARTIAL"),
            PaymentStatus::Refunded => write!(f, "REFUNDED"),
            PaymentStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

//--------------------------------------   BankTxStatus      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BankTxStatus {
    Pending,
    Verified,
}

impl Display for BankTxStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BankTxStatus::Pending => write!(f, "PENDING"),
            BankTxStatus::Verified => write!(f, "VERIFIED"),
        }
    }
}

//--------------------------------------        Role         ---------------------------------------------------------
/// Staff role tags, used for attribution fields only. Business rules never branch on the role inside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Manager,
    Kitchen,
    Cashier,
    Employee,
}

impl Role {
    /// Maps the position names used on staff records to a role tag. Unknown positions get the default front-of-house
    /// role, EMPLOYEE; there is no other fallthrough.
    pub fn from_position(position: &str) -> Self {
        match position.trim() {
            "Quản lý" => Role::Manager,
            "Đầu bếp" | "Phó bếp" => Role::Kitchen,
            "Thu ngân" => Role::Cashier,
            "Phục vụ" => Role::Employee,
            _ => Role::Employee,
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "ADMIN"),
            Role::Manager => write!(f, "MANAGER"),
            Role::Kitchen => write!(f, "KITCHEN"),
            Role::Cashier => write!(f, "CASHIER"),
            Role::Employee => write!(f, "EMPLOYEE"),
        }
    }
}

//--------------------------------------      TableRef       ---------------------------------------------------------
/// Tables can be addressed by database id (staff terminals) or by the printed table number (QR code entry).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableRef {
    Id(i64),
    Number(i64),
}

impl Display for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableRef::Id(id) => write!(f, "id {id}"),
            TableRef::Number(n) => write!(f, "number {n}"),
        }
    }
}

//--------------------------------------       Order         ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Order {
    pub id: i64,
    pub table_id: i64,
    pub employee_id: Option<i64>,
    pub customer_id: Option<i64>,
    pub customer_name: Option<String>,
    pub total_amount: Money,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      OrderLine      ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OrderLine {
    pub id: i64,
    pub order_id: i64,
    pub item_id: i64,
    pub quantity: i64,
    pub unit_price: Money,
    pub subtotal: Money,
}

//--------------------------------------      NewOrder       ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrderLine {
    pub item_id: i64,
    pub quantity: u32,
    pub unit_price: Money,
}

impl NewOrderLine {
    pub fn new(item_id: i64, quantity: u32, unit_price: Money) -> Self {
        Self { item_id, quantity, unit_price }
    }

    pub fn subtotal(&self) -> Money {
        self.unit_price * i64::from(self.quantity)
    }
}

/// How the order entered the system. Staff orders carry the employee id from the authenticated terminal; table-side
/// orders arrive unauthenticated with the customer's name instead.
#[derive(Debug, Clone)]
pub enum OrderChannel {
    Staff { employee_id: i64, customer_id: Option<i64> },
    TableSide { customer_name: String },
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub channel: OrderChannel,
    pub lines: Vec<NewOrderLine>,
    pub notes: Option<String>,
}

impl NewOrder {
    pub fn new(channel: OrderChannel, lines: Vec<NewOrderLine>) -> Self {
        Self { channel, lines, notes: None }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// The order total is always recomputed from the lines; a caller-supplied total is never trusted.
    pub fn total(&self) -> Money {
        self.lines.iter().map(NewOrderLine::subtotal).sum()
    }
}

//--------------------------------------    DiningTable      ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DiningTable {
    pub id: i64,
    pub table_number: i64,
    pub capacity: i64,
    pub status: TableStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------   KitchenTicket     ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct KitchenTicket {
    pub id: i64,
    pub order_id: i64,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      Payment        ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Payment {
    pub id: i64,
    pub order_id: i64,
    pub method: PaymentMethod,
    pub amount_paid: Money,
    pub change_given: Money,
    pub bank_txid: Option<String>,
    pub card_last4: Option<String>,
    pub status: PaymentStatus,
    pub cashier_id: Option<i64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------  BankTransaction    ---------------------------------------------------------
/// One record from the externally sourced bank feed. `txid` is the bank's identifier and is treated as opaque.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BankTransaction {
    pub txid: String,
    pub amount: Money,
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub status: BankTxStatus,
    pub used_for_order_id: Option<i64>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn order_status_parses_case_insensitively() {
        assert_eq!("pending".parse::<OrderStatus>().unwrap(), OrderStatus::Pending);
        assert_eq!(" Cancelled ".parse::<OrderStatus>().unwrap(), OrderStatus::Cancelled);
        assert_eq!("PAID".parse::<OrderStatus>().unwrap(), OrderStatus::Paid);
        assert!("SHIPPED".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn statuses_render_canonical_uppercase() {
        assert_eq!(OrderStatus::Preparing.to_string(), "PREPARING");
        assert_eq!(PaymentMethod::BankTransfer.to_string(), "BANK_TRANSFER");
        assert_eq!(TicketStatus::Waiting.to_string(), "WAITING");
        let parsed: PaymentMethod = "bank_transfer".parse().unwrap();
        assert_eq!(parsed, PaymentMethod::BankTransfer);
    }

    #[test]
    fn statuses_serialize_canonical_uppercase() {
        assert_eq!(serde_json::to_string(&OrderStatus::Pending).unwrap(), r#""PENDING""#);
        assert_eq!(serde_json::to_string(&PaymentMethod::QrCode).unwrap(), r#""QR_CODE""#);
        assert_eq!(serde_json::to_string(&PaymentStatus::Refunded).unwrap(), r#""REFUNDED""#);
        assert_eq!(serde_json::to_string(&TableStatus::Occupied).unwrap(), r#""OCCUPIED""#);
    }

    #[test]
    fn terminal_and_cancellable_sets() {
        assert!(OrderStatus::Paid.is_terminal());
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Ready.is_terminal());
        assert!(OrderStatus::Pending.is_cancellable());
        assert!(OrderStatus::Preparing.is_cancellable());
        assert!(!OrderStatus::Ready.is_cancellable());
        assert!(!OrderStatus::Delivered.is_cancellable());
    }

    #[test]
    fn role_mapping_has_single_default() {
        assert_eq!(Role::from_position("Đầu bếp"), Role::Kitchen);
        assert_eq!(Role::from_position("Thu ngân"), Role::Cashier);
        assert_eq!(Role::from_position("Phục vụ"), Role::Employee);
        assert_eq!(Role::from_position("Quản lý"), Role::Manager);
        assert_eq!(Role::from_position("Tạp vụ"), Role::Employee);
    }

    #[test]
    fn order_total_is_recomputed_from_lines() {
        let order = NewOrder::new(
            OrderChannel::TableSide { customer_name: "Nguyễn Văn A".to_string() },
            vec![
                NewOrderLine::new(1, 2, Money::from(20_000)),
                NewOrderLine::new(2, 1, Money::from(15_000)),
            ],
        );
        assert_eq!(order.total(), Money::from(55_000));
    }
}
