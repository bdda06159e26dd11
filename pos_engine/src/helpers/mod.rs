//! Pure calculation helpers. Nothing in here touches the database, which keeps the money arithmetic trivially
//! testable.
pub mod billing;

pub use billing::{payment_breakdown, split_shares, PaymentBreakdown, BANK_AMOUNT_TOLERANCE};
