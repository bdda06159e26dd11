//! The public-facing operations of the engine, for the surrounding HTTP layer to adapt into endpoints.
//!
//! Each API struct is generic over a [`crate::traits::PosDatabase`] backend. The APIs hold the pure validation
//! (status normalization, money arithmetic, tender checks); the backend holds the atomic units of work.
mod bank_api;
mod cashier_api;
mod kitchen_api;
pub mod objects;
mod order_flow_api;

pub use bank_api::BankFeedApi;
pub use cashier_api::CashierApi;
pub use kitchen_api::KitchenApi;
pub use order_flow_api::OrderFlowApi;
