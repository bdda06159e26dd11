//! The behaviour contract a storage backend must satisfy to drive the order lifecycle coordinator.
//!
//! Each trait method that touches more than one entity is a single atomic unit of work: the backend begins a
//! transaction, performs every read and write for the operation, and commits, rolling the whole unit back on any
//! error so the order, table, ticket and payment records never diverge.
mod data_objects;
mod errors;
mod pos_database;

pub use data_objects::{NewBankTransaction, OrderChanged, RefundOutcome, Settlement};
pub use errors::OrderFlowError;
pub use pos_database::PosDatabase;
