//! Restaurant order lifecycle engine
//!
//! This library is the transactional core behind the restaurant's point-of-sale: it owns orders and their state
//! machine, the dining tables they occupy, the kitchen tickets that mirror them, and the payments and bank-feed
//! matching that settle them. It is transport-agnostic; the HTTP layer adapts these APIs into endpoints.
//!
//! The library is divided into two main sections:
//! 1. Database management and control ([`mod@sqlite`]). SQLite is the supported backend. You should never need to
//!    access the database directly; use the public API instead. The exception is the data types used in the
//!    database, which are defined in the `db_types` module and are public.
//! 2. The public API ([`mod@api`]). [`OrderFlowApi`] opens, advances and cancels orders; [`KitchenApi`] drives the
//!    ticket queue; [`CashierApi`] takes payment, splits bills and refunds; [`BankFeedApi`] records and matches
//!    incoming bank transactions. Backends implement [`PosDatabase`] to serve these APIs, and every multi-entity
//!    operation is a single unit of work inside the backend.
pub mod api;
pub mod db_types;
pub mod helpers;
pub mod sqlite;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use api::{objects, BankFeedApi, CashierApi, KitchenApi, OrderFlowApi};
pub use sqlite::SqliteDatabase;
pub use traits::{NewBankTransaction, OrderChanged, OrderFlowError, PosDatabase, RefundOutcome, Settlement};
