//! Helpers for integration tests: spinning up a fresh migrated database and seeding it with dining tables.
pub mod prepare_env;
pub mod seed;
