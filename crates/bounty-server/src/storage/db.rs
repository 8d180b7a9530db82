//! Database connection and initialization.

pub use bounty_core::db::DatabaseError;

bounty_core::define_database!(Database, "Bounty database migrations complete");
