//! `SQLite` storage for the Bounty server.
//!
//! Provides persistence for the settings row, workers, properties and their
//! trusted-worker links, bounties, task templates and the directory tables.

mod db;
mod models;
mod queries;
mod queries_directory;


pub use db::{Database, DatabaseError};
pub use models::*;
