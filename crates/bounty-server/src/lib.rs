//! Bounty marketplace server.
//!
//! The `Store` abstraction and its backends, the marketplace service that
//! applies lifecycle rules through it, and the HTTP routes on top.

pub mod routes;
pub mod seed;
pub mod service;
pub mod storage;
pub mod store;
pub mod ticker;
