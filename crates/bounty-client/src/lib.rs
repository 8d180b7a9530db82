//! Bounty client library.
//!
//! Typed HTTP client for the marketplace server, the reducer-style state
//! store, the no-show tick poller and the `bounty` CLI subcommands.

pub mod api;
pub mod board;
pub mod bounty_cmd;
pub mod config;
pub mod config_cmd;
pub mod poller;
pub mod property_cmd;
pub mod store;
