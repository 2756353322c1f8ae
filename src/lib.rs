//! # Like Agent Library
//!
//! Keeps a per-region pool of game session tokens and fans a single
//! like request out across all of them.
//!
//! Modules:
//! - `config` — service configuration, defaults and validation
//! - `credentials` — per-region account credential loading
//! - `sources` — identity service client issuing session tokens
//! - `cache` — per-region token cache with lazy refresh
//! - `dispatch` — payload building and concurrent like fan-out
//! - `server` — HTTP routes

pub mod cache;
pub mod config;
pub mod credentials;
pub mod dispatch;
pub mod helpers;
pub mod observability;
pub mod server;
pub mod sources;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::config::service::ServiceConfig;
