//! Core types and trait definitions for the Agora civic-engagement backend.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod directory;
pub mod error;
pub mod event;
pub mod forum;
pub mod ledger;
pub mod memory;
pub mod news;
pub mod petition;
pub mod store;
pub mod user;

pub use error::{EntityKind, Error, Result};
