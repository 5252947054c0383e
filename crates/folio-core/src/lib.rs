//! Core types and trait definitions for the Folio contact service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! The API, server and CLI crates depend on it; it depends on nothing
//! proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod service;
pub mod store;
pub mod submission;

pub use error::{Error, Result};
pub use service::ContactService;
