//! Core types and trait definitions for the agenda contacts service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::ContactStore`], upstream clients
//! implement the traits in [`upstream`], and [`directory::Directory`] ties
//! them together.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod contact;
pub mod directory;
pub mod error;
pub mod store;
pub mod upstream;

pub use error::{Error, Result, UpstreamError};

#[cfg(test)]
mod tests;
