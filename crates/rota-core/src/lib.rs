//! Core types and trait definitions for the Rota staff scheduler.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod activity;
pub mod department;
pub mod error;
pub mod message;
pub mod notice;
pub mod patch;
pub mod permission;
pub mod rules;
pub mod shift;
pub mod store;
pub mod time_off;
pub mod user;

pub use error::{Error, Result};
