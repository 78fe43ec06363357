//! Core types and trait definitions for the siterank catalog and ranking
//! engine.
//!
//! This crate is deliberately free of database and filesystem dependencies.
//! The scoring and ordering rules live here as pure functions so every backend
//! and every driver agrees on them.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod catalog;
pub mod dataset;
pub mod error;
pub mod ranking;
pub mod response;
pub mod retrieval;
pub mod store;

pub use error::{Error, Result, ValidationError};
