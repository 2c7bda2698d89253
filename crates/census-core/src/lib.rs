//! Core types and trait definitions for the Census person registry.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! validation rules for a person record live here, once, and every consumer
//! (the REST service, the terminal client) calls through them.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod person;
pub mod service;
pub mod store;
pub mod validate;

pub use error::{Field, ServiceError, ValidationError};
