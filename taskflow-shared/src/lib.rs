//! # TaskFlow Shared Library
//!
//! Domain types, persistence and business rules used by the TaskFlow API
//! server.
//!
//! ## Module Organization
//!
//! - `models`: entities and their SQL
//! - `db`: the `Store` seam with PostgreSQL and in-memory backends
//! - `auth`: tokens, password hashing, request identity and board authorization
//! - `services`: board hierarchy operations and identity management
//! - `notify`: outbound notifications
//! - `error`: the domain error taxonomy

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod notify;
pub mod services;

/// Current version of the TaskFlow shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
