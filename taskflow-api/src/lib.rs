//! # TaskFlow API Server Library
//!
//! HTTP surface of the TaskFlow Kanban service: boards (exposed as
//! projects), columns, cards, comments, memberships and activity.
//!
//! ## Modules
//!
//! - `app`: Application state, authentication gate and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
