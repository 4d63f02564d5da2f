//! Category knowledge base admin service.
//!
//! # Purpose
//! Exposes the admin HTTP API, session auth, configuration and the storage
//! backends for use by the binary and tests.
pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod model;
pub mod observability;
pub mod store;
