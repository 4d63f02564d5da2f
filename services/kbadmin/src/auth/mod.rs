//! Session authentication for the admin API.
//!
//! # Purpose
//! Groups the server-side session table, the login/logout handlers, and the
//! request gate that every entity and association route passes through.
//!
//! # Security model
//! - The browser only ever holds an opaque random token in the `ckb_session`
//!   cookie; credentials are checked once at login and never stored.
//! - Tokens are kept hashed server-side.
//! - Data access after login uses the service's own warehouse identity.
pub mod gate;
pub mod login;
pub mod session;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "ckb_session";
