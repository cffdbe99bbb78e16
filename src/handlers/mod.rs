//! HTTP request handlers (route handlers).
//!
//! Handlers stay thin: they extract request data, delegate to the
//! services or the store gateway, and wrap the result in the response
//! envelope.

/// Fund catalog and subscribe/cancel endpoints
pub mod funds;
/// Liveness endpoint
pub mod health;
/// User balance, history and preference endpoints
pub mod user;
