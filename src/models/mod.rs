//! Data models representing store records.
//!
//! This module contains the structs that map to the six record collections,
//! plus the request/response types derived from them.

/// User balance record
pub mod balance;
/// Fund catalog record
pub mod fund;
/// Notification preference record
pub mod preferences;
/// Fund subscription record
pub mod subscription;
/// Transaction audit record
pub mod transaction;
/// Single-tenant user record
pub mod user;
