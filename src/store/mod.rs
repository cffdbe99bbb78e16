//! Data store gateway.
//!
//! Key-based access to the six record collections. Every read is a primary
//! key lookup (or a keyed listing) and every write touches exactly one
//! record. Balance and subscription mutations are conditional: the write
//! applies only while the record still holds the value the caller read,
//! and the caller learns via the returned bool whether it won.

pub mod balances;
pub mod funds;
pub mod preferences;
pub mod subscriptions;
pub mod transactions;
pub mod users;
