//! Business logic services.
//!
//! Services contain the core business logic separated from HTTP handlers:
//! pure validation rules, the subscribe/cancel orchestration and the
//! notification dispatcher.

pub mod fund_service;
pub mod notification;
pub mod validation;
