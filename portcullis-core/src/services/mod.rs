//! Service layer for policy logic
//!
//! This module contains the concrete services that decide refuse/allow/reset
//! per authentication attempt and manage account expiry.

pub mod attempt;
pub mod expiry;

pub use attempt::{AttemptTrackerService, Decision, ThrottleStatus};
pub use expiry::AccountExpiryService;
