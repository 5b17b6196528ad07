//! HTTP request handlers.

pub mod health;
pub mod monitoring;
pub mod shipments;

pub use health::{health_check, readiness};
