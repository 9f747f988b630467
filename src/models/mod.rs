//! Database models shared across the visa intake repository.

pub mod application;
pub mod attachment;
#[cfg(feature = "server")]
pub mod config;
pub mod idempotency;
pub mod sections;
pub mod status_history;
