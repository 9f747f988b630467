//! Domain aggregates exposed by the visa intake service layer.

pub mod application;
pub mod attachment;
pub mod auth;
pub mod idempotency;
pub mod types;
