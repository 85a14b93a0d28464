//! Durable audit trail for analyzed submissions

pub mod log;

pub use log::{separator, utc_timestamp, AuditLog, LogStats};
