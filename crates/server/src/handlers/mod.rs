//! HTTP request handlers.

pub mod access;
pub mod health;

pub use access::dispatch;
pub use health::health_check;
