//! HTTP request handlers for the relay

pub mod contact;
pub mod health;

pub use contact::contact_handler;
pub use health::health_handler;
