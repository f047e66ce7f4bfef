//! Data model definitions shared across Aryantra crates.
//!
//! Everything here crosses the HTTP boundary between the site front end,
//! the contact relay and the upstream form-intake endpoint, so the types
//! are plain data with optional `serde` support behind the `serde` feature.

#![allow(missing_docs)]

pub mod contact;
pub mod health;
pub mod routes;

pub use contact::ContactFormPayload;
pub use health::{HealthStatus, RelayErrorBody};
