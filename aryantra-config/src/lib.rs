//! Shared configuration library for the Aryantra relay.
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then environment variables (after loading `.env` when present), and
//! finally whatever CLI flags the binary applies on top. The upstream form
//! endpoint lives here and nowhere else, so the relay and the upstream probe
//! always agree on where submissions go.

#![allow(missing_docs)]

pub mod constants;
pub mod loader;
pub mod models;
pub mod sources;
pub mod util;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoadError, ConfigLoader};
pub use models::{
    Config, ConfigMetadata, CorsConfig, RelayConfig, ServerConfig,
};
pub use validation::{ConfigGuardRailError, ConfigWarning, ConfigWarnings};
