/// Port the relay listens on when nothing overrides it.
pub const DEFAULT_PORT: u16 = 3001;

pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Spreadsheet-backed form intake the site has always submitted to.
pub const DEFAULT_UPSTREAM_URL: &str = "https://script.google.com/macros/s/AKfycbxkZkwQOlMD0lYmTvcvpTsAtq72EbWejS6vNr2oVRtKynJbGLxmLOuvVwQU_xVsrJof/exec";

pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

/// Searched in order when no explicit config path is given.
pub const DEFAULT_CONFIG_LOCATIONS: &[&str] =
    &["aryantra.toml", "config/aryantra.toml"];
