macro_rules! api_path {
    ($path:literal) => {
        concat!("/api", $path)
    };
}

/// Route definitions shared by the relay and the site client.
pub mod api {
    /// Prefix every relay route lives under.
    pub const ROOT: &str = "/api";

    /// Contact form intake, forwarded upstream verbatim.
    pub const CONTACT: &str = api_path!("/contact");
    /// Liveness probe.
    pub const HEALTH: &str = api_path!("/health");
}
