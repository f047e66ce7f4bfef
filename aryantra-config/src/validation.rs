use thiserror::Error;

use crate::models::Config;

#[derive(Debug, Error)]
pub enum ConfigGuardRailError {
    #[error("upstream URL scheme '{scheme}' is not supported; use http or https")]
    UnsupportedUpstreamScheme { scheme: String },
    #[error("upstream URL {url} has no host")]
    UpstreamWithoutHost { url: String },
    #[error("relay timeout must be at least one second")]
    ZeroTimeout,
}

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.items.iter().any(|w| w.message.contains(needle))
    }
}

pub fn apply_guard_rails(
    config: &Config,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();

    let upstream = &config.relay.upstream_url;
    match upstream.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ConfigGuardRailError::UnsupportedUpstreamScheme {
                scheme: other.to_string(),
            });
        }
    }
    if upstream.host_str().is_none_or(str::is_empty) {
        return Err(ConfigGuardRailError::UpstreamWithoutHost {
            url: upstream.to_string(),
        });
    }
    if config.relay.timeout.is_zero() {
        return Err(ConfigGuardRailError::ZeroTimeout);
    }

    if !config.dev_mode {
        if config.relay.is_plain_http() {
            warnings.push_with_hint(
                "Contact submissions are forwarded upstream over plain http",
                "Point CONTACT_UPSTREAM_URL at an https endpoint, or set DEV_MODE=true for local stubs",
            );
        }
        if config.cors.is_permissive() {
            warnings.push_with_hint(
                "CORS accepts any origin",
                "Set CORS_ALLOWED_ORIGINS to the site's origin(s)",
            );
        }
    }

    Ok(warnings)
}
