use serde::{Deserialize, Serialize};
use std::{path::PathBuf, str::FromStr};

use crate::util::{non_empty_var, parse_bool_var, parse_csv_var};

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub relay: FileRelayConfig,
    #[serde(default)]
    pub cors: FileCorsConfig,
    pub dev_mode: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileRelayConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCorsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_host: Option<String>,
    pub port: Option<u16>,
    pub server_port: Option<u16>,
    pub upstream_url: Option<String>,
    pub upstream_timeout_secs: Option<u64>,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub dev_mode: Option<bool>,
    /// Variables that were set but did not parse.
    pub invalid: Vec<InvalidEnvVar>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidEnvVar {
    pub name: &'static str,
    pub value: String,
}

/// Parse `raw` as `T`, recording it in `invalid` when it is set but bad.
pub fn parse_value<T: FromStr>(
    name: &'static str,
    raw: Option<String>,
    invalid: &mut Vec<InvalidEnvVar>,
) -> Option<T> {
    let raw = raw?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            invalid.push(InvalidEnvVar { name, value: raw });
            None
        }
    }
}

fn parse_var<T: FromStr>(
    name: &'static str,
    invalid: &mut Vec<InvalidEnvVar>,
) -> Option<T> {
    parse_value(name, non_empty_var(name), invalid)
}

impl EnvConfig {
    pub fn gather() -> Self {
        let mut invalid = Vec::new();
        let port = parse_var("PORT", &mut invalid);
        let server_port = parse_var("SERVER_PORT", &mut invalid);
        let upstream_timeout_secs =
            parse_var("CONTACT_UPSTREAM_TIMEOUT_SECS", &mut invalid);

        Self {
            config_path: non_empty_var("ARYANTRA_CONFIG").map(PathBuf::from),
            server_host: non_empty_var("SERVER_HOST"),
            port,
            server_port,
            upstream_url: non_empty_var("CONTACT_UPSTREAM_URL"),
            upstream_timeout_secs,
            cors_allowed_origins: parse_csv_var("CORS_ALLOWED_ORIGINS"),
            dev_mode: parse_bool_var("DEV_MODE"),
            invalid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_numbers_are_recorded_by_name() {
        let mut invalid = Vec::new();
        assert_eq!(parse_value::<u16>("PORT", Some("3001".into()), &mut invalid), Some(3001));
        assert_eq!(parse_value::<u16>("PORT", None, &mut invalid), None);
        assert!(invalid.is_empty());

        assert_eq!(parse_value::<u16>("SERVER_PORT", Some("70000".into()), &mut invalid), None);
        assert_eq!(
            invalid,
            vec![InvalidEnvVar {
                name: "SERVER_PORT",
                value: "70000".into(),
            }]
        );
    }
}
