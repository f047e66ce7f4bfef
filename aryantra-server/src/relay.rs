//! Forwarding contact submissions to the intake endpoint.
//!
//! The relay is a passthrough. The submitted JSON goes upstream with
//! `Content-Type: application/json` and whatever comes back is returned
//! with the upstream status: as JSON when the body parses, as text when it
//! does not. Only a failure to get any answer at all is an error.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

use aryantra_config::RelayConfig;
use aryantra_model::ContactFormPayload;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("failed to build upstream client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream answered with unusable status {0}")]
    InvalidStatus(u16),
}

/// Upstream answer, ready to hand back to the submitter.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayResponse {
    Json { status: StatusCode, body: Value },
    Text { status: StatusCode, body: String },
}

impl RelayResponse {
    /// Classify an upstream body. Never fails: anything that is not JSON is
    /// kept as text.
    pub fn from_upstream(status: StatusCode, text: String) -> Self {
        match serde_json::from_str(&text) {
            Ok(body) => Self::Json { status, body },
            Err(_) => Self::Text { status, body: text },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Json { status, .. } | Self::Text { status, .. } => *status,
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json { .. })
    }
}

impl IntoResponse for RelayResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Json { status, body } => (status, Json(body)).into_response(),
            Self::Text { status, body } => (
                status,
                [(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("text/plain; charset=utf-8"),
                )],
                body,
            )
                .into_response(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpstreamRelay {
    http: reqwest::Client,
    upstream: Url,
}

impl UpstreamRelay {
    pub fn new(config: &RelayConfig) -> Result<Self, RelayError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(RelayError::Client)?;
        Ok(Self {
            http,
            upstream: config.upstream_url.clone(),
        })
    }

    pub fn upstream(&self) -> &Url {
        &self.upstream
    }

    /// POST `payload` upstream once. No retry.
    pub async fn forward(&self, payload: &Value) -> Result<RelayResponse, RelayError> {
        let response = self
            .http
            .post(self.upstream.clone())
            .json(payload)
            .send()
            .await?;

        let upstream_status = response.status().as_u16();
        let status = StatusCode::from_u16(upstream_status)
            .map_err(|_| RelayError::InvalidStatus(upstream_status))?;
        let text = response.text().await?;
        debug!(status = upstream_status, body_len = text.len(), "upstream replied");

        Ok(RelayResponse::from_upstream(status, text))
    }
}

/// Submission the `probe` command sends to check the upstream end to end.
pub fn probe_payload() -> ContactFormPayload {
    ContactFormPayload::new(
        "Test User",
        "test@example.com",
        "1234567890",
        "This is a test message from the aryantra-server probe",
    )
}

/// Names of the top-level fields in a submission, for logging without
/// recording what visitors typed.
pub fn field_names(payload: &Value) -> Vec<&str> {
    payload
        .as_object()
        .map(|fields| fields.keys().map(String::as_str).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_bodies_stay_json() {
        let response = RelayResponse::from_upstream(StatusCode::OK, r#"{"result":"success"}"#.into());
        assert_eq!(
            response,
            RelayResponse::Json {
                status: StatusCode::OK,
                body: json!({ "result": "success" }),
            }
        );
    }

    #[test]
    fn anything_else_is_text() {
        let response =
            RelayResponse::from_upstream(StatusCode::BAD_GATEWAY, "<html>oops</html>".into());
        assert!(!response.is_json());
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let empty = RelayResponse::from_upstream(StatusCode::OK, String::new());
        assert!(!empty.is_json());
    }

    #[test]
    fn field_names_skip_values() {
        let payload = json!({ "name": "Ada", "email": "ada@example.com" });
        let mut names = field_names(&payload);
        names.sort_unstable();
        assert_eq!(names, vec!["email", "name"]);
        assert!(field_names(&json!("not an object")).is_empty());
    }

    #[test]
    fn probe_payload_is_complete() {
        assert!(probe_payload().is_complete());
    }
}
