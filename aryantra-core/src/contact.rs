//! Contact form client.
//!
//! The form posts its fields as JSON to the relay and treats any 2xx reply
//! as delivered. One request may be in flight per form; a successful send
//! shows the confirmation for a few seconds and then clears the form.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use aryantra_model::{ContactFormPayload, routes};
use parking_lot::Mutex;
use serde_json::Value;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

pub const DEFAULT_RELAY_ORIGIN: &str = "http://localhost:3001";
pub const SUBMITTED_RESET_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("invalid relay endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("relay request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("relay answered {status}")]
    Rejected { status: u16, body: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    fn parse(text: String) -> Self {
        match serde_json::from_str(&text) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Text(text),
        }
    }
}

/// What the relay said about a delivered submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitReceipt {
    pub status: u16,
    pub body: ResponseBody,
}

#[derive(Debug, Clone)]
pub struct ContactClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl ContactClient {
    pub fn new(endpoint: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
        }
    }

    /// Client for the relay served at `origin`.
    pub fn for_origin(origin: &str) -> Result<Self, SubmitError> {
        let endpoint = Url::parse(origin)?.join(routes::api::CONTACT)?;
        Ok(Self::new(endpoint))
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub async fn submit(
        &self,
        payload: &ContactFormPayload,
    ) -> Result<SubmitReceipt, SubmitError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        debug!(status = status.as_u16(), body_len = text.len(), "relay replied");

        if !status.is_success() {
            return Err(SubmitError::Rejected {
                status: status.as_u16(),
                body: text,
            });
        }

        let body = ResponseBody::parse(text);
        if matches!(body, ResponseBody::Text(_)) {
            debug!("relay reply is not JSON, keeping it as text");
        }
        Ok(SubmitReceipt {
            status: status.as_u16(),
            body,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Sent,
    /// The relay was unreachable or answered non-2xx. The fields are kept
    /// so the visitor can resubmit.
    Failed,
    AlreadyInFlight,
    Incomplete(Vec<&'static str>),
}

#[derive(Debug, Default)]
struct FormInner {
    fields: Mutex<ContactFormPayload>,
    submitting: AtomicBool,
    submitted: AtomicBool,
    reset: Mutex<Option<CancellationToken>>,
}

/// Clears the in-flight flag even when the submit future is dropped.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Debug)]
pub struct ContactForm {
    client: ContactClient,
    reset_delay: Duration,
    inner: Arc<FormInner>,
}

impl ContactForm {
    pub fn new(client: ContactClient) -> Self {
        Self {
            client,
            reset_delay: SUBMITTED_RESET_DELAY,
            inner: Arc::default(),
        }
    }

    pub fn with_reset_delay(mut self, delay: Duration) -> Self {
        self.reset_delay = delay;
        self
    }

    pub fn fields(&self) -> ContactFormPayload {
        self.inner.fields.lock().clone()
    }

    pub fn update(&self, edit: impl FnOnce(&mut ContactFormPayload)) {
        edit(&mut *self.inner.fields.lock());
    }

    pub fn set_fields(&self, payload: ContactFormPayload) {
        *self.inner.fields.lock() = payload;
    }

    /// The submit control is disabled while this is true.
    pub fn is_submitting(&self) -> bool {
        self.inner.submitting.load(Ordering::Acquire)
    }

    /// The confirmation is showing.
    pub fn is_submitted(&self) -> bool {
        self.inner.submitted.load(Ordering::Acquire)
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let payload = {
            let fields = self.inner.fields.lock();
            if !fields.is_complete() {
                return SubmitOutcome::Incomplete(fields.missing_fields());
            }
            fields.clone()
        };

        if self
            .inner
            .submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("submission already in flight");
            return SubmitOutcome::AlreadyInFlight;
        }
        let in_flight = InFlight(&self.inner.submitting);
        let result = self.client.submit(&payload).await;
        drop(in_flight);

        match result {
            Ok(receipt) => {
                info!(status = receipt.status, "contact form delivered");
                self.inner.submitted.store(true, Ordering::Release);
                self.schedule_reset();
                SubmitOutcome::Sent
            }
            Err(err) => {
                warn!(error = %err, "contact form submission failed");
                self.inner.submitted.store(false, Ordering::Release);
                SubmitOutcome::Failed
            }
        }
    }

    fn schedule_reset(&self) {
        let token = CancellationToken::new();
        if let Some(previous) = self.inner.reset.lock().replace(token.clone()) {
            previous.cancel();
        }

        let inner = Arc::clone(&self.inner);
        let delay = self.reset_delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    inner.submitted.store(false, Ordering::Release);
                    inner.fields.lock().clear();
                }
            }
        });
    }

    /// Cancel the pending confirmation reset.
    pub fn teardown(&self) {
        if let Some(token) = self.inner.reset.lock().take() {
            token.cancel();
        }
    }
}

impl Drop for ContactForm {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use axum::{Json, Router, http::StatusCode, routing::post};
    use serde_json::json;
    use tokio::net::TcpListener;

    use super::*;

    async fn serve(app: Router) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });
        addr
    }

    async fn relay_ok() -> SocketAddr {
        serve(Router::new().route(
            routes::api::CONTACT,
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["email"], "test@example.com");
                Json(json!({ "result": "success" }))
            }),
        ))
        .await
    }

    fn client_for_origin(origin: &str) -> ContactClient {
        ContactClient::for_origin(origin).expect("endpoint")
    }

    fn client_for(addr: SocketAddr) -> ContactClient {
        client_for_origin(&format!("http://{addr}"))
    }

    fn filled() -> ContactFormPayload {
        ContactFormPayload::new(
            "Test User",
            "test@example.com",
            "1234567890",
            "Hello from the contact page",
        )
    }

    #[test]
    fn default_client_targets_local_relay() {
        let client = ContactClient::for_origin(DEFAULT_RELAY_ORIGIN).expect("endpoint");
        assert_eq!(client.endpoint().as_str(), "http://localhost:3001/api/contact");
    }

    #[tokio::test]
    async fn client_parses_json_receipt() {
        let addr = relay_ok().await;
        let receipt = client_for(addr).submit(&filled()).await.expect("delivered");
        assert_eq!(receipt.status, 200);
        assert_eq!(receipt.body, ResponseBody::Json(json!({ "result": "success" })));
    }

    #[tokio::test]
    async fn client_keeps_text_receipt() {
        let addr = serve(Router::new().route(
            routes::api::CONTACT,
            post(|| async { "ok, noted" }),
        ))
        .await;
        let receipt = client_for(addr).submit(&filled()).await.expect("delivered");
        assert_eq!(receipt.body, ResponseBody::Text("ok, noted".into()));
    }

    #[tokio::test]
    async fn non_success_is_rejected() {
        let addr = serve(Router::new().route(
            routes::api::CONTACT,
            post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
        ))
        .await;
        let err = client_for(addr).submit(&filled()).await.expect_err("rejected");
        match err {
            SubmitError::Rejected { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body, "upstream down");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn incomplete_form_is_not_sent() {
        let form = ContactForm::new(client_for_origin(DEFAULT_RELAY_ORIGIN));
        form.update(|fields| fields.name = "Only Name".into());
        let outcome = form.submit().await;
        assert_eq!(
            outcome,
            SubmitOutcome::Incomplete(vec!["email", "phone", "message"])
        );
        assert!(!form.is_submitting());
    }

    #[tokio::test]
    async fn one_request_in_flight_per_form() {
        let addr = relay_ok().await;
        let form = ContactForm::new(client_for(addr));
        form.set_fields(filled());

        let (first, second) = tokio::join!(form.submit(), form.submit());
        assert_eq!(first, SubmitOutcome::Sent);
        assert_eq!(second, SubmitOutcome::AlreadyInFlight);
        assert!(!form.is_submitting());
    }

    #[tokio::test]
    async fn success_confirms_then_clears() {
        let addr = relay_ok().await;
        let form = ContactForm::new(client_for(addr)).with_reset_delay(Duration::from_millis(50));
        form.set_fields(filled());

        assert_eq!(form.submit().await, SubmitOutcome::Sent);
        assert!(form.is_submitted());
        assert_eq!(form.fields(), filled(), "fields stay until the reset");

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(!form.is_submitted());
        assert_eq!(form.fields(), ContactFormPayload::default());
    }

    #[tokio::test]
    async fn unreachable_relay_fails_and_allows_retry() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let form = ContactForm::new(client_for(addr));
        form.set_fields(filled());
        assert_eq!(form.submit().await, SubmitOutcome::Failed);
        assert!(!form.is_submitted());
        assert!(!form.is_submitting());
        assert_eq!(form.fields(), filled());
    }

    #[tokio::test]
    async fn teardown_cancels_the_reset() {
        let addr = relay_ok().await;
        let form = ContactForm::new(client_for(addr)).with_reset_delay(Duration::from_millis(50));
        form.set_fields(filled());
        assert_eq!(form.submit().await, SubmitOutcome::Sent);

        form.teardown();
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(form.is_submitted());
        assert_eq!(form.fields(), filled());
    }
}
