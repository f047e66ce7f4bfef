//! Contact relay for the Aryantra site.
//!
//! Two routes: `POST /api/contact` forwards a form submission to the
//! configured intake endpoint and mirrors its answer, and `GET /api/health`
//! reports liveness.

pub mod handlers;
pub mod infra;
pub mod relay;
pub mod routes;

pub use infra::{AppError, AppResult, AppState};
pub use relay::{RelayError, RelayResponse, UpstreamRelay};
pub use routes::create_app;
