use axum::{Json, extract::State};
use serde_json::Value;
use tracing::info;

use crate::{
    infra::{AppResult, AppState},
    relay::{RelayResponse, field_names},
};

/// `POST /api/contact`: forward the submission upstream and answer with
/// whatever upstream answered.
pub async fn contact_handler(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> AppResult<RelayResponse> {
    info!(fields = ?field_names(&payload), "contact submission received");

    let response = state.relay().forward(&payload).await?;
    info!(
        status = response.status().as_u16(),
        json = response.is_json(),
        "contact submission forwarded"
    );
    Ok(response)
}
