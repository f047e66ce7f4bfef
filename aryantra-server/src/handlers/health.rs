use axum::Json;

use aryantra_model::HealthStatus;

pub async fn health_handler() -> Json<HealthStatus> {
    Json(HealthStatus::relay_running())
}
