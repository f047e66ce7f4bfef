use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use aryantra_config::Config;
use aryantra_model::routes::api;

use crate::{
    handlers::{contact_handler, health_handler},
    infra::AppState,
};

pub fn create_app(state: AppState) -> Router {
    let cors_layer = cors_layer(state.config());

    Router::new()
        .route(api::CONTACT, post(contact_handler))
        .route(api::HEALTH, get(health_handler))
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Any origin in dev mode or when no allow-list is configured, otherwise
/// the configured origins only.
fn cors_layer(config: &Config) -> CorsLayer {
    if config.dev_mode || config.cors.is_permissive() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{body::Body, http::Request};
    use tower::ServiceExt;
    use url::Url;

    use aryantra_config::{ConfigMetadata, CorsConfig, RelayConfig, ServerConfig};

    use super::*;

    fn config_with_origins(origins: &[&str], dev_mode: bool) -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: 0,
            },
            relay: RelayConfig {
                upstream_url: Url::parse("https://forms.example.com/exec").unwrap(),
                timeout: Duration::from_secs(5),
            },
            cors: CorsConfig {
                allowed_origins: origins.iter().map(|o| o.to_string()).collect(),
            },
            dev_mode,
            metadata: ConfigMetadata::default(),
        }
    }

    fn probe_router(config: &Config) -> Router {
        Router::new()
            .route("/probe", get(|| async { "ok" }))
            .layer(cors_layer(config))
    }

    async fn allow_origin_for(config: &Config, origin: &str) -> Option<String> {
        let request = Request::builder()
            .uri("/probe")
            .header(header::ORIGIN, origin)
            .body(Body::empty())
            .unwrap();
        let response = probe_router(config).oneshot(request).await.unwrap();
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn listed_origin_is_allowed() {
        let config = config_with_origins(&["https://aryantra.example"], false);
        assert_eq!(
            allow_origin_for(&config, "https://aryantra.example").await.as_deref(),
            Some("https://aryantra.example")
        );
    }

    #[tokio::test]
    async fn unlisted_origin_gets_no_allow_header() {
        let config = config_with_origins(&["https://aryantra.example"], false);
        assert_eq!(allow_origin_for(&config, "https://evil.example").await, None);
    }

    #[tokio::test]
    async fn dev_mode_ignores_the_allow_list() {
        let config = config_with_origins(&["https://aryantra.example"], true);
        assert_eq!(
            allow_origin_for(&config, "https://evil.example").await.as_deref(),
            Some("*")
        );
    }
}
