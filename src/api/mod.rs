//! Dashboard HTTP API
//!
//! HTTP layer built with Axum. Every pipeline route is stateless: the
//! request carries the full selection and the response is computed from the
//! shared dataset alone.
//!
//! # Endpoints
//!
//! ## Dataset
//! - `GET /api/v1/dataset` - Widget options, year bounds and defaults
//! - `GET /api/v1/dataset/countries` - Country universe with map codes
//!
//! ## Pipeline
//! - `POST /api/v1/trend` - Trend lines over a year range (json, csv, svg)
//! - `POST /api/v1/snapshot/ranking` - Ranked bars for one year (json, csv, svg)
//! - `POST /api/v1/snapshot/map` - Choropleth figure for one year
//!
//! ## Controls
//! - `POST /api/v1/controls/reconcile` - Select-all / deselect-all transition
//!
//! ## Health
//! - `GET /health/live` - Liveness check
//! - `GET /health/ready` - Readiness check
//! - `GET /health` - Full health status
//!
//! ## WebSocket
//! - `GET /ws` - Interactive dashboard session
//!
//! # Example
//!
//! ```rust,ignore
//! use childmort::api::{serve, AppState};
//! use childmort::config::Config;
//! use childmort::dataset::{DatasetStore, IsoLookup};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let store = Arc::new(DatasetStore::load(&config.dataset.path, IsoLookup::builtin())?);
//!
//!     let state = AppState::new(store, &config);
//!     serve(state, &config.api).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ApiConfig;
use crate::websocket::websocket_handler;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Dataset routes
        .route("/dataset", get(routes::dataset::get_dataset))
        .route("/dataset/countries", get(routes::dataset::list_countries))
        // Pipeline routes
        .route("/trend", post(routes::trend::get_trend))
        .route("/snapshot/ranking", post(routes::snapshot::get_ranking))
        .route("/snapshot/map", post(routes::snapshot::get_map))
        // Control routes
        .route("/controls/reconcile", post(routes::controls::reconcile));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let cors = cors_layer(&state.config.cors_origins);
    let timeout = Duration::from_secs(state.config.request_timeout_secs);
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .route("/ws", get(websocket_handler))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// Configured origins, or any origin when none are listed
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Dashboard API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Dashboard API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::dataset::{DatasetStore, DeathRecord, Disease, IsoLookup};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let records = vec![
            DeathRecord::new("Nigeria", 2010, Disease::Hiv, 50.0).iso("NGA"),
            DeathRecord::new("Nigeria", 2010, Disease::Malaria, 30.0).iso("NGA"),
            DeathRecord::new("Chad", 2010, Disease::Hiv, 20.0).iso("TCD"),
            DeathRecord::new("Chad", 2012, Disease::Hiv, 22.0).iso("TCD"),
        ];
        let store = DatasetStore::from_records(records, IsoLookup::builtin()).unwrap();
        let state = AppState::new(Arc::new(store), &Config::default());
        build_router(state)
    }

    async fn post_json(uri: &str, body: &str) -> Response {
        create_test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("Content-Type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn get_uri(uri: &str) -> Response {
        create_test_app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        for uri in ["/health/live", "/health/ready", "/health"] {
            assert_eq!(get_uri(uri).await.status(), StatusCode::OK, "{uri}");
        }

        let body = body_json(get_uri("/health").await).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["renderer"], "svg");
        assert_eq!(body["record_count"], 4);
    }

    #[tokio::test]
    async fn test_dataset_overview() {
        let response = get_uri("/api/v1/dataset").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["countries"], serde_json::json!(["Nigeria", "Chad"]));
        assert_eq!(body["years"]["min"], 2010);
        assert_eq!(body["years"]["max"], 2012);
        assert_eq!(body["defaults"]["top_n"], 8);
    }

    #[tokio::test]
    async fn test_country_ranking() {
        let response = post_json(
            "/api/v1/snapshot/ranking",
            r#"{"year": 2010, "countries": ["Nigeria", "Chad"], "diseases": ["HIV", "Malaria"]}"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let rows = body["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["key"], "Nigeria");
        assert_eq!(rows[0]["metric"], 80.0);
        assert_eq!(rows[0]["rank"], 1);
        assert_eq!(rows[1]["key"], "Chad");
        assert_eq!(body["domain"]["max"], 80.0);
        assert_eq!(body["meta"]["rows_matched"], 3);
    }

    #[tokio::test]
    async fn test_disease_ranking() {
        let body = body_json(
            post_json(
                "/api/v1/snapshot/ranking",
                r#"{"year": 2010, "countries": ["Nigeria", "Chad"], "diseases": ["HIV", "Malaria"], "group_by": "disease"}"#,
            )
            .await,
        )
        .await;
        assert_eq!(body["rows"][0]["key"], "HIV");
        assert_eq!(body["rows"][0]["metric"], 70.0);
        assert_eq!(body["rows"][1]["key"], "Malaria");
    }

    #[tokio::test]
    async fn test_zero_top_n_rejected() {
        let response = post_json(
            "/api/v1/snapshot/ranking",
            r#"{"year": 2010, "countries": ["Chad"], "top_n": 0}"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["request_id"].is_string());
    }

    #[tokio::test]
    async fn test_malformed_bodies_rejected() {
        let response = post_json("/api/v1/trend", "not json").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = post_json("/api/v1/snapshot/map", r#"{"year": "soon"}"#).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = post_json(
            "/api/v1/trend",
            r#"{"year_range": [2000, 2010], "format": "pdf"}"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_trend_outside_data_is_empty() {
        let response = post_json(
            "/api/v1/trend",
            r#"{"year_range": [1990, 1991], "countries": ["Chad"], "diseases": ["HIV"]}"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["points"], serde_json::json!([]));
        assert!(body["domain"].is_null());
    }

    #[tokio::test]
    async fn test_trend_formats() {
        let response = post_json(
            "/api/v1/trend",
            r#"{"year_range": [2010, 2012], "countries": ["Chad"], "format": "csv"}"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "text/csv");
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.starts_with("key,year,metric"));
        assert!(text.contains("Chad,2012,22"));

        let response = post_json(
            "/api/v1/trend",
            r#"{"year_range": [2010, 2012], "countries": ["Chad"], "format": "svg"}"#,
        )
        .await;
        assert_eq!(response.headers()["content-type"], "image/svg+xml");
    }

    #[tokio::test]
    async fn test_empty_selection_svg_is_placeholder() {
        let response = post_json(
            "/api/v1/snapshot/ranking",
            r#"{"year": 2010, "countries": [], "format": "svg"}"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["kind"], "placeholder");
    }

    #[tokio::test]
    async fn test_map_figure() {
        let body = body_json(
            post_json(
                "/api/v1/snapshot/map",
                r#"{"year": 2010, "countries": ["Nigeria", "Chad"]}"#,
            )
            .await,
        )
        .await;
        assert_eq!(body["artifact"]["kind"], "figure");
        assert_eq!(
            body["artifact"]["figure"]["data"][0]["locations"],
            serde_json::json!(["NGA", "TCD"])
        );
        assert_eq!(body["regions"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_reconcile_select_all() {
        let response = post_json(
            "/api/v1/controls/reconcile",
            r#"{"state": {"selected": ["Chad"], "deselect_all": false}, "event": {"control": "select_all", "value": true}}"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["selected"], serde_json::json!(["Nigeria", "Chad"]));
        assert_eq!(body["select_all"], true);
        assert_eq!(body["deselect_all"], false);
    }

    #[tokio::test]
    async fn test_reconcile_normalizes_contradictory_state() {
        let response = post_json(
            "/api/v1/controls/reconcile",
            r#"{"state": {"selected": ["Chad"], "select_all": true, "deselect_all": true}, "event": {"control": "deselect_all", "value": false}}"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["selected"], serde_json::json!(["Chad"]));
        assert_eq!(body["select_all"], false);
        assert_eq!(body["deselect_all"], false);
    }
}
