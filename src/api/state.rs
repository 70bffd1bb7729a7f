//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;

use crate::config::{ApiConfig, Config, DashboardConfig};
use crate::dataset::DatasetStore;
use crate::query::QueryExecutor;
use crate::render::{ChartRenderer, SvgRenderer};
use crate::websocket::{ConnectionHub, HubConfig};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// The loaded dataset
    pub store: Arc<DatasetStore>,
    /// Pipeline executor over `store`
    pub executor: Arc<QueryExecutor>,
    /// Chart backend
    pub renderer: Arc<dyn ChartRenderer>,
    /// Country universe in dataset order, shared by every session
    pub universe: Arc<[String]>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Widget defaults for new sessions
    pub dashboard: Arc<DashboardConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
    /// Wall-clock start, reported by health checks
    pub started_at: DateTime<Utc>,
    /// WebSocket connection hub
    pub ws_hub: Arc<ConnectionHub>,
}

impl AppState {
    /// Create state with the SVG renderer
    pub fn new(store: Arc<DatasetStore>, config: &Config) -> Self {
        let universe: Arc<[String]> = store.country_names().into();
        let hub_config = HubConfig {
            max_connections: config.websocket.max_connections,
        };
        Self {
            executor: Arc::new(QueryExecutor::new(Arc::clone(&store))),
            store,
            renderer: Arc::new(SvgRenderer::new()),
            universe,
            config: Arc::new(config.api.clone()),
            dashboard: Arc::new(config.dashboard.clone()),
            start_time: Instant::now(),
            started_at: Utc::now(),
            ws_hub: Arc::new(ConnectionHub::new(hub_config)),
        }
    }

    /// Swap the chart backend
    pub fn with_renderer(mut self, renderer: Arc<dyn ChartRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Get WebSocket connection count
    pub async fn ws_connection_count(&self) -> usize {
        self.ws_hub.connection_count().await
    }
}
