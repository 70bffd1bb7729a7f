//! Configuration System
//!
//! Loads configuration from a TOML file with environment variable overrides.
//! Every field has a default, so an empty file (or no file) is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub dataset: DatasetConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,

    #[serde(default)]
    pub websocket: WebSocketConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the data lives
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    /// Cleaned wide-format CSV, one row per (country, year)
    #[serde(default = "default_data_path")]
    pub path: PathBuf,

    /// Optional `country,iso_alpha` CSV extending the built-in table
    #[serde(default)]
    pub iso_path: Option<PathBuf>,

    /// Whether the CSV starts with a header row
    #[serde(default = "default_has_header")]
    pub has_header: bool,
}

fn default_data_path() -> PathBuf {
    PathBuf::from("data/clean_data.csv")
}

fn default_has_header() -> bool {
    true
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            iso_path: None,
            has_header: default_has_header(),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins; empty means any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8050
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Widget defaults for a fresh dashboard session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardConfig {
    /// Countries pre-selected in both tabs
    #[serde(default = "default_countries")]
    pub default_countries: Vec<String>,

    /// Initial year range of the trend tab
    #[serde(default = "default_trend_years")]
    pub trend_year_range: (i32, i32),

    /// Initial year of the snapshot tab
    #[serde(default = "default_snapshot_year")]
    pub snapshot_year: i32,

    /// Initial number of ranked countries
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    #[serde(default = "default_top_n_min")]
    pub top_n_min: usize,

    #[serde(default = "default_top_n_max")]
    pub top_n_max: usize,

    /// Ranks shown in the disease bar chart
    #[serde(default = "default_disease_top_n")]
    pub disease_top_n: usize,
}

fn default_countries() -> Vec<String> {
    [
        "Nigeria",
        "Congo, Dem, Rep.",
        "Niger",
        "Burkina Faso",
        "Mali",
        "South Africa",
        "Ethiopia",
        "Mozambique",
        "Sierra Leone",
        "South Sudan",
        "Central African Republic",
        "Chad",
        "Guinea",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_trend_years() -> (i32, i32) {
    (2000, 2010)
}

fn default_snapshot_year() -> i32 {
    2005
}

fn default_top_n() -> usize {
    8
}

fn default_top_n_min() -> usize {
    3
}

fn default_top_n_max() -> usize {
    10
}

fn default_disease_top_n() -> usize {
    5
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_countries: default_countries(),
            trend_year_range: default_trend_years(),
            snapshot_year: default_snapshot_year(),
            top_n: default_top_n(),
            top_n_min: default_top_n_min(),
            top_n_max: default_top_n_max(),
            disease_top_n: default_disease_top_n(),
        }
    }
}

impl DashboardConfig {
    /// Whether `n` is one of the offered top-N choices
    pub fn allows_top_n(&self, n: usize) -> bool {
        (self.top_n_min..=self.top_n_max).contains(&n)
    }
}

/// WebSocket configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WebSocketConfig {
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

fn default_max_connections() -> usize {
    1000
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config = Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })?;

        Ok(config)
    }

    /// Parse and validate TOML content
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            error: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("childmort").join("config.toml")),
            Some(PathBuf::from("/etc/childmort/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Reject settings the dashboard cannot honour
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.dashboard;
        if d.top_n_min == 0 || d.top_n_min > d.top_n_max {
            return Err(ConfigError::Invalid(format!(
                "top_n choices {}..={} are empty or start at zero",
                d.top_n_min, d.top_n_max
            )));
        }
        if !d.allows_top_n(d.top_n) {
            return Err(ConfigError::Invalid(format!(
                "default top_n {} is outside {}..={}",
                d.top_n, d.top_n_min, d.top_n_max
            )));
        }
        if d.disease_top_n == 0 {
            return Err(ConfigError::Invalid(
                "disease_top_n must be at least 1".to_string(),
            ));
        }
        if d.trend_year_range.0 > d.trend_year_range.1 {
            return Err(ConfigError::Invalid(format!(
                "trend_year_range {:?} is reversed",
                d.trend_year_range
            )));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::Invalid(format!(
                "unknown log format '{}'",
                self.logging.format
            )));
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("CHILDMORT_DATA_PATH") {
            self.dataset.path = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("CHILDMORT_ISO_PATH") {
            self.dataset.iso_path = Some(PathBuf::from(path));
        }

        if let Ok(host) = std::env::var("CHILDMORT_API_HOST") {
            self.api.host = host;
        }
        if let Ok(port) = std::env::var("CHILDMORT_API_PORT") {
            match port.parse() {
                Ok(p) => self.api.port = p,
                Err(_) => tracing::warn!("Ignoring invalid CHILDMORT_API_PORT '{}'", port),
            }
        }

        if let Ok(level) = std::env::var("CHILDMORT_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("CHILDMORT_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Child Mortality Dashboard Configuration
#
# Environment variables override these settings:
# - CHILDMORT_DATA_PATH
# - CHILDMORT_ISO_PATH
# - CHILDMORT_API_HOST
# - CHILDMORT_API_PORT
# - CHILDMORT_LOG_LEVEL
# - CHILDMORT_LOG_FORMAT

[dataset]
# Cleaned CSV export, one row per country and year
path = "data/clean_data.csv"

# Extra country to ISO-3 codes (two columns: country,iso_alpha)
# iso_path = "data/iso_codes.csv"

has_header = true

[api]
host = "0.0.0.0"
port = 8050

# Allowed CORS origins (empty allows any origin)
cors_origins = []

# Request timeout in seconds
request_timeout_secs = 30

[dashboard]
default_countries = [
    "Nigeria", "Congo, Dem, Rep.", "Niger", "Burkina Faso", "Mali",
    "South Africa", "Ethiopia", "Mozambique", "Sierra Leone", "South Sudan",
    "Central African Republic", "Chad", "Guinea",
]
trend_year_range = [2000, 2010]
snapshot_year = 2005

# Countries shown in the snapshot ranking, and the choices offered
top_n = 8
top_n_min = 3
top_n_max = 10

# Diseases shown in the snapshot disease ranking
disease_top_n = 5

[websocket]
max_connections = 1000

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.api.port, 8050);
        assert_eq!(config.dashboard.top_n, 8);
        assert_eq!(config.dashboard.trend_year_range, (2000, 2010));
        assert_eq!(config.dashboard.default_countries.len(), 13);
        assert_eq!(config.websocket.max_connections, 1000);
    }

    #[test]
    fn test_default_countries_have_iso_codes() {
        let iso = crate::dataset::IsoLookup::builtin();
        for country in &DashboardConfig::default().default_countries {
            assert!(iso.get(country).is_some(), "{country} has no ISO code");
        }
    }

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.dashboard, DashboardConfig::default());
        assert_eq!(config.dataset.path, PathBuf::from("data/clean_data.csv"));
        assert!(config.dataset.iso_path.is_none());
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::parse(
            r#"
            [api]
            port = 9000

            [dashboard]
            snapshot_year = 2012
            top_n = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.api.port, 9000);
        assert_eq!(config.api.host, "0.0.0.0");
        assert_eq!(config.dashboard.snapshot_year, 2012);
        assert_eq!(config.dashboard.top_n, 4);
        assert_eq!(config.dashboard.disease_top_n, 5);
    }

    #[test]
    fn test_invalid_top_n_rejected() {
        let err = Config::parse("[dashboard]\ntop_n = 12\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = Config::parse("[dashboard]\ntop_n_min = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_unknown_log_format_rejected() {
        let err = Config::parse("[logging]\nformat = \"xml\"\n").unwrap_err();
        assert!(err.to_string().contains("xml"));
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api\nport = 1").unwrap();

        match Config::load(&path).unwrap_err() {
            ConfigError::Parse { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
    }
}
