//! Application configuration loaded from environment variables.

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `DATABASE_URL` — Postgres connection string (in-memory store when unset)
/// - `MOCK_SERVICE_URL` — marketplace mock service base URL
/// - `MOCK_API_KEY` — API key sent to the mock service (default: empty)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub mock_service_url: String,
    pub mock_api_key: String,
    pub log_level: String,
}

const DEFAULT_MOCK_SERVICE_URL: &str =
    "https://ondc-private-mock-server-production.up.railway.app";

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_url: std::env::var("DATABASE_URL").ok(),
            mock_service_url: std::env::var("MOCK_SERVICE_URL")
                .map(|url| Self::with_scheme(&url))
                .unwrap_or_else(|_| DEFAULT_MOCK_SERVICE_URL.to_string()),
            mock_api_key: std::env::var("MOCK_API_KEY").unwrap_or_default(),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn with_scheme(url: &str) -> String {
        if url.starts_with("http") {
            url.to_string()
        } else {
            format!("https://{url}")
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_url: None,
            mock_service_url: DEFAULT_MOCK_SERVICE_URL.to_string(),
            mock_api_key: String::new(),
            log_level: "info".to_string(),
        }
    }
}
