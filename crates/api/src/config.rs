use std::path::PathBuf;
use std::str::FromStr;

/// Static build identifier stamped on every envelope.
///
/// Taken from `BUILD_NUMBER` at compile time, falling back to the crate version.
pub const BUILD_NUMBER: &str = match option_env!("BUILD_NUMBER") {
    Some(build) => build,
    None => env!("CARGO_PKG_VERSION"),
};

/// Server configuration loaded from environment variables.
///
/// All fields except the API key have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Shared secret expected in the `X-API-Key` header.
    pub api_key: String,
    /// Backlog capacity for webhook jobs; `0` means unlimited.
    pub max_queue_length: usize,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `900`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for the worker to finish its current job.
    pub shutdown_timeout_secs: u64,
    /// Timeout of a single webhook POST (default: `10`).
    pub webhook_timeout_secs: u64,
    /// Scratch directory for downloads and intermediates.
    pub storage_path: PathBuf,
    /// Directory of finished artifacts, served under `/uploads`.
    pub local_storage_path: PathBuf,
    /// Scratch files older than this are removed by the cleanup task.
    pub temp_file_max_age_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                  |
    /// |--------------------------|--------------------------|
    /// | `HOST`                   | `0.0.0.0`                |
    /// | `PORT`                   | `8080`                   |
    /// | `API_KEY`                | required                 |
    /// | `MAX_QUEUE_LENGTH`       | `0` (unlimited, also ≤0) |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`  |
    /// | `REQUEST_TIMEOUT_SECS`   | `900`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`  | `30`                     |
    /// | `WEBHOOK_TIMEOUT_SECS`   | `10`                     |
    /// | `STORAGE_PATH`           | `/tmp/mediakit`          |
    /// | `LOCAL_STORAGE_PATH`     | `/var/www/uploads`       |
    /// | `TEMP_FILE_MAX_AGE_SECS` | `3600`                   |
    ///
    /// Panics on a missing `API_KEY` or an unparsable value.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let api_key = std::env::var("API_KEY").expect("API_KEY must be set");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            host,
            port: parse_var("PORT", 8080),
            api_key,
            max_queue_length: queue_limit(parse_var("MAX_QUEUE_LENGTH", 0)),
            cors_origins,
            request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS", 900),
            shutdown_timeout_secs: parse_var("SHUTDOWN_TIMEOUT_SECS", 30),
            webhook_timeout_secs: parse_var("WEBHOOK_TIMEOUT_SECS", 10),
            storage_path: std::env::var("STORAGE_PATH")
                .unwrap_or_else(|_| "/tmp/mediakit".into())
                .into(),
            local_storage_path: std::env::var("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|_| "/var/www/uploads".into())
                .into(),
            temp_file_max_age_secs: parse_var("TEMP_FILE_MAX_AGE_SECS", 3600),
        }
    }
}

/// Any non-positive backlog limit means unlimited.
fn queue_limit(raw: i64) -> usize {
    usize::try_from(raw.max(0)).unwrap_or(usize::MAX)
}

/// Read `name` and parse it, using `default` when the variable is unset.
fn parse_var<T>(name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{name} must be a valid value: {e}")),
        Err(_) => default,
    }
}
