//! Client configuration: API base URL resolution and logging defaults.

/// Application-level constants
pub const APP_NAME: &str = "Prontuario";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable that overrides the records API base URL.
pub const API_URL_VAR: &str = "PRONTUARIO_API_URL";

/// The backend's servlet context path on a local deployment.
const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// Resolve the records API base URL: env override or the compiled default.
pub fn api_base_url() -> String {
    std::env::var(API_URL_VAR).unwrap_or_else(|_| DEFAULT_API_URL.to_string())
}

/// Default tracing filter when RUST_LOG is not set.
pub fn default_log_filter() -> String {
    format!("info,{}=debug", env!("CARGO_CRATE_NAME"))
}
