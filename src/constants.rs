//! Application-wide constants and configuration values
//!
//! Centralizes defaults and magic values used by the ingestion pipeline,
//! the backend client and the CLI.

#![allow(dead_code)]

/// Default timeout for HTTP requests in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;

/// Maximum number of connections per host in the HTTP client pool
pub const HTTP_POOL_MAX_IDLE_PER_HOST: usize = 100;

/// Kick-off time recorded for ingested historical results, which never carry
/// one in the source text
pub const DEFAULT_KICKOFF_TIME: &str = "09:00";

/// Venue recorded for ingested historical results, which never carry one in
/// the source text
pub const DEFAULT_VENUE: &str = "Campo do Instituto";

/// Backend RPC that rebuilds the league tables from completed matches
pub const STANDINGS_RPC: &str = "recalculate_standings";

/// Environment variable names
pub mod env_vars {
    /// Environment variable for API domain override
    pub const API_DOMAIN: &str = "PLACAR_API_DOMAIN";

    /// Environment variable for the API key override
    pub const API_KEY: &str = "PLACAR_API_KEY";

    /// Environment variable for log file path override
    pub const LOG_FILE: &str = "PLACAR_LOG_FILE";

    /// Environment variable for HTTP timeout in seconds (default: 30)
    pub const HTTP_TIMEOUT: &str = "PLACAR_HTTP_TIMEOUT";
}

/// Retry configuration for the backend client
pub mod retry {
    /// Maximum number of retry attempts for API calls
    pub const MAX_ATTEMPTS: u32 = 3;

    /// Base delay for exponential backoff (milliseconds)
    pub const BASE_DELAY_MS: u64 = 250;

    /// Retry delay for rate limit errors (seconds)
    pub const RATE_LIMIT_DELAY_SECONDS: u64 = 60;

    /// Retry delay for server errors (seconds)
    pub const SERVER_ERROR_DELAY_SECONDS: u64 = 5;
}
