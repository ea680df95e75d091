//! Core error types for plugwatch-core.
//!
//! Every failure in the record/history pipeline falls into one of three
//! families: the device API failed ([`ApiError`]), the API answered with
//! something we cannot classify ([`InvalidReading`]), or the event log could
//! not be read or written ([`StoreError`]). None of them are retried here;
//! they propagate to the command layer.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for plugwatch-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Device API errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Malformed or unexpected device payload
    #[error("Invalid reading: {0}")]
    InvalidReading(#[from] InvalidReading),

    /// Event log errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised by the Tuya cloud API boundary.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport-level failure (DNS, TLS, connect, timeout)
    #[error("network failure: {0}")]
    Network(#[source] reqwest::Error),

    /// Non-success HTTP status
    #[error("HTTP {status} from {endpoint}")]
    Http { status: u16, endpoint: String },

    /// Credentials rejected or access token expired
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Request quota exhausted
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// API answered with `success: false`
    #[error("request rejected (code {code}): {msg}")]
    Rejected { code: i64, msg: String },

    /// Response body did not match the envelope we expect
    #[error("unexpected response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Malformed(err.to_string())
        } else {
            ApiError::Network(err)
        }
    }
}

/// A reading the classifier refuses to turn into a status.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidReading {
    /// Data point required for classification was not reported
    #[error("missing data point '{0}'")]
    MissingDataPoint(String),

    /// Data point had the wrong JSON type
    #[error("data point '{code}' has unexpected value {value}")]
    BadDataPoint { code: String, value: String },

    /// Wattage that no physical plug can report
    #[error("power reading {0} W is not a valid wattage")]
    BadWattage(f64),

    /// Threshold that cannot separate On from Off
    #[error("threshold {0} W must be finite and non-negative")]
    BadThreshold(f64),

    /// Reading timestamp does not advance past the last stored event
    #[error("reading at {at} is not after last event at {last}")]
    OutOfOrder {
        at: chrono::DateTime<chrono::Utc>,
        last: chrono::DateTime<chrono::Utc>,
    },
}

/// Event store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Stored row cannot be decoded into an event
    #[error("Corrupt event row {row}: {message}")]
    Corrupt { row: i64, message: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Missing required configuration key
    #[error("Missing required configuration key: {0}")]
    MissingKey(String),

    /// Unknown Tuya region code
    #[error("Unknown Tuya region '{0}' (expected one of: us, us-e, eu, eu-w, cn, in)")]
    UnknownRegion(String),

    /// Home/data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),

    /// OS keyring access failed
    #[error("Keyring error: {0}")]
    Keyring(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseBusy
                    || e.code == rusqlite::ErrorCode::DatabaseLocked
                {
                    StoreError::Locked
                } else {
                    StoreError::QueryFailed(err.to_string())
                }
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Store(err.into())
    }
}

impl From<keyring::Error> for ConfigError {
    fn from(err: keyring::Error) -> Self {
        ConfigError::Keyring(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
