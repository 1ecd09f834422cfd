//! Error types for rapid_paradelle
//!
//! This module defines the error types used throughout the library.
//! All errors are designed to be informative and actionable.

use crate::types::LineId;
use thiserror::Error;

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ParadelleError>;

/// Main error type for rapid_paradelle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParadelleError {
    /// Configuration validation failed
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// An input record could not be accepted into the line store
    #[error("Invalid record #{index} (id {id}): {message}")]
    InvalidRecord {
        index: usize,
        id: LineId,
        message: String,
    },

    /// A line id was looked up that the store does not hold
    #[error("Unknown line id {id}")]
    UnknownLine { id: LineId },

    /// Seeds or stanzas handed to a matcher violate its preconditions
    #[error("Invalid line group: {message}")]
    InvalidGroup { message: String },

    /// A work unit outgrew a configured resource cap
    #[error("Limit exceeded: {what} is {actual}, limit is {limit}")]
    LimitExceeded {
        what: String,
        limit: usize,
        actual: usize,
    },

    /// The batch was interrupted through its cancel token
    #[error("Search cancelled")]
    Cancelled,

    /// A single search unit failed and the batch was aborted
    #[error("Worker failed on {unit}: {message}")]
    WorkerFailed { unit: String, message: String },

    /// The worker pool could not be built
    #[error("Thread pool error: {message}")]
    ThreadPool { message: String },

    /// A cached prepared corpus does not match the current configuration
    #[error("Stale cache: {message}")]
    StaleCache { message: String },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl ParadelleError {
    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an invalid record error for the record at `index`
    pub fn invalid_record(index: usize, id: LineId, message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            index,
            id,
            message: message.into(),
        }
    }

    /// Create an unknown line error
    pub fn unknown_line(id: LineId) -> Self {
        Self::UnknownLine { id }
    }

    /// Create an invalid group error
    pub fn invalid_group(message: impl Into<String>) -> Self {
        Self::InvalidGroup {
            message: message.into(),
        }
    }

    /// Create a limit exceeded error
    pub fn limit_exceeded(what: impl Into<String>, limit: usize, actual: usize) -> Self {
        Self::LimitExceeded {
            what: what.into(),
            limit,
            actual,
        }
    }

    /// Create a worker failure error
    pub fn worker_failed(unit: impl Into<String>, message: impl Into<String>) -> Self {
        Self::WorkerFailed {
            unit: unit.into(),
            message: message.into(),
        }
    }

    /// Create a thread pool error
    pub fn thread_pool(message: impl Into<String>) -> Self {
        Self::ThreadPool {
            message: message.into(),
        }
    }

    /// Create a stale cache error
    pub fn stale_cache(message: impl Into<String>) -> Self {
        Self::StaleCache {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Check if this error came from an interrupted batch
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<serde_json::Error> for ParadelleError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<rayon::ThreadPoolBuildError> for ParadelleError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Self::thread_pool(err.to_string())
    }
}
