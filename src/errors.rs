//! Error types for DEM Fetcher
//!
//! This module defines the error types for all components of the application,
//! organized per domain with a transparent top-level wrapper. Cancellation is
//! modeled as a distinguished variant rather than a generic failure so callers
//! can tell an interrupted run apart from a failed one.

use std::path::PathBuf;
use thiserror::Error;

/// Object-store access errors (listing and fetching)
#[derive(Error, Debug)]
pub enum StoreError {
    /// Listing a prefix failed
    #[error("Failed to list objects under prefix '{prefix}'")]
    List {
        prefix: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Fetching an object body failed
    #[error("Failed to fetch object '{key}'")]
    Get {
        key: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Writing a fetched body to disk failed
    #[error("Failed to write object '{key}' to {path}")]
    Write {
        key: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The listed object is missing a key or size
    #[error("Listing returned an incomplete object record under prefix '{prefix}'")]
    IncompleteRecord { prefix: String },
}

impl StoreError {
    /// Wrap a listing failure with its prefix context
    pub fn list(
        prefix: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::List {
            prefix: prefix.into(),
            source: Box::new(source),
        }
    }

    /// Wrap a fetch failure with its key context
    pub fn get(
        key: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Get {
            key: key.into(),
            source: Box::new(source),
        }
    }
}

/// Bounding-box parsing errors
#[derive(Error, Debug, PartialEq)]
pub enum BboxError {
    /// Input was empty or whitespace-only
    #[error("Bounding box string is empty. Expected 4 values: min_lon,min_lat,max_lon,max_lat")]
    Empty,

    /// Wrong number of numeric tokens
    #[error("Bounding box must contain exactly 4 values (min_lon,min_lat,max_lon,max_lat), found {found}")]
    WrongTokenCount { found: usize },

    /// A token failed to parse as a floating-point number
    #[error("Bounding box values must be valid numbers, could not parse '{token}'")]
    InvalidNumber { token: String },
}

/// Resume-ledger persistence errors
#[derive(Error, Debug)]
pub enum StateError {
    /// I/O error reading or writing the state file
    #[error("I/O error accessing state file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The state file is not valid JSON
    #[error("State file {path} is not valid JSON")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Run-level errors from the download coordinator
#[derive(Error, Debug)]
pub enum FetchError {
    /// Listing failed; fatal for the run
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Output directory could not be created or written
    #[error("I/O error in output directory")]
    Io(#[from] std::io::Error),

    /// Invalid run configuration
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// The run was cancelled before completing
    #[error("Download run was cancelled")]
    Cancelled,
}

impl FetchError {
    /// Create a configuration error with a message
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// True when this error represents cancellation rather than failure
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Object-store error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Bounding-box parsing error
    #[error(transparent)]
    Bbox(#[from] BboxError),

    /// State-file error
    #[error(transparent)]
    State(#[from] StateError),

    /// Coordinator run error
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("{message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Store(_) => "store",
            AppError::Bbox(_) => "bbox",
            AppError::State(_) => "state",
            AppError::Fetch(FetchError::Cancelled) => "cancelled",
            AppError::Fetch(_) => "fetch",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Object-store result type alias
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// State persistence result type alias
pub type StateResult<T> = std::result::Result<T, StateError>;

/// Coordinator result type alias
pub type FetchResult<T> = std::result::Result<T, FetchError>;
