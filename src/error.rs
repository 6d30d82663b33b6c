use thiserror::Error;

/// Errors reported by the matcher operations.
///
/// `NotFound`, `InsufficientMembers` and `InvalidDayName` are request-level
/// outcomes that callers receive as a structured failure body. `Store` wraps a
/// backend failure and is surfaced separately by the HTTP layer.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Users not found: {}", .0.join(", "))]
    NotFound(Vec<String>),

    #[error("Need at least 2 team members, got {0}")]
    InsufficientMembers(usize),

    #[error("Invalid day name: '{0}'")]
    InvalidDayName(String),

    #[error("Profile store error: {0}")]
    Store(#[from] StoreError),
}

impl MatchError {
    /// Stable code for programmatic handling by API clients
    pub fn code(&self) -> &'static str {
        match self {
            MatchError::NotFound(_) => "NOT_FOUND",
            MatchError::InsufficientMembers(_) => "INSUFFICIENT_MEMBERS",
            MatchError::InvalidDayName(_) => "INVALID_DAY_NAME",
            MatchError::Store(_) => "STORE_ERROR",
        }
    }

    pub fn is_store_failure(&self) -> bool {
        matches!(self, MatchError::Store(_))
    }
}

/// Errors raised while loading profiles from a backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("Profile service request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Profile service returned status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Errors raised while reading the service configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set in environment")]
    Missing(&'static str),

    #[error("Invalid value '{value}' for {key}")]
    Invalid { key: &'static str, value: String },
}
