//! Error types for junit-platform-starter

use thiserror::Error;

/// Result type alias for starter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for starter operations
///
/// Launch failures and timeouts are not errors: they are reported through
/// [`RunOutcome`](crate::launch::RunOutcome) so callers can tell them apart
/// from test failures.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// WalkDir error
    #[error("Directory walk error: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// A required artifact could not be resolved
    #[error("Resolving '{coordinate}' failed: {source}")]
    Resolution {
        coordinate: String,
        #[source]
        source: anyhow::Error,
    },

    /// Malformed `group:artifact[:version]` string
    #[error("Invalid artifact coordinate: '{input}'")]
    InvalidCoordinate { input: String },

    /// A path element could not be turned into an absolute path
    #[error("Path element '{element}' is unusable: {message}")]
    PathArgument { element: String, message: String },

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

impl Error {
    /// Create a resolution error for the given coordinate
    pub fn resolution(coordinate: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Error::Resolution {
            coordinate: coordinate.into(),
            source: source.into(),
        }
    }

    /// Create an invalid coordinate error
    pub fn invalid_coordinate(input: impl Into<String>) -> Self {
        Error::InvalidCoordinate {
            input: input.into(),
        }
    }

    /// Whether this error aborted a run during dependency resolution
    pub fn is_resolution_failure(&self) -> bool {
        matches!(self, Error::Resolution { .. })
    }
}
