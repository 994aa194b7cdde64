//! Error types for the harvester.

use std::time::Duration;

use streetview_common::GridError;
use thiserror::Error;

/// Result type alias using FetchError.
pub type FetchResult<T> = Result<T, FetchError>;

/// Failure of a single image request.
///
/// Every variant is recoverable: the harvester logs it and moves on to the
/// next heading or point.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Rate limited by imagery API (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    #[error("Imagery API error {status}: {message}")]
    Api { status: String, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// Short label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Network(_) => "network",
            FetchError::RateLimited { .. } => "rate_limited",
            FetchError::Api { .. } => "api",
            FetchError::Decode(_) => "decode",
            FetchError::Io(_) => "io",
        }
    }

    /// Retry-After hint when this is a throttling response.
    pub fn throttle_hint(&self) -> Option<Option<Duration>> {
        match self {
            FetchError::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Decode(err.to_string())
    }
}

/// Failure that prevents a whole region from being processed.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Invalid grid for region '{region}': {source}")]
    Grid {
        region: String,
        #[source]
        source: GridError,
    },

    #[error("Failed to create output directory {path}: {source}")]
    OutputDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let api = FetchError::Api {
            status: "REQUEST_DENIED".to_string(),
            message: "bad key".to_string(),
        };
        assert_eq!(api.kind(), "api");
        assert_eq!(api.throttle_hint(), None);

        let io = FetchError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
        assert_eq!(io.kind(), "io");

        let throttled = FetchError::RateLimited {
            retry_after: Some(Duration::from_secs(3)),
        };
        assert_eq!(throttled.kind(), "rate_limited");
        assert_eq!(throttled.throttle_hint(), Some(Some(Duration::from_secs(3))));
    }

    #[test]
    fn test_decode_from_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let fetch: FetchError = err.into();
        assert_eq!(fetch.kind(), "decode");
    }

    #[test]
    fn test_display() {
        let api = FetchError::Api {
            status: "INVALID_REQUEST".to_string(),
            message: "location missing".to_string(),
        };
        assert_eq!(
            api.to_string(),
            "Imagery API error INVALID_REQUEST: location missing"
        );
    }
}
