use medfind_core::InvalidCoordinate;
use thiserror::Error;

/// Errors returned by the geocoding client.
///
/// These never cross into the search core; the [`medfind_core::Geocoder`]
/// implementation logs them and reports "no result".
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// Network, TLS, or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{base_url}': {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    #[error(transparent)]
    InvalidCoordinate(#[from] InvalidCoordinate),
}
