use medfind_core::StoreError;
use thiserror::Error;

/// Errors returned to callers of the search service.
///
/// Geocoding failures never appear here; they only move resolution to the
/// next tier.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The request violates a precondition (missing city, bad coordinate,
    /// non-positive radius, empty comparison set).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// The storage collaborator failed; there is no alternate data source.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(#[from] StoreError),
}
