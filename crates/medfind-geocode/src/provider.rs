//! Fallible provider calls, one level below the [`medfind_core::Geocoder`] port.
//!
//! The port collapses "no match" and "request failed" into `None`. Anything
//! that must tell them apart, such as [`crate::CachedGeocoder`], works against
//! [`GeocodeProvider`] instead.

use std::future::Future;

use medfind_core::{Coordinate, Locality};

use crate::error::GeocodeError;

/// A geocoding backend that reports failures instead of hiding them.
pub trait GeocodeProvider: Send + Sync {
    /// Best coordinate for a free-text query. `Ok(None)` is a genuine miss.
    fn search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Option<Coordinate>, GeocodeError>> + Send;

    /// Locality names for a coordinate. `Ok(None)` means no address.
    fn reverse(
        &self,
        coordinate: Coordinate,
    ) -> impl Future<Output = Result<Option<Locality>, GeocodeError>> + Send;
}

/// Port view of a forward result: failures are logged and become `None`.
pub(crate) fn forward_answer(
    query: &str,
    result: Result<Option<Coordinate>, GeocodeError>,
) -> Option<Coordinate> {
    match result {
        Ok(Some(coordinate)) => {
            tracing::debug!(query, %coordinate, "forward geocode hit");
            Some(coordinate)
        }
        Ok(None) => {
            tracing::debug!(query, "forward geocode returned no results");
            None
        }
        Err(e) => {
            tracing::warn!(query, error = %e, "forward geocode failed");
            None
        }
    }
}

/// Port view of a reverse result.
pub(crate) fn reverse_answer(
    coordinate: Coordinate,
    result: Result<Option<Locality>, GeocodeError>,
) -> Option<Locality> {
    match result {
        Ok(locality) => locality,
        Err(e) => {
            tracing::warn!(%coordinate, error = %e, "reverse geocode failed");
            None
        }
    }
}
