//! Read-only collaborator interfaces consumed by the search core.
//!
//! The storage port is fallible and its errors reach the caller. The geocoder
//! port is not: providers fail often enough that a miss and an outage are
//! treated the same way, as "no answer".

use std::future::Future;

use thiserror::Error;

use crate::types::{
    Coordinate, HospitalCoordinate, HospitalRecord, Locality, RatingAggregate, ServiceOffering,
    ServiceRecord,
};

/// Failure reading from the storage collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("storage query failed: {context}: {source}")]
    Query {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Read operations the search core needs from persistent storage.
pub trait HospitalStore: Send + Sync {
    /// Hospitals whose city matches `city` case-insensitively.
    fn hospitals_by_city(
        &self,
        city: &str,
    ) -> impl Future<Output = Result<Vec<HospitalRecord>, StoreError>> + Send;

    /// `(id, coordinate)` pairs for hospitals that have a coordinate, limited
    /// to `city` (case-insensitive) when given.
    fn hospital_coordinates(
        &self,
        city: Option<&str>,
    ) -> impl Future<Output = Result<Vec<HospitalCoordinate>, StoreError>> + Send;

    /// Hospitals with the given ids. Unknown ids are skipped; order is unspecified.
    fn hospitals_by_ids(
        &self,
        ids: &[i64],
    ) -> impl Future<Output = Result<Vec<HospitalRecord>, StoreError>> + Send;

    /// Offerings of `service_id` at any of `hospital_ids`.
    fn offerings(
        &self,
        service_id: i64,
        hospital_ids: &[i64],
    ) -> impl Future<Output = Result<Vec<ServiceOffering>, StoreError>> + Send;

    /// Review average and count for one hospital.
    fn rating_aggregate(
        &self,
        hospital_id: i64,
    ) -> impl Future<Output = Result<RatingAggregate, StoreError>> + Send;

    /// The whole service catalog, ordered by id.
    fn services(&self) -> impl Future<Output = Result<Vec<ServiceRecord>, StoreError>> + Send;

    /// One catalog entry, or `None` if the id is unknown.
    fn service_by_id(
        &self,
        service_id: i64,
    ) -> impl Future<Output = Result<Option<ServiceRecord>, StoreError>> + Send;

    /// Services whose name contains `keyword`, ignoring case, ordered by id.
    fn search_services(
        &self,
        keyword: &str,
    ) -> impl Future<Output = Result<Vec<ServiceRecord>, StoreError>> + Send;

    /// Optional geospatial pushdown: hospitals within `radius_km` of
    /// `reference`, with the backend's own distance.
    ///
    /// `Ok(None)` means the backend does not support it. Results are treated
    /// as a hint and re-checked with [`crate::distance_km`].
    fn within_radius(
        &self,
        reference: Coordinate,
        radius_km: f64,
        city: Option<&str>,
    ) -> impl Future<Output = Result<Option<Vec<(HospitalRecord, f64)>>, StoreError>> + Send {
        let _ = (reference, radius_km, city);
        async { Ok(None) }
    }
}

/// Forward and reverse geocoding against an external provider.
///
/// Implementations must not retry and must convert every provider failure
/// into `None`.
pub trait Geocoder: Send + Sync {
    /// Best coordinate for a free-text query.
    fn forward_geocode(&self, query: &str) -> impl Future<Output = Option<Coordinate>> + Send;

    /// Locality names for a coordinate.
    fn reverse_geocode(
        &self,
        coordinate: Coordinate,
    ) -> impl Future<Output = Option<Locality>> + Send;
}
