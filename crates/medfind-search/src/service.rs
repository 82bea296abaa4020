//! Request-level operations: `search`, `compare_hospitals`, and the
//! read-only catalog and rating lookups callers use to pick their inputs.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use medfind_core::{
    AppConfig, Coordinate, Gazetteer, Geocoder, HospitalStore, RankedResult, RatingAggregate,
    ResolvedLocation, ServiceRecord,
};
use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::join::join_offerings;
use crate::rank::{rank, rank_without_distance};
use crate::resolver::{Candidate, LocationQuery, LocationResolver};

const DEFAULT_RADIUS_KM: f64 = 10.0;

/// Inputs to [`SearchService::search`].
///
/// Coordinates are used only when both `latitude` and `longitude` are given.
/// `radius_km` falls back to the service's configured default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub service_id: i64,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    pub city: String,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub radius_km: Option<f64>,
}

/// Ranked rows plus the location tier that produced them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
    pub location: ResolvedLocation,
    pub results: Vec<RankedResult>,
}

pub struct SearchService<S, G> {
    store: S,
    geocoder: G,
    resolver: LocationResolver,
    default_radius_km: f64,
}

impl<S: HospitalStore, G: Geocoder> SearchService<S, G> {
    #[must_use]
    pub fn new(store: S, geocoder: G, gazetteer: Arc<Gazetteer>) -> Self {
        Self {
            store,
            geocoder,
            resolver: LocationResolver::new(gazetteer),
            default_radius_km: DEFAULT_RADIUS_KM,
        }
    }

    /// Build a service using the radius, region, and pushdown settings from
    /// `config`.
    #[must_use]
    pub fn from_config(
        store: S,
        geocoder: G,
        gazetteer: Arc<Gazetteer>,
        config: &AppConfig,
    ) -> Self {
        Self::new(store, geocoder, gazetteer)
            .with_default_radius_km(config.default_radius_km)
            .with_resolver(|r| {
                r.with_region(config.geocoder_region.clone(), config.geocoder_country.clone())
                    .with_pushdown(config.use_radius_pushdown)
            })
    }

    #[must_use]
    pub fn with_default_radius_km(mut self, radius_km: f64) -> Self {
        self.default_radius_km = radius_km;
        self
    }

    #[must_use]
    pub fn with_resolver(mut self, f: impl FnOnce(LocationResolver) -> LocationResolver) -> Self {
        self.resolver = f(self.resolver);
        self
    }

    #[must_use]
    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }

    /// Hospitals offering `service_id` near the caller, nearest first.
    ///
    /// # Errors
    ///
    /// - [`SearchError::InvalidInput`] if the city is blank, the coordinate is
    ///   out of range, or the radius is not a positive finite number.
    /// - [`SearchError::UpstreamUnavailable`] if a storage read fails.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchOutcome, SearchError> {
        let city = request.city.trim();
        if city.is_empty() {
            return Err(SearchError::InvalidInput("city is required".to_string()));
        }

        let radius_km = request.radius_km.unwrap_or(self.default_radius_km);
        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(SearchError::InvalidInput(format!(
                "radius_km must be a positive number, got {radius_km}"
            )));
        }

        let coordinates = match (request.latitude, request.longitude) {
            (Some(lat), Some(lon)) => Some(
                Coordinate::validated(lat, lon)
                    .map_err(|e| SearchError::InvalidInput(e.to_string()))?,
            ),
            (None, None) => None,
            _ => {
                tracing::debug!("only one of latitude/longitude given; ignoring coordinates");
                None
            }
        };

        let query = LocationQuery {
            coordinates,
            city,
            area: request.area.as_deref(),
            radius_km: Some(radius_km),
        };
        let resolution = self
            .resolver
            .resolve(&self.store, &self.geocoder, query)
            .await?;

        let mut results =
            join_offerings(&self.store, request.service_id, resolution.candidates).await?;
        rank(&mut results);

        tracing::info!(
            service_id = request.service_id,
            city,
            tier = %resolution.location.tier,
            results = results.len(),
            "search complete"
        );
        Ok(SearchOutcome {
            location: resolution.location,
            results,
        })
    }

    /// Side-by-side view of `service_id` at the given hospitals, cheapest
    /// first.
    ///
    /// Duplicate ids are collapsed (first occurrence wins). Unknown ids and
    /// hospitals that do not offer the service are omitted.
    ///
    /// # Errors
    ///
    /// - [`SearchError::InvalidInput`] if `hospital_ids` is empty.
    /// - [`SearchError::UpstreamUnavailable`] if a storage read fails.
    pub async fn compare_hospitals(
        &self,
        service_id: i64,
        hospital_ids: &[i64],
    ) -> Result<Vec<RankedResult>, SearchError> {
        if hospital_ids.is_empty() {
            return Err(SearchError::InvalidInput(
                "at least one hospital id is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        let ids: Vec<i64> = hospital_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();

        let mut records: HashMap<i64, _> = self
            .store
            .hospitals_by_ids(&ids)
            .await?
            .into_iter()
            .map(|h| (h.id, h))
            .collect();
        let candidates: Vec<Candidate> = ids
            .iter()
            .filter_map(|id| records.remove(id))
            .map(|hospital| Candidate {
                hospital,
                distance_km: None,
            })
            .collect();

        let mut results = join_offerings(&self.store, service_id, candidates).await?;
        rank_without_distance(&mut results);

        tracing::info!(
            service_id,
            requested = hospital_ids.len(),
            results = results.len(),
            "comparison complete"
        );
        Ok(results)
    }

    /// The service catalog, optionally limited to one category (compared
    /// case-insensitively).
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::UpstreamUnavailable`] if the storage read fails.
    pub async fn list_services(
        &self,
        category: Option<&str>,
    ) -> Result<Vec<ServiceRecord>, SearchError> {
        let mut services = self.store.services().await?;
        if let Some(category) = category.map(str::trim).filter(|c| !c.is_empty()) {
            services.retain(|s| {
                s.category
                    .as_deref()
                    .is_some_and(|c| c.trim().eq_ignore_ascii_case(category))
            });
        }
        Ok(services)
    }

    /// One catalog entry.
    ///
    /// # Errors
    ///
    /// - [`SearchError::NotFound`] if no service has this id.
    /// - [`SearchError::UpstreamUnavailable`] if the storage read fails.
    pub async fn service(&self, service_id: i64) -> Result<ServiceRecord, SearchError> {
        self.store
            .service_by_id(service_id)
            .await?
            .ok_or_else(|| SearchError::NotFound(format!("service {service_id}")))
    }

    /// Catalog entries whose name contains `keyword`, ignoring case. A blank
    /// keyword matches every service.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::UpstreamUnavailable`] if the storage read fails.
    pub async fn search_services(&self, keyword: &str) -> Result<Vec<ServiceRecord>, SearchError> {
        let services = self.store.search_services(keyword.trim()).await?;
        tracing::debug!(keyword, count = services.len(), "service search");
        Ok(services)
    }

    /// Review average and count for one hospital.
    ///
    /// # Errors
    ///
    /// - [`SearchError::NotFound`] if no hospital has this id.
    /// - [`SearchError::UpstreamUnavailable`] if a storage read fails.
    pub async fn rating_stats(&self, hospital_id: i64) -> Result<RatingAggregate, SearchError> {
        if self.store.hospitals_by_ids(&[hospital_id]).await?.is_empty() {
            return Err(SearchError::NotFound(format!("hospital {hospital_id}")));
        }
        Ok(self.store.rating_aggregate(hospital_id).await?)
    }
}
