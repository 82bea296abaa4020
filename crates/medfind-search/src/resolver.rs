//! Location resolution fallback chain.
//!
//! Tiers are tried strictly in order and the first usable reference point
//! wins:
//!
//! 1. `EXPLICIT`: caller coordinates plus a radius.
//! 2. `GAZETTEER`: static `(city, area)` table, no I/O.
//! 3. `GEOCODE_AREA`: up to four free-text area queries, one at a time.
//! 4. `GEOCODE_CITY`: the city name alone.
//! 5. `CITY_ONLY`: every hospital in the city, no reference point.
//!
//! Geocoder misses and failures only advance the chain. Storage errors
//! propagate.

use std::collections::HashMap;
use std::sync::Arc;

use medfind_core::{
    distance_km, Coordinate, Gazetteer, Geocoder, HospitalRecord, HospitalStore,
    ResolvedLocation, StoreError, Tier,
};

/// Pushdown distances further than this from the canonical Haversine value
/// are logged as disagreements.
const PUSHDOWN_TOLERANCE_KM: f64 = 0.01;

const DEFAULT_REGION: &str = "Maharashtra";
const DEFAULT_COUNTRY: &str = "India";

/// Location inputs for one request.
#[derive(Debug, Clone, Copy)]
pub struct LocationQuery<'a> {
    pub coordinates: Option<Coordinate>,
    pub city: &'a str,
    pub area: Option<&'a str>,
    pub radius_km: Option<f64>,
}

/// A hospital passed on to the catalog join, with its distance from the
/// reference point when one exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub hospital: HospitalRecord,
    pub distance_km: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub location: ResolvedLocation,
    pub candidates: Vec<Candidate>,
}

/// Resolves a [`LocationQuery`] into a reference point and candidate set.
#[derive(Debug, Clone)]
pub struct LocationResolver {
    gazetteer: Arc<Gazetteer>,
    region: String,
    country: String,
    use_pushdown: bool,
}

/// Free-text geocoder queries for an area, in the order they are attempted.
///
/// Variants that would need a blank component are skipped.
#[must_use]
pub fn area_queries(area: &str, city: &str, region: &str, country: &str) -> Vec<String> {
    let area = area.trim();
    let city = city.trim();
    if area.is_empty() {
        return Vec::new();
    }

    let mut queries = Vec::with_capacity(4);
    if !city.is_empty() {
        queries.push(format!("{area}, {city}"));
    }
    if !region.trim().is_empty() && !country.trim().is_empty() {
        queries.push(format!("{area}, {}, {}", region.trim(), country.trim()));
    }
    queries.push(area.to_string());
    if !city.is_empty() {
        queries.push(format!("{city}, {area}"));
    }
    queries
}

impl LocationResolver {
    #[must_use]
    pub fn new(gazetteer: Arc<Gazetteer>) -> Self {
        Self {
            gazetteer,
            region: DEFAULT_REGION.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
            use_pushdown: false,
        }
    }

    /// Region and country used in the `"{area}, {region}, {country}"` query.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>, country: impl Into<String>) -> Self {
        self.region = region.into();
        self.country = country.into();
        self
    }

    /// Ask the store for its geospatial pushdown before filtering in process.
    #[must_use]
    pub fn with_pushdown(mut self, enabled: bool) -> Self {
        self.use_pushdown = enabled;
        self
    }

    /// Run the fallback chain.
    ///
    /// An empty candidate set is a valid outcome.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a storage read fails. Geocoder failures are
    /// never returned.
    pub async fn resolve<S, G>(
        &self,
        store: &S,
        geocoder: &G,
        query: LocationQuery<'_>,
    ) -> Result<Resolution, StoreError>
    where
        S: HospitalStore,
        G: Geocoder,
    {
        let city = query.city.trim();
        let city_filter = Some(city).filter(|c| !c.is_empty());
        let area = query.area.map(str::trim).filter(|a| !a.is_empty());

        if let (Some(point), Some(radius_km)) = (query.coordinates, query.radius_km) {
            return self
                .radius_resolution(store, point, Tier::Explicit, radius_km, city_filter)
                .await;
        }

        if let (Some(area), Some(radius_km)) = (area, query.radius_km) {
            if let Some((point, tier)) = self.locate_area(geocoder, city, area).await {
                return self
                    .radius_resolution(store, point, tier, radius_km, city_filter)
                    .await;
            }
            tracing::info!(city, area, "all geocoding tiers failed; falling back to city-only");
        }

        let candidates = match city_filter {
            Some(city) => store
                .hospitals_by_city(city)
                .await?
                .into_iter()
                .map(|hospital| Candidate {
                    hospital,
                    distance_km: None,
                })
                .collect(),
            None => Vec::new(),
        };
        tracing::info!(
            tier = %Tier::CityOnly,
            city,
            count = candidates.len(),
            "resolved location"
        );
        Ok(Resolution {
            location: ResolvedLocation::city_only(),
            candidates,
        })
    }

    /// Tiers two through four: gazetteer, area geocoding, city geocoding.
    async fn locate_area<G: Geocoder>(
        &self,
        geocoder: &G,
        city: &str,
        area: &str,
    ) -> Option<(Coordinate, Tier)> {
        if let Some(point) = self.gazetteer.lookup(city, area) {
            tracing::debug!(tier = %Tier::Gazetteer, city, area, %point, "gazetteer hit");
            return Some((point, Tier::Gazetteer));
        }
        tracing::debug!(city, area, "gazetteer miss");

        for q in area_queries(area, city, &self.region, &self.country) {
            tracing::debug!(tier = %Tier::GeocodeArea, query = %q, "trying area geocode");
            if let Some(point) = geocoder.forward_geocode(&q).await {
                tracing::debug!(tier = %Tier::GeocodeArea, query = %q, %point, "area geocoded");
                return Some((point, Tier::GeocodeArea));
            }
        }

        if city.is_empty() {
            return None;
        }
        tracing::debug!(tier = %Tier::GeocodeCity, city, "trying city geocode");
        geocoder
            .forward_geocode(city)
            .await
            .map(|point| (point, Tier::GeocodeCity))
    }

    async fn radius_resolution<S: HospitalStore>(
        &self,
        store: &S,
        point: Coordinate,
        tier: Tier,
        radius_km: f64,
        city: Option<&str>,
    ) -> Result<Resolution, StoreError> {
        let candidates = self.within_radius(store, point, radius_km, city).await?;
        tracing::info!(
            tier = %tier,
            reference = %point,
            radius_km,
            count = candidates.len(),
            "resolved location"
        );
        Ok(Resolution {
            location: ResolvedLocation::at(point, tier),
            candidates,
        })
    }

    /// Hospitals with a coordinate no further than `radius_km` from `point`,
    /// in storage order.
    async fn within_radius<S: HospitalStore>(
        &self,
        store: &S,
        point: Coordinate,
        radius_km: f64,
        city: Option<&str>,
    ) -> Result<Vec<Candidate>, StoreError> {
        if self.use_pushdown {
            match store.within_radius(point, radius_km, city).await {
                Ok(Some(rows)) => return Ok(verify_pushdown(rows, point, radius_km, city)),
                Ok(None) => tracing::debug!("store has no radius pushdown; filtering in process"),
                Err(e) => {
                    tracing::warn!(error = %e, "radius pushdown failed; filtering in process");
                }
            }
        }

        let in_range: Vec<(i64, f64)> = store
            .hospital_coordinates(city)
            .await?
            .into_iter()
            .map(|hc| (hc.hospital_id, distance_km(point, hc.coordinate)))
            .filter(|(_, d)| *d <= radius_km)
            .collect();
        if in_range.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = in_range.iter().map(|(id, _)| *id).collect();
        let mut records: HashMap<i64, HospitalRecord> = store
            .hospitals_by_ids(&ids)
            .await?
            .into_iter()
            .map(|h| (h.id, h))
            .collect();

        Ok(in_range
            .into_iter()
            .filter_map(|(id, d)| {
                records.remove(&id).map(|hospital| Candidate {
                    hospital,
                    distance_km: Some(d),
                })
            })
            .collect())
    }
}

/// Re-check pushdown rows with the canonical distance function.
fn verify_pushdown(
    rows: Vec<(HospitalRecord, f64)>,
    point: Coordinate,
    radius_km: f64,
    city: Option<&str>,
) -> Vec<Candidate> {
    rows.into_iter()
        .filter(|(hospital, _)| city.is_none_or(|c| hospital.city.trim().eq_ignore_ascii_case(c)))
        .filter_map(|(hospital, reported)| {
            let coordinate = hospital.coordinate?;
            let canonical = distance_km(point, coordinate);
            if (canonical - reported).abs() > PUSHDOWN_TOLERANCE_KM {
                tracing::warn!(
                    hospital_id = hospital.id,
                    reported,
                    canonical,
                    "pushdown distance disagrees with haversine"
                );
            }
            (canonical <= radius_km).then_some(Candidate {
                hospital,
                distance_km: Some(canonical),
            })
        })
        .collect()
}
