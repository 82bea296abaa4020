//! In-memory [`HospitalStore`] backed by a JSON fixture.
//!
//! Used by the CLI's `--fixture` mode and by tests. Rating aggregates are
//! computed from the stored reviews on every call.

use std::path::{Path, PathBuf};

use medfind_core::{
    distance_km, Coordinate, HospitalCoordinate, HospitalRecord, HospitalStore, RatingAggregate,
    ServiceOffering, ServiceRecord, StoreError,
};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read fixture {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse fixture: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One patient review.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Review {
    pub hospital_id: i64,
    pub rating: f64,
}

/// On-disk layout of a fixture file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreFixture {
    #[serde(default)]
    pub hospitals: Vec<HospitalRecord>,
    #[serde(default)]
    pub offerings: Vec<ServiceOffering>,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub services: Vec<ServiceRecord>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    hospitals: Vec<HospitalRecord>,
    offerings: Vec<ServiceOffering>,
    reviews: Vec<Review>,
    services: Vec<ServiceRecord>,
    pushdown: bool,
}

impl MemoryStore {
    #[must_use]
    pub fn new(
        hospitals: Vec<HospitalRecord>,
        offerings: Vec<ServiceOffering>,
        reviews: Vec<Review>,
    ) -> Self {
        Self {
            hospitals,
            offerings,
            reviews,
            services: Vec::new(),
            pushdown: false,
        }
    }

    #[must_use]
    pub fn from_fixture(fixture: StoreFixture) -> Self {
        Self::new(fixture.hospitals, fixture.offerings, fixture.reviews)
            .with_services(fixture.services)
    }

    /// Replace the service catalog. Entries are kept in id order.
    #[must_use]
    pub fn with_services(mut self, mut services: Vec<ServiceRecord>) -> Self {
        services.sort_by_key(|s| s.id);
        self.services = services;
        self
    }

    /// # Errors
    ///
    /// Returns [`FixtureError::Parse`] if `json` is not a valid fixture.
    pub fn from_json_str(json: &str) -> Result<Self, FixtureError> {
        let fixture: StoreFixture = serde_json::from_str(json)?;
        Ok(Self::from_fixture(fixture))
    }

    /// # Errors
    ///
    /// Returns [`FixtureError::Io`] if the file cannot be read, or
    /// [`FixtureError::Parse`] if it is not a valid fixture.
    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        let json = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Answer [`HospitalStore::within_radius`] instead of returning `None`.
    #[must_use]
    pub fn with_pushdown(mut self, enabled: bool) -> Self {
        self.pushdown = enabled;
        self
    }

    #[must_use]
    pub fn hospital_count(&self) -> usize {
        self.hospitals.len()
    }

    #[must_use]
    pub fn service_count(&self) -> usize {
        self.services.len()
    }

    fn in_city<'a>(&'a self, city: Option<&'a str>) -> impl Iterator<Item = &'a HospitalRecord> {
        let city = city.map(str::trim);
        self.hospitals
            .iter()
            .filter(move |h| city.is_none_or(|c| h.city.trim().eq_ignore_ascii_case(c)))
    }
}

impl HospitalStore for MemoryStore {
    async fn hospitals_by_city(&self, city: &str) -> Result<Vec<HospitalRecord>, StoreError> {
        Ok(self.in_city(Some(city)).cloned().collect())
    }

    async fn hospital_coordinates(
        &self,
        city: Option<&str>,
    ) -> Result<Vec<HospitalCoordinate>, StoreError> {
        Ok(self
            .in_city(city)
            .filter_map(|h| {
                h.coordinate.map(|coordinate| HospitalCoordinate {
                    hospital_id: h.id,
                    coordinate,
                })
            })
            .collect())
    }

    async fn hospitals_by_ids(&self, ids: &[i64]) -> Result<Vec<HospitalRecord>, StoreError> {
        Ok(self
            .hospitals
            .iter()
            .filter(|h| ids.contains(&h.id))
            .cloned()
            .collect())
    }

    async fn offerings(
        &self,
        service_id: i64,
        hospital_ids: &[i64],
    ) -> Result<Vec<ServiceOffering>, StoreError> {
        Ok(self
            .offerings
            .iter()
            .filter(|o| o.service_id == service_id && hospital_ids.contains(&o.hospital_id))
            .cloned()
            .collect())
    }

    async fn rating_aggregate(&self, hospital_id: i64) -> Result<RatingAggregate, StoreError> {
        let ratings: Vec<f64> = self
            .reviews
            .iter()
            .filter(|r| r.hospital_id == hospital_id)
            .map(|r| r.rating)
            .collect();
        if ratings.is_empty() {
            return Ok(RatingAggregate::empty(hospital_id));
        }

        #[allow(clippy::cast_precision_loss)]
        let average = ratings.iter().sum::<f64>() / ratings.len() as f64;
        Ok(RatingAggregate {
            hospital_id,
            average_rating: Some(average),
            review_count: i64::try_from(ratings.len()).unwrap_or(i64::MAX),
        })
    }

    async fn services(&self) -> Result<Vec<ServiceRecord>, StoreError> {
        Ok(self.services.clone())
    }

    async fn service_by_id(&self, service_id: i64) -> Result<Option<ServiceRecord>, StoreError> {
        Ok(self.services.iter().find(|s| s.id == service_id).cloned())
    }

    async fn search_services(&self, keyword: &str) -> Result<Vec<ServiceRecord>, StoreError> {
        let needle = keyword.trim().to_lowercase();
        Ok(self
            .services
            .iter()
            .filter(|s| s.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn within_radius(
        &self,
        reference: Coordinate,
        radius_km: f64,
        city: Option<&str>,
    ) -> Result<Option<Vec<(HospitalRecord, f64)>>, StoreError> {
        if !self.pushdown {
            return Ok(None);
        }
        Ok(Some(
            self.in_city(city)
                .filter_map(|h| {
                    let d = distance_km(reference, h.coordinate?);
                    (d <= radius_km).then(|| (h.clone(), d))
                })
                .collect(),
        ))
    }
}
