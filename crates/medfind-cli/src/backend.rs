//! Runtime choice of storage and geocoder behind the search ports.

use std::path::Path;
use std::time::Duration;

use medfind_core::{
    AppConfig, Coordinate, Geocoder, HospitalCoordinate, HospitalRecord, HospitalStore, Locality,
    RatingAggregate, ServiceOffering, ServiceRecord, StoreError,
};
use medfind_db::PgStore;
use medfind_geocode::{CachedGeocoder, NominatimClient};
use medfind_search::MemoryStore;

/// Storage selected from `--fixture` or `DATABASE_URL`.
pub(crate) enum Storage {
    Memory(MemoryStore),
    Postgres(PgStore),
}

impl Storage {
    /// A fixture file wins over `DATABASE_URL`.
    pub(crate) async fn open(fixture: Option<&Path>, config: &AppConfig) -> anyhow::Result<Self> {
        if let Some(path) = fixture {
            let store = MemoryStore::load(path)?.with_pushdown(config.use_radius_pushdown);
            tracing::info!(
                path = %path.display(),
                hospitals = store.hospital_count(),
                services = store.service_count(),
                "loaded fixture"
            );
            return Ok(Self::Memory(store));
        }

        if config.database_url.is_none() {
            anyhow::bail!("no storage configured: pass --fixture <PATH> or set DATABASE_URL");
        }
        let pool = medfind_db::connect_pool_from_config(config).await?;
        Ok(Self::Postgres(PgStore::new(pool)))
    }
}

impl HospitalStore for Storage {
    async fn hospitals_by_city(&self, city: &str) -> Result<Vec<HospitalRecord>, StoreError> {
        match self {
            Self::Memory(s) => s.hospitals_by_city(city).await,
            Self::Postgres(s) => s.hospitals_by_city(city).await,
        }
    }

    async fn hospital_coordinates(
        &self,
        city: Option<&str>,
    ) -> Result<Vec<HospitalCoordinate>, StoreError> {
        match self {
            Self::Memory(s) => s.hospital_coordinates(city).await,
            Self::Postgres(s) => s.hospital_coordinates(city).await,
        }
    }

    async fn hospitals_by_ids(&self, ids: &[i64]) -> Result<Vec<HospitalRecord>, StoreError> {
        match self {
            Self::Memory(s) => s.hospitals_by_ids(ids).await,
            Self::Postgres(s) => s.hospitals_by_ids(ids).await,
        }
    }

    async fn offerings(
        &self,
        service_id: i64,
        hospital_ids: &[i64],
    ) -> Result<Vec<ServiceOffering>, StoreError> {
        match self {
            Self::Memory(s) => s.offerings(service_id, hospital_ids).await,
            Self::Postgres(s) => s.offerings(service_id, hospital_ids).await,
        }
    }

    async fn rating_aggregate(&self, hospital_id: i64) -> Result<RatingAggregate, StoreError> {
        match self {
            Self::Memory(s) => s.rating_aggregate(hospital_id).await,
            Self::Postgres(s) => s.rating_aggregate(hospital_id).await,
        }
    }

    async fn services(&self) -> Result<Vec<ServiceRecord>, StoreError> {
        match self {
            Self::Memory(s) => s.services().await,
            Self::Postgres(s) => s.services().await,
        }
    }

    async fn service_by_id(&self, service_id: i64) -> Result<Option<ServiceRecord>, StoreError> {
        match self {
            Self::Memory(s) => s.service_by_id(service_id).await,
            Self::Postgres(s) => s.service_by_id(service_id).await,
        }
    }

    async fn search_services(&self, keyword: &str) -> Result<Vec<ServiceRecord>, StoreError> {
        match self {
            Self::Memory(s) => s.search_services(keyword).await,
            Self::Postgres(s) => s.search_services(keyword).await,
        }
    }

    async fn within_radius(
        &self,
        reference: Coordinate,
        radius_km: f64,
        city: Option<&str>,
    ) -> Result<Option<Vec<(HospitalRecord, f64)>>, StoreError> {
        match self {
            Self::Memory(s) => s.within_radius(reference, radius_km, city).await,
            Self::Postgres(s) => s.within_radius(reference, radius_km, city).await,
        }
    }
}

/// Nominatim client, memoized when `MEDFIND_GEOCODE_CACHE_TTL_SECS > 0`.
pub(crate) enum AppGeocoder {
    Direct(NominatimClient),
    Cached(CachedGeocoder<NominatimClient>),
}

impl AppGeocoder {
    pub(crate) fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let client = build_client(config)?;
        if config.geocode_cache_ttl_secs == 0 {
            return Ok(Self::Direct(client));
        }
        Ok(Self::Cached(CachedGeocoder::new(
            client,
            Duration::from_secs(config.geocode_cache_ttl_secs),
        )))
    }
}

pub(crate) fn build_client(config: &AppConfig) -> anyhow::Result<NominatimClient> {
    Ok(NominatimClient::with_base_url(
        &config.geocoder_user_agent,
        config.geocoder_timeout_secs,
        &config.geocoder_base_url,
    )?)
}

impl Geocoder for AppGeocoder {
    async fn forward_geocode(&self, query: &str) -> Option<Coordinate> {
        match self {
            Self::Direct(g) => g.forward_geocode(query).await,
            Self::Cached(g) => g.forward_geocode(query).await,
        }
    }

    async fn reverse_geocode(&self, coordinate: Coordinate) -> Option<Locality> {
        match self {
            Self::Direct(g) => g.reverse_geocode(coordinate).await,
            Self::Cached(g) => g.reverse_geocode(coordinate).await,
        }
    }
}
