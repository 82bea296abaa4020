//! [`HospitalStore`] backed by a Postgres pool.

use medfind_core::{
    Coordinate, HospitalCoordinate, HospitalRecord, HospitalStore, RatingAggregate,
    ServiceOffering, ServiceRecord, StoreError,
};
use sqlx::PgPool;

use crate::{hospitals, services};

/// Postgres storage collaborator. Read-only; supports radius pushdown.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Connection-level failures become [`StoreError::Unavailable`]; anything
/// else is a failed query.
pub(crate) fn store_error(context: &str, error: sqlx::Error) -> StoreError {
    match error {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(format!("{context}: {error}"))
        }
        other => StoreError::Query {
            context: context.to_string(),
            source: Box::new(other),
        },
    }
}

impl HospitalStore for PgStore {
    async fn hospitals_by_city(&self, city: &str) -> Result<Vec<HospitalRecord>, StoreError> {
        let rows = hospitals::list_hospitals_by_city(&self.pool, city)
            .await
            .map_err(|e| store_error("hospitals_by_city", e))?;
        Ok(rows.into_iter().map(HospitalRecord::from).collect())
    }

    async fn hospital_coordinates(
        &self,
        city: Option<&str>,
    ) -> Result<Vec<HospitalCoordinate>, StoreError> {
        hospitals::list_hospital_coordinates(&self.pool, city)
            .await
            .map_err(|e| store_error("hospital_coordinates", e))
    }

    async fn hospitals_by_ids(&self, ids: &[i64]) -> Result<Vec<HospitalRecord>, StoreError> {
        let rows = hospitals::list_hospitals_by_ids(&self.pool, ids)
            .await
            .map_err(|e| store_error("hospitals_by_ids", e))?;
        Ok(rows.into_iter().map(HospitalRecord::from).collect())
    }

    async fn offerings(
        &self,
        service_id: i64,
        hospital_ids: &[i64],
    ) -> Result<Vec<ServiceOffering>, StoreError> {
        let rows = hospitals::list_offerings(&self.pool, service_id, hospital_ids)
            .await
            .map_err(|e| store_error("offerings", e))?;
        Ok(rows.into_iter().map(ServiceOffering::from).collect())
    }

    async fn rating_aggregate(&self, hospital_id: i64) -> Result<RatingAggregate, StoreError> {
        hospitals::get_rating_aggregate(&self.pool, hospital_id)
            .await
            .map_err(|e| store_error("rating_aggregate", e))
    }

    async fn services(&self) -> Result<Vec<ServiceRecord>, StoreError> {
        let rows = services::list_services(&self.pool)
            .await
            .map_err(|e| store_error("services", e))?;
        Ok(rows.into_iter().map(ServiceRecord::from).collect())
    }

    async fn service_by_id(&self, service_id: i64) -> Result<Option<ServiceRecord>, StoreError> {
        let row = services::get_service(&self.pool, service_id)
            .await
            .map_err(|e| store_error("service_by_id", e))?;
        Ok(row.map(ServiceRecord::from))
    }

    async fn search_services(&self, keyword: &str) -> Result<Vec<ServiceRecord>, StoreError> {
        let rows = services::search_services(&self.pool, keyword)
            .await
            .map_err(|e| store_error("search_services", e))?;
        Ok(rows.into_iter().map(ServiceRecord::from).collect())
    }

    async fn within_radius(
        &self,
        reference: Coordinate,
        radius_km: f64,
        city: Option<&str>,
    ) -> Result<Option<Vec<(HospitalRecord, f64)>>, StoreError> {
        let rows = hospitals::list_hospitals_within_radius(&self.pool, reference, radius_km, city)
            .await
            .map_err(|e| store_error("within_radius", e))?;
        tracing::debug!(%reference, radius_km, count = rows.len(), "radius pushdown");
        Ok(Some(
            rows.into_iter()
                .map(|(row, distance)| (HospitalRecord::from(row), distance))
                .collect(),
        ))
    }
}
