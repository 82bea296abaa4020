//! Read queries over `hospitals`, `hospital_services`, and `reviews`.

use medfind_core::{
    Coordinate, HospitalCoordinate, HospitalRecord, RatingAggregate, ServiceOffering,
};
use rust_decimal::Decimal;
use sqlx::PgPool;

const HOSPITAL_COLUMNS: &str =
    "h.id, h.name, h.address, h.city, h.latitude, h.longitude, h.phone, h.rating";

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `hospitals` table.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct HospitalRow {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub city: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub phone: Option<String>,
    pub rating: Option<f64>,
}

impl HospitalRow {
    /// The row's coordinate, when both halves are present and in range.
    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Coordinate::validated(lat, lon).ok(),
            _ => None,
        }
    }
}

impl From<HospitalRow> for HospitalRecord {
    fn from(row: HospitalRow) -> Self {
        let coordinate = row.coordinate();
        Self {
            id: row.id,
            name: row.name,
            address: row.address,
            city: row.city,
            coordinate,
            phone: row.phone,
            static_rating: row.rating,
        }
    }
}

/// A row from `hospital_services`.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct OfferingRow {
    pub hospital_id: i64,
    pub service_id: i64,
    pub price: Decimal,
    pub is_available: bool,
    pub waiting_time_minutes: Option<i32>,
}

impl From<OfferingRow> for ServiceOffering {
    fn from(row: OfferingRow) -> Self {
        Self {
            hospital_id: row.hospital_id,
            service_id: row.service_id,
            price: row.price,
            available: row.is_available,
            waiting_time_minutes: row.waiting_time_minutes,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CoordinateRow {
    id: i64,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, sqlx::FromRow)]
struct DistanceRow {
    #[sqlx(flatten)]
    hospital: HospitalRow,
    distance_km: f64,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Hospitals whose city matches case-insensitively, ordered by id.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_hospitals_by_city(
    pool: &PgPool,
    city: &str,
) -> Result<Vec<HospitalRow>, sqlx::Error> {
    sqlx::query_as::<_, HospitalRow>(&format!(
        "SELECT {HOSPITAL_COLUMNS} \
         FROM hospitals h \
         WHERE LOWER(TRIM(h.city)) = LOWER(TRIM($1)) \
         ORDER BY h.id"
    ))
    .bind(city)
    .fetch_all(pool)
    .await
}

/// `(id, coordinate)` for every hospital with a location, optionally limited
/// to one city. Out-of-range rows are skipped.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_hospital_coordinates(
    pool: &PgPool,
    city: Option<&str>,
) -> Result<Vec<HospitalCoordinate>, sqlx::Error> {
    let rows = sqlx::query_as::<_, CoordinateRow>(
        "SELECT h.id, h.latitude, h.longitude \
         FROM hospitals h \
         WHERE h.latitude IS NOT NULL \
           AND h.longitude IS NOT NULL \
           AND ($1::text IS NULL OR LOWER(TRIM(h.city)) = LOWER(TRIM($1))) \
         ORDER BY h.id",
    )
    .bind(city)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .filter_map(|row| {
            Coordinate::validated(row.latitude, row.longitude)
                .ok()
                .map(|coordinate| HospitalCoordinate {
                    hospital_id: row.id,
                    coordinate,
                })
        })
        .collect())
}

/// Hospitals with the given ids, ordered by id. Unknown ids are skipped.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_hospitals_by_ids(
    pool: &PgPool,
    ids: &[i64],
) -> Result<Vec<HospitalRow>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    sqlx::query_as::<_, HospitalRow>(&format!(
        "SELECT {HOSPITAL_COLUMNS} \
         FROM hospitals h \
         WHERE h.id = ANY($1) \
         ORDER BY h.id"
    ))
    .bind(ids)
    .fetch_all(pool)
    .await
}

/// Offerings of one service at any of the given hospitals.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_offerings(
    pool: &PgPool,
    service_id: i64,
    hospital_ids: &[i64],
) -> Result<Vec<OfferingRow>, sqlx::Error> {
    if hospital_ids.is_empty() {
        return Ok(Vec::new());
    }
    sqlx::query_as::<_, OfferingRow>(
        "SELECT hs.hospital_id, hs.service_id, hs.price, hs.is_available, hs.waiting_time_minutes \
         FROM hospital_services hs \
         WHERE hs.service_id = $1 \
           AND hs.hospital_id = ANY($2) \
         ORDER BY hs.hospital_id",
    )
    .bind(service_id)
    .bind(hospital_ids)
    .fetch_all(pool)
    .await
}

/// Review average and count for one hospital. A hospital without reviews
/// gets `average_rating = None` and `review_count = 0`.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn get_rating_aggregate(
    pool: &PgPool,
    hospital_id: i64,
) -> Result<RatingAggregate, sqlx::Error> {
    let (average_rating, review_count) = sqlx::query_as::<_, (Option<f64>, i64)>(
        "SELECT AVG(r.rating)::float8, COUNT(*) \
         FROM reviews r \
         WHERE r.hospital_id = $1",
    )
    .bind(hospital_id)
    .fetch_one(pool)
    .await?;

    Ok(RatingAggregate {
        hospital_id,
        average_rating,
        review_count,
    })
}

/// Hospitals within `radius_km` of `reference`, nearest first, with the
/// great-circle distance computed in SQL.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_hospitals_within_radius(
    pool: &PgPool,
    reference: Coordinate,
    radius_km: f64,
    city: Option<&str>,
) -> Result<Vec<(HospitalRow, f64)>, sqlx::Error> {
    let rows = sqlx::query_as::<_, DistanceRow>(&format!(
        "SELECT * FROM ( \
             SELECT {HOSPITAL_COLUMNS}, \
                    2 * 6371.0 * ASIN(SQRT(LEAST(1.0, \
                        POWER(SIN(RADIANS(h.latitude - $1) / 2), 2) \
                        + COS(RADIANS($1)) * COS(RADIANS(h.latitude)) \
                          * POWER(SIN(RADIANS(h.longitude - $2) / 2), 2)))) AS distance_km \
             FROM hospitals h \
             WHERE h.latitude IS NOT NULL \
               AND h.longitude IS NOT NULL \
               AND ($4::text IS NULL OR LOWER(TRIM(h.city)) = LOWER(TRIM($4))) \
         ) d \
         WHERE d.distance_km <= $3 \
         ORDER BY d.distance_km, d.id"
    ))
    .bind(reference.latitude)
    .bind(reference.longitude)
    .bind(radius_km)
    .bind(city)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| (row.hospital, row.distance_km))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(latitude: Option<f64>, longitude: Option<f64>) -> HospitalRow {
        HospitalRow {
            id: 9,
            name: "Jehangir".to_string(),
            address: "Sassoon Rd".to_string(),
            city: "Pune".to_string(),
            latitude,
            longitude,
            phone: Some("020-6681-9999".to_string()),
            rating: Some(4.2),
        }
    }

    #[test]
    fn record_keeps_valid_coordinate_and_static_rating() {
        let record = HospitalRecord::from(row(Some(18.5307), Some(73.8768)));
        assert_eq!(record.coordinate, Some(Coordinate::new(18.5307, 73.8768)));
        assert_eq!(record.static_rating, Some(4.2));
        assert_eq!(record.phone.as_deref(), Some("020-6681-9999"));
    }

    #[test]
    fn partial_or_invalid_coordinate_becomes_none() {
        assert_eq!(row(Some(18.5), None).coordinate(), None);
        assert_eq!(row(None, Some(73.8)).coordinate(), None);
        assert_eq!(row(Some(118.5), Some(73.8)).coordinate(), None);
    }

    #[test]
    fn offering_row_maps_availability() {
        let offering = ServiceOffering::from(OfferingRow {
            hospital_id: 1,
            service_id: 2,
            price: Decimal::new(49_900, 2),
            is_available: false,
            waiting_time_minutes: Some(45),
        });
        assert!(!offering.available);
        assert_eq!(offering.price, Decimal::new(49_900, 2));
        assert_eq!(offering.waiting_time_minutes, Some(45));
    }
}
