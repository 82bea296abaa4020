//! Flat records exchanged between the storage collaborator, the resolver, and
//! callers of the search service.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// Returned by [`Coordinate::validated`] when either component is out of range
/// or not a finite number.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("coordinate ({latitude}, {longitude}) is outside [-90, 90] x [-180, 180]")]
pub struct InvalidCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build a coordinate, rejecting values outside the valid degree ranges.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCoordinate`] if latitude is outside `[-90, 90]`,
    /// longitude is outside `[-180, 180]`, or either is NaN.
    pub fn validated(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinate> {
        let coordinate = Self::new(latitude, longitude);
        if coordinate.is_valid() {
            Ok(coordinate)
        } else {
            Err(InvalidCoordinate {
                latitude,
                longitude,
            })
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

/// A hospital as returned by the storage collaborator.
///
/// `static_rating` is a curated fallback used only when no reviews exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HospitalRecord {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub city: String,
    #[serde(default)]
    pub coordinate: Option<Coordinate>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub static_rating: Option<f64>,
}

/// Projection of a hospital down to the fields needed for radius filtering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HospitalCoordinate {
    pub hospital_id: i64,
    pub coordinate: Coordinate,
}

/// Price and availability of one service at one hospital.
///
/// Unique per `(hospital_id, service_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceOffering {
    pub hospital_id: i64,
    pub service_id: i64,
    pub price: Decimal,
    pub available: bool,
    #[serde(default)]
    pub waiting_time_minutes: Option<i32>,
}

/// An entry in the service catalog (a procedure, test, or consultation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Review statistics computed per query; never persisted by the search core.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingAggregate {
    pub hospital_id: i64,
    pub average_rating: Option<f64>,
    pub review_count: i64,
}

impl RatingAggregate {
    #[must_use]
    pub const fn empty(hospital_id: i64) -> Self {
        Self {
            hospital_id,
            average_rating: None,
            review_count: 0,
        }
    }
}

/// Stage of the location fallback chain that produced the reference point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    Explicit,
    Gazetteer,
    GeocodeArea,
    GeocodeCity,
    CityOnly,
}

impl Tier {
    /// Whether results from this tier were radius-filtered around a reference point.
    #[must_use]
    pub const fn has_reference_point(self) -> bool {
        !matches!(self, Tier::CityOnly)
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Explicit => write!(f, "EXPLICIT"),
            Tier::Gazetteer => write!(f, "GAZETTEER"),
            Tier::GeocodeArea => write!(f, "GEOCODE_AREA"),
            Tier::GeocodeCity => write!(f, "GEOCODE_CITY"),
            Tier::CityOnly => write!(f, "CITY_ONLY"),
        }
    }
}

/// Outcome of location resolution for one request.
///
/// `reference_point` is `None` exactly when `tier` is [`Tier::CityOnly`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedLocation {
    pub reference_point: Option<Coordinate>,
    pub tier: Tier,
}

impl ResolvedLocation {
    #[must_use]
    pub const fn at(reference_point: Coordinate, tier: Tier) -> Self {
        Self {
            reference_point: Some(reference_point),
            tier,
        }
    }

    #[must_use]
    pub const fn city_only() -> Self {
        Self {
            reference_point: None,
            tier: Tier::CityOnly,
        }
    }
}

/// City and area names recovered by reverse geocoding.
///
/// Either field is an empty string when the provider did not supply it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locality {
    pub city: String,
    pub area: String,
}

/// One row of a search or comparison response.
///
/// `distance_km` is `None` when no reference point existed (the city-only
/// tier, or a comparison). Ranking treats `None` as `0.0`, but callers must
/// not read it as "co-located".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub hospital_id: i64,
    pub name: String,
    pub address: String,
    pub city: String,
    pub coordinate: Option<Coordinate>,
    pub phone: Option<String>,
    pub distance_km: Option<f64>,
    pub price: Decimal,
    pub available: bool,
    pub waiting_time_minutes: Option<i32>,
    pub average_rating: f64,
    pub review_count: i64,
}

impl RankedResult {
    /// Sentinel substituted for a missing distance when ordering rows.
    pub const UNKNOWN_DISTANCE_SENTINEL: f64 = 0.0;

    /// Distance used as the primary ranking key.
    #[must_use]
    pub fn ranking_distance(&self) -> f64 {
        self.distance_km.unwrap_or(Self::UNKNOWN_DISTANCE_SENTINEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validated_accepts_boundaries() {
        assert!(Coordinate::validated(90.0, 180.0).is_ok());
        assert!(Coordinate::validated(-90.0, -180.0).is_ok());
    }

    #[test]
    fn validated_rejects_out_of_range_and_nan() {
        assert!(Coordinate::validated(90.5, 0.0).is_err());
        assert!(Coordinate::validated(0.0, -180.1).is_err());
        assert!(Coordinate::validated(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn tier_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&Tier::GeocodeArea).unwrap();
        assert_eq!(json, "\"GEOCODE_AREA\"");
        assert_eq!(Tier::CityOnly.to_string(), "CITY_ONLY");
    }

    #[test]
    fn only_city_only_lacks_reference_point() {
        assert!(Tier::Explicit.has_reference_point());
        assert!(Tier::GeocodeCity.has_reference_point());
        assert!(!Tier::CityOnly.has_reference_point());
    }

    #[test]
    fn hospital_record_optional_fields_default() {
        let record: HospitalRecord = serde_json::from_str(
            r#"{"id": 1, "name": "A", "address": "1 Road", "city": "Pune"}"#,
        )
        .unwrap();
        assert!(record.coordinate.is_none());
        assert!(record.phone.is_none());
        assert!(record.static_rating.is_none());
    }

    #[test]
    fn ranking_distance_uses_sentinel_when_missing() {
        let row = RankedResult {
            hospital_id: 1,
            name: "A".to_string(),
            address: String::new(),
            city: "Pune".to_string(),
            coordinate: None,
            phone: None,
            distance_km: None,
            price: Decimal::new(100, 0),
            available: true,
            waiting_time_minutes: None,
            average_rating: 0.0,
            review_count: 0,
        };
        assert!(row.ranking_distance().abs() < f64::EPSILON);
    }
}
