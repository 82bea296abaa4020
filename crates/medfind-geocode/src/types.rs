//! Wire types for the Nominatim `search` and `reverse` endpoints.

use medfind_core::Locality;
use serde::{Deserialize, Deserializer};

/// One element of the `search` response array.
///
/// Nominatim encodes `lat`/`lon` as strings; some compatible providers send
/// numbers. Both are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    #[serde(deserialize_with = "de_f64_flexible")]
    pub lat: f64,
    #[serde(deserialize_with = "de_f64_flexible")]
    pub lon: f64,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Body of the `reverse` response. Misses come back as `{"error": "..."}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReverseResponse {
    #[serde(default)]
    pub address: Option<NominatimAddress>,
    #[serde(default)]
    pub error: Option<String>,
}

/// The subset of `addressdetails` fields used to name a locality.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NominatimAddress {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub suburb: Option<String>,
    pub neighbourhood: Option<String>,
    pub residential: Option<String>,
}

impl NominatimAddress {
    /// City from `city`, then `town`, then `village`; area from `suburb`,
    /// then `neighbourhood`, then `residential`. Missing parts are empty.
    #[must_use]
    pub fn to_locality(&self) -> Locality {
        Locality {
            city: first_present(&[&self.city, &self.town, &self.village]),
            area: first_present(&[&self.suburb, &self.neighbourhood, &self.residential]),
        }
    }
}

fn first_present(candidates: &[&Option<String>]) -> String {
    candidates
        .iter()
        .filter_map(|c| c.as_deref())
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or_default()
        .to_string()
}

fn de_f64_flexible<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StrOrNum {
        Str(String),
        Num(f64),
    }

    match StrOrNum::deserialize(deserializer)? {
        StrOrNum::Num(n) => Ok(n),
        StrOrNum::Str(s) => s.trim().parse::<f64>().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_hit_accepts_string_coordinates() {
        let hit: SearchHit =
            serde_json::from_str(r#"{"lat": "18.5114", "lon": "73.8048", "display_name": "Kothrud"}"#)
                .unwrap();
        assert!((hit.lat - 18.5114).abs() < 1e-9);
        assert!((hit.lon - 73.8048).abs() < 1e-9);
    }

    #[test]
    fn search_hit_accepts_numeric_coordinates() {
        let hit: SearchHit = serde_json::from_str(r#"{"lat": 18.5, "lon": 73.8}"#).unwrap();
        assert!((hit.lat - 18.5).abs() < 1e-9);
        assert!(hit.display_name.is_none());
    }

    #[test]
    fn search_hit_rejects_garbage_coordinates() {
        let result = serde_json::from_str::<SearchHit>(r#"{"lat": "north", "lon": "73.8"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn locality_prefers_city_then_town_then_village() {
        let address = NominatimAddress {
            town: Some("Hadapsar".to_string()),
            village: Some("Manjri".to_string()),
            ..NominatimAddress::default()
        };
        assert_eq!(address.to_locality().city, "Hadapsar");

        let address = NominatimAddress {
            city: Some("Pune".to_string()),
            town: Some("Hadapsar".to_string()),
            ..NominatimAddress::default()
        };
        assert_eq!(address.to_locality().city, "Pune");
    }

    #[test]
    fn locality_prefers_suburb_then_neighbourhood_then_residential() {
        let address = NominatimAddress {
            neighbourhood: Some("Lane 5".to_string()),
            residential: Some("Green Acres".to_string()),
            ..NominatimAddress::default()
        };
        assert_eq!(address.to_locality().area, "Lane 5");
    }

    #[test]
    fn missing_fields_become_empty_strings() {
        let locality = NominatimAddress::default().to_locality();
        assert_eq!(locality.city, "");
        assert_eq!(locality.area, "");
    }
}
