//! Static `(city, area) -> coordinate` reference table.
//!
//! Built once from YAML and read-only afterwards. Keys are trimmed and
//! lowercased on both insert and lookup. Duplicate keys resolve first-wins;
//! the losers are kept in [`Gazetteer::duplicates`] so the loader can report
//! them instead of silently overwriting.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use serde::Deserialize;

use crate::types::Coordinate;
use crate::ConfigError;

const BUILTIN_GAZETTEER: &str = include_str!("../../../config/gazetteer.yaml");

#[derive(Debug, Deserialize)]
struct GazetteerFile {
    cities: Vec<CityEntry>,
}

#[derive(Debug, Deserialize)]
struct CityEntry {
    name: String,
    #[serde(default)]
    aliases: Vec<String>,
    areas: Vec<AreaEntry>,
}

#[derive(Debug, Deserialize)]
struct AreaEntry {
    name: String,
    latitude: f64,
    longitude: f64,
}

/// An entry that was dropped because an earlier one already claimed its key.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateArea {
    pub city: String,
    pub area: String,
    pub kept: Coordinate,
    pub ignored: Coordinate,
}

#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    entries: HashMap<(String, String), Coordinate>,
    duplicates: Vec<DuplicateArea>,
}

/// Trim and lowercase a city or area name for use as a lookup key.
#[must_use]
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

impl Gazetteer {
    /// The table shipped with the crate (`config/gazetteer.yaml`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` only if the embedded document is malformed.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_yaml_str(BUILTIN_GAZETTEER)
    }

    /// Load from an explicit path, or fall back to the built-in table.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, parsed, or validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                let content =
                    std::fs::read_to_string(path).map_err(|e| ConfigError::GazetteerFileIo {
                        path: path.display().to_string(),
                        source: e,
                    })?;
                Self::from_yaml_str(&content)
            }
            None => Self::builtin(),
        }
    }

    /// Parse and validate a gazetteer YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::GazetteerParse`] on malformed YAML and
    /// [`ConfigError::Validation`] for blank names or out-of-range coordinates.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let file: GazetteerFile = serde_yaml::from_str(yaml)?;
        Self::from_file(file)
    }

    fn from_file(file: GazetteerFile) -> Result<Self, ConfigError> {
        let mut entries = Vec::new();
        for city in &file.cities {
            if city.name.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "gazetteer city name must be non-empty".to_string(),
                ));
            }
            for area in &city.areas {
                if area.name.trim().is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "gazetteer area name under '{}' must be non-empty",
                        city.name
                    )));
                }
                let coordinate = Coordinate::validated(area.latitude, area.longitude)
                    .map_err(|e| {
                        ConfigError::Validation(format!(
                            "gazetteer area '{}, {}': {e}",
                            area.name, city.name
                        ))
                    })?;
                for city_name in std::iter::once(&city.name).chain(city.aliases.iter()) {
                    entries.push((city_name.as_str(), area.name.as_str(), coordinate));
                }
            }
        }
        Ok(Self::from_entries(entries))
    }

    /// Build from `(city, area, coordinate)` triples in priority order.
    #[must_use]
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str, Coordinate)>,
    {
        let mut table: HashMap<(String, String), Coordinate> = HashMap::new();
        let mut duplicates = Vec::new();

        for (city, area, coordinate) in entries {
            let key = (normalize_key(city), normalize_key(area));
            if let Some(kept) = table.get(&key) {
                duplicates.push(DuplicateArea {
                    city: key.0,
                    area: key.1,
                    kept: *kept,
                    ignored: coordinate,
                });
            } else {
                table.insert(key, coordinate);
            }
        }

        Self {
            entries: table,
            duplicates,
        }
    }

    /// Reference coordinate for an area within a city, if known.
    #[must_use]
    pub fn lookup(&self, city: &str, area: &str) -> Option<Coordinate> {
        self.entries
            .get(&(normalize_key(city), normalize_key(area)))
            .copied()
    }

    /// Known area names for a city, sorted alphabetically.
    #[must_use]
    pub fn areas(&self, city: &str) -> Vec<&str> {
        let city = normalize_key(city);
        self.entries
            .keys()
            .filter(|(c, _)| *c == city)
            .map(|(_, a)| a.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    #[must_use]
    pub fn duplicates(&self) -> &[DuplicateArea] {
        &self.duplicates
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_contains_kothrud() {
        let gazetteer = Gazetteer::builtin().expect("embedded gazetteer should parse");
        assert_eq!(
            gazetteer.lookup("Pune", "Kothrud"),
            Some(Coordinate::new(18.5114, 73.8048))
        );
    }

    #[test]
    fn lookup_normalizes_case_and_whitespace() {
        let gazetteer = Gazetteer::builtin().unwrap();
        assert_eq!(
            gazetteer.lookup("  PUNE ", " Koregaon Park  "),
            Some(Coordinate::new(18.5344, 73.8985))
        );
    }

    #[test]
    fn aliases_share_the_city_areas() {
        let gazetteer = Gazetteer::builtin().unwrap();
        assert_eq!(
            gazetteer.lookup("Pimpri-Chinchwad", "new sangvi"),
            gazetteer.lookup("pune", "new sangvi")
        );
        assert!(gazetteer.lookup("New Delhi", "Saket").is_some());
    }

    #[test]
    fn lookup_miss_returns_none() {
        let gazetteer = Gazetteer::builtin().unwrap();
        assert!(gazetteer.lookup("pune", "atlantis").is_none());
        assert!(gazetteer.lookup("gotham", "kothrud").is_none());
    }

    #[test]
    fn duplicate_keys_keep_first_entry() {
        let gazetteer = Gazetteer::from_entries([
            ("Delhi", "Karol Bagh", Coordinate::new(28.6520, 77.1903)),
            ("delhi", " karol bagh", Coordinate::new(1.0, 1.0)),
        ]);
        assert_eq!(gazetteer.len(), 1);
        assert_eq!(
            gazetteer.lookup("delhi", "karol bagh"),
            Some(Coordinate::new(28.6520, 77.1903))
        );
        assert_eq!(gazetteer.duplicates().len(), 1);
        assert_eq!(gazetteer.duplicates()[0].ignored, Coordinate::new(1.0, 1.0));
    }

    #[test]
    fn yaml_rejects_out_of_range_coordinate() {
        let yaml = "cities:\n  - name: x\n    areas:\n      - { name: y, latitude: 91.0, longitude: 0.0 }\n";
        let err = Gazetteer::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)), "got {err:?}");
    }

    #[test]
    fn yaml_rejects_blank_area_name() {
        let yaml = "cities:\n  - name: x\n    areas:\n      - { name: '  ', latitude: 1.0, longitude: 1.0 }\n";
        let err = Gazetteer::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)), "got {err:?}");
    }

    #[test]
    fn areas_lists_sorted_names() {
        let gazetteer = Gazetteer::from_entries([
            ("Pune", "Wakad", Coordinate::new(18.5994, 73.7743)),
            ("Pune", "Baner", Coordinate::new(18.5646, 73.8057)),
            ("Mumbai", "Bandra", Coordinate::new(19.0596, 72.8295)),
        ]);
        assert_eq!(gazetteer.areas("pune"), vec!["baner", "wakad"]);
        assert!(gazetteer.areas("nowhere").is_empty());
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = Gazetteer::load(Some(Path::new("/nonexistent/gazetteer.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::GazetteerFileIo { .. }));
    }
}
