//! Shared domain types, collaborator ports, and configuration for `medfind`.
//!
//! Nothing in this crate performs I/O except configuration and gazetteer
//! loading. The search pipeline lives in `medfind-search`; the concrete
//! storage and geocoding adapters live in `medfind-db` and `medfind-geocode`.

pub mod app_config;
pub mod config;
pub mod distance;
pub mod error;
pub mod gazetteer;
pub mod ports;
pub mod types;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use distance::{distance_km, EARTH_RADIUS_KM};
pub use error::ConfigError;
pub use gazetteer::{DuplicateArea, Gazetteer};
pub use ports::{Geocoder, HospitalStore, StoreError};
pub use types::{
    Coordinate, HospitalCoordinate, HospitalRecord, InvalidCoordinate, Locality, RankedResult,
    RatingAggregate, ResolvedLocation, ServiceOffering, ServiceRecord, Tier,
};
