//! Forward and reverse geocoding against a Nominatim-compatible provider.
//!
//! [`NominatimClient`] exposes fallible `search`/`reverse` calls for callers
//! that want the error, and implements [`medfind_core::Geocoder`], which
//! flattens every failure into `None` for the location resolver.
//! [`CachedGeocoder`] sits on the fallible [`GeocodeProvider`] calls so that
//! only real answers are remembered.

pub mod cache;
pub mod client;
pub mod error;
pub mod provider;
pub mod types;

pub use cache::CachedGeocoder;
pub use client::NominatimClient;
pub use error::GeocodeError;
pub use provider::GeocodeProvider;
pub use types::{NominatimAddress, ReverseResponse, SearchHit};
