//! HTTP client for Nominatim-compatible `search` and `reverse` endpoints.
//!
//! One request per call, a fixed timeout, and no retries. Retrying is the
//! location resolver's job, expressed as its fallback chain.

use std::time::Duration;

use medfind_core::{Coordinate, Geocoder, Locality};
use reqwest::{Client, Url};

use crate::error::GeocodeError;
use crate::provider::{forward_answer, reverse_answer, GeocodeProvider};
use crate::types::{ReverseResponse, SearchHit};

const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org/";

/// Client for a Nominatim-compatible geocoding service.
///
/// Every request carries the configured `User-Agent`; public Nominatim
/// instances reject anonymous or library-default identifiers.
pub struct NominatimClient {
    client: Client,
    base_url: Url,
}

impl NominatimClient {
    /// Creates a client pointed at the public OpenStreetMap Nominatim instance.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(user_agent: &str, timeout_secs: u64) -> Result<Self, GeocodeError> {
        Self::with_base_url(user_agent, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (self-hosted provider, or
    /// wiremock in tests).
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`GeocodeError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        user_agent: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so `join("search")` appends a segment
        // instead of replacing the last one.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| GeocodeError::InvalidBaseUrl {
            base_url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    /// Free-text search returning the single best match, if any.
    ///
    /// Blank queries return `Ok(None)` without a request.
    ///
    /// # Errors
    ///
    /// - [`GeocodeError::Http`] on network failure or timeout.
    /// - [`GeocodeError::UnexpectedStatus`] on a non-2xx response.
    /// - [`GeocodeError::Deserialize`] if the body is not the expected JSON array.
    /// - [`GeocodeError::InvalidCoordinate`] if the provider returns an
    ///   out-of-range point.
    pub async fn search(&self, query: &str) -> Result<Option<Coordinate>, GeocodeError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(None);
        }

        let url = self.build_url(
            "search",
            &[
                ("q", query),
                ("format", "json"),
                ("limit", "1"),
                ("addressdetails", "1"),
            ],
        )?;
        let body = self.request_text(&url).await?;
        let hits: Vec<SearchHit> =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Deserialize {
                context: format!("search(q={query})"),
                source: e,
            })?;

        match hits.first() {
            Some(hit) => Ok(Some(Coordinate::validated(hit.lat, hit.lon)?)),
            None => Ok(None),
        }
    }

    /// Resolve a coordinate to city and area names.
    ///
    /// Returns `Ok(None)` when the provider has no address for the point.
    ///
    /// # Errors
    ///
    /// - [`GeocodeError::InvalidCoordinate`] if `coordinate` is out of range
    ///   (no request is sent).
    /// - [`GeocodeError::Http`], [`GeocodeError::UnexpectedStatus`], or
    ///   [`GeocodeError::Deserialize`] as for [`Self::search`].
    pub async fn reverse(&self, coordinate: Coordinate) -> Result<Option<Locality>, GeocodeError> {
        let coordinate = Coordinate::validated(coordinate.latitude, coordinate.longitude)?;
        let lat = coordinate.latitude.to_string();
        let lon = coordinate.longitude.to_string();

        let url = self.build_url(
            "reverse",
            &[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("format", "json"),
                ("addressdetails", "1"),
            ],
        )?;
        let body = self.request_text(&url).await?;
        let parsed: ReverseResponse =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Deserialize {
                context: format!("reverse(lat={lat}, lon={lon})"),
                source: e,
            })?;

        if let Some(message) = parsed.error.as_deref() {
            tracing::debug!(
                %coordinate,
                provider_message = message,
                "reverse geocode returned no address"
            );
        }
        Ok(parsed.address.map(|address| address.to_locality()))
    }

    /// Builds an endpoint URL with percent-encoded query parameters.
    fn build_url(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Url, GeocodeError> {
        let mut url = self
            .base_url
            .join(endpoint)
            .map_err(|e| GeocodeError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Sends a GET request and returns the body of a 2xx response.
    async fn request_text(&self, url: &Url) -> Result<String, GeocodeError> {
        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }
}

impl GeocodeProvider for NominatimClient {
    async fn search(&self, query: &str) -> Result<Option<Coordinate>, GeocodeError> {
        NominatimClient::search(self, query).await
    }

    async fn reverse(&self, coordinate: Coordinate) -> Result<Option<Locality>, GeocodeError> {
        NominatimClient::reverse(self, coordinate).await
    }
}

impl Geocoder for NominatimClient {
    async fn forward_geocode(&self, query: &str) -> Option<Coordinate> {
        forward_answer(query, NominatimClient::search(self, query).await)
    }

    async fn reverse_geocode(&self, coordinate: Coordinate) -> Option<Locality> {
        reverse_answer(coordinate, NominatimClient::reverse(self, coordinate).await)
    }
}
