//! Nominatim (OpenStreetMap) geocoding. Free, no API key required.
//!
//! Reverse geocoding never fails outward: any failure collapses to the
//! 2-decimal coordinate label so weather rendering is never blocked.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::FetchError;
use crate::model::{CityMatch, Coordinates};

use super::{CitySearch, ReverseGeocoder};

const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";
const USER_AGENT: &str = concat!("skyspy/", env!("CARGO_PKG_VERSION"));

/// Nominatim client covering both geocoding directions.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    base_url: String,
    http: Client,
}

impl NominatimClient {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the client at a different endpoint (tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, FetchError> {
        // Nominatim's usage policy requires an identifying user agent.
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            base_url: base_url.into(),
            http,
        })
    }

    async fn try_reverse(&self, coords: Coordinates) -> Result<Option<String>, FetchError> {
        let url = format!("{}/reverse", self.base_url);
        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", coords.latitude.to_string()),
                ("lon", coords.longitude.to_string()),
                ("format", "json".to_string()),
            ])
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body: ReverseResponse = serde_json::from_str(&res.text().await?)?;
        Ok(place_label(&body))
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimClient {
    async fn place_name(&self, coords: Coordinates) -> String {
        match self.try_reverse(coords).await {
            Ok(Some(name)) => {
                tracing::info!(%name, "reverse geocoded");
                name
            }
            Ok(None) => coords.label(),
            Err(e) => {
                tracing::debug!(error = %e, "reverse geocode failed, using coordinates");
                coords.label()
            }
        }
    }
}

#[async_trait]
impl CitySearch for NominatimClient {
    async fn search_city(&self, query: &str) -> Result<CityMatch, FetchError> {
        let url = format!("{}/search", self.base_url);
        let res = self
            .http
            .get(&url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| {
                tracing::debug!(error = %e, "city search transport failure");
                FetchError::CityNotFound
            })?;

        if !res.status().is_success() {
            tracing::debug!(status = %res.status(), "city search failed");
            return Err(FetchError::CityNotFound);
        }

        let hits: Vec<SearchHit> = res.json().await.map_err(|_| FetchError::CityNotFound)?;
        let hit = hits.into_iter().next().ok_or(FetchError::CityNotFound)?;

        let latitude: f64 = hit.lat.parse().map_err(|_| FetchError::CityNotFound)?;
        let longitude: f64 = hit.lon.parse().map_err(|_| FetchError::CityNotFound)?;

        Ok(CityMatch {
            coordinates: Coordinates { latitude, longitude },
            label: hit.display_name,
        })
    }
}

/// Label preference: city > town > village > county > state, paired with the
/// country. When that pairing is impossible, the first two comma-separated
/// segments of the full display name.
fn place_label(body: &ReverseResponse) -> Option<String> {
    if let Some(addr) = &body.address {
        let place = addr
            .city
            .as_ref()
            .or(addr.town.as_ref())
            .or(addr.village.as_ref())
            .or(addr.county.as_ref())
            .or(addr.state.as_ref());

        if let (Some(place), Some(country)) = (place, addr.country.as_ref()) {
            return Some(format!("{place}, {country}"));
        }
    }

    body.display_name.as_deref().map(leading_segments)
}

fn leading_segments(display_name: &str) -> String {
    display_name
        .split(',')
        .take(2)
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    county: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    address: Option<NominatimAddress>,
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    display_name: String,
}
