use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::model::{CityMatch, Coordinates, ForecastBundle, Unit};

pub mod nominatim;
pub mod openmeteo;

/// Weather service boundary: current conditions plus the daily outlook for
/// one set of coordinates in one unit system.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    async fn fetch_forecast(
        &self,
        coords: Coordinates,
        unit: Unit,
    ) -> Result<ForecastBundle, FetchError>;
}

/// Reverse geocoding boundary. Never fails outward: implementations fall
/// back to the coordinate label on any failure.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync + Debug {
    async fn place_name(&self, coords: Coordinates) -> String;
}

/// Forward geocoding boundary: free-text query to the single best match.
#[async_trait]
pub trait CitySearch: Send + Sync + Debug {
    async fn search_city(&self, query: &str) -> Result<CityMatch, FetchError>;
}
