//! Core library for the `skyspy` weather dashboard.
//!
//! This crate defines:
//! - The domain model (coordinates, preferences, current/forecast data)
//! - WMO weather-code translation
//! - Adapters for the forecast, geocoding, and city-search services
//! - The application state controller driving fetches and UI state
//!
//! It is used by `skyspy-cli`, but can also be reused by other front ends.

pub mod app;
pub mod error;
pub mod location;
pub mod model;
pub mod provider;
pub mod wmo;

pub use app::{App, AppEvent, Services};
pub use error::{FetchError, LocateError};
pub use location::Locator;
pub use model::{
    CityMatch, Coordinates, CurrentWeather, ForecastBundle, ForecastDay, Preferences, Snapshot,
    Theme, UiState, Unit,
};
pub use provider::{CitySearch, ForecastProvider, ReverseGeocoder};
