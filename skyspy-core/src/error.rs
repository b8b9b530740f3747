use reqwest::StatusCode;
use thiserror::Error;

/// Failures of the weather and city-search adapters.
///
/// `Display` carries the exact user-facing message; the controller surfaces
/// these verbatim. No retries are performed anywhere: every failure is
/// terminal for that attempt.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never produced a usable response.
    #[error("Weather data not available")]
    Transport(#[from] reqwest::Error),

    /// Upstream answered with a non-success status.
    #[error("Weather data not available")]
    Status(StatusCode),

    /// The body was not the JSON shape we expect.
    #[error("Weather data not available")]
    Decode(#[from] serde_json::Error),

    /// Parallel daily arrays disagree on length.
    #[error("Weather data not available")]
    Malformed,

    /// City search produced no usable match.
    #[error("City not found")]
    CityNotFound,
}

/// Failures of the device-location capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocateError {
    /// The environment has no location capability at all.
    #[error("Geolocation is not supported")]
    Unsupported,

    /// The capability exists but did not produce a fix (denied, timed out).
    #[error("Unable to access location. Please search for a city.")]
    Unavailable,
}
