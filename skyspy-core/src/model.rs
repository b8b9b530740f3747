use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Geographic coordinates, compared by value.
///
/// Replaced wholesale on every search or location fix, never merged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Display label used when no place name could be resolved, e.g. "51.50, -0.13".
    pub fn label(&self) -> String {
        format!("{:.2}, {:.2}", self.latitude, self.longitude)
    }
}

/// Temperature unit requested from the weather provider.
///
/// Values are unit-dependent at the source; switching units means refetching,
/// not converting client-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl Unit {
    /// Query-parameter value understood by the weather provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Celsius => "celsius",
            Unit::Fahrenheit => "fahrenheit",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Celsius => "°C",
            Unit::Fahrenheit => "°F",
        }
    }

    pub fn toggled(&self) -> Unit {
        match self {
            Unit::Celsius => Unit::Fahrenheit,
            Unit::Fahrenheit => Unit::Celsius,
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Unit {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "celsius" | "c" => Ok(Unit::Celsius),
            "fahrenheit" | "f" => Ok(Unit::Fahrenheit),
            _ => Err(format!(
                "Unknown unit '{value}'. Supported units: celsius, fahrenheit."
            )),
        }
    }
}

/// Rendering theme. Affects presentation only; toggling never refetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(&self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Theme {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(format!("Unknown theme '{value}'. Supported themes: light, dark.")),
        }
    }
}

/// User preferences held for the lifetime of the session. Nothing is persisted.
#[derive(Debug, Clone, Copy, Default)]
pub struct Preferences {
    pub unit: Unit,
    pub theme: Theme,
}

/// Current conditions, normalized from the provider payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentWeather {
    /// Capture time of the fetch, not a provider timestamp.
    pub observed_at: DateTime<Utc>,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity_pct: u8,
    pub pressure_hpa: f64,
    pub wind_speed_mps: f64,
    pub description: String,
    pub icon: String,
    pub coordinates: Coordinates,
}

/// One day of the forecast. `date` is UTC midnight after the provider
/// day-boundary correction applied by the forecast adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: DateTime<Utc>,
    pub max_temp: f64,
    pub min_temp: f64,
    pub feels_like_max: f64,
    pub description: String,
    pub icon: String,
}

/// Result of one successful forecast fetch: current conditions plus the
/// chronologically ascending daily outlook.
#[derive(Debug, Clone)]
pub struct ForecastBundle {
    pub current: CurrentWeather,
    pub daily: Vec<ForecastDay>,
}

/// Best match returned by the city search.
#[derive(Debug, Clone)]
pub struct CityMatch {
    pub coordinates: Coordinates,
    /// Provider display name, verbatim.
    pub label: String,
}

/// Volatile UI state owned by the controller.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub loading: bool,
    pub error: Option<String>,
    pub location_label: String,
}

/// Read-only view of the controller state consumed by the presentation layer.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub current: Option<CurrentWeather>,
    pub forecast: Option<Vec<ForecastDay>>,
    pub ui: UiState,
    pub preferences: Preferences,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_label_rounds_to_two_decimals() {
        let c = Coordinates { latitude: 51.5049, longitude: -0.1278 };
        assert_eq!(c.label(), "51.50, -0.13");
    }

    #[test]
    fn unit_roundtrip_and_toggle() {
        for unit in [Unit::Celsius, Unit::Fahrenheit] {
            let parsed = Unit::try_from(unit.as_str()).expect("roundtrip should succeed");
            assert_eq!(unit, parsed);
            assert_ne!(unit, unit.toggled());
            assert_eq!(unit, unit.toggled().toggled());
        }
    }

    #[test]
    fn unknown_unit_error() {
        let err = Unit::try_from("kelvin").unwrap_err();
        assert!(err.contains("Unknown unit"));
    }

    #[test]
    fn theme_roundtrip_and_toggle() {
        for theme in [Theme::Light, Theme::Dark] {
            let parsed = Theme::try_from(theme.as_str()).expect("roundtrip should succeed");
            assert_eq!(theme, parsed);
            assert_eq!(theme, theme.toggled().toggled());
        }
    }
}
