use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::error::FetchError;
use crate::model::{Coordinates, CurrentWeather, ForecastBundle, ForecastDay, Unit};
use crate::wmo;

use super::ForecastProvider;

const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Current-conditions fields requested from the provider.
const CURRENT_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,apparent_temperature,weather_code,pressure_msl,wind_speed_10m";

/// Daily fields requested from the provider.
const DAILY_FIELDS: &str =
    "weather_code,temperature_2m_max,temperature_2m_min,apparent_temperature_max";

/// Number of forecast days requested. Fixed by design.
pub const FORECAST_DAYS: usize = 7;

/// Open-Meteo forecast client. No API key required.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    base_url: String,
    http: Client,
}

impl OpenMeteoProvider {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the client at a different endpoint (tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: Client::new(),
        }
    }

    async fn fetch(&self, coords: Coordinates, unit: Unit) -> Result<ForecastBundle, FetchError> {
        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("latitude", coords.latitude.to_string()),
                ("longitude", coords.longitude.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
                ("daily", DAILY_FIELDS.to_string()),
                ("temperature_unit", unit.as_str().to_string()),
                ("wind_speed_unit", "ms".to_string()),
                ("forecast_days", FORECAST_DAYS.to_string()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            tracing::warn!(%status, "forecast request failed");
            return Err(FetchError::Status(status));
        }

        let parsed: OmForecastResponse = serde_json::from_str(&body)?;
        normalize(coords, parsed)
    }
}

impl Default for OpenMeteoProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ForecastProvider for OpenMeteoProvider {
    async fn fetch_forecast(
        &self,
        coords: Coordinates,
        unit: Unit,
    ) -> Result<ForecastBundle, FetchError> {
        self.fetch(coords, unit).await
    }
}

fn normalize(coords: Coordinates, parsed: OmForecastResponse) -> Result<ForecastBundle, FetchError> {
    let current = CurrentWeather {
        // Capture time of this fetch; the provider timestamp is not used.
        observed_at: Utc::now(),
        temperature: parsed.current.temperature_2m,
        feels_like: parsed.current.apparent_temperature,
        humidity_pct: parsed.current.relative_humidity_2m,
        pressure_hpa: parsed.current.pressure_msl,
        wind_speed_mps: parsed.current.wind_speed_10m,
        description: wmo::describe(parsed.current.weather_code).to_string(),
        icon: wmo::icon_for(parsed.current.weather_code).to_string(),
        coordinates: coords,
    };

    let d = parsed.daily;
    let days = d.time.len();
    if [
        d.weather_code.len(),
        d.temperature_2m_max.len(),
        d.temperature_2m_min.len(),
        d.apparent_temperature_max.len(),
    ]
    .iter()
    .any(|&len| len != days)
    {
        return Err(FetchError::Malformed);
    }

    let mut daily = Vec::with_capacity(days);
    for i in 0..days {
        daily.push(ForecastDay {
            date: shift_day(d.time[i]),
            max_temp: d.temperature_2m_max[i],
            min_temp: d.temperature_2m_min[i],
            feels_like_max: d.apparent_temperature_max[i],
            description: wmo::describe(d.weather_code[i]).to_string(),
            icon: wmo::icon_for(d.weather_code[i]).to_string(),
        });
    }

    Ok(ForecastBundle { current, daily })
}

/// Interpret a provider calendar date as UTC midnight shifted forward one
/// day. The provider's day boundary lands one day early otherwise; this
/// correction is deliberate and must not be dropped.
fn shift_day(date: NaiveDate) -> DateTime<Utc> {
    let shifted = date + chrono::Days::new(1);
    Utc.from_utc_datetime(&shifted.and_time(NaiveTime::MIN))
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    temperature_2m: f64,
    relative_humidity_2m: u8,
    apparent_temperature: f64,
    weather_code: i32,
    pressure_msl: f64,
    wind_speed_10m: f64,
}

#[derive(Debug, Deserialize)]
struct OmDaily {
    time: Vec<NaiveDate>,
    weather_code: Vec<i32>,
    temperature_2m_max: Vec<f64>,
    temperature_2m_min: Vec<f64>,
    apparent_temperature_max: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    current: OmCurrent,
    daily: OmDaily,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn coords() -> Coordinates {
        Coordinates { latitude: 51.5, longitude: -0.13 }
    }

    fn sample_body() -> serde_json::Value {
        json!({
            "current": {
                "temperature_2m": 19.6,
                "relative_humidity_2m": 63,
                "apparent_temperature": 18.2,
                "weather_code": 61,
                "pressure_msl": 1012.5,
                "wind_speed_10m": 4.3
            },
            "daily": {
                "time": ["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04",
                         "2024-01-05", "2024-01-06", "2024-01-07"],
                "weather_code": [0, 2, 3, 61, 71, 80, 95],
                "temperature_2m_max": [8.1, 9.0, 7.4, 6.2, 3.3, 5.5, 6.8],
                "temperature_2m_min": [1.2, 2.5, 0.9, -0.4, -2.1, 0.0, 1.1],
                "apparent_temperature_max": [6.9, 8.2, 6.0, 4.4, 0.8, 3.2, 5.0]
            }
        })
    }

    async fn mock_provider(body: serde_json::Value) -> (MockServer, OpenMeteoProvider) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
        let provider = OpenMeteoProvider::with_base_url(server.uri());
        (server, provider)
    }

    #[tokio::test]
    async fn normalizes_current_conditions() {
        let (_server, provider) = mock_provider(sample_body()).await;

        let bundle = provider.fetch_forecast(coords(), Unit::Celsius).await.unwrap();
        let current = bundle.current;

        assert_eq!(current.temperature, 19.6);
        assert_eq!(current.feels_like, 18.2);
        assert_eq!(current.humidity_pct, 63);
        assert_eq!(current.pressure_hpa, 1012.5);
        assert_eq!(current.wind_speed_mps, 4.3);
        assert_eq!(current.description, "Rain");
        assert_eq!(current.icon, "10d");
        assert_eq!(current.coordinates, coords());
    }

    #[tokio::test]
    async fn observed_at_is_capture_time() {
        let (_server, provider) = mock_provider(sample_body()).await;

        let before = Utc::now();
        let bundle = provider.fetch_forecast(coords(), Unit::Celsius).await.unwrap();
        let after = Utc::now();

        assert!(bundle.current.observed_at >= before);
        assert!(bundle.current.observed_at <= after);
    }

    #[tokio::test]
    async fn shifts_daily_dates_forward_one_day() {
        let (_server, provider) = mock_provider(sample_body()).await;

        let bundle = provider.fetch_forecast(coords(), Unit::Celsius).await.unwrap();

        let expected = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        assert_eq!(bundle.daily[0].date, expected);
    }

    #[tokio::test]
    async fn returns_seven_ascending_days() {
        let (_server, provider) = mock_provider(sample_body()).await;

        let bundle = provider.fetch_forecast(coords(), Unit::Celsius).await.unwrap();

        assert_eq!(bundle.daily.len(), FORECAST_DAYS);
        for pair in bundle.daily.windows(2) {
            assert!(pair[0].date < pair[1].date);
        }
    }

    #[tokio::test]
    async fn requests_fixed_day_count_and_wind_unit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("forecast_days", "7"))
            .and(query_param("wind_speed_unit", "ms"))
            .and(query_param("temperature_unit", "fahrenheit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OpenMeteoProvider::with_base_url(server.uri());
        provider.fetch_forecast(coords(), Unit::Fahrenheit).await.unwrap();
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let provider = OpenMeteoProvider::with_base_url(server.uri());
        let err = provider.fetch_forecast(coords(), Unit::Celsius).await.unwrap_err();

        assert!(matches!(err, FetchError::Status(_)));
        assert_eq!(err.to_string(), "Weather data not available");
    }

    #[tokio::test]
    async fn undecodable_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let provider = OpenMeteoProvider::with_base_url(server.uri());
        let err = provider.fetch_forecast(coords(), Unit::Celsius).await.unwrap_err();

        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[tokio::test]
    async fn mismatched_daily_arrays_are_an_error() {
        let mut body = sample_body();
        body["daily"]["weather_code"] = json!([0, 2]);
        let (_server, provider) = mock_provider(body).await;

        let err = provider.fetch_forecast(coords(), Unit::Celsius).await.unwrap_err();

        assert!(matches!(err, FetchError::Malformed));
    }
}
