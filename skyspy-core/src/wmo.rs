//! WMO weather-code translation.
//!
//! Open-Meteo reports conditions as WMO integer codes. The bucket boundaries
//! below are a business-rule constant; they are inclusive and must not drift.

/// Human-readable description for a WMO weather code.
///
/// Total over all integers: anything outside the documented buckets is
/// "Unknown" rather than an error.
pub fn describe(code: i32) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45..=48 => "Fog",
        51..=57 => "Drizzle",
        61..=68 => "Rain",
        71..=77 => "Snow",
        80..=86 => "Showers",
        95..=99 => "Thunderstorm",
        _ => "Unknown",
    }
}

/// Icon identifier for a WMO weather code. Undocumented codes get the
/// clear-sky icon.
pub fn icon_for(code: i32) -> &'static str {
    match code {
        0 => "01d",
        1 | 2 => "02d",
        3 => "03d",
        45..=48 => "50d",
        51..=57 | 80..=86 => "09d",
        61..=68 => "10d",
        71..=77 => "13d",
        95..=99 => "11d",
        _ => "01d",
    }
}

/// Image URL for an icon identifier. The identifier is the only variable part.
pub fn icon_url(icon: &str) -> String {
    format!("https://openweathermap.org/img/wn/{icon}@2x.png")
}
