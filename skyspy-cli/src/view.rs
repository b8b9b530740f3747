//! Terminal rendering.
//!
//! A pure function of the controller snapshot: no state of its own, no I/O.
//! Temperatures are rounded to the nearest integer here and only here; the
//! controller keeps full precision.

use chrono::{DateTime, Utc};
use skyspy_core::{wmo, Snapshot, Theme, Unit};

/// ANSI palette selected by the theme.
struct Palette {
    heading: &'static str,
    error: &'static str,
    dim: &'static str,
    reset: &'static str,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => Palette {
            heading: "\x1b[1;96m",
            error: "\x1b[1;91m",
            dim: "\x1b[90m",
            reset: "\x1b[0m",
        },
        Theme::Light => Palette {
            heading: "\x1b[1;34m",
            error: "\x1b[1;31m",
            dim: "\x1b[37m",
            reset: "\x1b[0m",
        },
    }
}

/// Render the snapshot to output lines.
pub fn render(snapshot: &Snapshot) -> Vec<String> {
    let p = palette(snapshot.preferences.theme);
    let unit = snapshot.preferences.unit;
    let mut lines = Vec::new();

    if let Some(error) = &snapshot.ui.error {
        lines.push(format!("{}{error}{}", p.error, p.reset));
    }

    if snapshot.ui.loading {
        lines.push(format!("{}Loading...{}", p.dim, p.reset));
    }

    if let Some(current) = &snapshot.current {
        let label = if snapshot.ui.location_label.is_empty() {
            "Current Location"
        } else {
            snapshot.ui.location_label.as_str()
        };
        lines.push(format!("{}{label}{}", p.heading, p.reset));
        lines.push(format!("{}{}{}", p.dim, short_date(current.observed_at), p.reset));
        lines.push(format!(
            "{}  {}",
            degrees(current.temperature, unit),
            current.description
        ));
        lines.push(format!("Feels like: {}", degrees(current.feels_like, unit)));
        lines.push(format!("Humidity: {}%", current.humidity_pct));
        lines.push(format!("Wind Speed: {} m/s", current.wind_speed_mps));
        lines.push(format!("{}{}{}", p.dim, wmo::icon_url(&current.icon), p.reset));
    }

    if let Some(days) = &snapshot.forecast {
        lines.push(format!("{}7-Day Forecast{}", p.heading, p.reset));
        for day in days {
            lines.push(format!(
                "{}  {} - {}  {}",
                short_date(day.date),
                degrees(day.max_temp, unit),
                degrees(day.min_temp, unit),
                day.description
            ));
        }
    }

    lines
}

fn degrees(value: f64, unit: Unit) -> String {
    format!("{:.0}{}", value.round(), unit.symbol())
}

fn short_date(date: DateTime<Utc>) -> String {
    date.format("%a, %b %-d").to_string()
}
