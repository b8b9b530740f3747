use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use inquire::{Select, Text};
use skyspy_core::location::{FixedLocator, Unsupported};
use skyspy_core::provider::nominatim::NominatimClient;
use skyspy_core::provider::openmeteo::OpenMeteoProvider;
use skyspy_core::{
    App, AppEvent, CitySearch, Coordinates, Locator, Preferences, ReverseGeocoder, Services, Theme,
    Unit,
};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::view;

const SEARCH: &str = "Search city";
const TOGGLE_UNIT: &str = "Toggle units";
const TOGGLE_THEME: &str = "Toggle theme";
const QUIT: &str = "Quit";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skyspy", version, about = "Terminal weather dashboard")]
pub struct Cli {
    /// Search this city instead of using the device location.
    #[arg(long)]
    pub city: Option<String>,

    /// Fixed device coordinates as "lat,lon", e.g. "51.50,-0.13".
    #[arg(long)]
    pub coords: Option<String>,

    /// Temperature unit: celsius or fahrenheit.
    #[arg(long, default_value = "celsius")]
    pub unit: String,

    /// Color theme: light or dark. Defaults to the terminal's ambient theme.
    #[arg(long)]
    pub theme: Option<String>,

    /// Render one snapshot and exit instead of the interactive prompt.
    #[arg(long)]
    pub once: bool,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let unit = Unit::try_from(self.unit.as_str()).map_err(anyhow::Error::msg)?;
        let theme = match &self.theme {
            Some(raw) => Theme::try_from(raw.as_str()).map_err(anyhow::Error::msg)?,
            None => ambient_theme(),
        };

        let nominatim = Arc::new(NominatimClient::new()?);
        let services = Services {
            forecast: Arc::new(OpenMeteoProvider::new()),
            geocoder: Arc::clone(&nominatim) as Arc<dyn ReverseGeocoder>,
            search: nominatim as Arc<dyn CitySearch>,
            locator: locator_from(self.coords.as_deref())?,
        };

        let (mut app, mut rx) = App::new(services, Preferences { unit, theme });

        match &self.city {
            Some(city) => app.submit_search(city),
            None => app.start(),
        }

        loop {
            settle(&mut app, &mut rx).await;
            for line in view::render(&app.snapshot()) {
                println!("{line}");
            }
            if self.once {
                return Ok(());
            }

            println!();
            let choice = Select::new("What next?", vec![SEARCH, TOGGLE_UNIT, TOGGLE_THEME, QUIT])
                .prompt()?;
            match choice {
                SEARCH => {
                    let query = Text::new("City name:").prompt()?;
                    app.submit_search(&query);
                }
                TOGGLE_UNIT => app.toggle_unit(),
                TOGGLE_THEME => app.toggle_theme(),
                _ => return Ok(()),
            }
        }
    }
}

/// Pump completion events until every outstanding adapter call has settled.
/// No timeout: a hung request keeps us (and the loading marker) waiting.
async fn settle(app: &mut App, rx: &mut UnboundedReceiver<AppEvent>) {
    while !app.is_idle() {
        let Some(event) = rx.recv().await else {
            break;
        };
        app.handle(event);
    }
}

fn locator_from(coords: Option<&str>) -> Result<Arc<dyn Locator>> {
    match coords {
        Some(raw) => {
            let (lat, lon) = raw
                .split_once(',')
                .ok_or_else(|| anyhow!("--coords expects \"lat,lon\""))?;
            let coordinates = Coordinates {
                latitude: lat.trim().parse().context("invalid latitude in --coords")?,
                longitude: lon.trim().parse().context("invalid longitude in --coords")?,
            };
            Ok(Arc::new(FixedLocator(coordinates)))
        }
        None => Ok(Arc::new(Unsupported)),
    }
}

/// One read of the terminal's ambient theme at session start. Mutable
/// afterwards only through the theme toggle.
fn ambient_theme() -> Theme {
    match std::env::var("COLORFGBG") {
        Ok(value) => theme_from_colorfgbg(&value),
        Err(_) => Theme::default(),
    }
}

/// COLORFGBG reports "<fg>;<bg>"; light background codes mean a light theme.
fn theme_from_colorfgbg(value: &str) -> Theme {
    let background = value
        .rsplit(';')
        .next()
        .and_then(|s| s.trim().parse::<u8>().ok());
    match background {
        Some(7) | Some(15) => Theme::Light,
        _ => Theme::Dark,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let cli = Cli::try_parse_from([
            "skyspy",
            "--city",
            "london",
            "--unit",
            "fahrenheit",
            "--theme",
            "light",
            "--once",
        ])
        .unwrap();

        assert_eq!(cli.city.as_deref(), Some("london"));
        assert_eq!(cli.unit, "fahrenheit");
        assert!(cli.once);
    }

    #[test]
    fn locator_from_parses_coordinates() {
        let locator = locator_from(Some("51.50, -0.13")).unwrap();
        assert!(locator.is_supported());
    }

    #[test]
    fn locator_from_rejects_garbage() {
        assert!(locator_from(Some("not-coords")).is_err());
        assert!(locator_from(Some("51.5,east")).is_err());
    }

    #[test]
    fn no_coords_means_unsupported_environment() {
        let locator = locator_from(None).unwrap();
        assert!(!locator.is_supported());
    }

    #[test]
    fn colorfgbg_light_backgrounds() {
        assert_eq!(theme_from_colorfgbg("0;15"), Theme::Light);
        assert_eq!(theme_from_colorfgbg("0;7"), Theme::Light);
        assert_eq!(theme_from_colorfgbg("15;0"), Theme::Dark);
        assert_eq!(theme_from_colorfgbg("garbage"), Theme::Dark);
    }
}
