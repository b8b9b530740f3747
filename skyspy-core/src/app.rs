//! Application state controller.
//!
//! Single logical thread of control: adapter calls run on spawned tasks and
//! post completion events onto a channel; the owner pumps each event back
//! into [`App::handle`]. All state transitions happen inside `handle` and the
//! trigger methods, so nothing here needs a lock.
//!
//! Superseding rule: searches and forecast fetches share one monotonically
//! increasing request id. A settling request commits only when its id equals
//! the most recently issued one; older results (and their errors) are
//! discarded. There is no cancellation and no timeout: a hung request simply
//! leaves `loading` set.

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::error::{FetchError, LocateError};
use crate::location::Locator;
use crate::model::{
    CityMatch, Coordinates, CurrentWeather, ForecastBundle, ForecastDay, Preferences, Snapshot,
    UiState, Unit,
};
use crate::provider::{CitySearch, ForecastProvider, ReverseGeocoder};

/// Completion events posted by spawned adapter calls.
#[derive(Debug)]
pub enum AppEvent {
    /// Device location attempt settled.
    Located(Result<Coordinates, LocateError>),
    /// Reverse geocoding finished. Never an error; failures were absorbed
    /// into a coordinate label by the adapter.
    LabelResolved(String),
    /// City search settled.
    SearchSettled {
        request: u64,
        result: Result<CityMatch, FetchError>,
    },
    /// Forecast fetch settled.
    ForecastSettled {
        request: u64,
        result: Result<ForecastBundle, FetchError>,
    },
}

/// External collaborators of the controller.
#[derive(Debug, Clone)]
pub struct Services {
    pub forecast: Arc<dyn ForecastProvider>,
    pub geocoder: Arc<dyn ReverseGeocoder>,
    pub search: Arc<dyn CitySearch>,
    pub locator: Arc<dyn Locator>,
}

#[derive(Debug)]
pub struct App {
    services: Services,

    preferences: Preferences,
    coordinates: Option<Coordinates>,
    current: Option<CurrentWeather>,
    forecast: Option<Vec<ForecastDay>>,
    ui: UiState,

    tx: UnboundedSender<AppEvent>,

    /// Last request id handed out.
    next_request: u64,
    /// Id of the most recently issued search or forecast fetch; only this
    /// one may commit.
    latest_issued: u64,
    /// Fetches contributing to `loading` (locate, search, forecast).
    fetches: usize,
    /// Outstanding label resolutions; tracked for idleness, never for
    /// `loading`.
    labels: usize,
    /// `(coordinates, unit)` pair the last forecast fetch was issued for.
    fetched_for: Option<(Coordinates, Unit)>,
}

impl App {
    /// Build the controller. `preferences.theme` is expected to hold the
    /// ambient theme read once at session start.
    pub fn new(services: Services, preferences: Preferences) -> (Self, UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let app = Self {
            services,
            preferences,
            coordinates: None,
            current: None,
            forecast: None,
            ui: UiState::default(),
            tx,
            next_request: 0,
            latest_issued: 0,
            fetches: 0,
            labels: 0,
            fetched_for: None,
        };
        (app, rx)
    }

    /// Read-only view for the presentation layer.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            current: self.current.clone(),
            forecast: self.forecast.clone(),
            ui: self.ui.clone(),
            preferences: self.preferences,
        }
    }

    /// True when no adapter call is outstanding.
    pub fn is_idle(&self) -> bool {
        self.fetches == 0 && self.labels == 0
    }

    /// Startup trigger: acquire the device location, then fetch weather and
    /// resolve the place label concurrently.
    pub fn start(&mut self) {
        if !self.services.locator.is_supported() {
            self.ui.error = Some(LocateError::Unsupported.to_string());
            return;
        }

        self.begin_fetch();
        let locator = Arc::clone(&self.services.locator);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(AppEvent::Located(locator.locate().await));
        });
    }

    /// City search trigger. Empty queries are ignored.
    pub fn submit_search(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }

        let request = self.issue_request();
        self.begin_fetch();
        let search = Arc::clone(&self.services.search);
        let tx = self.tx.clone();
        let query = query.to_owned();
        tokio::spawn(async move {
            let result = search.search_city(&query).await;
            let _ = tx.send(AppEvent::SearchSettled { request, result });
        });
    }

    /// Flip the temperature unit; the reactive rule issues the refetch.
    pub fn toggle_unit(&mut self) {
        self.preferences.unit = self.preferences.unit.toggled();
        self.react();
    }

    /// Flip the theme. Rendering-only; the reactive rule sees no change.
    pub fn toggle_theme(&mut self) {
        self.preferences.theme = self.preferences.theme.toggled();
        self.react();
    }

    /// Apply one completion event.
    pub fn handle(&mut self, event: AppEvent) {
        match event {
            AppEvent::Located(result) => {
                self.settle_fetch();
                match result {
                    Ok(coords) => {
                        tracing::info!(
                            latitude = coords.latitude,
                            longitude = coords.longitude,
                            "device location acquired"
                        );
                        self.coordinates = Some(coords);
                        self.spawn_label(coords);
                        self.react();
                    }
                    Err(e) => {
                        self.ui.error = Some(e.to_string());
                    }
                }
            }
            AppEvent::LabelResolved(label) => {
                self.labels = self.labels.saturating_sub(1);
                self.ui.location_label = label;
            }
            AppEvent::SearchSettled { request, result } => {
                self.settle_fetch();
                if request != self.latest_issued {
                    tracing::debug!(request, "discarding superseded search result");
                    return;
                }
                match result {
                    Ok(hit) => {
                        self.coordinates = Some(hit.coordinates);
                        self.ui.location_label = hit.label;
                        // Coordinates are replaced wholesale; a search for the
                        // same place still counts as a change.
                        self.fetched_for = None;
                        self.react();
                    }
                    Err(e) => {
                        self.ui.error = Some(e.to_string());
                    }
                }
            }
            AppEvent::ForecastSettled { request, result } => {
                self.settle_fetch();
                if request != self.latest_issued {
                    tracing::debug!(request, "discarding superseded forecast result");
                    return;
                }
                match result {
                    Ok(bundle) => {
                        tracing::info!(days = bundle.daily.len(), "forecast committed");
                        self.current = Some(bundle.current);
                        self.forecast = Some(bundle.daily);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "forecast fetch failed");
                        self.ui.error = Some(e.to_string());
                    }
                }
            }
        }
    }

    /// Reactive rule, evaluated after every state transition: when
    /// coordinates are set and `(coordinates, unit)` changed since the last
    /// issued fetch, issue exactly one forecast fetch. Never re-triggers
    /// geocoding.
    fn react(&mut self) {
        let Some(coords) = self.coordinates else {
            return;
        };
        let depends = (coords, self.preferences.unit);
        if self.fetched_for != Some(depends) {
            self.fetched_for = Some(depends);
            self.spawn_forecast(coords, self.preferences.unit);
        }
    }

    fn spawn_forecast(&mut self, coords: Coordinates, unit: Unit) {
        let request = self.issue_request();
        self.begin_fetch();
        let forecast = Arc::clone(&self.services.forecast);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = forecast.fetch_forecast(coords, unit).await;
            let _ = tx.send(AppEvent::ForecastSettled { request, result });
        });
    }

    fn spawn_label(&mut self, coords: Coordinates) {
        self.labels += 1;
        let geocoder = Arc::clone(&self.services.geocoder);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(AppEvent::LabelResolved(geocoder.place_name(coords).await));
        });
    }

    fn issue_request(&mut self) -> u64 {
        self.next_request += 1;
        self.latest_issued = self.next_request;
        self.next_request
    }

    /// `loading` goes up synchronously with the fetch; the previous error is
    /// cleared when a new attempt starts.
    fn begin_fetch(&mut self) {
        self.fetches += 1;
        self.ui.loading = true;
        self.ui.error = None;
    }

    fn settle_fetch(&mut self) {
        self.fetches = self.fetches.saturating_sub(1);
        self.ui.loading = self.fetches > 0;
    }
}
