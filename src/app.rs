use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use tokio::task::JoinHandle;

use crate::api::models::{
    FrequencySegment, IsochroneBand, NamedLocation, TripDuration, TripRequest,
};
use crate::api::ApiClient;
use crate::config::AppConfig;
use crate::geo::Coordinate;
use crate::layer_styler::{self, ISOCHRONE_BUCKETS};
use crate::map_view::{FeatureGeometry, MapView, OverlayFeature, OverlayKind};
use crate::route::{Bounds, Route};
use crate::route_animator::{MarkerUpdate, Phase, RouteAnimator, TickOutcome};
use crate::trip_stats::{self, TripRecord, TripStatistics};
use crate::trip_summary::TripSummary;

/// Raw form fields; whitespace is trimmed on submission and nothing else is
/// validated here, the backend owns validation.
#[derive(Debug, Clone, Default)]
pub struct FormInput {
    pub location_name: String,
    pub patient_name: String,
    pub driver_name: String,
    pub purpose: String,
    pub notes: String,
    /// Present when the form's location dropdown carried coordinates.
    pub pickup: Option<Coordinate>,
}

impl FormInput {
    fn trimmed(self) -> FormInput {
        FormInput {
            location_name: self.location_name.trim().to_string(),
            patient_name: self.patient_name.trim().to_string(),
            driver_name: self.driver_name.trim().to_string(),
            purpose: self.purpose.trim().to_string(),
            notes: self.notes,
            pickup: self.pickup,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    NetworkFailure,
    MalformedResponse,
}

/// Non-blocking user-visible message. Failures never take the page down;
/// they queue here and the shell drains them.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

/// Clears the loading flag on drop, so the indicator can never stay stuck on
/// either the success or the error path.
struct LoadingGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> LoadingGuard<'a> {
    fn engage(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        LoadingGuard { flag }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

struct RefreshGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// The one owner of the map-view pair, the animator, and the backend client.
/// Event handlers get a reference to this instead of reaching for globals.
pub struct App {
    config: AppConfig,
    api: ApiClient,
    routing_map: Mutex<MapView>,
    analysis_map: Mutex<MapView>,
    animator: Mutex<RouteAnimator>,
    ticker: Mutex<Option<JoinHandle<()>>>,
    loading: AtomicBool,
    analysis_refresh_in_flight: AtomicBool,
    notifications: Mutex<Vec<Notification>>,
    summary: Mutex<Option<TripSummary>>,
    session_trips: Mutex<Vec<TripRecord>>,
    displayed_odometer: Mutex<f64>,
}

impl App {
    pub fn new(config: AppConfig) -> Arc<Self> {
        let hospital = config.hospital.coordinate();
        let padding = config.map.viewport_padding_px;
        let api = ApiClient::new(&config.backend.base_url);
        let routing_map = MapView::new(hospital, &config.hospital.name, padding);
        let analysis_map = MapView::new(hospital, &config.hospital.name, padding);
        let animator = RouteAnimator::with_heading_blend(config.animation.heading_blend);
        Arc::new(App {
            config,
            api,
            routing_map: Mutex::new(routing_map),
            analysis_map: Mutex::new(analysis_map),
            animator: Mutex::new(animator),
            ticker: Mutex::new(None),
            loading: AtomicBool::new(false),
            analysis_refresh_in_flight: AtomicBool::new(false),
            notifications: Mutex::new(Vec::new()),
            summary: Mutex::new(None),
            session_trips: Mutex::new(Vec::new()),
            displayed_odometer: Mutex::new(0.0),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Submit the form, then reflect the result everywhere: route + animation
    /// on the routing map, a fresh summary, odometer progression, and an
    /// analysis refresh. On failure the summary is cleared and a notification
    /// is queued; the app stays interactive.
    pub async fn submit_trip(self: &Arc<Self>, form: FormInput) -> Result<()> {
        let _loading = LoadingGuard::engage(&self.loading);
        let form = form.trimmed();
        let (date, time) = current_datetime_text();
        let request = TripRequest {
            location_name: form.location_name.clone(),
            pickup_location: form.location_name.clone(),
            patient_name: form.patient_name.clone(),
            driver_name: form.driver_name.clone(),
            purpose: form.purpose.clone(),
            notes: form.notes.clone(),
            pickup_lat: form.pickup.map(|p| p.latitude),
            pickup_lon: form.pickup.map(|p| p.longitude),
            date: Some(date),
            time: Some(time.clone()),
        };

        let response = match self.api.submit_trip(&request).await {
            Err(err) => {
                error!("trip submission failed: {err:#}");
                self.notify(
                    NotificationKind::NetworkFailure,
                    format!("Submit failed: {err:#}"),
                );
                *self.summary.lock().unwrap() = None;
                return Err(err);
            }
            Ok(response) => response,
        };

        *self.summary.lock().unwrap() = Some(TripSummary::from_response(&response));
        if let Some(next) = response.next_odometer_value() {
            *self.displayed_odometer.lock().unwrap() = next;
        }
        self.session_trips.lock().unwrap().push(TripRecord {
            pickup_location: form.location_name.clone(),
            distance_km: response.distance_km_value().unwrap_or(0.0),
            duration_minutes: match response.duration() {
                Some(TripDuration::Seconds(seconds)) => seconds as f64 / 60.0,
                Some(TripDuration::FractionalMinutes(minutes)) => minutes,
                None => 0.0,
            },
            time: Some(time),
        });

        match Route::with_anchored_start(
            response.route_coordinates(),
            self.config.hospital.coordinate(),
            self.config.map.anchor_gap_meters,
        ) {
            // a trip without drawable geometry is still a logged trip
            Err(err) => warn!("no drawable route in the trip response: {err:#}"),
            Ok(route) => {
                self.routing_map.lock().unwrap().set_route(route.points());
                self.start_animation(route);
            }
        }

        self.refresh_analysis().await;
        Ok(())
    }

    /// Start the single tick driver for `route`, replacing any previous one.
    /// The driver captures the animator generation, so a driver that lost its
    /// animation can only observe the mismatch and exit.
    pub fn start_animation(self: &Arc<Self>, route: Route) {
        let generation = self.animator.lock().unwrap().start(route);
        let mut ticker = self.ticker.lock().unwrap();
        if let Some(previous) = ticker.take() {
            previous.abort();
        }
        let app = Arc::clone(self);
        let period = Duration::from_millis(self.config.animation.tick_interval_ms);
        *ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // the first interval tick fires immediately, skip it for even pacing
            interval.tick().await;
            loop {
                interval.tick().await;
                // tick and apply under the animator lock: `cancel_animation`
                // also takes it, so once cancel returns no update can land
                let done = {
                    let mut animator = app.animator.lock().unwrap();
                    if animator.generation() != generation {
                        true
                    } else {
                        match animator.tick() {
                            TickOutcome::Idle => true,
                            TickOutcome::Advanced(update) => {
                                app.apply_marker_update(&update, false);
                                false
                            }
                            TickOutcome::Completed(update) => {
                                app.apply_marker_update(&update, true);
                                true
                            }
                        }
                    }
                };
                if done {
                    break;
                }
            }
        }));
    }

    fn apply_marker_update(&self, update: &MarkerUpdate, arrived: bool) {
        let mut map = self.routing_map.lock().unwrap();
        map.update_animated_marker(update.position, update.heading);
        if update.at_pickup {
            map.set_ambulance_popup("Picked up patient");
        }
        if arrived {
            map.set_ambulance_popup(&format!("Arrived at {}", self.config.hospital.name));
        }
    }

    /// Synchronous: `cancel` waits out any in-progress tick (they hold the
    /// animator lock while applying), and the generation bump turns every
    /// later tick of the old driver into a no-op.
    pub fn cancel_animation(&self) {
        self.animator.lock().unwrap().cancel();
        if let Some(ticker) = self.ticker.lock().unwrap().take() {
            ticker.abort();
        }
    }

    pub fn animation_phase(&self) -> Phase {
        self.animator.lock().unwrap().phase()
    }

    /// Refresh both analysis overlays. Refreshes are serialized: a call that
    /// finds one in flight is dropped, so the displayed overlays always come
    /// from the last refresh that actually completed.
    pub async fn refresh_analysis(&self) {
        let _guard = match self.begin_analysis_refresh() {
            None => {
                info!("analysis refresh already in flight, skipping");
                return;
            }
            Some(guard) => guard,
        };

        match self.api.get_isochrones().await {
            Err(err) => {
                error!("isochrones fetch failed: {err:#}");
                self.notify(
                    NotificationKind::NetworkFailure,
                    format!("Failed to load isochrones: {err:#}"),
                );
            }
            Ok(bands) => {
                let features = isochrone_features(&bands, &self.config.hospital.name);
                self.apply_overlay(OverlayKind::Isochrones, features);
            }
        }

        match self.api.get_frequency().await {
            Err(err) => {
                error!("frequency fetch failed: {err:#}");
                self.notify(
                    NotificationKind::NetworkFailure,
                    format!("Failed to load frequency analysis: {err:#}"),
                );
            }
            Ok(segments) => {
                let features = frequency_features(&segments);
                self.apply_overlay(OverlayKind::Frequency, features);
            }
        }
    }

    fn begin_analysis_refresh(&self) -> Option<RefreshGuard<'_>> {
        if self.analysis_refresh_in_flight.swap(true, Ordering::SeqCst) {
            return None;
        }
        Some(RefreshGuard {
            flag: &self.analysis_refresh_in_flight,
        })
    }

    fn apply_overlay(&self, kind: OverlayKind, features: Vec<OverlayFeature>) {
        let mut bounds: Option<Bounds> = None;
        for feature in &features {
            feature.geometry.extend_bounds(&mut bounds);
        }
        let mut map = self.analysis_map.lock().unwrap();
        map.set_overlay(kind, features);
        if let Some(bounds) = bounds {
            map.fit_to_bounds(bounds);
        }
    }

    pub async fn load_locations(&self) -> Result<Vec<NamedLocation>> {
        match self.api.get_locations().await {
            Err(err) => {
                error!("failed to load locations: {err:#}");
                Err(err)
            }
            Ok(locations) => Ok(locations),
        }
    }

    /// Start odometer for the form: the last trip's end reading, or 0.
    pub async fn prefill_odometer(&self) -> f64 {
        let value = match self.api.get_last_trip().await {
            Err(err) => {
                error!("failed to fetch last trip: {err:#}");
                0.0
            }
            Ok(last) => last.and_then(|t| t.next_odometer).unwrap_or(0.0),
        };
        *self.displayed_odometer.lock().unwrap() = value;
        value
    }

    pub fn displayed_odometer(&self) -> f64 {
        *self.displayed_odometer.lock().unwrap()
    }

    pub fn export_csv_url(&self) -> String {
        self.api.export_csv_url()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    fn notify(&self, kind: NotificationKind, message: String) {
        self.notifications
            .lock()
            .unwrap()
            .push(Notification { kind, message });
    }

    pub fn take_notifications(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.notifications.lock().unwrap())
    }

    pub fn summary(&self) -> Option<TripSummary> {
        self.summary.lock().unwrap().clone()
    }

    pub fn session_statistics(&self) -> Option<TripStatistics> {
        trip_stats::calculate_statistics(&self.session_trips.lock().unwrap())
    }

    pub fn routing_map(&self) -> MutexGuard<'_, MapView> {
        self.routing_map.lock().unwrap()
    }

    pub fn analysis_map(&self) -> MutexGuard<'_, MapView> {
        self.analysis_map.lock().unwrap()
    }
}

/// Form display strings: date as `YYYY-MM-DD`, time as `HH:MM`, local clock.
pub fn current_datetime_text() -> (String, String) {
    let now = Local::now();
    (
        now.format("%Y-%m-%d").to_string(),
        now.format("%H:%M").to_string(),
    )
}

fn isochrone_features(bands: &[IsochroneBand], hospital_name: &str) -> Vec<OverlayFeature> {
    bands
        .iter()
        .map(|band| OverlayFeature {
            geometry: FeatureGeometry::Polygon(band.rings.clone()),
            style: layer_styler::style_for_time_bucket(band.seconds, &ISOCHRONE_BUCKETS),
            popup: format!(
                "Within {} minutes from {}",
                (band.seconds as f64 / 60.0).round() as u32,
                hospital_name
            ),
        })
        .collect()
}

fn frequency_features(segments: &[FrequencySegment]) -> Vec<OverlayFeature> {
    let max_count = segments.iter().map(|s| s.count).max().unwrap_or(0);
    segments
        .iter()
        .map(|segment| OverlayFeature {
            geometry: FeatureGeometry::Line(segment.line.clone()),
            style: layer_styler::style_for_frequency(segment.count, max_count),
            popup: format!("Route frequency: {} trip(s)", segment.count),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_guard_clears_on_drop() {
        let flag = AtomicBool::new(false);
        {
            let _guard = LoadingGuard::engage(&flag);
            assert!(flag.load(Ordering::SeqCst));
        }
        assert!(!flag.load(Ordering::SeqCst));
    }

    #[test]
    fn analysis_refresh_is_exclusive() {
        let app = App::new(AppConfig::default());
        let first = app.begin_analysis_refresh();
        assert!(first.is_some());
        // a second refresh started while one is in flight is refused
        assert!(app.begin_analysis_refresh().is_none());
        drop(first);
        assert!(app.begin_analysis_refresh().is_some());
    }

    #[test]
    fn notifications_drain() {
        let app = App::new(AppConfig::default());
        app.notify(NotificationKind::NetworkFailure, "boom".to_string());
        let drained = app.take_notifications();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].kind, NotificationKind::NetworkFailure);
        assert!(app.take_notifications().is_empty());
    }

    #[test]
    fn form_input_is_trimmed() {
        let form = FormInput {
            location_name: "  Gulmohar Park  ".to_string(),
            patient_name: " A ".to_string(),
            driver_name: "B".to_string(),
            purpose: " pickup ".to_string(),
            notes: " keep raw ".to_string(),
            pickup: None,
        };
        let trimmed = form.trimmed();
        assert_eq!(trimmed.location_name, "Gulmohar Park");
        assert_eq!(trimmed.patient_name, "A");
        assert_eq!(trimmed.purpose, "pickup");
        assert_eq!(trimmed.notes, " keep raw ");
    }
}
