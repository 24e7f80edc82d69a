use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::Instant;

use backend::{AgencyID, Gateway, RouteID, TripID};

use crate::refresh::{Refresher, SharedMap};
use crate::timers::{LiveTimers, Repeating};
use crate::{Config, Emitter, Event, LayerID, MapSurface, MapSync, Selection};

/// Drives the whole client: walks the rider through picking a trip, then owns the tracking
/// session for it. At most one session exists at a time, and starting a new one fully replaces
/// the old one, timers and map layers included.
///
/// All of the user-facing operations take `&mut self`, so they run one at a time. Only the
/// periodic refreshes run concurrently with them.
pub struct Tracker<G, M> {
    shared: Arc<Refresher<G, M>>,
    config: Config,
    selection: Selection,
    session: Option<Session>,
    status_poll: Option<Repeating>,
    live_timers: LiveTimers,
}

struct Session {
    trip: TripID,
    // Dropping these cancels the refreshes
    _vehicles: Repeating,
    _stations: Repeating,
}

impl<G: Gateway, M: MapSurface> Tracker<G, M> {
    pub fn new(gateway: G, surface: M, config: Config, events: Emitter) -> Self {
        let map = MapSync::new(
            surface,
            config.stale_vehicles,
            config.station_match_tolerance,
        );
        Self {
            shared: Arc::new(Refresher {
                gateway,
                map: Arc::new(Mutex::new(map)),
                events,
            }),
            config,
            selection: Selection::new(),
            session: None,
            status_poll: None,
            live_timers: LiveTimers::default(),
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn map(&self) -> SharedMap<M> {
        self.shared.map.clone()
    }

    pub fn gateway(&self) -> &G {
        &self.shared.gateway
    }

    /// The trip currently being tracked
    pub fn session_trip(&self) -> Option<&TripID> {
        self.session.as_ref().map(|s| &s.trip)
    }

    /// How many timer tasks are still alive. Right after a session starts, that's 2, plus 1 if
    /// the status poll is running.
    pub fn live_timers(&self) -> usize {
        self.live_timers.get()
    }

    fn events(&self) -> &Emitter {
        &self.shared.events
    }

    fn emit_all(&self, events: Vec<Event>) {
        for ev in events {
            self.events().emit(ev);
        }
    }

    /// Fills in the agency choices. When there's exactly one, it's picked automatically.
    pub async fn load_agencies(&mut self) {
        let agencies = match self.shared.gateway.agencies().await {
            Ok(agencies) => agencies,
            Err(err) => {
                self.events()
                    .error(format!("Error loading agencies: {err}"));
                return;
            }
        };
        let only = if agencies.len() == 1 {
            Some(agencies[0].id)
        } else {
            None
        };
        if agencies.is_empty() {
            self.events().info("No agencies available.");
        }
        self.events().emit(Event::AgenciesLoaded(agencies));

        if let Some(agency) = only {
            info!("Only one agency, picking {agency}");
            self.select_agency(Some(agency)).await;
        }
    }

    pub async fn select_agency(&mut self, agency: Option<AgencyID>) {
        let events = self.selection.pick_agency(agency);
        self.emit_all(events);
        let Some(agency) = agency else {
            return;
        };

        self.events().info("Loading routes with active vehicles...");
        match self.shared.gateway.routes_with_vehicles().await {
            Ok(routes) => {
                let events = self.selection.routes_loaded(agency, routes);
                self.emit_all(events);
            }
            Err(err) => self.events().error(format!("Error loading routes: {err}")),
        }
    }

    pub async fn select_route(&mut self, route: Option<RouteID>) {
        let events = self.selection.pick_route(route);
        if events.is_empty() {
            return;
        }
        self.emit_all(events);
        let Some(route) = route else {
            return;
        };

        self.events().info("Loading directions...");
        match self.shared.gateway.trips_for_route(route).await {
            Ok(trips) => {
                let events = self.selection.trips_loaded(route, trips);
                self.emit_all(events);
            }
            Err(err) => self.events().error(format!("Error loading trips: {err}")),
        }
    }

    pub fn select_trip(&mut self, trip: Option<TripID>) {
        let events = self.selection.pick_trip(trip);
        self.emit_all(events);
    }

    /// Starts tracking the selected trip, replacing any session already running. Returns false if
    /// no session was started: either no trip is selected, or the backend refused the trip. In
    /// the second case, a previous session keeps running untouched.
    pub async fn start_tracking(&mut self) -> bool {
        let Some(trip) = self.selection.trip().cloned() else {
            warn!("Can't start tracking without a trip");
            return false;
        };

        self.events().info("Starting tracking...");
        if let Err(err) = self.shared.gateway.select_active_trip(&trip).await {
            self.events()
                .error(format!("Error starting tracking: {err}"));
            return false;
        }
        self.events().success(format!(
            "Tracking started! Vehicles will update every {} seconds.",
            self.config.update_interval().as_secs()
        ));

        // Cancel the old timers before anything else, so a late tick can't draw onto the new
        // session's map
        self.teardown().await;
        info!("Tracking trip {trip}");
        self.events().emit(Event::SessionStarted(trip.clone()));

        self.render_stops().await;

        // Don't make the rider wait a full period for the first positions
        self.shared.vehicles().await;
        self.shared.station_list().await;

        let period = self.config.update_interval();
        let first = Instant::now() + period;
        let vehicles = {
            let shared = self.shared.clone();
            Repeating::spawn(&self.live_timers, first, period, move || {
                let shared = shared.clone();
                async move { shared.vehicles().await }
            })
        };
        let stations = {
            let shared = self.shared.clone();
            Repeating::spawn(&self.live_timers, first, period, move || {
                let shared = shared.clone();
                async move { shared.station_list().await }
            })
        };
        self.session = Some(Session {
            trip,
            _vehicles: vehicles,
            _stations: stations,
        });
        true
    }

    /// Cancels the timers and clears everything the session drew. Does nothing if there's no
    /// session.
    pub async fn stop_tracking(&mut self) {
        if self.session.is_none() {
            return;
        }
        self.teardown().await;
        self.events().emit(Event::SessionStopped);
    }

    async fn teardown(&mut self) {
        if let Some(session) = self.session.take() {
            info!("Stopped tracking trip {}", session.trip);
        }
        self.shared.map.lock().await.clear();
        self.events().emit(Event::StationHighlighted(None));
    }

    async fn render_stops(&mut self) {
        let stops = match self.shared.gateway.stops().await {
            Ok(stops) => stops,
            Err(err) => {
                self.events()
                    .error(format!("Error loading stations: {err}"));
                return;
            }
        };
        let num_stops = stops.len();
        let rendered = self.shared.map.lock().await.render_stops(stops);
        let Some(rendered) = rendered else {
            self.events().info("No stations available for this trip.");
            self.events().emit(Event::StopsRendered {
                stops: 0,
                terminal: None,
                bearing: None,
            });
            return;
        };

        let terminal = rendered.terminal.name;
        let banner = match self.selection.headsign() {
            Some(headsign) => format!("Direction: {headsign} (last stop: {terminal})"),
            None => format!("Last stop on route: {terminal}"),
        };
        self.events().emit(Event::Direction(Some(banner)));
        self.events().emit(Event::StopsRendered {
            stops: num_stops,
            terminal: Some(terminal),
            bearing: rendered.bearing,
        });
    }

    /// The rider clicked a marker on the map. If it's one of this session's stops, tell the
    /// backend the rider is there, then highlight it.
    pub async fn click_marker(&mut self, layer: LayerID) {
        let stop = match self.shared.map.lock().await.clicked_stop(layer) {
            Some(stop) => stop.clone(),
            None => {
                debug!("Ignoring click on {:?}, not a current stop", layer);
                return;
            }
        };

        if let Err(err) = self
            .shared
            .gateway
            .set_rider_location(stop.lat, stop.lon, &stop.name)
            .await
        {
            self.events()
                .error(format!("Error setting location: {err}"));
            return;
        }
        self.shared.map.lock().await.select(Some(layer));
        self.located(&stop.name, stop.sequence).await;
    }

    /// The rider picked a station from the list. The list and the map come from different
    /// requests, so the matching marker is found by position.
    pub async fn select_station(&mut self, lat: f64, lon: f64, name: &str, sequence: i64) {
        if let Err(err) = self
            .shared
            .gateway
            .set_rider_location(lat, lon, name)
            .await
        {
            self.events()
                .error(format!("Error setting location: {err}"));
            return;
        }
        {
            let mut map = self.shared.map.lock().await;
            if map.select_near(lat, lon).is_some() {
                map.center_on(lat, lon, self.config.station_zoom);
            } else {
                debug!("No stop marker near {name} ({lat}, {lon})");
            }
        }
        self.located(name, sequence).await;
    }

    async fn located(&self, name: &str, sequence: i64) {
        self.events().emit(Event::StationHighlighted(Some(sequence)));
        self.events().success(format!("Location set to: {name}"));
        self.shared.status().await;
    }

    /// Polls the backend's status message right away and then periodically, independent of any
    /// session. Calling this again restarts the poll.
    pub fn spawn_status_poll(&mut self) {
        let shared = self.shared.clone();
        // Replace first, so the old poll is cancelled before the new one exists
        self.status_poll = None;
        self.status_poll = Some(Repeating::spawn(
            &self.live_timers,
            Instant::now(),
            self.config.update_interval(),
            move || {
                let shared = shared.clone();
                async move { shared.status().await }
            },
        ));
    }
}
