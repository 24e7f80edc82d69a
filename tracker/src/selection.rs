use std::collections::BTreeMap;

use backend::{AgencyID, Route, RouteID, Trip, TripID};

use crate::{Controls, Event, StatusKind, StatusMessage};

/// Where the rider is in the agency → route → trip funnel
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionState {
    NoAgency,
    AgencySelected(AgencyID),
    RouteSelected(AgencyID, RouteID),
    TripSelected(AgencyID, RouteID, TripID),
}

/// The current agency, route, and trip. Each level only makes sense given the one above it, so
/// changing or clearing a level always resets everything below.
///
/// Nothing here does IO. Each transition returns the events the presentation layer needs to see,
/// and the caller is responsible for fetching whatever the new level needs.
pub struct Selection {
    agency: Option<AgencyID>,
    route: Option<RouteID>,
    trip: Option<TripID>,
    headsign: Option<String>,

    routes_available: bool,
    // For the trips of the selected route
    trips_by_id: BTreeMap<TripID, Trip>,
}

impl Selection {
    pub fn new() -> Self {
        Self {
            agency: None,
            route: None,
            trip: None,
            headsign: None,

            routes_available: false,
            trips_by_id: BTreeMap::new(),
        }
    }

    pub fn state(&self) -> SelectionState {
        match (self.agency, self.route, &self.trip) {
            (Some(a), Some(r), Some(t)) => SelectionState::TripSelected(a, r, t.clone()),
            (Some(a), Some(r), None) => SelectionState::RouteSelected(a, r),
            (Some(a), None, _) => SelectionState::AgencySelected(a),
            (None, _, _) => SelectionState::NoAgency,
        }
    }

    /// Derived from the selection every time, so the controls can't disagree with it.
    pub fn controls(&self) -> Controls {
        Controls {
            route: self.agency.is_some() && self.routes_available,
            trip: self.route.is_some() && !self.trips_by_id.is_empty(),
            start: self.trip.is_some(),
        }
    }

    pub fn agency(&self) -> Option<AgencyID> {
        self.agency
    }

    pub fn route(&self) -> Option<RouteID> {
        self.route
    }

    pub fn trip(&self) -> Option<&TripID> {
        self.trip.as_ref()
    }

    /// The headsign of the selected trip, if it's known
    pub fn headsign(&self) -> Option<&str> {
        self.headsign.as_deref()
    }

    /// The routes for the new agency still need to be fetched and passed to `routes_loaded`.
    pub fn pick_agency(&mut self, agency: Option<AgencyID>) -> Vec<Event> {
        self.agency = agency;
        self.routes_available = false;
        self.clear_route();

        let mut events = Vec::new();
        if agency.is_none() {
            events.push(Event::RoutesReset);
            events.push(Event::TripsReset);
            events.extend(hide_banners());
        }
        events.push(Event::Controls(self.controls()));
        events
    }

    /// Routes fetched for some agency. Ignored if that's not the selected agency anymore.
    pub fn routes_loaded(&mut self, agency: AgencyID, routes: Vec<Route>) -> Vec<Event> {
        if self.agency != Some(agency) {
            debug!("Ignoring routes for {:?}, which isn't selected anymore", agency);
            return Vec::new();
        }

        self.routes_available = !routes.is_empty();
        let mut events = vec![Event::RoutesLoaded(routes)];
        if self.routes_available {
            events.push(Event::TripsReset);
            events.push(Event::StatusHidden);
        } else {
            events.push(info("No routes with active vehicles found."));
        }
        events.push(Event::Controls(self.controls()));
        events
    }

    /// The trips for the new route still need to be fetched and passed to `trips_loaded`.
    pub fn pick_route(&mut self, route: Option<RouteID>) -> Vec<Event> {
        if route.is_some() && self.agency.is_none() {
            warn!("Can't pick {:?} before an agency", route);
            return Vec::new();
        }
        self.clear_route();
        self.route = route;

        let mut events = Vec::new();
        if route.is_none() {
            events.push(Event::TripsReset);
            events.extend(hide_banners());
        }
        events.push(Event::Controls(self.controls()));
        events
    }

    /// Trips fetched for some route. Rebuilds the lookup used to resolve headsigns. Ignored if
    /// that's not the selected route anymore.
    pub fn trips_loaded(&mut self, route: RouteID, trips: Vec<Trip>) -> Vec<Event> {
        if self.route != Some(route) {
            debug!("Ignoring trips for {:?}, which isn't selected anymore", route);
            return Vec::new();
        }

        self.trips_by_id = trips.iter().map(|t| (t.id.clone(), t.clone())).collect();
        let mut events = Vec::new();
        let empty = trips.is_empty();
        events.push(Event::TripsLoaded(trips));
        if empty {
            events.push(info("No trips found for this route."));
        } else {
            events.extend(hide_banners());
        }
        events.push(Event::Controls(self.controls()));
        events
    }

    pub fn pick_trip(&mut self, trip: Option<TripID>) -> Vec<Event> {
        if trip.is_some() && self.route.is_none() {
            warn!("Can't pick {:?} before a route", trip);
            return Vec::new();
        }

        self.headsign = match trip {
            Some(ref id) => match self.trips_by_id.get(id) {
                Some(t) => t.headsign.clone(),
                None => {
                    // The ID came from the list we just fetched, so this is a race between
                    // fetches, not something the rider did
                    debug!("{:?} isn't in the trip lookup; no direction to show", id);
                    None
                }
            },
            None => None,
        };
        let picked = trip.is_some();
        self.trip = trip;

        let mut events = vec![Event::Direction(
            self.headsign.as_ref().map(|h| format!("Direction: {h}")),
        )];
        if !picked {
            events.push(Event::StatusHidden);
        }
        events.push(Event::Controls(self.controls()));
        if picked {
            events.push(Event::FocusMap);
        }
        events
    }

    fn clear_route(&mut self) {
        self.route = None;
        self.trips_by_id.clear();
        self.trip = None;
        self.headsign = None;
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::new()
    }
}

fn hide_banners() -> Vec<Event> {
    vec![Event::StatusHidden, Event::Direction(None)]
}

fn info(text: &str) -> Event {
    Event::Status(StatusMessage {
        kind: StatusKind::Info,
        text: text.to_string(),
    })
}
