//! An in-memory backend for tests

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use anyhow::{bail, Result};

use backend::{
    Agency, AgencyID, Gateway, Route, RouteID, StationView, Stop, Trip, TripID, Vehicle,
    VehicleID,
};

#[derive(Default)]
pub struct MockGateway {
    pub agencies: Mutex<Vec<Agency>>,
    pub routes: Mutex<Vec<Route>>,
    pub trips: Mutex<BTreeMap<RouteID, Vec<Trip>>>,
    pub stops: Mutex<Vec<Stop>>,
    pub vehicles: Mutex<Vec<Vehicle>>,
    pub stations: Mutex<Vec<StationView>>,
    pub status: Mutex<String>,

    pub selected: Mutex<Option<TripID>>,
    pub rider: Mutex<Option<(f64, f64, String)>>,

    failing: Mutex<BTreeSet<&'static str>>,
    calls: Mutex<BTreeMap<&'static str, usize>>,
}

impl MockGateway {
    /// One agency with one route, running one trip from A to B with one vehicle on it.
    pub fn cluj() -> Self {
        let mock = Self::default();
        *mock.agencies.lock().unwrap() = vec![Agency {
            id: AgencyID(1),
            name: "Cluj".to_string(),
        }];
        *mock.routes.lock().unwrap() = vec![Route {
            id: RouteID(7),
            short_name: "1".to_string(),
            long_name: "Centru".to_string(),
        }];
        mock.trips.lock().unwrap().insert(
            RouteID(7),
            vec![Trip {
                id: TripID::new("T1"),
                headsign: Some("Gara".to_string()),
                route_id: Some(RouteID(7)),
                direction: Some(0),
            }],
        );
        *mock.stops.lock().unwrap() = vec![stop("B", 0.0, 1.0, 2), stop("A", 0.0, 0.0, 1)];
        *mock.vehicles.lock().unwrap() = vec![vehicle(5, 0.0, 0.5)];
        *mock.stations.lock().unwrap() = vec![StationView {
            sequence: 1,
            lat: 0.0,
            lon: 0.0,
            station_name: "A".to_string(),
            has_vehicle: false,
            vehicles: Vec::new(),
        }];
        *mock.status.lock().unwrap() = "2 stops away".to_string();
        mock
    }

    pub fn fail(&self, endpoint: &'static str) {
        self.failing.lock().unwrap().insert(endpoint);
    }

    pub fn recover(&self, endpoint: &'static str) {
        self.failing.lock().unwrap().remove(endpoint);
    }

    pub fn calls(&self, endpoint: &'static str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(endpoint)
            .cloned()
            .unwrap_or(0)
    }

    fn call(&self, endpoint: &'static str) -> Result<()> {
        *self.calls.lock().unwrap().entry(endpoint).or_insert(0) += 1;
        if self.failing.lock().unwrap().contains(endpoint) {
            bail!("Failed to {endpoint}: Service Unavailable");
        }
        Ok(())
    }
}

pub fn stop(name: &str, lat: f64, lon: f64, sequence: i64) -> Stop {
    Stop {
        name: name.to_string(),
        lat,
        lon,
        sequence,
    }
}

pub fn vehicle(id: i64, lat: f64, lon: f64) -> Vehicle {
    Vehicle {
        id: VehicleID(id),
        label: format!("CJ-{id}"),
        lat,
        lon,
        speed: Some(8.0),
        trip_id: Some(TripID::new("T1")),
    }
}

impl Gateway for MockGateway {
    async fn agencies(&self) -> Result<Vec<Agency>> {
        self.call("agencies")?;
        Ok(self.agencies.lock().unwrap().clone())
    }

    async fn routes(&self) -> Result<Vec<Route>> {
        self.call("routes")?;
        Ok(self.routes.lock().unwrap().clone())
    }

    async fn routes_with_vehicles(&self) -> Result<Vec<Route>> {
        self.call("routes_with_vehicles")?;
        Ok(self.routes.lock().unwrap().clone())
    }

    async fn trips_for_route(&self, route: RouteID) -> Result<Vec<Trip>> {
        self.call("trips")?;
        Ok(self
            .trips
            .lock()
            .unwrap()
            .get(&route)
            .cloned()
            .unwrap_or_default())
    }

    async fn select_active_trip(&self, trip: &TripID) -> Result<()> {
        self.call("select_trip")?;
        *self.selected.lock().unwrap() = Some(trip.clone());
        Ok(())
    }

    async fn selected_trip(&self) -> Result<String> {
        self.call("selected_trip")?;
        Ok(self
            .selected
            .lock()
            .unwrap()
            .as_ref()
            .map(|t| t.to_string())
            .unwrap_or_default())
    }

    async fn stops(&self) -> Result<Vec<Stop>> {
        self.call("stops")?;
        Ok(self.stops.lock().unwrap().clone())
    }

    async fn vehicles(&self) -> Result<Vec<Vehicle>> {
        self.call("vehicles")?;
        Ok(self.vehicles.lock().unwrap().clone())
    }

    async fn stations_with_vehicles(&self) -> Result<Vec<StationView>> {
        self.call("stations")?;
        Ok(self.stations.lock().unwrap().clone())
    }

    async fn set_rider_location(&self, lat: f64, lon: f64, name: &str) -> Result<()> {
        self.call("user_location")?;
        *self.rider.lock().unwrap() = Some((lat, lon, name.to_string()));
        Ok(())
    }

    async fn status_message(&self) -> Result<String> {
        self.call("status")?;
        Ok(self.status.lock().unwrap().clone())
    }
}
