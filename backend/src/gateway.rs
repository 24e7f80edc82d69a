use std::future::Future;
use std::sync::Arc;

use anyhow::Result;

use crate::{Agency, Route, RouteID, StationView, Stop, Trip, TripID, Vehicle};

/// Everything the client needs from the backend. The backend holds one globally selected trip;
/// `stops`, `vehicles`, `stations_with_vehicles`, and `status_message` all describe that trip.
///
/// Every failure (transport error or non-2xx response) comes back as an error with a message
/// meant for a human.
pub trait Gateway: Send + Sync + 'static {
    fn agencies(&self) -> impl Future<Output = Result<Vec<Agency>>> + Send;

    /// Every route, including ones with nothing running right now
    fn routes(&self) -> impl Future<Output = Result<Vec<Route>>> + Send;

    /// Only routes that currently have at least one active vehicle
    fn routes_with_vehicles(&self) -> impl Future<Output = Result<Vec<Route>>> + Send;

    fn trips_for_route(&self, route: RouteID) -> impl Future<Output = Result<Vec<Trip>>> + Send;

    /// Make this trip authoritative for all of the trip-scoped queries.
    fn select_active_trip(&self, trip: &TripID) -> impl Future<Output = Result<()>> + Send;

    /// The backend's idea of the selected trip, as free-form text
    fn selected_trip(&self) -> impl Future<Output = Result<String>> + Send;

    /// Unordered
    fn stops(&self) -> impl Future<Output = Result<Vec<Stop>>> + Send;

    fn vehicles(&self) -> impl Future<Output = Result<Vec<Vehicle>>> + Send;

    fn stations_with_vehicles(&self) -> impl Future<Output = Result<Vec<StationView>>> + Send;

    fn set_rider_location(
        &self,
        lat: f64,
        lon: f64,
        name: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// A short human-readable summary, like "2 stops away"
    fn status_message(&self) -> impl Future<Output = Result<String>> + Send;
}

impl<T: Gateway> Gateway for Arc<T> {
    fn agencies(&self) -> impl Future<Output = Result<Vec<Agency>>> + Send {
        (**self).agencies()
    }

    fn routes(&self) -> impl Future<Output = Result<Vec<Route>>> + Send {
        (**self).routes()
    }

    fn routes_with_vehicles(&self) -> impl Future<Output = Result<Vec<Route>>> + Send {
        (**self).routes_with_vehicles()
    }

    fn trips_for_route(&self, route: RouteID) -> impl Future<Output = Result<Vec<Trip>>> + Send {
        (**self).trips_for_route(route)
    }

    fn select_active_trip(&self, trip: &TripID) -> impl Future<Output = Result<()>> + Send {
        (**self).select_active_trip(trip)
    }

    fn selected_trip(&self) -> impl Future<Output = Result<String>> + Send {
        (**self).selected_trip()
    }

    fn stops(&self) -> impl Future<Output = Result<Vec<Stop>>> + Send {
        (**self).stops()
    }

    fn vehicles(&self) -> impl Future<Output = Result<Vec<Vehicle>>> + Send {
        (**self).vehicles()
    }

    fn stations_with_vehicles(&self) -> impl Future<Output = Result<Vec<StationView>>> + Send {
        (**self).stations_with_vehicles()
    }

    fn set_rider_location(
        &self,
        lat: f64,
        lon: f64,
        name: &str,
    ) -> impl Future<Output = Result<()>> + Send {
        (**self).set_rider_location(lat, lon, name)
    }

    fn status_message(&self) -> impl Future<Output = Result<String>> + Send {
        (**self).status_message()
    }
}
