//! Types and client for the tracking backend.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod agencies;
mod gateway;
mod http;
mod ids;
mod routes;
mod stops;
mod trips;
mod vehicles;

pub use agencies::Agency;
pub use gateway::Gateway;
pub use http::HttpGateway;
pub use ids::{AgencyID, RouteID, TripID, VehicleID};
pub use routes::Route;
pub use stops::{StationVehicle, StationView, Stop};
pub use trips::Trip;
pub use vehicles::Vehicle;
