use std::sync::Arc;

use tokio::sync::Mutex;

use backend::Gateway;

use crate::{Emitter, Event, MapSurface, MapSync, StationList};

/// The map, shared between the controller and the timer tasks. Only held for synchronous
/// updates, never across a request to the backend.
pub type SharedMap<M> = Arc<Mutex<MapSync<M>>>;

/// What every periodic refresh needs. Ticks never fail; problems become events and log lines, and
/// the timer keeps going.
pub(crate) struct Refresher<G, M> {
    pub gateway: G,
    pub map: SharedMap<M>,
    pub events: Emitter,
}

impl<G: Gateway, M: MapSurface> Refresher<G, M> {
    pub async fn vehicles(&self) {
        let vehicles = match self.gateway.vehicles().await {
            Ok(vehicles) => vehicles,
            Err(err) => {
                self.events
                    .error(format!("Error updating vehicles: {err}"));
                return;
            }
        };
        if vehicles.is_empty() {
            self.events
                .info("No vehicles currently active for this trip.");
        }
        let result = self.map.lock().await.reconcile_vehicles(&vehicles);
        debug!(
            "{} vehicles: {} new, {} moved, {} removed",
            vehicles.len(),
            result.created,
            result.moved,
            result.removed
        );
        self.events.emit(Event::VehiclesReconciled(result));
    }

    pub async fn station_list(&self) {
        match self.gateway.stations_with_vehicles().await {
            Ok(stations) => self
                .events
                .emit(Event::StationList(StationList::Loaded(stations))),
            Err(err) => {
                warn!("Station list refresh failed: {err}");
                self.events
                    .emit(Event::StationList(StationList::Failed(err.to_string())));
            }
        }
    }

    pub async fn status(&self) {
        let text = match self.gateway.status_message().await {
            Ok(text) => text.trim().to_string(),
            Err(err) => {
                warn!("Status refresh failed: {err}");
                "Status unavailable".to_string()
            }
        };
        self.events.emit(Event::StatusText(text));
    }
}
