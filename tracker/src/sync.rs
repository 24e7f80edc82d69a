use std::collections::{BTreeMap, BTreeSet};

use geom::LonLat;

use backend::{Stop, Vehicle, VehicleID};

use crate::geometry::{arrow_rotation, bearing};
use crate::{LayerID, MapSurface, MarkerStyle, StaleVehicles};

/// Owns everything drawn for a tracking session and keeps it in line with the latest snapshots.
/// Nothing else mutates the surface.
pub struct MapSync<M> {
    surface: M,
    stale_vehicles: StaleVehicles,
    match_tolerance: f64,

    vehicles: BTreeMap<VehicleID, LayerID>,
    // Every stop marker drawn, including ones shadowed by a later stop with the same name
    clickable: BTreeMap<LayerID, Stop>,
    // TODO Stop names aren't unique on every feed; key by sequence once clicks and the station
    // list agree on it
    stops_by_name: BTreeMap<String, LayerID>,
    // Sorted by sequence
    path: Vec<Stop>,
    route_line: Option<LayerID>,
    route_arrow: Option<LayerID>,
    selected: Option<LayerID>,
}

/// What one vehicle snapshot did to the map
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub created: usize,
    pub moved: usize,
    pub removed: usize,
}

pub struct RenderedStops {
    /// The stop with the highest sequence
    pub terminal: Stop,
    /// From the second-to-last stop to the terminal, if there are at least 2 stops
    pub bearing: Option<f64>,
}

impl<M: MapSurface> MapSync<M> {
    pub fn new(surface: M, stale_vehicles: StaleVehicles, match_tolerance: f64) -> Self {
        Self {
            surface,
            stale_vehicles,
            match_tolerance,

            vehicles: BTreeMap::new(),
            clickable: BTreeMap::new(),
            stops_by_name: BTreeMap::new(),
            path: Vec::new(),
            route_line: None,
            route_arrow: None,
            selected: None,
        }
    }

    pub fn surface(&self) -> &M {
        &self.surface
    }

    /// Removes everything this session drew. Safe to call when nothing is drawn.
    pub fn clear(&mut self) {
        for (_, layer) in std::mem::take(&mut self.vehicles) {
            self.surface.remove(layer);
        }
        self.clear_stops();
    }

    fn clear_stops(&mut self) {
        for layer in std::mem::take(&mut self.clickable).into_keys() {
            self.surface.remove(layer);
        }
        self.stops_by_name.clear();
        self.path.clear();
        self.selected = None;
        if let Some(layer) = self.route_line.take() {
            self.surface.remove(layer);
        }
        if let Some(layer) = self.route_arrow.take() {
            self.surface.remove(layer);
        }
    }

    /// Draws one clickable marker per stop, a path through them in sequence order, and an arrow
    /// at the terminal pointing the way the route arrives. Replaces any stops drawn before.
    /// Returns None if there are no stops.
    pub fn render_stops(&mut self, mut stops: Vec<Stop>) -> Option<RenderedStops> {
        self.clear_stops();
        if stops.is_empty() {
            return None;
        }
        stops.sort_by_key(|s| s.sequence);

        for stop in &stops {
            let layer =
                self.surface
                    .add_stop_marker(stop.pos(), stop.name.clone(), MarkerStyle::Default);
            if let Some(shadowed) = self.stops_by_name.insert(stop.name.clone(), layer) {
                warn!(
                    "Two stops named {} on this trip; {:?} won't be found by name",
                    stop.name, shadowed
                );
            }
            self.clickable.insert(layer, stop.clone());
        }

        let pts: Vec<LonLat> = stops.iter().map(|s| s.pos()).collect();
        self.route_line = Some(self.surface.add_path(pts));

        let mut direction = None;
        if stops.len() >= 2 {
            let prev = &stops[stops.len() - 2];
            let last = &stops[stops.len() - 1];
            let b = bearing(prev.lat, prev.lon, last.lat, last.lon);
            self.route_arrow = Some(self.surface.add_arrow(last.pos(), arrow_rotation(b)));
            direction = Some(b);
        }

        let terminal = stops[stops.len() - 1].clone();
        self.path = stops;
        Some(RenderedStops {
            terminal,
            bearing: direction,
        })
    }

    /// Moves markers of known vehicles in place and creates markers for new ones. Vehicles
    /// missing from the snapshot are handled according to the StaleVehicles policy.
    pub fn reconcile_vehicles(&mut self, vehicles: &[Vehicle]) -> Reconciliation {
        let mut result = Reconciliation::default();
        let mut seen = BTreeSet::new();
        for vehicle in vehicles {
            seen.insert(vehicle.id);
            if let Some(layer) = self.vehicles.get(&vehicle.id) {
                self.surface.move_marker(*layer, vehicle.pos());
                result.moved += 1;
            } else {
                let layer = self.surface.add_vehicle_marker(
                    vehicle.pos(),
                    vec![
                        format!("Vehicle: {}", vehicle.label),
                        format!("Speed: {}", vehicle.describe_speed()),
                    ],
                );
                self.vehicles.insert(vehicle.id, layer);
                result.created += 1;
            }
        }

        if self.stale_vehicles == StaleVehicles::Remove {
            let stale: Vec<VehicleID> = self
                .vehicles
                .keys()
                .filter(|id| !seen.contains(id))
                .cloned()
                .collect();
            for id in stale {
                if let Some(layer) = self.vehicles.remove(&id) {
                    self.surface.remove(layer);
                    result.removed += 1;
                }
            }
        }
        result
    }

    /// If this layer is a stop marker from the current session, which stop is it?
    pub fn clicked_stop(&self, layer: LayerID) -> Option<&Stop> {
        self.clickable.get(&layer)
    }

    /// Marks exactly one stop marker as selected, restoring the previous one in the same step.
    /// Layers that aren't current stop markers (maybe the session was restarted since the click)
    /// just deselect.
    pub fn select(&mut self, layer: Option<LayerID>) {
        let layer = layer.filter(|l| self.clickable.contains_key(l));
        if let Some(prev) = self.selected.take() {
            if Some(prev) != layer {
                self.surface.set_style(prev, MarkerStyle::Default);
            }
        }
        if let Some(l) = layer {
            self.surface.set_style(l, MarkerStyle::Selected);
        }
        self.selected = layer;
    }

    /// Selects the first stop marker within the match tolerance of this position, or deselects
    /// everything if there's none.
    pub fn select_near(&mut self, lat: f64, lon: f64) -> Option<Stop> {
        let found = self
            .clickable
            .iter()
            .find(|(_, s)| {
                (s.lat - lat).abs() < self.match_tolerance
                    && (s.lon - lon).abs() < self.match_tolerance
            })
            .map(|(layer, stop)| (*layer, stop.clone()));
        self.select(found.as_ref().map(|(layer, _)| *layer));
        found.map(|(_, stop)| stop)
    }

    pub fn center_on(&mut self, lat: f64, lon: f64, zoom: u8) {
        self.surface.set_view(LonLat::new(lon, lat), zoom);
    }

    pub fn selected(&self) -> Option<&Stop> {
        self.selected.and_then(|l| self.clickable.get(&l))
    }

    pub fn stop_marker(&self, name: &str) -> Option<LayerID> {
        self.stops_by_name.get(name).cloned()
    }

    pub fn vehicle_marker(&self, id: VehicleID) -> Option<LayerID> {
        self.vehicles.get(&id).cloned()
    }

    pub fn num_vehicle_markers(&self) -> usize {
        self.vehicles.len()
    }

    /// The stops of this session, in the order the path visits them
    pub fn path(&self) -> &[Stop] {
        &self.path
    }
}
