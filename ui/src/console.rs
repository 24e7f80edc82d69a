use backend::{Route, StationView, Trip};
use tracker::{Event, StationList, StatusKind};

/// Turns tracker events into lines of text. Remembers just enough to redraw the station list when
/// the highlight moves.
#[derive(Default)]
pub struct Console {
    stations: Vec<StationView>,
    highlighted: Option<i64>,
}

impl Console {
    pub fn handle(&mut self, ev: Event) -> Vec<String> {
        match ev {
            Event::AgenciesLoaded(agencies) => {
                if agencies.is_empty() {
                    return vec!["Agency: No agencies available".to_string()];
                }
                let mut lines = vec!["Agency: -- Select an agency --".to_string()];
                for agency in agencies {
                    lines.push(format!("  {}: {}", agency.id, agency.name));
                }
                lines
            }
            Event::RoutesReset => vec!["Route: First select an agency".to_string()],
            Event::RoutesLoaded(routes) => describe_routes(&routes),
            Event::TripsReset => vec!["Direction: First select a route".to_string()],
            Event::TripsLoaded(trips) => describe_trips(&trips),
            Event::Controls(controls) => {
                debug!("Controls now {:?}", controls);
                Vec::new()
            }
            Event::Status(msg) => {
                let tag = match msg.kind {
                    StatusKind::Info => "info",
                    StatusKind::Success => "ok",
                    StatusKind::Error => "error",
                };
                vec![format!("[{tag}] {}", msg.text)]
            }
            Event::StatusHidden | Event::FocusMap | Event::VehiclesReconciled(_) => Vec::new(),
            Event::Direction(banner) => banner.into_iter().collect(),
            Event::SessionStarted(trip) => vec![format!("Tracking trip {trip}")],
            Event::SessionStopped => vec!["Stopped tracking".to_string()],
            Event::StopsRendered {
                stops,
                terminal,
                bearing,
            } => {
                let mut line = format!("{stops} stops on the map");
                if let (Some(terminal), Some(bearing)) = (terminal, bearing) {
                    line.push_str(&format!(", arriving at {terminal} heading {bearing:.0}°"));
                }
                vec![line]
            }
            Event::StationList(StationList::Loaded(stations)) => {
                self.stations = stations;
                self.station_lines()
            }
            Event::StationList(StationList::Failed(_)) => {
                self.stations.clear();
                vec!["Error loading stations".to_string()]
            }
            Event::StationHighlighted(sequence) => {
                self.highlighted = sequence;
                if self.stations.is_empty() {
                    Vec::new()
                } else {
                    self.station_lines()
                }
            }
            Event::StatusText(text) => vec![format!("Status: {text}")],
        }
    }

    /// One line per station, then one indented line per vehicle there. The highlighted station is
    /// marked with `>` and stations with a vehicle with `*`.
    pub fn station_lines(&self) -> Vec<String> {
        if self.stations.is_empty() {
            return vec!["No stations available".to_string()];
        }
        let mut lines = Vec::new();
        for station in &self.stations {
            let cursor = if self.highlighted == Some(station.sequence) {
                '>'
            } else {
                ' '
            };
            let busy = if station.has_vehicle { '*' } else { ' ' };
            lines.push(format!(
                "{cursor}{busy} {}. {}",
                station.sequence, station.station_name
            ));
            for vehicle in &station.vehicles {
                lines.push(format!("      {}", vehicle.describe()));
            }
        }
        lines
    }
}

pub fn describe_routes(routes: &[Route]) -> Vec<String> {
    if routes.is_empty() {
        return vec!["Route: No active routes available".to_string()];
    }
    let mut lines = vec!["Route: -- Select a route --".to_string()];
    for route in routes {
        lines.push(format!("  {}: {}", route.id, route.describe()));
    }
    lines
}

fn describe_trips(trips: &[Trip]) -> Vec<String> {
    if trips.is_empty() {
        return vec!["Direction: No trips available".to_string()];
    }
    let mut lines = vec!["Direction: -- Select a direction --".to_string()];
    for trip in trips {
        let name = match (&trip.headsign, trip.direction) {
            (Some(headsign), _) => headsign.clone(),
            (None, Some(dir)) => format!("Direction {dir}"),
            (None, None) => "Unknown direction".to_string(),
        };
        lines.push(format!("  {}: {}", trip.id, name));
    }
    lines
}

#[cfg(test)]
mod tests {
    use backend::{RouteID, StationVehicle, TripID};
    use tracker::StatusMessage;

    use super::*;

    fn station(sequence: i64, name: &str, vehicles: Vec<StationVehicle>) -> StationView {
        StationView {
            sequence,
            lat: 46.77,
            lon: 23.6,
            station_name: name.to_string(),
            has_vehicle: !vehicles.is_empty(),
            vehicles,
        }
    }

    #[test]
    fn dropdown_placeholders() {
        let mut console = Console::default();
        assert_eq!(
            console.handle(Event::RoutesLoaded(Vec::new())),
            vec!["Route: No active routes available"]
        );
        assert_eq!(
            console.handle(Event::RoutesReset),
            vec!["Route: First select an agency"]
        );
        assert_eq!(
            console.handle(Event::RoutesLoaded(vec![Route {
                id: RouteID(7),
                short_name: "24B".to_string(),
                long_name: "Gara - Zorilor".to_string(),
            }])),
            vec!["Route: -- Select a route --", "  7: 24B - Gara - Zorilor"]
        );
        assert_eq!(
            console.handle(Event::TripsLoaded(vec![Trip {
                id: TripID::new("T1"),
                headsign: None,
                route_id: Some(RouteID(7)),
                direction: Some(1),
            }])),
            vec!["Direction: -- Select a direction --", "  T1: Direction 1"]
        );
    }

    #[test]
    fn station_list_follows_highlight() {
        let mut console = Console::default();
        // Nothing to redraw yet
        assert!(console.handle(Event::StationHighlighted(Some(2))).is_empty());

        let lines = console.handle(Event::StationList(StationList::Loaded(vec![
            station(1, "Memorandumului", Vec::new()),
            station(
                2,
                "Piata Unirii",
                vec![StationVehicle {
                    label: "CJ-01".to_string(),
                    speed: Some(4.04),
                }],
            ),
        ])));
        assert_eq!(
            lines,
            vec![
                "   1. Memorandumului",
                ">* 2. Piata Unirii",
                "      CJ-01 (4.0 m/s)"
            ]
        );

        let lines = console.handle(Event::StationHighlighted(Some(1)));
        assert_eq!(lines[0], ">  1. Memorandumului");
        assert_eq!(lines[1], " * 2. Piata Unirii");

        assert_eq!(
            console.handle(Event::StationList(StationList::Failed("boom".to_string()))),
            vec!["Error loading stations"]
        );
        assert_eq!(console.station_lines(), vec!["No stations available"]);
    }

    #[test]
    fn statuses() {
        let mut console = Console::default();
        assert_eq!(
            console.handle(Event::Status(StatusMessage {
                kind: StatusKind::Error,
                text: "Error loading routes: Failed to load routes: Not Found".to_string(),
            })),
            vec!["[error] Error loading routes: Failed to load routes: Not Found"]
        );
        assert_eq!(
            console.handle(Event::StopsRendered {
                stops: 12,
                terminal: Some("Gara".to_string()),
                bearing: Some(89.6),
            }),
            vec!["12 stops on the map, arriving at Gara heading 90°"]
        );
        assert!(console.handle(Event::Direction(None)).is_empty());
    }
}
