use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{RouteID, TripID};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: TripID,
    pub headsign: Option<String>,
    pub route_id: Option<RouteID>,
    /// 0 or 1 in GTFS. Inbound/outbound are arbitrary.
    pub direction: Option<u8>,
}

pub fn parse(json: &str) -> Result<Vec<Trip>> {
    let records: Vec<Record> = serde_json::from_str(json)?;
    let mut trips = Vec::new();
    for rec in records {
        let direction = match rec.direction_id {
            Some(x @ (0 | 1)) => Some(x),
            None => None,
            x => bail!("Unknown direction_id {:?} for {:?}", x, rec.trip_id),
        };
        trips.push(Trip {
            id: rec.trip_id,
            // An empty headsign is as good as none for picking a direction
            headsign: rec.trip_headsign.filter(|x| !x.is_empty()),
            route_id: rec.route_id,
            direction,
        });
    }
    Ok(trips)
}

#[derive(Deserialize)]
struct Record {
    trip_id: TripID,
    trip_headsign: Option<String>,
    route_id: Option<RouteID>,
    direction_id: Option<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trips() {
        let trips = parse(
            r#"[
                {"trip_id": "1_0", "route_id": 7, "direction_id": 0, "trip_headsign": "Gara"},
                {"trip_id": "1_1", "trip_headsign": ""}
            ]"#,
        )
        .unwrap();
        assert_eq!(trips[0].id, TripID::new("1_0"));
        assert_eq!(trips[0].headsign.as_deref(), Some("Gara"));
        assert_eq!(trips[0].direction, Some(0));
        assert_eq!(trips[1].headsign, None);
        assert_eq!(trips[1].route_id, None);
    }

    #[test]
    fn bad_direction() {
        assert!(parse(r#"[{"trip_id": "x", "direction_id": 3}]"#).is_err());
    }
}
