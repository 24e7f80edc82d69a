use std::collections::BTreeMap;

use anyhow::Result;
use geom::LonLat;
use serde::{Deserialize, Deserializer, Serialize};

/// One stop along the active trip.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    /// Position along the trip's path. Assumed unique per trip.
    pub sequence: i64,
}

impl Stop {
    pub fn pos(&self) -> LonLat {
        LonLat::new(self.lon, self.lat)
    }
}

/// The backend serves stops as an object keyed by stop ID. The keys aren't useful to the client,
/// and the order is arbitrary.
pub fn parse(json: &str) -> Result<Vec<Stop>> {
    let keyed: BTreeMap<String, Stop> = serde_json::from_str(json)?;
    Ok(keyed.into_values().collect())
}

/// A stop in the combined station list, annotated with the vehicles currently there.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StationView {
    pub sequence: i64,
    pub lat: f64,
    pub lon: f64,
    #[serde(rename = "stationName")]
    pub station_name: String,
    #[serde(rename = "hasVehicle", deserialize_with = "parse_bool")]
    pub has_vehicle: bool,
    #[serde(default)]
    pub vehicles: Vec<StationVehicle>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StationVehicle {
    #[serde(default)]
    pub label: String,
    pub speed: Option<f64>,
}

impl StationVehicle {
    pub fn describe(&self) -> String {
        format!("{} ({:.1} m/s)", self.label, self.speed.unwrap_or(0.0))
    }
}

pub fn parse_stations(json: &str) -> Result<Vec<StationView>> {
    Ok(serde_json::from_str(json)?)
}

fn parse_bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    let n = <u8>::deserialize(d)?;
    if n == 1 {
        return Ok(true);
    }
    if n == 0 {
        return Ok(false);
    }
    Err(serde::de::Error::custom(format!("Unknown bool value {n}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyed_stops() {
        let mut stops = parse(
            r#"{
                "101": {"name": "Piata Unirii", "lat": 46.7694, "lon": 23.5899, "sequence": 2},
                "55": {"name": "Gara", "lat": 46.7842, "lon": 23.5862, "sequence": 1}
            }"#,
        )
        .unwrap();
        stops.sort_by_key(|s| s.sequence);
        assert_eq!(stops[0].name, "Gara");
        assert_eq!(stops[1].sequence, 2);
    }

    #[test]
    fn stations_with_vehicles() {
        let stations = parse_stations(
            r#"[
                {"sequence": 1, "lat": 46.78, "lon": 23.58, "stationName": "Gara", "hasVehicle": 1,
                 "vehicles": [{"label": "T21", "speed": 4.04}, {"label": "T3", "speed": null}]},
                {"sequence": 2, "lat": 46.77, "lon": 23.59, "stationName": "Sora", "hasVehicle": 0, "vehicles": []}
            ]"#,
        )
        .unwrap();
        assert!(stations[0].has_vehicle);
        assert!(!stations[1].has_vehicle);
        let described: Vec<String> = stations[0].vehicles.iter().map(|v| v.describe()).collect();
        assert_eq!(described, vec!["T21 (4.0 m/s)", "T3 (0.0 m/s)"]);
    }

    #[test]
    fn has_vehicle_must_be_0_or_1() {
        assert!(parse_stations(
            r#"[{"sequence": 1, "lat": 0, "lon": 0, "stationName": "x", "hasVehicle": 2}]"#
        )
        .is_err());
    }
}
