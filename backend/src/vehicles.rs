use anyhow::Result;
use geom::LonLat;
use serde::{Deserialize, Serialize};

use crate::{TripID, VehicleID};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleID,
    pub label: String,
    pub lat: f64,
    pub lon: f64,
    /// Meters per second, when the feed reports it
    pub speed: Option<f64>,
    pub trip_id: Option<TripID>,
}

impl Vehicle {
    pub fn pos(&self) -> LonLat {
        LonLat::new(self.lon, self.lat)
    }

    pub fn describe_speed(&self) -> String {
        format!("{:.1} m/s", self.speed.unwrap_or(0.0))
    }
}

/// Vehicles without a position can't be drawn, so they're skipped.
pub fn parse(json: &str) -> Result<Vec<Vehicle>> {
    let records: Vec<Record> = serde_json::from_str(json)?;
    let mut vehicles = Vec::new();
    for rec in records {
        let (lat, lon) = match (rec.latitude, rec.longitude) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => {
                debug!("Skipping {:?} without a position", rec.id);
                continue;
            }
        };
        vehicles.push(Vehicle {
            id: rec.id,
            label: rec.label.unwrap_or_else(|| rec.id.to_string()),
            lat,
            lon,
            speed: rec.speed,
            trip_id: rec.trip_id,
        });
    }
    Ok(vehicles)
}

#[derive(Deserialize)]
struct Record {
    id: VehicleID,
    label: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    speed: Option<f64>,
    trip_id: Option<TripID>,
}
