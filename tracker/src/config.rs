use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Knobs for the tracker. Every field has a default, so a config file only needs to list what it
/// changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How often vehicles, the station list, and the status message are refreshed
    pub update_interval_secs: u64,
    /// (lat, lon) of the initial map view
    pub map_center: (f64, f64),
    pub map_zoom: u8,
    /// The zoom used when centering on a station picked from the list
    pub station_zoom: u8,
    /// Degrees. A station picked from the list matches a stop marker within this distance on both
    /// axes.
    pub station_match_tolerance: f64,
    pub stale_vehicles: StaleVehicles,
}

/// What happens to the marker of a vehicle that disappears from the latest snapshot
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StaleVehicles {
    /// Leave it where it was last seen. Vehicles often drop out of one snapshot and come back.
    Keep,
    Remove,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            update_interval_secs: 15,
            map_center: (46.7712, 23.6236),
            map_zoom: 13,
            station_zoom: 15,
            station_match_tolerance: 0.0001,
            stale_vehicles: StaleVehicles::Keep,
        }
    }
}

impl Config {
    /// Reads a JSON config file. Missing fields take their defaults.
    pub fn load(path: &str) -> Result<Self> {
        let json = fs_err::read_to_string(path)?;
        let config = serde_json::from_str(&json).with_context(|| format!("parsing {path}"))?;
        info!("Loaded config from {path}");
        Ok(config)
    }

    pub fn update_interval(&self) -> Duration {
        // A zero period would make tokio's interval panic
        Duration::from_secs(self.update_interval_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config() {
        let config: Config =
            serde_json::from_str(r#"{"update_interval_secs": 30, "stale_vehicles": "Remove"}"#)
                .unwrap();
        assert_eq!(config.update_interval(), Duration::from_secs(30));
        assert_eq!(config.stale_vehicles, StaleVehicles::Remove);
        assert_eq!(config.map_zoom, 13);
    }

    #[test]
    fn bad_config_file() {
        let path = std::env::temp_dir().join("tracker_bad_config.json");
        fs_err::write(&path, "{not json").unwrap();
        let err = Config::load(path.to_str().unwrap()).unwrap_err();
        assert!(format!("{err:#}").contains("parsing"));
        assert!(Config::load("/definitely/not/here.json").is_err());
    }

    #[test]
    fn zero_interval_is_clamped() {
        let config = Config {
            update_interval_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.update_interval(), Duration::from_secs(1));
    }
}
