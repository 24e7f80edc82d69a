//! The client core: picking a trip, tracking it, and keeping a map in line with what the backend
//! reports. Presentation lives elsewhere; everything here talks to it through [`Event`]s and the
//! [`MapSurface`] trait.

#[macro_use]
extern crate log;

mod config;
mod controller;
mod events;
pub mod geometry;
mod map;
#[cfg(test)]
mod mock;
mod refresh;
mod selection;
mod sync;
mod timers;

pub use config::{Config, StaleVehicles};
pub use controller::Tracker;
pub use events::{channel, Controls, Emitter, Event, StationList, StatusKind, StatusMessage};
pub use map::{Layer, LayerID, MapSurface, MarkerStyle, MemorySurface};
pub use refresh::SharedMap;
pub use selection::{Selection, SelectionState};
pub use sync::{MapSync, Reconciliation, RenderedStops};
