use std::collections::BTreeMap;

use geom::LonLat;

/// A handle to something drawn on a map surface
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerID(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerStyle {
    Default,
    Selected,
}

impl MarkerStyle {
    pub fn stroke(self) -> &'static str {
        match self {
            MarkerStyle::Default => "#0c5460",
            MarkerStyle::Selected => "#155724",
        }
    }

    pub fn fill(self) -> &'static str {
        match self {
            MarkerStyle::Default => "#17a2b8",
            MarkerStyle::Selected => "#28a745",
        }
    }
}

/// Whatever actually draws the map. Only `MapSync` calls these.
///
/// Clicks flow the other way: the surface reports the LayerID that was clicked, and the tracker
/// decides what it means.
pub trait MapSurface: Send + 'static {
    fn add_vehicle_marker(&mut self, pos: LonLat, popup: Vec<String>) -> LayerID;
    fn add_stop_marker(&mut self, pos: LonLat, popup: String, style: MarkerStyle) -> LayerID;
    fn add_path(&mut self, pts: Vec<LonLat>) -> LayerID;
    /// Rotation is in degrees, clockwise, applied to a glyph that points east.
    fn add_arrow(&mut self, pos: LonLat, rotation: f64) -> LayerID;

    fn move_marker(&mut self, layer: LayerID, pos: LonLat);
    fn set_style(&mut self, layer: LayerID, style: MarkerStyle);
    fn remove(&mut self, layer: LayerID);

    fn set_view(&mut self, center: LonLat, zoom: u8);
}

#[derive(Clone, PartialEq)]
pub enum Layer {
    Vehicle {
        pos: LonLat,
        popup: Vec<String>,
    },
    Stop {
        pos: LonLat,
        popup: String,
        style: MarkerStyle,
    },
    Path(Vec<LonLat>),
    Arrow {
        pos: LonLat,
        rotation: f64,
    },
}

/// Keeps every layer in memory. Used headless and in tests; something else can turn the layers
/// into pixels or GeoJSON.
pub struct MemorySurface {
    layers: BTreeMap<LayerID, Layer>,
    next_id: usize,
    view: (LonLat, u8),
    // How many layers were ever created. Moving a marker doesn't count.
    created: usize,
}

impl MemorySurface {
    pub fn new(center: LonLat, zoom: u8) -> Self {
        Self {
            layers: BTreeMap::new(),
            next_id: 0,
            view: (center, zoom),
            created: 0,
        }
    }

    pub fn layers(&self) -> &BTreeMap<LayerID, Layer> {
        &self.layers
    }

    pub fn get(&self, layer: LayerID) -> Option<&Layer> {
        self.layers.get(&layer)
    }

    pub fn view(&self) -> (LonLat, u8) {
        self.view
    }

    pub fn num_created(&self) -> usize {
        self.created
    }

    pub fn count_vehicles(&self) -> usize {
        self.layers
            .values()
            .filter(|l| matches!(l, Layer::Vehicle { .. }))
            .count()
    }

    pub fn count_stops(&self) -> usize {
        self.layers
            .values()
            .filter(|l| matches!(l, Layer::Stop { .. }))
            .count()
    }

    pub fn stops_with_style(&self, style: MarkerStyle) -> Vec<LayerID> {
        self.layers
            .iter()
            .filter_map(|(id, l)| match l {
                Layer::Stop { style: s, .. } if *s == style => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn paths(&self) -> Vec<&Vec<LonLat>> {
        self.layers
            .values()
            .filter_map(|l| match l {
                Layer::Path(pts) => Some(pts),
                _ => None,
            })
            .collect()
    }

    pub fn arrows(&self) -> Vec<(LonLat, f64)> {
        self.layers
            .values()
            .filter_map(|l| match l {
                Layer::Arrow { pos, rotation } => Some((*pos, *rotation)),
                _ => None,
            })
            .collect()
    }

    fn insert(&mut self, layer: Layer) -> LayerID {
        let id = LayerID(self.next_id);
        self.next_id += 1;
        self.created += 1;
        self.layers.insert(id, layer);
        id
    }
}

impl MapSurface for MemorySurface {
    fn add_vehicle_marker(&mut self, pos: LonLat, popup: Vec<String>) -> LayerID {
        self.insert(Layer::Vehicle { pos, popup })
    }

    fn add_stop_marker(&mut self, pos: LonLat, popup: String, style: MarkerStyle) -> LayerID {
        self.insert(Layer::Stop { pos, popup, style })
    }

    fn add_path(&mut self, pts: Vec<LonLat>) -> LayerID {
        self.insert(Layer::Path(pts))
    }

    fn add_arrow(&mut self, pos: LonLat, rotation: f64) -> LayerID {
        self.insert(Layer::Arrow { pos, rotation })
    }

    fn move_marker(&mut self, layer: LayerID, new_pos: LonLat) {
        match self.layers.get_mut(&layer) {
            Some(Layer::Vehicle { pos, .. })
            | Some(Layer::Stop { pos, .. })
            | Some(Layer::Arrow { pos, .. }) => {
                *pos = new_pos;
            }
            Some(Layer::Path(_)) => warn!("Can't move path {:?} like a marker", layer),
            None => warn!("Moving unknown {:?}", layer),
        }
    }

    fn set_style(&mut self, layer: LayerID, new_style: MarkerStyle) {
        match self.layers.get_mut(&layer) {
            Some(Layer::Stop { style, .. }) => {
                *style = new_style;
            }
            _ => warn!("Can't restyle {:?}", layer),
        }
    }

    fn remove(&mut self, layer: LayerID) {
        if self.layers.remove(&layer).is_none() {
            warn!("Removing unknown {:?}", layer);
        }
    }

    fn set_view(&mut self, center: LonLat, zoom: u8) {
        self.view = (center, zoom);
    }
}
