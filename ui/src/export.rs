use anyhow::Result;
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};
use geom::LonLat;

use tracker::{Layer, MarkerStyle, MemorySurface};

/// Everything currently drawn, as one FeatureCollection. Each feature has a `type` property of
/// `vehicle`, `stop`, `route`, or `arrow`.
pub fn to_geojson(surface: &MemorySurface) -> GeoJson {
    let mut features = Vec::new();
    for (id, layer) in surface.layers() {
        let mut feature = match layer {
            Layer::Vehicle { pos, popup } => {
                let mut f = feature(point(*pos));
                f.set_property("type", "vehicle");
                f.set_property("popup", popup.join("\n"));
                f
            }
            Layer::Stop { pos, popup, style } => {
                let mut f = feature(point(*pos));
                f.set_property("type", "stop");
                f.set_property("name", popup.clone());
                f.set_property("selected", *style == MarkerStyle::Selected);
                f.set_property("stroke", style.stroke());
                f.set_property("fill", style.fill());
                f
            }
            Layer::Path(pts) => {
                let mut f = feature(Value::LineString(
                    pts.iter().map(|pt| vec![pt.x(), pt.y()]).collect(),
                ));
                f.set_property("type", "route");
                f
            }
            Layer::Arrow { pos, rotation } => {
                let mut f = feature(point(*pos));
                f.set_property("type", "arrow");
                f.set_property("rotation", *rotation);
                f
            }
        };
        feature.set_property("layer", id.0);
        features.push(feature);
    }

    GeoJson::FeatureCollection(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

pub fn write_geojson(surface: &MemorySurface, path: &str) -> Result<()> {
    fs_err::write(path, to_geojson(surface).to_string())?;
    info!("Wrote {} layers to {path}", surface.layers().len());
    Ok(())
}

fn feature(value: Value) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: None,
        foreign_members: None,
    }
}

fn point(pos: LonLat) -> Value {
    Value::Point(vec![pos.x(), pos.y()])
}
