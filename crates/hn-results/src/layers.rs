//! GeoJSON export of the generated network layers.

use std::fs;
use std::path::{Path, PathBuf};

use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};
use hn_netgen::{GeneratedNetwork, LineFeature, NetworkLayer};
use serde_json::json;
use tracing::info;

use crate::ResultsResult;

fn line_feature(feature: &LineFeature) -> Feature {
    let segment = feature.segment;
    let geometry = Geometry::new(Value::LineString(vec![
        vec![segment.start.x, segment.start.y],
        vec![segment.end.x, segment.end.y],
    ]));

    let mut properties = JsonObject::new();
    properties.insert("length_m".to_string(), json!(feature.length_m));
    properties.insert("role".to_string(), json!(feature.role.as_str()));
    properties.insert("heat_demand_w".to_string(), json!(feature.heat_demand_w));

    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

pub fn layer_to_feature_collection(layer: &NetworkLayer) -> FeatureCollection {
    let mut foreign = JsonObject::new();
    foreign.insert("name".to_string(), json!(layer.kind.name()));

    FeatureCollection {
        bbox: None,
        features: layer.features.iter().map(line_feature).collect(),
        foreign_members: Some(foreign),
    }
}

/// Write `<layer>.geojson` for each of the four layers into `dir`.
pub fn write_layers(dir: &Path, network: &GeneratedNetwork) -> ResultsResult<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    for layer in network.layers() {
        let path = dir.join(format!("{}.geojson", layer.kind.name()));
        let collection = GeoJson::FeatureCollection(layer_to_feature_collection(&layer));
        fs::write(&path, serde_json::to_string_pretty(&collection)?)?;
        info!(layer = layer.kind.name(), features = layer.features.len(), path = %path.display(), "wrote layer");
        written.push(path);
    }
    Ok(written)
}
