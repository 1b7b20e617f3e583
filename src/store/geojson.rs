//! GeoJSON reader and writer.

use std::path::Path;

use geojson::{GeoJson, Geometry, PolygonType, Value};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Feature, FeatureCollection, GeoCoord, GeoPolygon, Properties, Ring};

fn ring_from_positions(positions: &[Vec<f64>], path: &Path) -> Result<Ring> {
    let vertices = positions
        .iter()
        .map(|pos| match pos.as_slice() {
            [lon, lat, ..] => GeoCoord::from_lon_lat(*lon, *lat),
            _ => Err(Error::parse(path, "position with fewer than two values")),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Ring::new(vertices))
}

fn polygon_from_rings(rings: &PolygonType, path: &Path) -> Result<Option<GeoPolygon>> {
    let Some((outer, holes)) = rings.split_first() else {
        return Ok(None);
    };
    let outer = ring_from_positions(outer, path)?;
    let holes = holes
        .iter()
        .map(|h| ring_from_positions(h, path))
        .collect::<Result<Vec<_>>>()?;
    Ok(Some(GeoPolygon::new(outer, holes)))
}

fn feature_polygons(geometry: &Geometry, path: &Path) -> Result<Vec<GeoPolygon>> {
    match &geometry.value {
        Value::Polygon(rings) => Ok(polygon_from_rings(rings, path)?.into_iter().collect()),
        Value::MultiPolygon(polys) => {
            let mut out = Vec::with_capacity(polys.len());
            for rings in polys {
                out.extend(polygon_from_rings(rings, path)?);
            }
            Ok(out)
        }
        Value::GeometryCollection(geometries) => {
            let mut out = Vec::new();
            for g in geometries {
                out.extend(feature_polygons(g, path)?);
            }
            Ok(out)
        }
        _ => Ok(Vec::new()),
    }
}

fn convert_feature(feature: geojson::Feature, path: &Path, out: &mut Vec<Feature>) -> Result<()> {
    let Some(geometry) = feature.geometry.as_ref() else {
        return Ok(());
    };
    // A string `name` property becomes the feature name; it is written back on save
    let mut properties: Properties = feature.properties.unwrap_or_default();
    let name = match properties.get("name") {
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        _ => None,
    };
    if name.is_some() {
        properties.remove("name");
    }

    for polygon in feature_polygons(geometry, path)? {
        out.push(Feature {
            name: name.clone(),
            polygon,
            properties: properties.clone(),
        });
    }
    Ok(())
}

/// Read a GeoJSON document (feature collection, feature or bare geometry)
pub fn parse(content: &str, path: &Path) -> Result<FeatureCollection> {
    let geojson: GeoJson = content.parse().map_err(|err| Error::parse(path, err))?;

    let mut features = Vec::new();
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            let total = fc.features.len();
            for feature in fc.features {
                convert_feature(feature, path, &mut features)?;
            }
            debug!(
                "Read {} polygon features from {} GeoJSON features in {}",
                features.len(),
                total,
                path.display()
            );
        }
        GeoJson::Feature(feature) => convert_feature(feature, path, &mut features)?,
        GeoJson::Geometry(geometry) => {
            features.extend(feature_polygons(&geometry, path)?.into_iter().map(Feature::new));
        }
    }

    Ok(FeatureCollection::new(features))
}

fn ring_positions(ring: &Ring) -> Vec<Vec<f64>> {
    ring.closed_vertices().map(|c| vec![c.lon(), c.lat()]).collect()
}

fn to_geojson_feature(feature: &Feature) -> geojson::Feature {
    let rings: PolygonType = feature
        .polygon
        .rings()
        .map(ring_positions)
        .collect();

    let mut properties = feature.properties.clone();
    if let Some(name) = &feature.name {
        properties
            .entry("name")
            .or_insert_with(|| serde_json::Value::String(name.clone()));
    }

    geojson::Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Polygon(rings))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Serialize features as a GeoJSON FeatureCollection
pub fn to_string(collection: &FeatureCollection) -> Result<String, serde_json::Error> {
    let fc = geojson::FeatureCollection {
        bbox: None,
        features: collection.iter().map(to_geojson_feature).collect(),
        foreign_members: None,
    };
    serde_json::to_string_pretty(&fc)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"name": "Edifício A", "floors": 12},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [
                        [[-40.2890, -20.3152], [-40.2888, -20.3152], [-40.2888, -20.3150], [-40.2890, -20.3150], [-40.2890, -20.3152]]
                    ]
                }
            },
            {
                "type": "Feature",
                "properties": {"kind": "pier"},
                "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1]]}
            },
            {
                "type": "Feature",
                "properties": null,
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[0, 0], [1, 0], [1, 1], [0, 0]]],
                        [[[2, 2], [4, 2], [4, 4], [2, 4], [2, 2]], [[2.5, 2.5], [3, 2.5], [3, 3], [2.5, 2.5]]]
                    ]
                }
            }
        ]
    }"#;

    #[test]
    fn test_parse() {
        let fc = parse(SAMPLE, Path::new("edificacoes.geojson")).unwrap();
        assert_eq!(fc.len(), 3);

        let a = &fc.features()[0];
        assert_eq!(a.name.as_deref(), Some("Edifício A"));
        assert_eq!(a.properties["floors"], serde_json::json!(12));
        assert_eq!(a.polygon.outer().len(), 4);

        assert!(fc.features()[1].properties.is_empty());
        assert_eq!(fc.features()[2].polygon.holes().len(), 1);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            parse("{not json", Path::new("x.geojson")),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn test_write_then_read() {
        let original = parse(SAMPLE, Path::new("edificacoes.geojson")).unwrap();
        let text = to_string(&original).unwrap();
        let reread = parse(&text, Path::new("out.geojson")).unwrap();
        assert_eq!(reread, original);
    }
}
