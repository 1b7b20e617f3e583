//! KML reader and writer.
//!
//! Every `Placemark` carrying polygon geometry becomes one feature per
//! polygon. `ExtendedData` (`Data`/`value` and `SchemaData`/`SimpleData`)
//! is read into string properties; other Placemark children are ignored.

use std::io::Write;
use std::path::Path;

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Feature, FeatureCollection, GeoCoord, GeoPolygon, Properties, Ring};

#[derive(Default)]
struct PlacemarkState {
    name: Option<String>,
    properties: Properties,
    polygons: Vec<GeoPolygon>,
}

#[derive(Default)]
struct PolygonState {
    outer: Option<Ring>,
    holes: Vec<Ring>,
}

fn name_attribute(e: &BytesStart<'_>, path: &Path) -> Result<Option<String>> {
    match e.try_get_attribute("name").map_err(|err| Error::parse(path, err))? {
        Some(attr) => {
            let value = attr.unescape_value().map_err(|err| Error::parse(path, err))?;
            Ok(Some(value.into_owned()))
        }
        None => Ok(None),
    }
}

/// Parse "lon,lat[,alt] lon,lat[,alt] ..." into a ring
fn parse_coordinates(text: &str, path: &Path) -> Result<Ring> {
    let mut vertices = Vec::new();
    for tuple in text.split_whitespace() {
        let mut parts = tuple.split(',');
        let mut next = || -> Result<f64> {
            parts
                .next()
                .ok_or_else(|| Error::parse(path, format!("incomplete coordinate '{}'", tuple)))?
                .trim()
                .parse::<f64>()
                .map_err(|err| Error::parse(path, format!("bad coordinate '{}': {}", tuple, err)))
        };
        let lon = next()?;
        let lat = next()?;
        vertices.push(GeoCoord::from_lon_lat(lon, lat)?);
    }
    Ok(Ring::new(vertices))
}

/// Read a KML document into features, in document order
pub fn parse(content: &str, path: &Path) -> Result<FeatureCollection> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<String> = Vec::new();
    let mut text = String::new();
    let mut placemark: Option<PlacemarkState> = None;
    let mut polygon: Option<PolygonState> = None;
    let mut data_name: Option<String> = None;
    let mut features = Vec::new();
    let mut skipped = 0usize;

    loop {
        match reader.read_event().map_err(|err| Error::parse(path, err))? {
            Event::Start(e) => {
                let local = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                match local.as_str() {
                    "Placemark" => placemark = Some(PlacemarkState::default()),
                    "Polygon" if placemark.is_some() => polygon = Some(PolygonState::default()),
                    "Data" | "SimpleData" => data_name = name_attribute(&e, path)?,
                    _ => {}
                }
                stack.push(local);
                text.clear();
            }
            Event::Text(t) => {
                let unescaped = t.unescape().map_err(|err| Error::parse(path, err))?;
                text.push_str(&unescaped);
            }
            Event::CData(t) => text.push_str(&String::from_utf8_lossy(&t)),
            Event::End(e) => {
                let local = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                stack.pop();
                let parent = stack.last().map(String::as_str);

                match local.as_str() {
                    "name" if parent == Some("Placemark") => {
                        if let Some(pm) = placemark.as_mut() {
                            let name = text.trim();
                            if !name.is_empty() {
                                pm.name = Some(name.to_string());
                            }
                        }
                    }
                    "value" if parent == Some("Data") => {
                        if let (Some(pm), Some(key)) = (placemark.as_mut(), data_name.as_ref()) {
                            pm.properties
                                .insert(key.clone(), Value::String(text.trim().to_string()));
                        }
                    }
                    "SimpleData" => {
                        if let (Some(pm), Some(key)) = (placemark.as_mut(), data_name.take()) {
                            pm.properties
                                .insert(key, Value::String(text.trim().to_string()));
                        }
                    }
                    "Data" => data_name = None,
                    "coordinates" => {
                        if let Some(poly) = polygon.as_mut() {
                            let ring = parse_coordinates(&text, path)?;
                            let boundary = stack
                                .iter()
                                .map(String::as_str)
                                .rev()
                                .find(|s| matches!(*s, "outerBoundaryIs" | "innerBoundaryIs"));
                            match boundary {
                                Some("outerBoundaryIs") => poly.outer = Some(ring),
                                Some(_) => poly.holes.push(ring),
                                None => {}
                            }
                        }
                    }
                    "Polygon" => {
                        if let (Some(poly), Some(pm)) = (polygon.take(), placemark.as_mut()) {
                            if let Some(outer) = poly.outer {
                                pm.polygons.push(GeoPolygon::new(outer, poly.holes));
                            }
                        }
                    }
                    "Placemark" => {
                        if let Some(pm) = placemark.take() {
                            if pm.polygons.is_empty() {
                                skipped += 1;
                            }
                            for poly in pm.polygons {
                                features.push(Feature {
                                    name: pm.name.clone(),
                                    polygon: poly,
                                    properties: pm.properties.clone(),
                                });
                            }
                        }
                    }
                    _ => {}
                }
                text.clear();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if skipped > 0 {
        debug!(
            "Skipped {} placemarks without polygon geometry in {}",
            skipped,
            path.display()
        );
    }

    Ok(FeatureCollection::new(features))
}

fn property_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn write_ring<W: Write>(out: &mut W, tag: &str, ring: &Ring) -> std::io::Result<()> {
    write!(out, "        <{}><LinearRing><coordinates>", tag)?;
    for (i, c) in ring.closed_vertices().enumerate() {
        if i > 0 {
            write!(out, " ")?;
        }
        write!(out, "{},{}", c.lon(), c.lat())?;
    }
    writeln!(out, "</coordinates></LinearRing></{}>", tag)
}

/// Write features as a KML 2.2 document
pub fn write<W: Write>(collection: &FeatureCollection, out: &mut W) -> std::io::Result<()> {
    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(out, r#"<kml xmlns="http://www.opengis.net/kml/2.2">"#)?;
    writeln!(out, "<Document>")?;

    for feature in collection {
        writeln!(out, "  <Placemark>")?;
        if let Some(name) = &feature.name {
            writeln!(out, "    <name>{}</name>", escape(name.as_str()))?;
        }
        if !feature.properties.is_empty() {
            writeln!(out, "    <ExtendedData>")?;
            for (key, value) in &feature.properties {
                writeln!(
                    out,
                    r#"      <Data name="{}"><value>{}</value></Data>"#,
                    escape(key.as_str()),
                    escape(property_text(value).as_str())
                )?;
            }
            writeln!(out, "    </ExtendedData>")?;
        }
        writeln!(out, "    <Polygon>")?;
        write_ring(out, "outerBoundaryIs", feature.polygon.outer())?;
        for hole in feature.polygon.holes() {
            write_ring(out, "innerBoundaryIs", hole)?;
        }
        writeln!(out, "    </Polygon>")?;
        writeln!(out, "  </Placemark>")?;
    }

    writeln!(out, "</Document>")?;
    writeln!(out, "</kml>")
}
