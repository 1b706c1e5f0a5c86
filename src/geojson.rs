//! GeoJSON ingest: turns a `Feature` or `FeatureCollection` root into the
//! feature additions the [`crate::builder::TileBuilder`] understands.

use geojson::{Feature as GjFeature, GeoJson, Value as GjValue};
use serde_json::{Map, Value as JsonValue};

use crate::error::{Error, Result};
use crate::geom::{Geometry, Point};
use crate::layer::PropertyValue;
use crate::projection::wgs84_to_wm;

/// One ingested feature: projected geometry plus its restricted property bag.
pub struct IngestedFeature {
    pub geometry: Geometry,
    pub properties: Vec<(String, PropertyValue)>,
}

/// Parse a GeoJSON `Feature` or `FeatureCollection` into a sequence of
/// ingested features, projecting every coordinate via [`wgs84_to_wm`].
///
/// Any other root (a bare `Geometry`, for instance) is a fatal
/// [`Error::UnsupportedRoot`], matching the original importer which only
/// recognized `"Feature"` and `"FeatureCollection"` at the top level.
pub fn import_geojson(value: &GeoJson, earth_radius: f64) -> Result<Vec<IngestedFeature>> {
    match value {
        GeoJson::FeatureCollection(fc) => fc
            .features
            .iter()
            .map(|f| import_feature(f, earth_radius))
            .collect(),
        GeoJson::Feature(f) => Ok(vec![import_feature(f, earth_radius)?]),
        GeoJson::Geometry(_) => Err(Error::UnsupportedRoot),
    }
}

fn import_feature(feature: &GjFeature, earth_radius: f64) -> Result<IngestedFeature> {
    let geometry = feature
        .geometry
        .as_ref()
        .ok_or_else(|| Error::UnsupportedGeometryType("<missing geometry>".into()))?;
    let geometry = import_geometry(&geometry.value, earth_radius)?;

    let properties = match &feature.properties {
        Some(map) => import_properties(map)?,
        None => {
            log::warn!("GeoJSON feature had no `properties`; defaulting to an empty object");
            Vec::new()
        }
    };

    Ok(IngestedFeature {
        geometry,
        properties,
    })
}

fn import_geometry(value: &GjValue, earth_radius: f64) -> Result<Geometry> {
    let project = |pos: &[f64]| -> Result<Point> {
        let (lon, lat) = (
            pos.first().copied().unwrap_or(0.0),
            pos.get(1).copied().unwrap_or(0.0),
        );
        if !lon.is_finite() || !lat.is_finite() {
            return Err(Error::NonFiniteCoordinate);
        }
        Ok(wgs84_to_wm(lon, lat, earth_radius))
    };

    Ok(match value {
        GjValue::Point(pos) => Geometry::MultiPoint(vec![project(pos)?]),
        GjValue::MultiPoint(positions) => {
            let points = positions.iter().map(|p| project(p)).collect::<Result<_>>()?;
            Geometry::MultiPoint(points)
        }
        GjValue::LineString(line) => {
            let points = line.iter().map(|p| project(p)).collect::<Result<_>>()?;
            Geometry::MultiLineString(vec![points])
        }
        GjValue::MultiLineString(lines) => {
            let lines = lines
                .iter()
                .map(|line| line.iter().map(|p| project(p)).collect::<Result<_>>())
                .collect::<Result<_>>()?;
            Geometry::MultiLineString(lines)
        }
        GjValue::Polygon(rings) => {
            let rings = rings
                .iter()
                .map(|ring| project_ring(ring, &project))
                .collect::<Result<_>>()?;
            Geometry::MultiPolygon(vec![rings])
        }
        GjValue::MultiPolygon(polygons) => {
            let polygons = polygons
                .iter()
                .map(|rings| {
                    rings
                        .iter()
                        .map(|ring| project_ring(ring, &project))
                        .collect::<Result<_>>()
                })
                .collect::<Result<_>>()?;
            Geometry::MultiPolygon(polygons)
        }
        GjValue::GeometryCollection(_) => {
            return Err(Error::UnsupportedGeometryType("GeometryCollection".into()))
        }
    })
}

/// Drop the GeoJSON wire-form closing vertex (first == last) back to the
/// open-ring representation [`Geometry`] uses internally.
fn project_ring(ring: &[Vec<f64>], project: &impl Fn(&[f64]) -> Result<Point>) -> Result<Vec<Point>> {
    let mut points = ring.iter().map(|p| project(p)).collect::<Result<Vec<_>>>()?;
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    Ok(points)
}

fn import_properties(map: &Map<String, JsonValue>) -> Result<Vec<(String, PropertyValue)>> {
    map.iter()
        .map(|(key, value)| {
            let v = match value {
                JsonValue::Bool(b) => PropertyValue::Bool(*b),
                JsonValue::String(s) => PropertyValue::String(s.clone()),
                JsonValue::Number(n) => {
                    if let Some(i) = n.as_i64() {
                        PropertyValue::Int(i)
                    } else if let Some(f) = n.as_f64() {
                        PropertyValue::Double(f)
                    } else {
                        return Err(Error::UnsupportedPropertyValue(key.clone()));
                    }
                }
                JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => {
                    return Err(Error::UnsupportedPropertyValue(key.clone()))
                }
            };
            Ok((key.clone(), v))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const R: f64 = 6_378_137.0;

    #[test]
    fn rejects_bare_geometry_root() {
        let gj = GeoJson::from_str(r#"{"type": "Point", "coordinates": [1, 2]}"#).unwrap();
        assert!(matches!(import_geojson(&gj, R), Err(Error::UnsupportedRoot)));
    }

    #[test]
    fn rejects_geometry_collection() {
        let gj = GeoJson::from_str(
            r#"{"type": "Feature", "properties": {}, "geometry":
               {"type": "GeometryCollection", "geometries": []}}"#,
        )
        .unwrap();
        assert!(matches!(
            import_geojson(&gj, R),
            Err(Error::UnsupportedGeometryType(_))
        ));
    }

    #[test]
    fn rejects_non_scalar_property() {
        let gj = GeoJson::from_str(
            r#"{"type": "Feature", "properties": {"tags": [1,2]},
               "geometry": {"type": "Point", "coordinates": [0, 0]}}"#,
        )
        .unwrap();
        assert!(matches!(
            import_geojson(&gj, R),
            Err(Error::UnsupportedPropertyValue(_))
        ));
    }

    #[test]
    fn missing_properties_defaults_to_empty() {
        let gj = GeoJson::from_str(
            r#"{"type": "Feature", "geometry": {"type": "Point", "coordinates": [0, 0]}}"#,
        )
        .unwrap();
        let features = import_geojson(&gj, R).unwrap();
        assert_eq!(features.len(), 1);
        assert!(features[0].properties.is_empty());
    }

    #[test]
    fn polygon_drops_implicit_closing_vertex() {
        let gj = GeoJson::from_str(
            r#"{"type": "Feature", "properties": {}, "geometry":
               {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]}}"#,
        )
        .unwrap();
        let features = import_geojson(&gj, R).unwrap();
        let Geometry::MultiPolygon(polys) = &features[0].geometry else {
            panic!("expected polygon")
        };
        assert_eq!(polys[0][0].len(), 4);
    }

    #[test]
    fn feature_collection_imports_each_feature() {
        let gj = GeoJson::from_str(
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "properties": {"n": 1}, "geometry": {"type": "Point", "coordinates": [0,0]}},
                {"type": "Feature", "properties": {"n": 2}, "geometry": {"type": "Point", "coordinates": [1,1]}}
            ]}"#,
        )
        .unwrap();
        let features = import_geojson(&gj, R).unwrap();
        assert_eq!(features.len(), 2);
    }
}
