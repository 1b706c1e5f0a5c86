//! Layer store: an ordered collection of layers, each owning its features and
//! an aggregate bounding box that only ever grows.

use crate::geom::{Bounds, Geometry, Point};

/// Identifies a [`Layer`] within a [`crate::TileBuilder`] by insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerId(pub(crate) usize);

/// An MVT-expressible feature property value.
///
/// This is a restriction of arbitrary JSON to the scalar set the MVT wire
/// format can represent; anything else is rejected at ingest.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
}

/// A single feature: its geometry (already in Web-Mercator meters), its
/// cached bounding box, and its property bag.
#[derive(Debug, Clone)]
pub struct Feature {
    pub bounds: Bounds,
    pub geometry: Geometry,
    pub properties: Vec<(String, PropertyValue)>,
}

impl Feature {
    pub fn new(geometry: Geometry, properties: Vec<(String, PropertyValue)>) -> Self {
        let bounds = geometry.bounds();
        Feature {
            bounds,
            geometry,
            properties,
        }
    }
}

/// An ordered, named group of features sharing a clip buffer.
#[derive(Debug, Clone)]
pub struct Layer {
    pub id: String,
    pub buffer: f64,
    pub bounds: Bounds,
    pub features: Vec<Feature>,
}

impl Layer {
    pub fn new(id: impl Into<String>, buffer: f64) -> Self {
        Layer {
            id: id.into(),
            buffer,
            bounds: Bounds::empty(),
            features: Vec::new(),
        }
    }

    pub fn push_feature(&mut self, feature: Feature) {
        self.bounds.add(&feature.bounds);
        self.features.push(feature);
    }
}

/// Coordinates for an [`crate::TileBuilder::add_multi_point`]-style call: already
/// projected points, no further structure.
pub type MultiPoint = Vec<Point>;
/// Coordinates for a multi-line-string add: a sequence of polylines.
pub type MultiLineString = Vec<Vec<Point>>;
/// Coordinates for a multi-polygon add: a sequence of polygons, each a
/// sequence of rings (exterior first, then holes).
pub type MultiPolygon = Vec<Vec<Vec<Point>>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pushing_features_only_grows_bounds() {
        let mut layer = Layer::new("roads", 0.1);
        layer.push_feature(Feature::new(
            Geometry::MultiPoint(vec![Point::new(1.0, 1.0)]),
            vec![],
        ));
        let after_first = layer.bounds;
        layer.push_feature(Feature::new(
            Geometry::MultiPoint(vec![Point::new(-5.0, 0.0)]),
            vec![],
        ));
        assert!(layer.bounds.min.x <= after_first.min.x);
        assert!(layer.bounds.max.x >= after_first.max.x);
        assert_eq!(layer.bounds.min, Point::new(-5.0, 0.0));
        assert_eq!(layer.bounds.max, Point::new(1.0, 1.0));
    }

    #[test]
    fn new_layer_has_empty_bounds() {
        let layer = Layer::new("", 0.1);
        assert!(layer.bounds.is_empty());
        assert!(layer.features.is_empty());
    }
}
