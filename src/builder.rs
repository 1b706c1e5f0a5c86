//! Tile builder orchestrator: the per-zoom loop that simplifies, determines
//! the covered tile range, clips and encodes each tile's features, and hands
//! the serialized bytes to the caller's handler.

use std::f64::consts::PI;
use std::ops::ControlFlow;

use geojson::GeoJson;

use crate::clip::{clip_line_string, clip_polygon_ring, test_point};
use crate::error::{Error, Result};
use crate::geojson::import_geojson;
use crate::geom::{Bounds, Geometry, Point};
use crate::layer::{
    Feature, Layer, LayerId, MultiLineString, MultiPoint, MultiPolygon, PropertyValue,
};
use crate::mvt::{
    encode_multilinestring, encode_multipoint, encode_multipolygon, encode_tile, orient_ring,
    quantize, GeomType, TileLayerEncoder,
};
use crate::projection::world_bounds;
use crate::simplify::{simplify_line_string, simplify_polygon_ring};

/// Which way `build_tiles` numbers the y-axis of the tiles it hands to the
/// caller's handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YConvention {
    /// `y` increases northward, matching the raw Web-Mercator-meters axis.
    Native,
    /// `y` increases southward: the de-facto slippy-map / XYZ convention
    /// used by tile servers, MBTiles, and most slippy-map clients.
    #[default]
    Xyz,
}

/// Validated configuration for a [`TileBuilder`].
#[derive(Debug, Clone, Copy)]
pub struct BuilderConfig {
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub default_layer_buffer: f64,
    pub tile_extent: u32,
    pub simplification_factor: f64,
    pub earth_radius: f64,
    pub y_convention: YConvention,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        let tile_extent = 4096;
        BuilderConfig {
            min_zoom: 0,
            max_zoom: 0,
            default_layer_buffer: 0.1,
            tile_extent,
            simplification_factor: 1.0 / tile_extent as f64,
            earth_radius: 6_378_137.0,
            y_convention: YConvention::Xyz,
        }
    }
}

/// Offline builder: accumulates layers and features, then renders them to an
/// MVT tile pyramid via [`TileBuilder::build_tiles`].
///
/// Features and layers are append-only up to `build_tiles`, which itself
/// operates on a private working copy so the builder remains usable
/// afterwards.
pub struct TileBuilder {
    config: BuilderConfig,
    layers: Vec<Layer>,
    current_layer: usize,
}

impl TileBuilder {
    /// Build with the default configuration, overriding only the zoom range.
    pub fn new(min_zoom: u8, max_zoom: u8) -> Result<Self> {
        Self::with_config(BuilderConfig {
            min_zoom,
            max_zoom,
            ..BuilderConfig::default()
        })
    }

    /// Build with a fully specified configuration, validated eagerly: an
    /// out-of-range zoom pair or buffer is rejected here, never discovered
    /// lazily at `build_tiles` time.
    pub fn with_config(config: BuilderConfig) -> Result<Self> {
        if config.min_zoom > config.max_zoom || config.max_zoom > 24 {
            return Err(Error::InvalidZoomRange {
                min_zoom: config.min_zoom as i32,
                max_zoom: config.max_zoom as i32,
            });
        }
        if config.tile_extent == 0 {
            return Err(Error::InvalidExtent(config.tile_extent as i32));
        }
        if !config.default_layer_buffer.is_finite() || config.default_layer_buffer < 0.0 {
            return Err(Error::InvalidBuffer(config.default_layer_buffer));
        }
        let initial = Layer::new("", config.default_layer_buffer);
        Ok(TileBuilder {
            config,
            layers: vec![initial],
            current_layer: 0,
        })
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Append a new layer and make it the target of the `*_to_current_layer`
    /// convenience adders.
    pub fn create_layer(&mut self, id: &str, buffer: Option<f64>) -> LayerId {
        let buffer = buffer.unwrap_or(self.config.default_layer_buffer);
        self.layers.push(Layer::new(id, buffer));
        self.current_layer = self.layers.len() - 1;
        LayerId(self.current_layer)
    }

    fn layer_mut(&mut self, id: LayerId) -> &mut Layer {
        &mut self.layers[id.0]
    }

    pub fn add_multi_point(
        &mut self,
        layer: LayerId,
        coords: MultiPoint,
        properties: Vec<(String, PropertyValue)>,
    ) {
        let feature = Feature::new(Geometry::MultiPoint(coords), properties);
        self.layer_mut(layer).push_feature(feature);
    }

    pub fn add_multi_line_string(
        &mut self,
        layer: LayerId,
        coords: MultiLineString,
        properties: Vec<(String, PropertyValue)>,
    ) {
        let feature = Feature::new(Geometry::MultiLineString(coords), properties);
        self.layer_mut(layer).push_feature(feature);
    }

    pub fn add_multi_polygon(
        &mut self,
        layer: LayerId,
        coords: MultiPolygon,
        properties: Vec<(String, PropertyValue)>,
    ) {
        let feature = Feature::new(Geometry::MultiPolygon(coords), properties);
        self.layer_mut(layer).push_feature(feature);
    }

    /// The original importer's implicit target: whichever layer
    /// `create_layer` last created (the initial unnamed layer if none has
    /// been created yet).
    fn current_layer_id(&self) -> LayerId {
        LayerId(self.current_layer)
    }

    pub fn add_multi_point_to_current_layer(
        &mut self,
        coords: MultiPoint,
        properties: Vec<(String, PropertyValue)>,
    ) {
        self.add_multi_point(self.current_layer_id(), coords, properties);
    }

    pub fn add_multi_line_string_to_current_layer(
        &mut self,
        coords: MultiLineString,
        properties: Vec<(String, PropertyValue)>,
    ) {
        self.add_multi_line_string(self.current_layer_id(), coords, properties);
    }

    pub fn add_multi_polygon_to_current_layer(
        &mut self,
        coords: MultiPolygon,
        properties: Vec<(String, PropertyValue)>,
    ) {
        self.add_multi_polygon(self.current_layer_id(), coords, properties);
    }

    /// Parse a GeoJSON `Feature` or `FeatureCollection`, projecting every
    /// coordinate to Web-Mercator meters, and append the results to the
    /// current layer (the same implicit target `add_multi_*` uses).
    pub fn import_geojson(&mut self, value: &GeoJson) -> Result<()> {
        let ingested = import_geojson(value, self.config.earth_radius)?;
        let layer = self.layer_mut(self.current_layer_id());
        for f in ingested {
            layer.push_feature(Feature::new(f.geometry, f.properties));
        }
        Ok(())
    }

    fn tolerance_for_zoom(&self, z: u8) -> f64 {
        tile_size_for_zoom(z, self.config.earth_radius) * self.config.simplification_factor
    }

    /// Render every configured zoom, from `max_zoom` down to `min_zoom`,
    /// feeding each non-empty tile to `handler`. The handler may return
    /// `ControlFlow::Break` to stop early; `build_tiles` then returns `Ok(())`
    /// without rendering the remaining zooms.
    pub fn build_tiles(
        &self,
        mut handler: impl FnMut(u8, u32, u32, Vec<u8>) -> ControlFlow<()>,
    ) -> Result<()> {
        log::debug!(
            "build_tiles: zoom {}..={} over {} layers",
            self.config.min_zoom,
            self.config.max_zoom,
            self.layers.len()
        );
        let mut working: Vec<Layer> = self.layers.clone();
        for z in (self.config.min_zoom..=self.config.max_zoom).rev() {
            if let ControlFlow::Break(()) = self.build_tiles_for_zoom(z, &mut working, &mut handler)? {
                return Ok(());
            }
        }
        Ok(())
    }

    /// Render a single zoom against a (possibly already-simplified) working
    /// copy of the layers, mutating it in place so the caller can drive the
    /// zoom loop itself (e.g. to parallelize per-zoom work, per §5).
    pub fn build_tiles_for_zoom(
        &self,
        z: u8,
        layers: &mut [Layer],
        handler: &mut dyn FnMut(u8, u32, u32, Vec<u8>) -> ControlFlow<()>,
    ) -> Result<ControlFlow<()>> {
        let tolerance = self.tolerance_for_zoom(z);
        for layer in layers.iter_mut() {
            simplify_layer(layer, tolerance);
        }

        let world = world_bounds(self.config.earth_radius);
        let tile_size = tile_size_for_zoom(z, self.config.earth_radius);
        let tiles_per_axis = 1u32 << z;

        let mut expanded = Bounds::empty();
        for layer in layers.iter() {
            if layer.features.is_empty() {
                continue;
            }
            expanded.add(&layer.bounds.expanded(layer.buffer * tile_size));
        }
        if expanded.is_empty() {
            log::debug!("zoom {z}: no candidate tiles (no features)");
            return Ok(ControlFlow::Continue(()));
        }

        // Upper bound is `floor(x) + 1`, not `ceil(x)`: they agree except when
        // `x` lands exactly on a tile boundary, where `ceil` would collapse
        // the range to empty and silently drop a tile the feature still
        // touches (reachable with buffer = 0 and a feature on a tile edge).
        let clamp_index = |v: f64| v.clamp(0.0, tiles_per_axis as f64) as u32;
        let tile_x0 = clamp_index(((expanded.min.x - world.min.x) / tile_size).floor());
        let tile_x1 = clamp_index(((expanded.max.x - world.min.x) / tile_size).floor() + 1.0);
        let tile_y0 = clamp_index(((expanded.min.y - world.min.y) / tile_size).floor());
        let tile_y1 = clamp_index(((expanded.max.y - world.min.y) / tile_size).floor() + 1.0);
        log::debug!(
            "zoom {z}: tolerance={tolerance:.6} candidate tiles x[{tile_x0}..{tile_x1}) y[{tile_y0}..{tile_y1})"
        );

        for native_y in tile_y0..tile_y1 {
            for tile_x in tile_x0..tile_x1 {
                let mut encoders: Vec<TileLayerEncoder> = Vec::new();
                for layer in layers.iter() {
                    if layer.features.is_empty() {
                        continue;
                    }
                    let tile_origin = Point::new(
                        tile_x as f64 * tile_size + world.min.x,
                        native_y as f64 * tile_size + world.min.y,
                    );
                    let buffer_m = layer.buffer * tile_size;
                    let tile_bounds = Bounds {
                        min: Point::new(tile_origin.x - buffer_m, tile_origin.y - buffer_m),
                        max: Point::new(
                            tile_origin.x + tile_size + buffer_m,
                            tile_origin.y + tile_size + buffer_m,
                        ),
                    };
                    let mut encoder = TileLayerEncoder::new(layer.id.clone(), self.config.tile_extent);
                    for feature in &layer.features {
                        if !feature.bounds.intersects(&tile_bounds) {
                            continue;
                        }
                        encode_feature_into(
                            feature,
                            tile_origin,
                            tile_size,
                            self.config.tile_extent,
                            &tile_bounds,
                            &mut encoder,
                        )?;
                    }
                    if !encoder.is_empty() {
                        encoders.push(encoder);
                    }
                }
                if encoders.is_empty() {
                    continue;
                }
                let bytes = encode_tile(&encoders);
                let exposed_y = match self.config.y_convention {
                    YConvention::Native => native_y,
                    YConvention::Xyz => tiles_per_axis - 1 - native_y,
                };
                log::trace!("tile z={z} x={tile_x} y={exposed_y}: {} bytes", bytes.len());
                if let ControlFlow::Break(()) = handler(z, tile_x, exposed_y, bytes) {
                    return Ok(ControlFlow::Break(()));
                }
            }
        }
        Ok(ControlFlow::Continue(()))
    }
}

fn tile_size_for_zoom(z: u8, earth_radius: f64) -> f64 {
    2.0 * PI * earth_radius / (1u64 << z) as f64
}

/// Simplify every feature in `layer` with `tolerance`, dropping rings that
/// fall below 3 vertices and polygons whose exterior vanishes (spec 3/4.2),
/// then recompute bounds. Simplification only removes vertices, so a
/// feature's recomputed bounds is always a subset of its previous one — this
/// never causes a feature to wrongly disappear from a tile it still touches.
fn simplify_layer(layer: &mut Layer, tolerance: f64) {
    for feature in layer.features.iter_mut() {
        feature.geometry = simplify_geometry(&feature.geometry, tolerance);
        feature.bounds = feature.geometry.bounds();
    }
    let mut bounds = Bounds::empty();
    for feature in &layer.features {
        bounds.add(&feature.bounds);
    }
    layer.bounds = bounds;
}

fn simplify_geometry(geometry: &Geometry, tolerance: f64) -> Geometry {
    match geometry {
        Geometry::MultiPoint(points) => Geometry::MultiPoint(points.clone()),
        Geometry::MultiLineString(lines) => Geometry::MultiLineString(
            lines
                .iter()
                .map(|l| simplify_line_string(l, tolerance))
                .filter(|l| l.len() >= 2)
                .collect(),
        ),
        Geometry::MultiPolygon(polygons) => Geometry::MultiPolygon(
            polygons
                .iter()
                .filter_map(|polygon| {
                    let (exterior, holes) = polygon.split_first()?;
                    let exterior = simplify_polygon_ring(exterior, tolerance);
                    if exterior.len() < 3 {
                        log::trace!("dropping polygon: exterior vanished under simplification");
                        return None;
                    }
                    let mut rings = vec![exterior];
                    for hole in holes {
                        let hole = simplify_polygon_ring(hole, tolerance);
                        if hole.len() >= 3 {
                            rings.push(hole);
                        } else {
                            log::trace!("dropping hole ring: vanished under simplification");
                        }
                    }
                    Some(rings)
                })
                .collect(),
        ),
    }
}

/// Clip, quantize, orient, and push one feature's geometry into `encoder`,
/// for the tile whose unbuffered origin is `tile_origin` and whose
/// buffer-expanded clip rectangle is `tile_bounds` (both in WM meters).
fn encode_feature_into(
    feature: &Feature,
    tile_origin: Point,
    tile_size: f64,
    extent: u32,
    tile_bounds: &Bounds,
    encoder: &mut TileLayerEncoder,
) -> Result<()> {
    // u increases eastward, v increases southward (downward in tile-pixel
    // space) even though WM meters increase northward: this is the flip
    // the encoder spec calls for independent of tile (x, y) numbering.
    let to_local = |p: Point| -> (i32, i32) {
        let u = (p.x - tile_origin.x) / tile_size;
        let v = 1.0 - (p.y - tile_origin.y) / tile_size;
        quantize(u, v, extent)
    };

    match &feature.geometry {
        Geometry::MultiPoint(points) => {
            let survivors: Vec<(i32, i32)> = points
                .iter()
                .filter(|p| test_point(**p, tile_bounds))
                .map(|p| to_local(*p))
                .collect();
            if survivors.is_empty() {
                return Ok(());
            }
            let commands = encode_multipoint(&survivors)?;
            encoder.push_feature(&feature.properties, GeomType::Point, commands);
        }
        Geometry::MultiLineString(lines) => {
            let mut fragments = Vec::new();
            for line in lines {
                for fragment in clip_line_string(line, tile_bounds) {
                    if fragment.len() < 2 {
                        continue;
                    }
                    fragments.push(fragment.into_iter().map(to_local).collect::<Vec<_>>());
                }
            }
            if fragments.is_empty() {
                return Ok(());
            }
            let commands = encode_multilinestring(&fragments)?;
            encoder.push_feature(&feature.properties, GeomType::LineString, commands);
        }
        Geometry::MultiPolygon(polygons) => {
            let mut encoded_polygons = Vec::new();
            for polygon in polygons {
                let Some((exterior, holes)) = polygon.split_first() else {
                    continue;
                };
                let clipped_exterior = clip_polygon_ring(exterior, tile_bounds);
                if clipped_exterior.len() < 3 {
                    // Exterior vanished under clipping: the whole polygon,
                    // holes included, is dropped (spec 4.3/3).
                    log::trace!("dropping polygon: exterior vanished under clipping");
                    continue;
                }
                let mut rings = Vec::with_capacity(1 + holes.len());
                rings.push(orient_ring(
                    clipped_exterior.into_iter().map(to_local).collect(),
                    true,
                ));
                for hole in holes {
                    let clipped_hole = clip_polygon_ring(hole, tile_bounds);
                    if clipped_hole.len() < 3 {
                        log::trace!("dropping hole ring: vanished under clipping");
                        continue;
                    }
                    rings.push(orient_ring(
                        clipped_hole.into_iter().map(to_local).collect(),
                        false,
                    ));
                }
                encoded_polygons.push(rings);
            }
            if encoded_polygons.is_empty() {
                return Ok(());
            }
            let commands = encode_multipolygon(&encoded_polygons)?;
            encoder.push_feature(&feature.properties, GeomType::Polygon, commands);
        }
    }
    Ok(())
}
