//! Tile command encoder (MVT spec 4.3): turns clipped, tile-local geometry
//! into MVT `Feature.geometry` command integers, normalizes polygon winding,
//! and accumulates a layer's deduplicated `keys`/`values` tables.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::layer::PropertyValue;
use crate::mvt::commands::{Command, CommandInteger, ParameterInteger};
use crate::mvt::pbf::PbufWriter;
use crate::mvt::value::TileValue;

/// A single `MoveTo`/`LineTo` command integer packs a count into 29 bits
/// (`count << 3 | id`); a ring or line with more vertices than this can't be
/// represented and is an [`Error::TooManyVertices`].
const MAX_COMMAND_COUNT: usize = (1 << 29) - 1;

fn check_command_count(n: usize) -> Result<()> {
    if n > MAX_COMMAND_COUNT {
        return Err(Error::TooManyVertices(n));
    }
    Ok(())
}

/// MVT `Tile.GeomType` enum: `UNKNOWN=0, POINT=1, LINESTRING=2, POLYGON=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeomType {
    Point = 1,
    LineString = 2,
    Polygon = 3,
}

/// A feature whose geometry has already been quantized to tile-local
/// integer coordinates, ready to be folded into a layer's feature list.
struct EncodedFeature {
    tags: Vec<u32>,
    geom_type: GeomType,
    geometry: Vec<u32>,
}

/// Accumulates one non-empty MVT layer for a single tile: its features plus
/// the deduplicated string/value tables every feature's tags index into.
pub struct TileLayerEncoder {
    name: String,
    extent: u32,
    keys: Vec<String>,
    key_index: HashMap<String, u32>,
    values: Vec<TileValue>,
    value_index: HashMap<TileValue, u32>,
    features: Vec<EncodedFeature>,
}

impl TileLayerEncoder {
    pub fn new(name: impl Into<String>, extent: u32) -> Self {
        TileLayerEncoder {
            name: name.into(),
            extent,
            keys: Vec::new(),
            key_index: HashMap::new(),
            values: Vec::new(),
            value_index: HashMap::new(),
            features: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    fn key_id(&mut self, key: &str) -> u32 {
        if let Some(&id) = self.key_index.get(key) {
            return id;
        }
        let id = self.keys.len() as u32;
        self.keys.push(key.to_string());
        self.key_index.insert(key.to_string(), id);
        id
    }

    fn value_id(&mut self, value: TileValue) -> u32 {
        if let Some(&id) = self.value_index.get(&value) {
            return id;
        }
        let id = self.values.len() as u32;
        self.value_index.insert(value.clone(), id);
        self.values.push(value);
        id
    }

    /// Register a feature's properties and quantized geometry commands.
    pub fn push_feature(
        &mut self,
        properties: &[(String, PropertyValue)],
        geom_type: GeomType,
        geometry: Vec<u32>,
    ) {
        let mut tags = Vec::with_capacity(properties.len() * 2);
        for (key, value) in properties {
            let key_id = self.key_id(key);
            let value_id = self.value_id(TileValue::from(value));
            tags.push(key_id);
            tags.push(value_id);
        }
        self.features.push(EncodedFeature {
            tags,
            geom_type,
            geometry,
        });
    }

    /// Serialize this layer as an MVT `Layer` message (field 1=name, 2=features,
    /// 3=keys, 4=values, 5=extent; `version` is field 15).
    fn encode(&self) -> PbufWriter {
        let mut w = PbufWriter::new();
        w.write_string_field(1, &self.name);
        for feature in &self.features {
            let mut fw = PbufWriter::new();
            fw.write_packed_uint32_field(2, &feature.tags);
            fw.write_varint_field(3, feature.geom_type as u64);
            fw.write_packed_uint32_field(4, &feature.geometry);
            w.write_message_field(2, &fw);
        }
        for key in &self.keys {
            w.write_string_field(3, key);
        }
        for value in &self.values {
            w.write_message_field(4, &value.encode());
        }
        w.write_varint_field(5, self.extent as u64);
        w.write_varint_field(15, 2); // MVT spec version 2
        w
    }
}

/// Serialize a whole `Tile` message (field 3, repeated `Layer layers`) from
/// its non-empty per-layer encoders.
pub fn encode_tile(layers: &[TileLayerEncoder]) -> Vec<u8> {
    let mut w = PbufWriter::new();
    for layer in layers {
        w.write_message_field(3, &layer.encode());
    }
    w.into_bytes()
}

/// Quantize a tile-local continuous coordinate `(u, v)` to the tile's integer
/// `0..extent` space (MVT spec 4.3 step 1).
pub fn quantize(u: f64, v: f64, extent: u32) -> (i32, i32) {
    ((u * extent as f64).round() as i32, (v * extent as f64).round() as i32)
}

/// Running pen position plus the command buffer it writes deltas into.
#[derive(Default)]
struct Pen {
    x: i32,
    y: i32,
}

impl Pen {
    fn delta_to(&mut self, commands: &mut Vec<u32>, point: (i32, i32)) {
        commands.push(ParameterInteger::from(point.0.wrapping_sub(self.x)));
        commands.push(ParameterInteger::from(point.1.wrapping_sub(self.y)));
        self.x = point.0;
        self.y = point.1;
    }
}

/// `MultiPoint` template: a single `MoveTo(count=N)` followed by `N` deltas.
pub fn encode_multipoint(points: &[(i32, i32)]) -> Result<Vec<u32>> {
    check_command_count(points.len())?;
    let mut commands = Vec::with_capacity(1 + points.len() * 2);
    let mut pen = Pen::default();
    commands.push(CommandInteger::from(Command::MoveTo, points.len() as u32));
    for &p in points {
        pen.delta_to(&mut commands, p);
    }
    Ok(commands)
}

/// `LineString` template for one polyline fragment: `MoveTo(1)` + delta,
/// `LineTo(N-1)` + deltas. Assumes `line.len() >= 2`.
fn encode_line(commands: &mut Vec<u32>, pen: &mut Pen, line: &[(i32, i32)]) -> Result<()> {
    check_command_count(line.len() - 1)?;
    commands.push(CommandInteger::from(Command::MoveTo, 1));
    pen.delta_to(commands, line[0]);
    commands.push(CommandInteger::from(Command::LineTo, (line.len() - 1) as u32));
    for &p in &line[1..] {
        pen.delta_to(commands, p);
    }
    Ok(())
}

/// Encode a `MultiLineString` as one command sequence covering every
/// fragment in turn, sharing a single running pen position.
pub fn encode_multilinestring(lines: &[Vec<(i32, i32)>]) -> Result<Vec<u32>> {
    let mut commands = Vec::new();
    let mut pen = Pen::default();
    for line in lines {
        if line.len() < 2 {
            continue;
        }
        encode_line(&mut commands, &mut pen, line)?;
    }
    Ok(commands)
}

/// `Polygon ring` template: `MoveTo(1)` + delta, `LineTo(N-1)` + deltas,
/// `ClosePath(1)`. The ring is stored open; its implicit closing edge is the
/// `ClosePath` command, not an explicit repeated vertex.
fn encode_ring(commands: &mut Vec<u32>, pen: &mut Pen, ring: &[(i32, i32)]) -> Result<()> {
    check_command_count(ring.len() - 1)?;
    commands.push(CommandInteger::from(Command::MoveTo, 1));
    pen.delta_to(commands, ring[0]);
    commands.push(CommandInteger::from(Command::LineTo, (ring.len() - 1) as u32));
    for &p in &ring[1..] {
        pen.delta_to(commands, p);
    }
    commands.push(CommandInteger::from(Command::ClosePath, 1));
    Ok(())
}

/// Twice the signed area of a closed ring (shoelace formula), in quantized
/// tile-local coordinates. Sign indicates winding; magnitude is unused.
fn signed_area_x2(ring: &[(i32, i32)]) -> i64 {
    let n = ring.len();
    let mut sum: i64 = 0;
    for i in 0..n {
        let (x1, y1) = ring[i];
        let (x2, y2) = ring[(i + 1) % n];
        sum += x1 as i64 * y2 as i64 - x2 as i64 * y1 as i64;
    }
    sum
}

/// Reverse `ring` if its winding disagrees with its role: exterior rings
/// (`is_exterior`) must carry a positive signed area in tile-pixel
/// coordinates (clockwise in screen space, since `v` already increases
/// downward post-flip, reads as a positive shoelace sum); holes must carry a
/// negative one.
pub fn orient_ring(mut ring: Vec<(i32, i32)>, is_exterior: bool) -> Vec<(i32, i32)> {
    let area2 = signed_area_x2(&ring);
    if (area2 > 0) != is_exterior {
        ring.reverse();
    }
    ring
}

/// Encode a `MultiPolygon` as one command sequence covering every polygon's
/// rings (already oriented via [`orient_ring`]) in turn.
pub fn encode_multipolygon(polygons: &[Vec<Vec<(i32, i32)>>]) -> Result<Vec<u32>> {
    let mut commands = Vec::new();
    let mut pen = Pen::default();
    for polygon in polygons {
        for ring in polygon {
            if ring.len() < 3 {
                continue;
            }
            encode_ring(&mut commands, &mut pen, ring)?;
        }
    }
    Ok(commands)
}
