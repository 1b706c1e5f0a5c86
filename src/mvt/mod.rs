//! Mapbox Vector Tile wire encoding: command integers (spec 4.3), the
//! deduplicated per-layer value table (spec 4.1), and the hand-rolled
//! protobuf writer underneath both (spec 4.8).

pub mod commands;
mod encode;
mod pbf;
mod value;

pub use encode::{
    encode_multilinestring, encode_multipoint, encode_multipolygon, encode_tile, orient_ring,
    quantize, GeomType, TileLayerEncoder,
};
pub use value::TileValue;
