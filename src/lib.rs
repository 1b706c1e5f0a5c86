//! Offline builder for Mapbox Vector Tile pyramids.
//!
//! `mbvt-builder` turns WGS84 geometry (added directly or imported from
//! GeoJSON) into a pyramid of MVT-encoded tiles: it projects to spherical
//! Web Mercator, simplifies each zoom with Douglas-Peucker, clips every
//! feature to its tile (with an optional buffer), normalizes polygon
//! winding, quantizes to the tile's integer grid, and serializes the result
//! as MVT protobuf bytes.
//!
//! ## Building a pyramid
//!
//! ```rust
//! use std::ops::ControlFlow;
//! use mbvt_builder::{TileBuilder, geom::Point};
//!
//! let mut builder = TileBuilder::new(0, 2).unwrap();
//! let layer = builder.create_layer("points", None);
//! builder.add_multi_point(layer, vec![Point::new(0.0, 0.0)], vec![]);
//!
//! builder.build_tiles(|z, x, y, bytes| {
//!     println!("tile {z}/{x}/{y}: {} bytes", bytes.len());
//!     ControlFlow::Continue(())
//! }).unwrap();
//! ```
//!
//! ## Importing GeoJSON
//!
//! ```rust
//! use mbvt_builder::TileBuilder;
//!
//! let gj = r#"{"type":"Feature","properties":{"name":"origin"},
//!              "geometry":{"type":"Point","coordinates":[0,0]}}"#
//!     .parse()
//!     .unwrap();
//! let mut builder = TileBuilder::new(0, 0).unwrap();
//! builder.import_geojson(&gj).unwrap();
//! ```

mod builder;
pub mod clip;
pub mod error;
pub mod geom;
pub mod geojson;
pub mod layer;
mod mvt;
pub mod projection;
pub mod simplify;

pub use builder::{BuilderConfig, TileBuilder, YConvention};
pub use error::{Error, Result};
pub use layer::{Feature, Layer, LayerId, MultiLineString, MultiPoint, MultiPolygon, PropertyValue};
