//! Error and Result types.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("zoom range invalid: minZoom={min_zoom} maxZoom={max_zoom} (expected 0 <= min <= max <= 24)")]
    InvalidZoomRange { min_zoom: i32, max_zoom: i32 },
    #[error("layer buffer must be finite and non-negative, got {0}")]
    InvalidBuffer(f64),
    #[error("tile extent must be > 0, got {0}")]
    InvalidExtent(i32),
    #[error("GeoJSON root must be a Feature or FeatureCollection")]
    UnsupportedRoot,
    #[error("unsupported GeoJSON geometry type `{0}`")]
    UnsupportedGeometryType(String),
    #[error("unsupported property value for key `{0}`")]
    UnsupportedPropertyValue(String),
    #[error("non-finite coordinate encountered during ingest")]
    NonFiniteCoordinate,
    #[error("ring exceeds maximum encodable vertex count ({0} > 2^29)")]
    TooManyVertices(usize),
    #[error("GeoJSON parse error: {0}")]
    GeoJson(#[from] geojson::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
