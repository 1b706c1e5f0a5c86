//! Wire-level representation of an MVT `Value` message, deduplicated per
//! layer in a `values` table (MVT spec 4.1).

use std::hash::{Hash, Hasher};

use crate::layer::PropertyValue;
use crate::mvt::pbf::PbufWriter;

/// An MVT-expressible property value, in the exact shape the `Value` message
/// wants it.
///
/// Signed integers always go out as `sint_value` (field 6, zig-zag), matching
/// the rest of this ecosystem's habit of never trusting `int_value`'s plain
/// varint encoding to stay small for negative numbers.
#[derive(Debug, Clone, PartialEq)]
pub enum TileValue {
    String(String),
    Double(f64),
    Sint(i64),
    Bool(bool),
}

impl From<&PropertyValue> for TileValue {
    fn from(v: &PropertyValue) -> Self {
        match v {
            PropertyValue::Bool(b) => TileValue::Bool(*b),
            PropertyValue::Int(i) => TileValue::Sint(*i),
            PropertyValue::Double(d) => TileValue::Double(*d),
            PropertyValue::String(s) => TileValue::String(s.clone()),
        }
    }
}

impl TileValue {
    /// Field numbers per the canonical `vector_tile.proto`:
    /// `string=1, float=2, double=3, int=4, uint=5, sint=6, bool=7`.
    pub fn encode(&self) -> PbufWriter {
        let mut w = PbufWriter::new();
        match self {
            TileValue::String(s) => w.write_string_field(1, s),
            TileValue::Double(d) => w.write_double_field(3, *d),
            TileValue::Sint(i) => w.write_sint_field(6, *i),
            TileValue::Bool(b) => w.write_bool_field(7, *b),
        }
        w
    }
}

// Treat doubles as bits so TileValue can key a dedup HashMap. Callers never
// feed NaN property values in from a `f64::is_finite()`-checked ingest path.
impl Eq for TileValue {}

impl Hash for TileValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            TileValue::String(s) => {
                0u8.hash(state);
                s.hash(state);
            }
            TileValue::Double(d) => {
                1u8.hash(state);
                d.to_bits().hash(state);
            }
            TileValue::Sint(i) => {
                2u8.hash(state);
                i.hash(state);
            }
            TileValue::Bool(b) => {
                3u8.hash(state);
                b.hash(state);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_encodes_as_field_seven_varint() {
        let w = TileValue::Bool(true).encode();
        assert_eq!(w.into_bytes(), vec![(7 << 3), 1]);
    }

    #[test]
    fn sint_zigzags_negative_values() {
        let w = TileValue::Sint(-1).encode();
        // field 6, varint wire type -> tag 0x30, then zigzag(-1) = 1
        assert_eq!(w.into_bytes(), vec![(6 << 3), 1]);
    }

    #[test]
    fn string_is_length_delimited() {
        let w = TileValue::String("hi".into()).encode();
        assert_eq!(w.into_bytes(), vec![(1 << 3) | 2, 2, b'h', b'i']);
    }

    #[test]
    fn distinct_variants_with_equal_bit_patterns_hash_differently() {
        use std::collections::hash_map::DefaultHasher;
        let hash_of = |v: &TileValue| {
            let mut h = DefaultHasher::new();
            v.hash(&mut h);
            h.finish()
        };
        // Sint(0) and Bool(false) both carry a zero payload; the discriminant
        // prefix keeps them from colliding in the layer's value table.
        assert_ne!(hash_of(&TileValue::Sint(0)), hash_of(&TileValue::Bool(false)));
    }

    #[test]
    fn from_property_value_maps_int_to_sint() {
        assert_eq!(TileValue::from(&PropertyValue::Int(-5)), TileValue::Sint(-5));
    }
}
