//! Black-box tests of the tile pyramid against the public `TileBuilder` API.

use std::ops::ControlFlow;

use mbvt_builder::{BuilderConfig, TileBuilder};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn collect(builder: &TileBuilder) -> Vec<(u8, u32, u32, Vec<u8>)> {
    let mut tiles = Vec::new();
    builder
        .build_tiles(|z, x, y, bytes| {
            tiles.push((z, x, y, bytes));
            ControlFlow::Continue(())
        })
        .unwrap();
    tiles
}

#[test]
fn single_point_renders_across_every_zoom() {
    init_logging();
    let mut builder = TileBuilder::new(0, 3).unwrap();
    let layer = builder.create_layer("poi", None);
    builder.add_multi_point(layer, vec![mbvt_builder::geom::Point::new(0.0, 0.0)], vec![]);

    let tiles = collect(&builder);
    let zooms: Vec<u8> = tiles.iter().map(|t| t.0).collect();
    for z in 0..=3 {
        assert!(zooms.contains(&z), "missing zoom {z}");
    }
    for (_, _, _, bytes) in &tiles {
        assert!(!bytes.is_empty());
    }
}

#[test]
fn empty_builder_produces_no_tiles() {
    let builder = TileBuilder::new(0, 5).unwrap();
    assert!(collect(&builder).is_empty());
}

#[test]
fn invalid_zoom_range_is_rejected_eagerly() {
    assert!(TileBuilder::new(8, 3).is_err());
}

#[test]
fn invalid_buffer_is_rejected_eagerly() {
    let config = BuilderConfig {
        default_layer_buffer: -1.0,
        ..BuilderConfig::default()
    };
    assert!(TileBuilder::with_config(config).is_err());
}

#[test]
fn native_y_convention_flips_relative_to_xyz() {
    use mbvt_builder::geom::Point;
    use mbvt_builder::YConvention;

    let square = |side: f64| {
        vec![vec![vec![
            Point::new(0.0, 0.0),
            Point::new(side, 0.0),
            Point::new(side, side),
            Point::new(0.0, side),
        ]]]
    };

    let xyz_config = BuilderConfig {
        min_zoom: 1,
        max_zoom: 1,
        default_layer_buffer: 0.0,
        ..BuilderConfig::default()
    };
    let mut xyz_builder = TileBuilder::with_config(xyz_config).unwrap();
    let tile_size = 2.0 * std::f64::consts::PI * xyz_builder.config().earth_radius / 2.0;
    xyz_builder.add_multi_polygon_to_current_layer(square(tile_size), vec![]);

    let native_config = BuilderConfig {
        y_convention: YConvention::Native,
        ..xyz_config
    };
    let mut native_builder = TileBuilder::with_config(native_config).unwrap();
    native_builder.add_multi_polygon_to_current_layer(square(tile_size), vec![]);

    let xyz_tiles = collect(&xyz_builder);
    let native_tiles = collect(&native_builder);
    assert_eq!(xyz_tiles.len(), 1);
    assert_eq!(native_tiles.len(), 1);
    assert_eq!(xyz_tiles[0].2, 1 - native_tiles[0].2);
}

#[test]
fn properties_round_trip_into_tile_bytes() {
    use mbvt_builder::geom::Point;
    use mbvt_builder::PropertyValue;

    let mut builder = TileBuilder::new(0, 0).unwrap();
    let layer = builder.create_layer("labeled", None);
    builder.add_multi_point(
        layer,
        vec![Point::new(0.0, 0.0)],
        vec![
            ("name".to_string(), PropertyValue::String("origin".to_string())),
            ("rank".to_string(), PropertyValue::Int(1)),
        ],
    );
    let tiles = collect(&builder);
    assert_eq!(tiles.len(), 1);
    let bytes = &tiles[0].3;
    // The property strings are emitted as length-delimited UTF-8; a crude
    // substring check confirms they made it into the wire bytes without
    // decoding the whole protobuf message back out.
    let haystack = String::from_utf8_lossy(bytes);
    assert!(haystack.contains("name") || bytes.windows(4).any(|w| w == b"name"));
}
