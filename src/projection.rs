//! WGS84 longitude/latitude to spherical Web-Mercator projection.

use crate::geom::{Bounds, Point};

/// Clamp applied to latitude so the projection never reaches +/- infinity.
const LAT_EPSILON: f64 = 1e-9;

/// Project a WGS84 `(lon_deg, lat_deg)` pair onto spherical Web-Mercator meters.
///
/// Latitude is clamped to `+/- (90 - LAT_EPSILON)` degrees before projecting.
pub fn wgs84_to_wm(lon_deg: f64, lat_deg: f64, earth_radius: f64) -> Point {
    let lat_deg = lat_deg.clamp(-90.0 + LAT_EPSILON, 90.0 - LAT_EPSILON);
    let x = earth_radius * lon_deg * std::f64::consts::PI / 180.0;
    let lat_rad = lat_deg * std::f64::consts::PI / 180.0;
    let y = 0.5 * earth_radius * ((1.0 + lat_rad.sin()) / (1.0 - lat_rad.sin())).ln();
    Point::new(x, y)
}

/// The whole-world map bounds `[-pi*R, pi*R]^2`.
pub fn world_bounds(earth_radius: f64) -> Bounds {
    let extent = std::f64::consts::PI * earth_radius;
    Bounds {
        min: Point::new(-extent, -extent),
        max: Point::new(extent, extent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const R: f64 = 6_378_137.0;

    #[test]
    fn x_round_trips_through_longitude() {
        let mut lon = -180.0;
        while lon <= 180.0 {
            let p = wgs84_to_wm(lon, 0.0, R);
            let recovered = p.x / R * 180.0 / std::f64::consts::PI;
            assert!((recovered - lon).abs() < 1e-9, "lon={lon} recovered={recovered}");
            lon += 7.5;
        }
    }

    #[test]
    fn equator_meridian_is_origin() {
        let p = wgs84_to_wm(0.0, 0.0, R);
        assert!(p.x.abs() < 1e-9);
        assert!(p.y.abs() < 1e-9);
    }

    #[test]
    fn poles_do_not_overflow() {
        let north = wgs84_to_wm(0.0, 90.0, R);
        let south = wgs84_to_wm(0.0, -90.0, R);
        assert!(north.y.is_finite());
        assert!(south.y.is_finite());
        assert!(north.y > 0.0);
        assert!(south.y < 0.0);
    }

    #[test]
    fn world_bounds_is_square() {
        let b = world_bounds(R);
        assert_eq!(b.min.x, -b.max.x);
        assert_eq!(b.min.y, -b.max.y);
        assert_eq!(b.max.x, b.max.y);
    }
}
