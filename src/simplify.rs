//! Tolerance-based Douglas-Peucker simplification for polylines and polygon rings.
//!
//! Both entry points are pure functions parameterized by tolerance: no shared state,
//! no trait dispatch, just a value in and a (possibly shorter) value out.

use crate::geom::Point;

/// Simplify a polyline, always preserving both endpoints.
pub fn simplify_line_string(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() < 3 || tolerance <= 0.0 {
        return points.to_vec();
    }
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;
    douglas_peucker(points, 0, points.len() - 1, tolerance, &mut keep);
    points
        .iter()
        .zip(keep.iter())
        .filter_map(|(p, &k)| k.then_some(*p))
        .collect()
}

/// Simplify a closed ring (stored open: first point is not repeated as last).
///
/// The caller is responsible for discarding the result if it has fewer than 3
/// vertices (a degenerate ring is not an error, just dropped at a higher level).
pub fn simplify_polygon_ring(ring: &[Point], tolerance: f64) -> Vec<Point> {
    if ring.len() < 3 {
        return ring.to_vec();
    }
    // Treat the ring as a closed line string whose two endpoints happen to
    // coincide: anchor on the farthest-from-centroid point so the implicit
    // closing edge doesn't swallow real detail near index 0.
    let anchor = farthest_from_centroid(ring);
    let mut rotated = Vec::with_capacity(ring.len() + 1);
    rotated.extend_from_slice(&ring[anchor..]);
    rotated.extend_from_slice(&ring[..anchor]);
    rotated.push(rotated[0]);

    let simplified = simplify_line_string(&rotated, tolerance);
    let mut result = simplified;
    if result.len() > 1 {
        result.pop(); // drop the duplicated closing vertex, ring is stored open
    }
    result
}

fn farthest_from_centroid(ring: &[Point]) -> usize {
    let n = ring.len() as f64;
    let cx = ring.iter().map(|p| p.x).sum::<f64>() / n;
    let cy = ring.iter().map(|p| p.y).sum::<f64>() / n;
    ring.iter()
        .enumerate()
        .map(|(i, p)| {
            let dx = p.x - cx;
            let dy = p.y - cy;
            (i, dx * dx + dy * dy)
        })
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Recursive core: mark vertices in `points[lo..=hi]` that must be retained.
fn douglas_peucker(points: &[Point], lo: usize, hi: usize, tolerance: f64, keep: &mut [bool]) {
    if hi <= lo + 1 {
        return;
    }
    let (mut far_idx, mut far_dist) = (lo, 0.0_f64);
    for i in (lo + 1)..hi {
        let d = perpendicular_distance(points[i], points[lo], points[hi]);
        if d > far_dist {
            far_dist = d;
            far_idx = i;
        }
    }
    if far_dist > tolerance {
        keep[far_idx] = true;
        douglas_peucker(points, lo, far_idx, tolerance, keep);
        douglas_peucker(points, far_idx, hi, tolerance, keep);
    }
}

/// Perpendicular distance from `p` to the segment `(a, b)`; falls back to the
/// distance to `a` when `a == b`.
fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return ((p.x - a.x).powi(2) + (p.y - a.y).powi(2)).sqrt();
    }
    ((dy * p.x - dx * p.y + b.x * a.y - b.y * a.x).abs()) / len_sq.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_colinear_midpoint() {
        let line = vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(2.0, 0.0)];
        let simplified = simplify_line_string(&line, 0.5);
        assert_eq!(simplified, vec![Point::new(0.0, 0.0), Point::new(2.0, 0.0)]);
    }

    #[test]
    fn keeps_endpoints_when_everything_dropped() {
        let line = vec![Point::new(0.0, 0.0), Point::new(0.01, 0.01), Point::new(10.0, 0.0)];
        let simplified = simplify_line_string(&line, 5.0);
        assert_eq!(simplified.first(), Some(&Point::new(0.0, 0.0)));
        assert_eq!(simplified.last(), Some(&Point::new(10.0, 0.0)));
    }

    #[test]
    fn zero_tolerance_is_identity() {
        let line = vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(2.0, 0.3)];
        assert_eq!(simplify_line_string(&line, 0.0), line);
    }

    #[test]
    fn idempotent() {
        let line = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 5.0),
            Point::new(2.0, 0.1),
            Point::new(3.0, 6.0),
            Point::new(4.0, 0.0),
        ];
        let once = simplify_line_string(&line, 2.0);
        let twice = simplify_line_string(&once, 2.0);
        assert_eq!(once, twice);
    }

    #[test]
    fn every_dropped_vertex_is_within_tolerance() {
        let line: Vec<Point> = (0..50)
            .map(|i| Point::new(i as f64, ((i as f64) * 0.3).sin()))
            .collect();
        let tolerance = 0.2;
        let simplified = simplify_line_string(&line, tolerance);
        for p in &line {
            if simplified.contains(p) {
                continue;
            }
            let min_dist = simplified
                .windows(2)
                .map(|w| perpendicular_distance(*p, w[0], w[1]))
                .fold(f64::INFINITY, f64::min);
            assert!(min_dist <= tolerance + 1e-9, "dropped vertex {p:?} strayed {min_dist}");
        }
    }

    #[test]
    fn ring_below_three_vertices_signals_caller_to_drop() {
        let ring = vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.5, 0.001)];
        let simplified = simplify_polygon_ring(&ring, 1.0);
        assert!(simplified.len() < 3);
    }

    #[test]
    fn square_ring_survives_simplification() {
        let ring = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        let simplified = simplify_polygon_ring(&ring, 0.1);
        assert_eq!(simplified.len(), 4);
    }
}
