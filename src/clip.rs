//! Rectangular clipping for points, polylines, and polygon rings.
//!
//! Each function is a pure value transformer parameterized by the clip
//! rectangle (a [`Bounds`]) — no shared state, matching [`crate::simplify`].

use crate::geom::{Bounds, Point};

/// Whether `p` lies inside `bounds`, inclusive on every edge: a vertex lying
/// exactly on the boundary counts as inside.
pub fn test_point(p: Point, bounds: &Bounds) -> bool {
    p.x >= bounds.min.x && p.x <= bounds.max.x && p.y >= bounds.min.y && p.y <= bounds.max.y
}

/// Clip a polyline against `bounds`, producing zero or more fragments.
///
/// Implemented with Liang-Barsky parametric clipping per segment; consecutive
/// segments whose clipped endpoints coincide are merged into one fragment,
/// and a segment that exits and later re-enters starts a new fragment.
/// Fragments shorter than 2 points are omitted.
pub fn clip_line_string(coords: &[Point], bounds: &Bounds) -> Vec<Vec<Point>> {
    let mut fragments = Vec::new();
    let mut current: Vec<Point> = Vec::new();

    for pair in coords.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        match clip_segment(a, b, bounds) {
            Some((ca, cb)) => match current.last() {
                Some(&last) if last == ca => current.push(cb),
                _ => {
                    if current.len() >= 2 {
                        fragments.push(std::mem::take(&mut current));
                    } else {
                        current.clear();
                    }
                    current.push(ca);
                    current.push(cb);
                }
            },
            None => {
                if current.len() >= 2 {
                    fragments.push(std::mem::take(&mut current));
                } else {
                    current.clear();
                }
            }
        }
    }
    if current.len() >= 2 {
        fragments.push(current);
    }
    fragments
}

/// Liang-Barsky parametric segment clip. Returns the clipped `(start, end)`
/// points when any portion of `a -> b` lies within `bounds`, `None` otherwise.
fn clip_segment(a: Point, b: Point, bounds: &Bounds) -> Option<(Point, Point)> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let p = [-dx, dx, -dy, dy];
    let q = [
        a.x - bounds.min.x,
        bounds.max.x - a.x,
        a.y - bounds.min.y,
        bounds.max.y - a.y,
    ];

    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    for i in 0..4 {
        if p[i] == 0.0 {
            if q[i] < 0.0 {
                return None;
            }
        } else {
            let r = q[i] / p[i];
            if p[i] < 0.0 {
                if r > t1 {
                    return None;
                } else if r > t0 {
                    t0 = r;
                }
            } else if r < t0 {
                return None;
            } else if r < t1 {
                t1 = r;
            }
        }
    }
    if t0 > t1 {
        return None;
    }
    let start = Point::new(a.x + t0 * dx, a.y + t0 * dy);
    let end = Point::new(a.x + t1 * dx, a.y + t1 * dy);
    Some((start, end))
}

/// Sutherland-Hodgman clip of a closed ring (stored open) against the four
/// edges of `bounds`, in the fixed order left, right, bottom, top.
///
/// The caller discards the result if it has fewer than 3 vertices.
pub fn clip_polygon_ring(ring: &[Point], bounds: &Bounds) -> Vec<Point> {
    let min = bounds.min;
    let max = bounds.max;

    let left = clip_edge(ring, |p| p.x >= min.x, |a, b| lerp_x(a, b, min.x));
    let right = clip_edge(&left, |p| p.x <= max.x, |a, b| lerp_x(a, b, max.x));
    let bottom = clip_edge(&right, |p| p.y >= min.y, |a, b| lerp_y(a, b, min.y));
    clip_edge(&bottom, |p| p.y <= max.y, |a, b| lerp_y(a, b, max.y))
}

fn clip_edge(
    points: &[Point],
    inside: impl Fn(Point) -> bool,
    intersect: impl Fn(Point, Point) -> Point,
) -> Vec<Point> {
    if points.is_empty() {
        return Vec::new();
    }
    let mut output = Vec::with_capacity(points.len() + 1);
    let mut prev = *points.last().unwrap();
    let mut prev_inside = inside(prev);
    for &curr in points {
        let curr_inside = inside(curr);
        if curr_inside {
            if !prev_inside {
                output.push(intersect(prev, curr));
            }
            output.push(curr);
        } else if prev_inside {
            output.push(intersect(prev, curr));
        }
        prev = curr;
        prev_inside = curr_inside;
    }
    output
}

fn lerp_x(a: Point, b: Point, x: f64) -> Point {
    let t = (x - a.x) / (b.x - a.x);
    Point::new(x, a.y + t * (b.y - a.y))
}

fn lerp_y(a: Point, b: Point, y: f64) -> Point {
    let t = (y - a.y) / (b.y - a.y);
    Point::new(a.x + t * (b.x - a.x), y)
}
