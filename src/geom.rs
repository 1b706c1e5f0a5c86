//! Geometry primitives: points, axis-aligned bounds, and the closed geometry sum type.
//!
//! Polymorphism here is closed by design: every consumer of [`Geometry`] matches
//! exhaustively on its three variants rather than going through a visitor trait.

/// A point in Web-Mercator meters (or, before projection, WGS84 degrees).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// Inclusive axis-aligned bounding rectangle.
///
/// The empty bounds is `(min: +inf, max: -inf)`; unioning it with anything
/// replaces it outright.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Default for Bounds {
    fn default() -> Self {
        Bounds {
            min: Point::new(f64::INFINITY, f64::INFINITY),
            max: Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }
}

impl Bounds {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    pub fn add_point(&mut self, p: Point) {
        if p.x < self.min.x {
            self.min.x = p.x;
        }
        if p.y < self.min.y {
            self.min.y = p.y;
        }
        if p.x > self.max.x {
            self.max.x = p.x;
        }
        if p.y > self.max.y {
            self.max.y = p.y;
        }
    }

    pub fn add(&mut self, other: &Bounds) {
        if other.is_empty() {
            return;
        }
        self.add_point(other.min);
        self.add_point(other.max);
    }

    pub fn union_of(points: impl IntoIterator<Item = Point>) -> Bounds {
        let mut b = Bounds::empty();
        for p in points {
            b.add_point(p);
        }
        b
    }

    /// Expand outward by `amount` on every side. A no-op on an empty bounds.
    pub fn expanded(&self, amount: f64) -> Bounds {
        if self.is_empty() {
            return *self;
        }
        Bounds {
            min: Point::new(self.min.x - amount, self.min.y - amount),
            max: Point::new(self.max.x + amount, self.max.y + amount),
        }
    }

    pub fn intersects(&self, other: &Bounds) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}

/// A ring of a polygon: the first ring of a polygon is the exterior, the rest are holes.
/// Stored open (first point is not repeated as the last).
pub type Ring = Vec<Point>;

/// A polyline: at least 2 points once valid, but intermediate producers may hold fewer
/// transiently (e.g. mid-clip) so the type itself does not enforce the minimum.
pub type Line = Vec<Point>;

/// A polygon: exterior ring followed by zero or more hole rings.
pub type Polygon = Vec<Ring>;

/// Closed three-way geometry sum type, matching the MVT geometry type triad
/// (Point, LineString, Polygon), each always stored in its "multi" form.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    MultiPoint(Vec<Point>),
    MultiLineString(Vec<Line>),
    MultiPolygon(Vec<Polygon>),
}

impl Geometry {
    /// Bounding box of every coordinate in the geometry, regardless of variant.
    pub fn bounds(&self) -> Bounds {
        let mut b = Bounds::empty();
        match self {
            Geometry::MultiPoint(points) => {
                for p in points {
                    b.add_point(*p);
                }
            }
            Geometry::MultiLineString(lines) => {
                for line in lines {
                    for p in line {
                        b.add_point(*p);
                    }
                }
            }
            Geometry::MultiPolygon(polygons) => {
                for polygon in polygons {
                    for ring in polygon {
                        for p in ring {
                            b.add_point(*p);
                        }
                    }
                }
            }
        }
        b
    }
}
