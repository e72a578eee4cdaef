//! Geometry records and the planar primitives they are built from.
//!
//! A [`Geometry`] is a typed payload keyed by an [`Identifier`]. Lines and
//! circles may own their points inline or reference a point geometry by id;
//! references are resolved one level deep by the diagram.

use serde::{Deserialize, Serialize};
use std::fmt;
use tordie_core::Identifier;

/// Tolerance used by containment tests to absorb floating-point noise.
pub const CONTAINS_EPSILON: f64 = 1e-9;

/// A 2D point in world or screen space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Returns this point moved by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Shortest distance from this point to the segment `a`-`b`.
    ///
    /// Degenerate segments fall back to the distance to `a`.
    pub fn distance_to_segment(&self, a: &Point, b: &Point) -> f64 {
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let len_sq = dx * dx + dy * dy;
        if len_sq == 0.0 {
            return self.distance_to(a);
        }
        let t = (((self.x - a.x) * dx + (self.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
        self.distance_to(&Point::new(a.x + t * dx, a.y + t * dy))
    }
}

/// Axis-aligned rectangle with normalized corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Rect {
    /// Builds a rectangle spanning two arbitrary corners.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            min_x: a.x.min(b.x),
            min_y: a.y.min(b.y),
            max_x: a.x.max(b.x),
            max_y: a.y.max(b.y),
        }
    }

    /// Smallest rectangle containing every point, or `None` for an empty input.
    pub fn bounding<I: IntoIterator<Item = Point>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut rect = Rect::from_corners(first, first);
        for p in iter {
            rect.min_x = rect.min_x.min(p.x);
            rect.min_y = rect.min_y.min(p.y);
            rect.max_x = rect.max_x.max(p.x);
            rect.max_y = rect.max_y.max(p.y);
        }
        Some(rect)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: &Point) -> bool {
        p.x >= self.min_x - CONTAINS_EPSILON
            && p.x <= self.max_x + CONTAINS_EPSILON
            && p.y >= self.min_y - CONTAINS_EPSILON
            && p.y <= self.max_y + CONTAINS_EPSILON
    }

    /// Grows the rectangle by `amount` on every side.
    pub fn inflate(&self, amount: f64) -> Rect {
        Rect {
            min_x: self.min_x - amount,
            min_y: self.min_y - amount,
            max_x: self.max_x + amount,
            max_y: self.max_y + amount,
        }
    }

    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min_x, self.min_y),
            Point::new(self.max_x, self.min_y),
            Point::new(self.max_x, self.max_y),
            Point::new(self.min_x, self.max_y),
        ]
    }

    /// The four edges, walking the corners in order.
    pub fn edges(&self) -> [(Point, Point); 4] {
        let [a, b, c, d] = self.corners();
        [(a, b), (b, c), (c, d), (d, a)]
    }

    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

/// A line or circle endpoint: either an inline point or a reference to a
/// point geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointRef {
    Resolved(Point),
    Reference(Identifier),
}

impl PointRef {
    pub fn reference(&self) -> Option<&Identifier> {
        match self {
            PointRef::Reference(id) => Some(id),
            PointRef::Resolved(_) => None,
        }
    }

    pub fn references(&self, id: &Identifier) -> bool {
        self.reference() == Some(id)
    }
}

impl From<Point> for PointRef {
    fn from(p: Point) -> Self {
        PointRef::Resolved(p)
    }
}

impl From<Identifier> for PointRef {
    fn from(id: Identifier) -> Self {
        PointRef::Reference(id)
    }
}

/// Closed set of geometry kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GeometryKind {
    Point,
    Line,
    Circle,
    Parametric,
    Group,
    Tessellation,
    ImportedPath,
}

impl GeometryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryKind::Point => "point",
            GeometryKind::Line => "line",
            GeometryKind::Circle => "circle",
            GeometryKind::Parametric => "parametric",
            GeometryKind::Group => "group",
            GeometryKind::Tessellation => "tessellation",
            GeometryKind::ImportedPath => "importedPath",
        }
    }

    /// Kinds the hit-tester can report.
    pub fn is_selectable(&self) -> bool {
        matches!(
            self,
            GeometryKind::Point | GeometryKind::Line | GeometryKind::Circle | GeometryKind::Group
        )
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed geometry payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum GeometryPayload {
    Point(Point),
    Line {
        p0: PointRef,
        p1: PointRef,
    },
    Circle {
        center: PointRef,
        radius: f64,
    },
    Parametric {
        t0: f64,
        t1: f64,
        expr: String,
    },
    Group {
        children: Vec<Identifier>,
    },
    Tessellation {
        cell: Identifier,
        #[serde(default)]
        rules: serde_json::Map<String, serde_json::Value>,
    },
    ImportedPath {
        raw: String,
    },
}

impl GeometryPayload {
    pub fn point(x: f64, y: f64) -> Self {
        GeometryPayload::Point(Point::new(x, y))
    }

    pub fn line(p0: impl Into<PointRef>, p1: impl Into<PointRef>) -> Self {
        GeometryPayload::Line {
            p0: p0.into(),
            p1: p1.into(),
        }
    }

    pub fn circle(center: impl Into<PointRef>, radius: f64) -> Self {
        GeometryPayload::Circle {
            center: center.into(),
            radius,
        }
    }

    pub fn kind(&self) -> GeometryKind {
        match self {
            GeometryPayload::Point(_) => GeometryKind::Point,
            GeometryPayload::Line { .. } => GeometryKind::Line,
            GeometryPayload::Circle { .. } => GeometryKind::Circle,
            GeometryPayload::Parametric { .. } => GeometryKind::Parametric,
            GeometryPayload::Group { .. } => GeometryKind::Group,
            GeometryPayload::Tessellation { .. } => GeometryKind::Tessellation,
            GeometryPayload::ImportedPath { .. } => GeometryKind::ImportedPath,
        }
    }

    /// Point ids this payload references through its endpoints or centre.
    pub fn point_references(&self) -> Vec<&Identifier> {
        match self {
            GeometryPayload::Line { p0, p1 } => {
                [p0, p1].into_iter().filter_map(PointRef::reference).collect()
            }
            GeometryPayload::Circle { center, .. } => center.reference().into_iter().collect(),
            _ => Vec::new(),
        }
    }

    /// Whether this payload depends on geometry `id` (endpoint, centre,
    /// group child or tessellation cell).
    pub fn depends_on(&self, id: &Identifier) -> bool {
        match self {
            GeometryPayload::Line { p0, p1 } => p0.references(id) || p1.references(id),
            GeometryPayload::Circle { center, .. } => center.references(id),
            GeometryPayload::Group { children } => children.contains(id),
            GeometryPayload::Tessellation { cell, .. } => cell == id,
            _ => false,
        }
    }
}

/// Stored geometry record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub id: Identifier,
    pub payload: GeometryPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Map<String, serde_json::Value>>,
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        self.payload.kind()
    }

    /// Inline position of a point geometry.
    pub fn as_point(&self) -> Option<Point> {
        match self.payload {
            GeometryPayload::Point(p) => Some(p),
            _ => None,
        }
    }

    /// Returns a copy with every point moved by `f`.
    ///
    /// Only inline coordinates are touched; references are left alone, so
    /// callers wanting a fully mapped shape should resolve references first.
    pub fn map_points(&self, f: impl Fn(Point) -> Point) -> Geometry {
        let map_ref = |r: &PointRef| match r {
            PointRef::Resolved(p) => PointRef::Resolved(f(*p)),
            PointRef::Reference(id) => PointRef::Reference(id.clone()),
        };
        let payload = match &self.payload {
            GeometryPayload::Point(p) => GeometryPayload::Point(f(*p)),
            GeometryPayload::Line { p0, p1 } => GeometryPayload::Line {
                p0: map_ref(p0),
                p1: map_ref(p1),
            },
            GeometryPayload::Circle { center, radius } => GeometryPayload::Circle {
                center: map_ref(center),
                radius: *radius,
            },
            other => other.clone(),
        };
        Geometry {
            id: self.id.clone(),
            payload,
            meta: self.meta.clone(),
        }
    }
}
