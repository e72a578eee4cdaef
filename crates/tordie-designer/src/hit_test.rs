//! Hit-testing of lasso rectangles and pointer clicks against diagram geometry.
//!
//! All tests run in world coordinates. Pixel tolerances are converted to world
//! units by dividing by the current zoom, so grab targets keep a constant
//! on-screen size at every zoom level.

use tordie_core::Identifier;
use tordie_settings::SelectionSettings;

use crate::diagram::Diagram;
use crate::geometry::{Geometry, GeometryPayload, Point, Rect};
use crate::view::ViewTransform;

/// True when `p` falls inside `rect` grown by `inflate` on every side.
pub fn point_in_inflated_rect(p: &Point, rect: &Rect, inflate: f64) -> bool {
    rect.inflate(inflate).contains(p)
}

/// Parametric segment intersection (`u, v` in `[0, 1]`).
///
/// Parallel and collinear segments (zero determinant) never count as crossing.
pub fn segments_intersect(a1: &Point, a2: &Point, b1: &Point, b2: &Point) -> bool {
    let d_ax = a2.x - a1.x;
    let d_ay = a2.y - a1.y;
    let d_bx = b2.x - b1.x;
    let d_by = b2.y - b1.y;

    let det = d_ax * d_by - d_ay * d_bx;
    if det == 0.0 {
        return false;
    }

    let ox = b1.x - a1.x;
    let oy = b1.y - a1.y;
    let u = (ox * d_by - oy * d_bx) / det;
    let v = (ox * d_ay - oy * d_ax) / det;
    (0.0..=1.0).contains(&u) && (0.0..=1.0).contains(&v)
}

/// True when the segment has an endpoint inside `rect` or crosses one of its edges.
pub fn segment_intersects_rect(a: &Point, b: &Point, rect: &Rect) -> bool {
    if rect.contains(a) || rect.contains(b) {
        return true;
    }
    rect.edges()
        .iter()
        .any(|(e1, e2)| segments_intersect(a, b, e1, e2))
}

/// Zoom-aware hit-testing over one diagram.
pub struct HitTester<'a> {
    diagram: &'a Diagram,
    view: &'a ViewTransform,
    settings: &'a SelectionSettings,
}

impl<'a> HitTester<'a> {
    pub fn new(
        diagram: &'a Diagram,
        view: &'a ViewTransform,
        settings: &'a SelectionSettings,
    ) -> Self {
        Self {
            diagram,
            view,
            settings,
        }
    }

    /// Inflation, in world units, applied to a point target with the given
    /// visual radius in pixels.
    pub fn inflation(&self, radius_px: f64) -> f64 {
        self.view.px_to_world(self.settings.min_hit_px.max(radius_px))
    }

    fn point_inflation(&self) -> f64 {
        self.inflation(self.settings.point_radius_px)
    }

    /// Whether geometry overlaps a world-space rectangle.
    ///
    /// Groups are hit when any direct child is hit. Parametric,
    /// tessellation and imported-path geometry is never hit.
    pub fn hits_rect(&self, geometry: &Geometry, world_rect: &Rect) -> bool {
        self.hits_rect_at_depth(geometry, world_rect, 0)
    }

    fn hits_rect_at_depth(&self, geometry: &Geometry, world_rect: &Rect, depth: usize) -> bool {
        match &geometry.payload {
            GeometryPayload::Point(p) => {
                point_in_inflated_rect(p, world_rect, self.point_inflation())
            }
            GeometryPayload::Line { p0, p1 } => {
                let a = self.diagram.resolve_point(p0);
                let b = self.diagram.resolve_point(p1);
                let inflate = self.point_inflation();
                point_in_inflated_rect(&a, world_rect, inflate)
                    || point_in_inflated_rect(&b, world_rect, inflate)
                    || segment_intersects_rect(&a, &b, world_rect)
            }
            GeometryPayload::Circle { center, radius } => {
                let c = self.diagram.resolve_point(center);
                let radius_px = radius * self.view.zoom();
                point_in_inflated_rect(&c, world_rect, self.inflation(radius_px))
            }
            GeometryPayload::Group { children } => {
                depth == 0
                    && children.iter().any(|child| {
                        self.diagram
                            .geometry(child)
                            .is_some_and(|g| self.hits_rect_at_depth(g, world_rect, depth + 1))
                    })
            }
            GeometryPayload::Parametric { .. }
            | GeometryPayload::Tessellation { .. }
            | GeometryPayload::ImportedPath { .. } => false,
        }
    }

    /// Raw candidate ids overlapped by a screen-space lasso, in draw order.
    pub fn lasso_hits(&self, screen_rect: &Rect) -> Vec<Identifier> {
        let world_rect = self.view.screen_rect_to_world(screen_rect);
        self.diagram
            .geometries()
            .filter(|g| g.kind().is_selectable() && self.hits_rect(g, &world_rect))
            .map(|g| g.id.clone())
            .collect()
    }

    fn hits_point(&self, geometry: &Geometry, world: &Point) -> bool {
        match &geometry.payload {
            GeometryPayload::Point(p) => p.distance_to(world) <= self.point_inflation(),
            GeometryPayload::Line { p0, p1 } => {
                let a = self.diagram.resolve_point(p0);
                let b = self.diagram.resolve_point(p1);
                let reach = self.view.px_to_world(self.settings.line_hit_px / 2.0);
                world.distance_to_segment(&a, &b) <= reach
            }
            GeometryPayload::Circle { center, radius } => {
                let c = self.diagram.resolve_point(center);
                c.distance_to(world) <= self.inflation(radius * self.view.zoom())
            }
            _ => false,
        }
    }

    /// Topmost geometry under a screen point.
    ///
    /// Points win over other kinds so an endpoint stays grabbable on top of
    /// its line; otherwise the most recently drawn hit is returned.
    pub fn pick(&self, screen: Point) -> Option<Identifier> {
        let world = self.view.screen_to_world(screen);
        let mut fallback = None;
        for geometry in self.diagram.geometries().rev() {
            if !self.hits_point(geometry, &world) {
                continue;
            }
            if matches!(geometry.payload, GeometryPayload::Point(_)) {
                return Some(geometry.id.clone());
            }
            if fallback.is_none() {
                fallback = Some(geometry.id.clone());
            }
        }
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemOptions;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Rect {
        Rect::from_corners(Point::new(x0, y0), Point::new(x1, y1))
    }

    #[test]
    fn test_segments_intersect() {
        let a1 = Point::new(0.0, 0.0);
        let a2 = Point::new(10.0, 10.0);
        assert!(segments_intersect(&a1, &a2, &Point::new(0.0, 10.0), &Point::new(10.0, 0.0)));
        assert!(!segments_intersect(&a1, &a2, &Point::new(20.0, 0.0), &Point::new(30.0, -10.0)));
        // parallel and collinear never cross
        assert!(!segments_intersect(&a1, &a2, &Point::new(1.0, 0.0), &Point::new(11.0, 10.0)));
        assert!(!segments_intersect(&a1, &a2, &Point::new(2.0, 2.0), &Point::new(5.0, 5.0)));
    }

    #[test]
    fn test_segment_crossing_rect_without_endpoints_inside() {
        let r = rect(4.0, -1.0, 6.0, 1.0);
        assert!(segment_intersects_rect(&Point::new(0.0, 0.0), &Point::new(10.0, 0.0), &r));
        assert!(!segment_intersects_rect(&Point::new(0.0, 5.0), &Point::new(10.0, 5.0), &r));
        assert!(segment_intersects_rect(&Point::new(5.0, 0.0), &Point::new(50.0, 50.0), &r));
    }

    #[test]
    fn test_point_in_inflated_rect() {
        let r = rect(0.0, 0.0, 10.0, 10.0);
        assert!(!point_in_inflated_rect(&Point::new(13.0, 5.0), &r, 2.0));
        assert!(point_in_inflated_rect(&Point::new(12.0, 5.0), &r, 2.0));
    }

    #[test]
    fn test_lasso_hits_point_and_line() {
        let mut d = Diagram::new();
        let p0 = d.create_geometry(GeometryPayload::point(0.0, 0.0), None);
        let p1 = d.create_geometry(GeometryPayload::point(100.0, 100.0), None);
        let l = d.create_geometry(GeometryPayload::line(p0.clone(), p1.clone()), None);
        let view = ViewTransform::default();
        let settings = SelectionSettings::default();
        let tester = HitTester::new(&d, &view, &settings);

        let hits = tester.lasso_hits(&rect(-5.0, -5.0, 5.0, 5.0));
        assert_eq!(hits, vec![p0.clone(), l.clone()]);

        // crosses the middle of the line only
        let hits = tester.lasso_hits(&rect(45.0, 40.0, 55.0, 50.0));
        assert_eq!(hits, vec![l]);
    }

    #[test]
    fn test_circle_and_group_hits() {
        let mut d = Diagram::new();
        let c = d.create_geometry(GeometryPayload::circle(Point::new(50.0, 50.0), 20.0), None);
        let p = d.create_geometry(GeometryPayload::point(200.0, 200.0), None);
        let g = d.create_geometry(
            GeometryPayload::Group {
                children: vec![p.clone()],
            },
            None,
        );
        let parametric = d.create_geometry(
            GeometryPayload::Parametric {
                t0: 0.0,
                t1: 1.0,
                expr: "t".to_string(),
            },
            None,
        );
        d.create_item(ItemOptions::new().with_geometry(c.clone()));
        let view = ViewTransform::default();
        let settings = SelectionSettings::default();
        let tester = HitTester::new(&d, &view, &settings);

        // circle centre 50 is within 20px of a rect ending at 31
        assert_eq!(tester.lasso_hits(&rect(0.0, 0.0, 31.0, 31.0)), vec![c]);
        assert_eq!(tester.lasso_hits(&rect(195.0, 195.0, 205.0, 205.0)), vec![p, g]);
        assert!(!tester.lasso_hits(&rect(-1e6, -1e6, 1e6, 1e6)).contains(&parametric));
    }

    #[test]
    fn test_tolerance_scales_with_zoom() {
        let mut d = Diagram::new();
        let p = d.create_geometry(GeometryPayload::point(10.0, 0.0), None);
        let settings = SelectionSettings::default();
        let mut view = ViewTransform::default();
        view.set_zoom(4.0);
        let tester = HitTester::new(&d, &view, &settings);

        // the point sits at screen x = 40; a lasso ending at 34 is 6px away
        assert!(tester.lasso_hits(&rect(0.0, -10.0, 34.0, 10.0)).contains(&p));
        assert!(!tester.lasso_hits(&rect(0.0, -10.0, 33.0, 10.0)).contains(&p));
    }

    #[test]
    fn test_pick_prefers_points() {
        let mut d = Diagram::new();
        let p0 = d.create_geometry(GeometryPayload::point(0.0, 0.0), None);
        let p1 = d.create_geometry(GeometryPayload::point(100.0, 0.0), None);
        let l = d.create_geometry(GeometryPayload::line(p0.clone(), p1), None);
        let view = ViewTransform::default();
        let settings = SelectionSettings::default();
        let tester = HitTester::new(&d, &view, &settings);

        assert_eq!(tester.pick(Point::new(1.0, 1.0)), Some(p0));
        assert_eq!(tester.pick(Point::new(50.0, 4.0)), Some(l));
        assert_eq!(tester.pick(Point::new(50.0, 6.0)), None);
    }
}
