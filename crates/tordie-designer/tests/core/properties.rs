use std::collections::HashSet;

use proptest::prelude::*;
use tordie_designer::{
    combine, expand, CombineMode, Diagram, GeometryPayload, HitTester, Identifier, Point, Rect,
    ViewTransform,
};
use tordie_settings::SelectionSettings;

// ===================
// Strategies
// ===================

fn point_strategy() -> impl Strategy<Value = Point> {
    (-1.0e4f64..1.0e4, -1.0e4f64..1.0e4).prop_map(|(x, y)| Point::new(x, y))
}

fn zoom_strategy() -> impl Strategy<Value = f64> {
    0.05f64..50.0
}

fn view_with(pan: Point, zoom: f64) -> ViewTransform {
    let mut view = ViewTransform::new(800.0, 600.0);
    view.set_zoom(zoom);
    view.set_pan(pan.x, pan.y);
    view
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

fn ids(range: std::ops::Range<u8>) -> HashSet<Identifier> {
    range.map(|i| Identifier::from_raw(format!("geom_{}", i))).collect()
}

/// Chain of points joined by lines; no point is shared by more than one line.
fn disjoint_lines(count: usize) -> Diagram {
    let mut d = Diagram::new();
    for i in 0..count {
        let x = i as f64 * 10.0;
        let a = d.create_geometry(GeometryPayload::point(x, 0.0), None);
        let b = d.create_geometry(GeometryPayload::point(x, 5.0), None);
        d.create_geometry(GeometryPayload::line(a, b), None);
    }
    d
}

// ===================
// Property Test Functions
// ===================

fn check_round_trip(p: Point, pan: Point, zoom: f64) -> Result<(), TestCaseError> {
    let view = view_with(pan, zoom);
    let back = view.screen_to_world(view.world_to_screen(p));
    prop_assert!(close(back.x, p.x), "{} vs {}", back.x, p.x);
    prop_assert!(close(back.y, p.y), "{} vs {}", back.y, p.y);
    Ok(())
}

fn check_zoom_anchoring(cursor: Point, pan: Point, z0: f64, z1: f64) -> Result<(), TestCaseError> {
    let mut view = view_with(pan, z0);
    let before = view.screen_to_world(cursor);
    view.zoom_at(cursor, z1);
    let after = view.screen_to_world(cursor);
    // absolute tolerance scaled to the magnitudes involved
    let scale = cursor.x.abs().max(pan.x.abs()).max(1.0) / z0.min(z1);
    prop_assert!((before.x - after.x).abs() <= 1e-9 * scale);
    let scale = cursor.y.abs().max(pan.y.abs()).max(1.0) / z0.min(z1);
    prop_assert!((before.y - after.y).abs() <= 1e-9 * scale);
    Ok(())
}

fn check_toggle_twice(
    current: HashSet<Identifier>,
    candidate: Identifier,
) -> Result<(), TestCaseError> {
    let single: HashSet<Identifier> = [candidate].into_iter().collect();
    let once = combine(&current, &single, CombineMode::Toggle);
    let twice = combine(&once, &single, CombineMode::Toggle);
    prop_assert_eq!(twice, current);
    Ok(())
}

fn check_union_order_free(
    current: HashSet<Identifier>,
    a: HashSet<Identifier>,
    b: HashSet<Identifier>,
) -> Result<(), TestCaseError> {
    let ab = combine(&combine(&current, &a, CombineMode::Union), &b, CombineMode::Union);
    let ba = combine(&combine(&current, &b, CombineMode::Union), &a, CombineMode::Union);
    prop_assert_eq!(&ab, &ba);
    let again = combine(&ab, &a, CombineMode::Union);
    prop_assert_eq!(again, ab);
    Ok(())
}

fn check_expansion_idempotent(count: usize, picks: Vec<usize>) -> Result<(), TestCaseError> {
    let d = disjoint_lines(count);
    let all: Vec<Identifier> = d.geometries().map(|g| g.id.clone()).collect();
    let raw: Vec<Identifier> = picks.iter().map(|i| all[i % all.len()].clone()).collect();
    let once = expand(raw, &d);
    let twice = expand(once.iter().cloned(), &d);
    prop_assert_eq!(once, twice);
    Ok(())
}

/// A point exactly `min_hit_px` screen pixels beyond a lasso edge is hit at any zoom.
fn check_tolerance_scale_invariance(zoom: f64, offset_px: f64) -> Result<(), TestCaseError> {
    let settings = SelectionSettings {
        min_hit_px: 4.0,
        point_radius_px: 0.0,
        ..SelectionSettings::default()
    };
    let view = view_with(Point::ORIGIN, zoom);
    let world = view.screen_to_world(Point::new(200.0, 200.0));
    let mut d = Diagram::new();
    let p = d.create_geometry(GeometryPayload::point(world.x, world.y), None);
    let tester = HitTester::new(&d, &view, &settings);

    let edge = 200.0 - settings.min_hit_px + offset_px;
    let rect = Rect::from_corners(Point::new(100.0, 150.0), Point::new(edge, 250.0));
    let hits = tester.lasso_hits(&rect);
    if offset_px >= 0.0 {
        prop_assert!(hits.contains(&p), "missed at zoom {}", zoom);
    } else {
        prop_assert!(!hits.contains(&p), "hit at zoom {}", zoom);
    }
    Ok(())
}

// ===================
// Proptest Wrappers
// ===================

proptest! {
    #[test]
    fn screen_world_round_trip(
        p in point_strategy(),
        pan in point_strategy(),
        zoom in zoom_strategy(),
    ) {
        check_round_trip(p, pan, zoom)?;
    }

    #[test]
    fn zoom_keeps_cursor_anchored(
        cursor in point_strategy(),
        pan in point_strategy(),
        z0 in zoom_strategy(),
        z1 in zoom_strategy(),
    ) {
        check_zoom_anchoring(cursor, pan, z0, z1)?;
    }

    #[test]
    fn toggle_twice_restores_selection(start in 0u8..10, end in 10u8..20, pick in 0u8..30) {
        check_toggle_twice(ids(start..end), Identifier::from_raw(format!("geom_{}", pick)))?;
    }

    #[test]
    fn union_is_order_free(a in 0u8..10, b in 5u8..15, c in 10u8..20) {
        check_union_order_free(ids(0..a), ids(a..b.max(a)), ids(c..20))?;
    }

    #[test]
    fn expansion_idempotent_without_shared_points(
        count in 1usize..8,
        picks in prop::collection::vec(0usize..64, 0..6),
    ) {
        check_expansion_idempotent(count, picks)?;
    }

    #[test]
    fn hit_tolerance_is_constant_in_pixels(
        zoom in prop::sample::select(vec![0.25, 0.5, 1.0, 2.0, 4.0, 8.0]),
    ) {
        check_tolerance_scale_invariance(zoom, 0.0)?;
        check_tolerance_scale_invariance(zoom, -0.5)?;
    }
}
