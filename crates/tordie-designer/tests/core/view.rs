use std::cell::RefCell;
use std::rc::Rc;

use tordie_core::event_bus::ViewEvent;
use tordie_core::{EditorEvent, EventBus, EventCategory, EventFilter};
use tordie_designer::{Point, Rect, ScrollAxis, ViewTransform};
use tordie_settings::{DocumentSettings, ViewportSettings};

#[test]
fn test_view_defaults_from_settings() {
    let viewport = ViewportSettings {
        default_zoom: 2.0,
        default_offset_x: 15.0,
        default_offset_y: -5.0,
        ..ViewportSettings::default()
    };
    let view = ViewTransform::from_settings(&viewport, &DocumentSettings::default(), 1200.0, 800.0);
    assert_eq!(view.zoom(), 2.0);
    assert_eq!(view.pan(), Point::new(15.0, -5.0));
    assert_eq!(view.document_width(), 1000.0);
}

#[test]
fn test_zoom_is_clamped_and_never_zero() {
    let mut view = ViewTransform::new(800.0, 600.0);
    view.set_zoom(1e9);
    assert_eq!(view.zoom(), view.max_zoom());
    view.set_zoom(1e-9);
    assert_eq!(view.zoom(), view.min_zoom());
    view.set_zoom(0.0);
    view.set_zoom(-3.0);
    view.set_zoom(f64::NAN);
    assert_eq!(view.zoom(), view.min_zoom());
}

#[test]
fn test_transform_changes_are_published() {
    let bus = Rc::new(EventBus::new());
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    bus.subscribe(EventFilter::Categories(vec![EventCategory::View]), move |event| {
        if let EditorEvent::View(ViewEvent::TransformChanged(snapshot)) = event {
            sink.borrow_mut().push(*snapshot);
        }
    });

    let mut view = ViewTransform::new(800.0, 600.0);
    view.attach_bus(bus.clone());
    view.set_pan(10.0, 10.0);
    view.set_pan(10.0, 10.0);
    view.set_zoom(3.0);
    view.set_rotation(45.0);

    let events = events.borrow();
    assert_eq!(events.len(), 3);
    assert_eq!(events[2].rotation_deg, 45.0);
    assert_eq!(events[1].zoom, 3.0);
}

#[test]
fn test_rotation_is_display_only() {
    let mut view = ViewTransform::new(800.0, 600.0);
    view.set_rotation(90.0);
    let p = Point::new(10.0, 0.0);
    assert_eq!(view.world_to_screen(p), p);

    let display = view.world_to_display(p);
    assert!(display.x.abs() < 1e-9);
    assert!((display.y - 10.0).abs() < 1e-9);
    let back = view.display_to_world(display);
    assert!((back.x - 10.0).abs() < 1e-9);
    assert!(back.y.abs() < 1e-9);
}

#[test]
fn test_fit_to_bounds_shows_whole_box() {
    let mut view = ViewTransform::new(1000.0, 500.0);
    let bounds = Rect::from_corners(Point::new(100.0, 100.0), Point::new(300.0, 200.0));
    view.fit_to_bounds(&bounds, 0.1);

    let visible = view.visible_world_rect();
    for corner in bounds.corners() {
        assert!(visible.contains(&corner), "{:?} not in {:?}", corner, visible);
    }
    let centre = view.world_to_screen(bounds.center());
    assert!((centre.x - 500.0).abs() < 1e-9);
    assert!((centre.y - 250.0).abs() < 1e-9);
}

#[test]
fn test_scroll_proxy_tracks_pan() {
    let mut session = tordie_designer::EditSession::new(800.0, 600.0);
    let before = session.scroll_proxy(ScrollAxis::Horizontal);
    session.view.pan_by(-50.0, 0.0);
    let after = session.scroll_proxy(ScrollAxis::Horizontal);
    assert_eq!(after.position_px - before.position_px, 50.0);

    session.scroll_to(ScrollAxis::Horizontal, before.position_px);
    assert_eq!(session.view.pan_x(), 0.0);
}
