use std::cell::RefCell;
use std::rc::Rc;

use tordie_core::types::shared;
use tordie_designer::{
    enable_navigation, enable_select_mode, Cursor, EditSession, ListenerKind, ListenerRegistry,
    PointerEvent, Rect, Surface,
};

/// Surface double that records every visual change.
#[derive(Default)]
struct RecordingSurface {
    listeners: ListenerRegistry,
    cursor: Cursor,
    lasso: Option<Rect>,
    lasso_history: Vec<Option<Rect>>,
    redraws: usize,
}

impl Surface for RecordingSurface {
    fn listeners_mut(&mut self) -> &mut ListenerRegistry {
        &mut self.listeners
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    fn set_lasso(&mut self, rect: Option<Rect>) {
        self.lasso = rect;
        self.lasso_history.push(rect);
    }

    fn request_redraw(&mut self) {
        self.redraws += 1;
    }
}

fn setup() -> (Rc<RefCell<RecordingSurface>>, Rc<RefCell<EditSession>>) {
    let session = shared(EditSession::new(800.0, 600.0));
    session.borrow_mut().diagram.seed_if_empty();
    (shared(RecordingSurface::default()), session)
}

#[test]
fn select_mode_installs_and_removes_listeners() {
    let (surface, session) = setup();
    let dispose = enable_select_mode(&surface, &session);
    assert_eq!(surface.borrow().listeners.len(), 6);
    assert_eq!(surface.borrow().listeners.count(ListenerKind::WindowPointerUp), 1);
    assert_eq!(surface.borrow().cursor, Cursor::Crosshair);

    dispose();
    assert!(surface.borrow().listeners.is_empty());
    assert_eq!(surface.borrow().cursor, Cursor::Default);
}

#[test]
fn lasso_visual_follows_gesture() {
    let (surface, session) = setup();
    let _dispose = enable_select_mode(&surface, &session);

    surface
        .borrow_mut()
        .dispatch(ListenerKind::PointerDown, &PointerEvent::primary(130.0, 150.0));
    assert_eq!(surface.borrow().lasso, None);

    surface
        .borrow_mut()
        .dispatch(ListenerKind::PointerMove, &PointerEvent::primary(150.0, 170.0));
    assert_eq!(
        surface.borrow().lasso,
        Some(Rect::from_corners(
            tordie_designer::Point::new(130.0, 150.0),
            tordie_designer::Point::new(150.0, 170.0)
        ))
    );

    surface
        .borrow_mut()
        .dispatch(ListenerKind::PointerUp, &PointerEvent::primary(150.0, 170.0));
    assert_eq!(surface.borrow().lasso, None);
    assert_eq!(session.borrow().selection.len(), 3);
    assert!(surface.borrow().redraws > 0);
}

#[test]
fn dispose_hides_lasso_in_progress() {
    let (surface, session) = setup();
    let dispose = enable_select_mode(&surface, &session);

    surface
        .borrow_mut()
        .dispatch(ListenerKind::PointerDown, &PointerEvent::primary(500.0, 500.0));
    surface
        .borrow_mut()
        .dispatch(ListenerKind::PointerMove, &PointerEvent::primary(560.0, 560.0));
    assert!(surface.borrow().lasso.is_some());

    dispose();
    assert_eq!(surface.borrow().lasso, None);
    assert_eq!(surface.borrow().lasso_history.last(), Some(&None));

    // listeners are gone, so further events change nothing
    let ran = surface
        .borrow_mut()
        .dispatch(ListenerKind::PointerUp, &PointerEvent::primary(560.0, 560.0));
    assert_eq!(ran, 0);
    assert!(session.borrow().selection.is_empty());
}

#[test]
fn navigation_wheel_zooms_view() {
    let (surface, session) = setup();
    let dispose = enable_navigation(&surface, &session);
    assert_eq!(surface.borrow().listeners.count(ListenerKind::Wheel), 1);

    surface
        .borrow_mut()
        .dispatch(ListenerKind::Wheel, &PointerEvent::wheel(400.0, 300.0, -1.0));
    let zoom = session.borrow().view.zoom();
    assert!((zoom - 1.1).abs() < 1e-12);

    dispose();
    assert!(surface.borrow().listeners.is_empty());
}

#[test]
fn both_modes_coexist() {
    let (surface, session) = setup();
    let select = enable_select_mode(&surface, &session);
    let navigation = enable_navigation(&surface, &session);
    assert_eq!(surface.borrow().listeners.len(), 12);

    // middle drag pans and never arms the lasso
    surface
        .borrow_mut()
        .dispatch(ListenerKind::PointerDown, &PointerEvent::middle(10.0, 10.0));
    surface
        .borrow_mut()
        .dispatch(ListenerKind::PointerMove, &PointerEvent::middle(40.0, 30.0));
    assert_eq!(session.borrow().view.pan(), tordie_designer::Point::new(30.0, 20.0));
    assert_eq!(surface.borrow().lasso, None);

    navigation();
    select();
    assert!(surface.borrow().listeners.is_empty());
}
