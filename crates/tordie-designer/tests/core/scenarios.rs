use tordie_designer::{
    EditSession, GeometryPayload, Identifier, ListenerKind, ModifierKeys, Point, PointerEvent,
    ViewTransform,
};

fn line_session() -> (EditSession, Identifier, Identifier, Identifier) {
    let mut session = EditSession::new(800.0, 600.0);
    let p0 = session.diagram.create_geometry(GeometryPayload::point(0.0, 0.0), None);
    let p1 = session.diagram.create_geometry(GeometryPayload::point(100.0, 100.0), None);
    let l = session
        .diagram
        .create_geometry(GeometryPayload::line(p0.clone(), p1.clone()), None);
    (session, p0, p1, l)
}

fn selected(session: &EditSession) -> Vec<Identifier> {
    let mut ids: Vec<Identifier> = session.selection.iter().cloned().collect();
    ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    ids
}

fn sorted(mut ids: Vec<Identifier>) -> Vec<Identifier> {
    ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    ids
}

#[test]
fn lasso_around_endpoint_selects_line_and_both_points() {
    let (mut session, p0, p1, l) = line_session();

    session.handle_select(ListenerKind::PointerDown, &PointerEvent::primary(-5.0, -5.0));
    session.handle_select(ListenerKind::PointerMove, &PointerEvent::primary(5.0, 5.0));
    session.handle_select(ListenerKind::PointerUp, &PointerEvent::primary(5.0, 5.0));

    assert_eq!(selected(&session), sorted(vec![p0, p1, l]));
}

#[test]
fn click_point_then_empty_canvas() {
    let (mut session, p0, p1, l) = line_session();

    session.handle_select(ListenerKind::Click, &PointerEvent::primary(0.0, 0.0));
    assert_eq!(selected(&session), sorted(vec![p0, p1, l]));

    session.handle_select(ListenerKind::Click, &PointerEvent::primary(400.0, 20.0));
    assert!(session.selection.is_empty());
}

#[test]
fn zoom_about_cursor_from_one_to_two() {
    let mut view = ViewTransform::new(800.0, 600.0);
    let cursor = Point::new(50.0, 50.0);
    view.zoom_at(cursor, 2.0);

    assert_eq!(view.pan(), Point::new(-50.0, -50.0));
    assert_eq!(view.screen_to_world(cursor), Point::new(50.0, 50.0));
}

#[test]
fn shift_lasso_extends_and_ctrl_click_removes() {
    let mut session = EditSession::new(800.0, 600.0);
    let a = session.diagram.create_geometry(GeometryPayload::point(10.0, 10.0), None);
    let b = session.diagram.create_geometry(GeometryPayload::point(300.0, 300.0), None);

    session.handle_select(ListenerKind::Click, &PointerEvent::primary(10.0, 10.0));
    let shift = ModifierKeys::shift();
    let at = |x: f64, y: f64| PointerEvent::primary(x, y).with_modifiers(shift);
    session.handle_select(ListenerKind::PointerDown, &at(290.0, 290.0));
    session.handle_select(ListenerKind::PointerMove, &at(310.0, 310.0));
    session.handle_select(ListenerKind::PointerUp, &at(310.0, 310.0));
    // the click that trails the lasso release is swallowed
    session.handle_select(ListenerKind::Click, &at(310.0, 310.0));
    assert_eq!(selected(&session), sorted(vec![a.clone(), b.clone()]));

    session.handle_select(
        ListenerKind::Click,
        &PointerEvent::primary(10.0, 10.0).with_modifiers(ModifierKeys::ctrl()),
    );
    assert_eq!(selected(&session), vec![b]);
}

#[test]
fn dragging_endpoint_moves_line() {
    let (mut session, p0, _p1, l) = line_session();

    session.handle_select(ListenerKind::PointerDown, &PointerEvent::primary(100.0, 100.0));
    session.handle_select(ListenerKind::PointerMove, &PointerEvent::primary(120.0, 110.0));
    session.handle_select(ListenerKind::PointerUp, &PointerEvent::primary(120.0, 110.0));

    assert_eq!(
        session.diagram.line_endpoints(&l),
        Some((Point::new(0.0, 0.0), Point::new(120.0, 110.0)))
    );
    assert!(session.selection.contains(&p0));
}

#[test]
fn dangling_reference_does_not_break_selection() {
    let (mut session, p0, _p1, l) = line_session();
    session.diagram.remove_geometry(&p0);

    session.handle_select(ListenerKind::PointerDown, &PointerEvent::primary(-5.0, -5.0));
    session.handle_select(ListenerKind::PointerMove, &PointerEvent::primary(5.0, 5.0));
    session.handle_select(ListenerKind::PointerUp, &PointerEvent::primary(5.0, 5.0));

    // the missing endpoint resolves to the origin, so the line is still hit
    assert!(session.selection.contains(&l));
    assert!(!session.selection.contains(&p0));
    assert!(session.selection.iter().all(|id| session.diagram.geometry(id).is_some()));
    assert_eq!(session.render_list().len(), 2);
}
