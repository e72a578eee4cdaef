use std::rc::Rc;

use serde_json::json;
use tordie_core::DiagramError;
use tordie_designer::{
    Diagram, Geometry, GeometryKind, GeometryPayload, ItemOptions, ModifierParams, Point, Transform,
};

fn params(value: serde_json::Value) -> ModifierParams {
    value.as_object().cloned().unwrap_or_default()
}

#[test]
fn test_modifier_stack_then_item_transform() {
    let mut d = Diagram::new();
    let p = d.create_geometry(GeometryPayload::point(1.0, 0.0), None);
    let item = d.create_item(ItemOptions::new().with_geometry(p));
    let shift = d
        .create_modifier("Translate", params(json!({"dx": 2.0})), Vec::new())
        .unwrap();
    let mirror = d
        .create_modifier("Reflect", params(json!({"axis": "x", "at": 0.0})), Vec::new())
        .unwrap();
    d.attach_modifier(&item, &shift).unwrap();
    d.attach_modifier(&item, &mirror).unwrap();
    d.set_item_transform(
        &item,
        Transform {
            x: 10.0,
            ..Transform::identity()
        },
    )
    .unwrap();

    // (1,0) -> translate (3,0) -> mirror (-3,0) -> item offset (7,0)
    assert_eq!(d.evaluate(&item).and_then(|g| g.as_point()), Some(Point::new(7.0, 0.0)));

    // reordering the stack invalidates the cached result
    d.move_modifier(&item, 1, 0).unwrap();
    assert!(!d.is_cached(&item));
    // (1,0) -> mirror (-1,0) -> translate (1,0) -> item offset (11,0)
    assert_eq!(d.evaluate(&item).and_then(|g| g.as_point()), Some(Point::new(11.0, 0.0)));
}

#[test]
fn test_unknown_modifier_type_rejected() {
    let mut d = Diagram::new();
    let result = d.create_modifier("Array", params(json!({})), Vec::new());
    assert!(matches!(result, Err(DiagramError::UnknownModifierType { .. })));
}

#[test]
fn test_custom_evaluator_registration() {
    let mut d = Diagram::new();
    d.register_modifier(
        "Collapse",
        Rc::new(
            |g: &Geometry, _params: &ModifierParams, _inputs: &[Geometry], _ctx: &Diagram| {
                g.map_points(|_| Point::ORIGIN)
            },
        ),
    )
    .unwrap();
    let p = d.create_geometry(GeometryPayload::point(4.0, 4.0), None);
    let item = d.create_item(ItemOptions::new().with_geometry(p));
    let collapse = d.create_modifier("Collapse", params(json!({})), Vec::new()).unwrap();
    d.attach_modifier(&item, &collapse).unwrap();
    assert_eq!(d.evaluate(&item).and_then(|g| g.as_point()), Some(Point::ORIGIN));
}

#[test]
fn test_point_move_invalidates_dependent_line_item() {
    let mut d = Diagram::new();
    let p0 = d.create_geometry(GeometryPayload::point(0.0, 0.0), None);
    let p1 = d.create_geometry(GeometryPayload::point(5.0, 0.0), None);
    let line = d.create_geometry(GeometryPayload::line(p0.clone(), p1), None);
    let item = d.create_item(ItemOptions::new().with_geometry(line));

    d.evaluate(&item);
    assert!(d.is_cached(&item));
    d.update_point(&p0, Point::new(1.0, 1.0)).unwrap();
    assert!(!d.is_cached(&item));
}

#[test]
fn test_item_tree_and_display_list() {
    let mut d = Diagram::new();
    let p = d.create_geometry(GeometryPayload::point(0.0, 0.0), None);
    let group = d.create_item(ItemOptions::new().named("Group"));
    let child = d.create_item(
        ItemOptions::new()
            .named("Point")
            .with_geometry(p)
            .with_parent(group.clone()),
    );

    let labels = d.display_list();
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].name, "Group");
    assert_eq!(labels[0].kind, None);
    assert_eq!(labels[0].children[0].kind, Some(GeometryKind::Point));

    assert!(matches!(
        d.set_parent(&group, Some(&child)),
        Err(DiagramError::CyclicParent { .. })
    ));

    d.remove_item(&group).unwrap();
    assert_eq!(d.item(&child).and_then(|i| i.parent.clone()), None);
    assert_eq!(d.display_list().len(), 1);
}

#[test]
fn test_validate_references_reports_bad_links() {
    let mut d = Diagram::new();
    let circle = d.create_geometry(GeometryPayload::circle(Point::ORIGIN, 1.0), None);
    let p = d.create_geometry(GeometryPayload::point(0.0, 0.0), None);
    d.create_geometry(GeometryPayload::line(p.clone(), circle), None);
    assert_eq!(d.validate_references().len(), 1);

    d.remove_geometry(&p);
    assert_eq!(d.validate_references().len(), 2);
}
