//! Renderer-agnostic draw list.
//!
//! The engine does not rasterize anything. A host renderer asks for a
//! [`RenderList`] once per display tick, gated by [`RedrawGate`], and draws
//! the primitives in order. Coordinates are world units; point radii are
//! already divided by zoom so handles keep a constant on-screen size.

use std::collections::HashSet;

use serde::Serialize;
use tordie_core::Identifier;
use tordie_settings::SelectionSettings;

use crate::diagram::Diagram;
use crate::geometry::{GeometryPayload, Point};
use crate::selection::Selection;
use crate::view::ViewTransform;

/// Smallest zoom used when compensating handle sizes.
const MIN_RADIUS_ZOOM: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RenderPrimitive {
    Point {
        id: Identifier,
        at: Point,
        radius: f64,
        selected: bool,
    },
    Line {
        id: Identifier,
        from: Point,
        to: Point,
        selected: bool,
    },
    Circle {
        id: Identifier,
        center: Point,
        radius: f64,
        selected: bool,
    },
}

impl RenderPrimitive {
    pub fn id(&self) -> &Identifier {
        match self {
            RenderPrimitive::Point { id, .. }
            | RenderPrimitive::Line { id, .. }
            | RenderPrimitive::Circle { id, .. } => id,
        }
    }

    pub fn is_selected(&self) -> bool {
        match self {
            RenderPrimitive::Point { selected, .. }
            | RenderPrimitive::Line { selected, .. }
            | RenderPrimitive::Circle { selected, .. } => *selected,
        }
    }
}

/// Primitives for one frame. Lines come before points so handles draw on top.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderList {
    pub primitives: Vec<RenderPrimitive>,
}

impl RenderList {
    /// Builds the list from the current stores.
    ///
    /// Geometry bound only to hidden items is skipped.
    pub fn build(
        diagram: &Diagram,
        view: &ViewTransform,
        selection: &Selection,
        settings: &SelectionSettings,
    ) -> Self {
        let visual = selection.visual_set(diagram);
        let hidden = hidden_geometry(diagram);
        let zoom = view.zoom().max(MIN_RADIUS_ZOOM);

        let mut shapes = Vec::new();
        let mut handles = Vec::new();
        for geometry in diagram.geometries() {
            if hidden.contains(&geometry.id) {
                continue;
            }
            let id = geometry.id.clone();
            let selected = visual.contains(&id);
            match &geometry.payload {
                GeometryPayload::Point(p) => {
                    let radius_px = if selected {
                        settings.selected_point_radius_px
                    } else {
                        settings.point_radius_px
                    };
                    handles.push(RenderPrimitive::Point {
                        id,
                        at: *p,
                        radius: radius_px / zoom,
                        selected,
                    });
                }
                GeometryPayload::Line { p0, p1 } => shapes.push(RenderPrimitive::Line {
                    id,
                    from: diagram.resolve_point(p0),
                    to: diagram.resolve_point(p1),
                    selected,
                }),
                GeometryPayload::Circle { center, radius } => shapes.push(RenderPrimitive::Circle {
                    id,
                    center: diagram.resolve_point(center),
                    radius: *radius,
                    selected,
                }),
                GeometryPayload::Group { .. }
                | GeometryPayload::Parametric { .. }
                | GeometryPayload::Tessellation { .. }
                | GeometryPayload::ImportedPath { .. } => {}
            }
        }
        shapes.extend(handles);
        Self { primitives: shapes }
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn selected_count(&self) -> usize {
        self.primitives.iter().filter(|p| p.is_selected()).count()
    }
}

fn hidden_geometry(diagram: &Diagram) -> HashSet<Identifier> {
    let mut shown = HashSet::new();
    let mut hidden = HashSet::new();
    for item in diagram.items() {
        if let Some(geometry) = &item.geometry {
            if item.visible {
                shown.insert(geometry.clone());
            } else {
                hidden.insert(geometry.clone());
            }
        }
    }
    hidden.retain(|id| !shown.contains(id));
    hidden
}

/// Redraw throttle that polls store versions once per display tick.
///
/// High-frequency pointer events only bump versions; the render loop calls
/// [`RedrawGate::poll`] each tick and redraws when something moved.
#[derive(Debug, Clone, Default)]
pub struct RedrawGate {
    seen: Option<(u64, u64, u64)>,
}

impl RedrawGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any store changed since the previous poll. The first poll is always true.
    pub fn poll(&mut self, diagram: &Diagram, view: &ViewTransform, selection: &Selection) -> bool {
        let current = (diagram.version(), view.version(), selection.version());
        if self.seen == Some(current) {
            return false;
        }
        self.seen = Some(current);
        true
    }

    /// Forces the next poll to report a change.
    pub fn invalidate(&mut self) {
        self.seen = None;
    }
}
