//! Drag-to-move of a grabbed entity.

use std::collections::HashSet;

use tordie_core::{DiagramError, Identifier};

use crate::diagram::Diagram;
use crate::geometry::{GeometryPayload, PointRef};
use crate::selection::Selection;

fn shift(point: &PointRef, dx: f64, dy: f64) -> PointRef {
    match point {
        PointRef::Resolved(p) => PointRef::Resolved(p.translated(dx, dy)),
        reference => reference.clone(),
    }
}

/// Moves the grabbed entity `id` by a world-space delta.
///
/// * point: the point moves; lines referencing it follow through the reference.
/// * line: every selected point moves, or the line's own referenced endpoints
///   when no point is selected. Inline endpoints of the line move with it.
/// * circle: the centre moves.
///
/// Other kinds are left untouched.
pub fn drag_entity(
    diagram: &mut Diagram,
    selection: &Selection,
    id: &Identifier,
    dx: f64,
    dy: f64,
) -> Result<(), DiagramError> {
    if dx == 0.0 && dy == 0.0 {
        return Ok(());
    }
    let payload = diagram
        .geometry(id)
        .map(|g| g.payload.clone())
        .ok_or_else(|| DiagramError::GeometryNotFound { id: id.clone() })?;

    match payload {
        GeometryPayload::Point(_) => diagram.translate_point(id, dx, dy),
        GeometryPayload::Line { p0, p1 } => {
            let selected_points: Vec<Identifier> = selection
                .iter()
                .filter(|sel| {
                    matches!(
                        diagram.geometry(sel).map(|g| &g.payload),
                        Some(GeometryPayload::Point(_))
                    )
                })
                .cloned()
                .collect();

            let mut targets: HashSet<Identifier> = if selected_points.is_empty() {
                p0.reference().into_iter().chain(p1.reference()).cloned().collect()
            } else {
                selected_points.into_iter().collect()
            };

            for target in targets.drain() {
                if let Err(e) = diagram.translate_point(&target, dx, dy) {
                    tracing::warn!("Skipping endpoint {} during drag: {}", target, e);
                }
            }

            if matches!(p0, PointRef::Resolved(_)) || matches!(p1, PointRef::Resolved(_)) {
                diagram.update_geometry(
                    id,
                    GeometryPayload::Line {
                        p0: shift(&p0, dx, dy),
                        p1: shift(&p1, dx, dy),
                    },
                )?;
            }
            Ok(())
        }
        GeometryPayload::Circle { center, radius } => match center {
            PointRef::Reference(center_id) => diagram.translate_point(&center_id, dx, dy),
            PointRef::Resolved(c) => diagram.update_geometry(
                id,
                GeometryPayload::Circle {
                    center: PointRef::Resolved(c.translated(dx, dy)),
                    radius,
                },
            ),
        },
        _ => {
            tracing::debug!("Geometry {} is not draggable", id);
            Ok(())
        }
    }
}
