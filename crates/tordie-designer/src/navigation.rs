//! Pan, wheel zoom and cursor readout.

use serde::Serialize;

use crate::geometry::Point;
use crate::surface::{Cursor, PointerButton, PointerEvent, ToolFeedback};
use crate::view::ViewTransform;

/// Pointer position in both coordinate spaces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CursorReadout {
    pub screen: Point,
    pub world: Point,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PanGesture {
    start_screen: Point,
    start_pan: Point,
}

/// Middle-button panning and wheel zooming of one [`ViewTransform`].
#[derive(Debug, Clone, Default)]
pub struct NavigationController {
    pan: Option<PanGesture>,
    readout: Option<CursorReadout>,
}

impl NavigationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_panning(&self) -> bool {
        self.pan.is_some()
    }

    /// Last pointer position over the surface, `None` after the pointer left.
    pub fn readout(&self) -> Option<CursorReadout> {
        self.readout
    }

    pub fn pointer_down(&mut self, view: &ViewTransform, event: &PointerEvent) -> ToolFeedback {
        if event.button != PointerButton::Middle {
            return ToolFeedback::none();
        }
        self.pan = Some(PanGesture {
            start_screen: event.position,
            start_pan: view.pan(),
        });
        tracing::debug!("Pan started at {:?}", event.position);
        ToolFeedback::none().with_cursor(Cursor::Grabbing)
    }

    /// Updates the readout and, while panning, applies `pan0 + (current - start)`.
    pub fn pointer_move(&mut self, view: &mut ViewTransform, event: &PointerEvent) -> ToolFeedback {
        let mut feedback = ToolFeedback::none();
        if let Some(gesture) = self.pan {
            let dx = event.position.x - gesture.start_screen.x;
            let dy = event.position.y - gesture.start_screen.y;
            view.set_pan(gesture.start_pan.x + dx, gesture.start_pan.y + dy);
            feedback = feedback.with_redraw();
        }
        self.readout = Some(CursorReadout {
            screen: event.position,
            world: view.screen_to_world(event.position),
        });
        feedback
    }

    pub fn pointer_up(&mut self, event: &PointerEvent) -> ToolFeedback {
        if event.button != PointerButton::Middle || self.pan.is_none() {
            return ToolFeedback::none();
        }
        self.finish_pan()
    }

    /// Ends a pan regardless of which button was released.
    pub fn window_pointer_up(&mut self) -> ToolFeedback {
        if self.pan.is_none() {
            return ToolFeedback::none();
        }
        self.finish_pan()
    }

    fn finish_pan(&mut self) -> ToolFeedback {
        self.pan = None;
        tracing::debug!("Pan finished");
        ToolFeedback::none().with_cursor(Cursor::Default)
    }

    pub fn pointer_leave(&mut self) -> ToolFeedback {
        self.readout = None;
        ToolFeedback::none()
    }

    /// Zooms about the cursor by `factor` per notch.
    ///
    /// Negative deltas zoom in. A zero delta is ignored.
    pub fn wheel(
        &mut self,
        view: &mut ViewTransform,
        event: &PointerEvent,
        factor: f64,
    ) -> ToolFeedback {
        let delta = event.wheel_delta_y;
        if delta == 0.0 || !delta.is_finite() {
            return ToolFeedback::none();
        }
        let target = if delta < 0.0 {
            view.zoom() * factor
        } else {
            view.zoom() / factor
        };
        view.zoom_at(event.position, target);
        self.readout = Some(CursorReadout {
            screen: event.position,
            world: view.screen_to_world(event.position),
        });
        ToolFeedback::redraw()
    }

    pub fn cancel(&mut self) {
        self.pan = None;
    }
}
