//! Selection tool: click, lasso and drag-to-move gestures.
//!
//! ```text
//! Idle --down on empty--> Armed --move >= threshold--> Lassoing --up--> Idle
//!   ^                       |                                            |
//!   +--------up-------------+                                            |
//!   +--------------------------------------------------------------------+
//! ```
//!
//! A press on a selectable entity never arms the lasso; it starts an entity
//! press that becomes a drag once the pointer travels past the drag
//! threshold. All thresholds are measured in screen pixels.

use std::rc::Rc;

use tordie_core::event_bus::ToolEvent;
use tordie_core::{EditorEvent, EventBus, Identifier};
use tordie_settings::SelectionSettings;

use crate::diagram::Diagram;
use crate::drag::drag_entity;
use crate::geometry::{Point, Rect};
use crate::hit_test::HitTester;
use crate::selection::{ModifierKeys, Selection};
use crate::surface::{Cursor, LassoVisual, PointerButton, PointerEvent, ToolFeedback};
use crate::view::ViewTransform;

/// Lasso gesture state. Coordinates are screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ToolState {
    #[default]
    Idle,
    /// Primary button down on empty canvas; lasso not yet visible.
    Armed { anchor: Point },
    /// Lasso visible, spanning `anchor` to `current`.
    Lassoing { anchor: Point, current: Point },
}

impl ToolState {
    /// Screen rectangle of a visible lasso.
    pub fn lasso_rect(&self) -> Option<Rect> {
        match self {
            ToolState::Lassoing { anchor, current } => Some(Rect::from_corners(*anchor, *current)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct EntityPress {
    id: Identifier,
    start_screen: Point,
    last_world: Point,
    dragging: bool,
}

/// Borrowed stores the tool operates on for one event.
pub struct ToolContext<'a> {
    pub diagram: &'a mut Diagram,
    pub view: &'a ViewTransform,
    pub selection: &'a mut Selection,
    pub settings: &'a SelectionSettings,
}

impl ToolContext<'_> {
    fn pick(&self, screen: Point) -> Option<Identifier> {
        HitTester::new(self.diagram, self.view, self.settings).pick(screen)
    }
}

/// Pointer-driven selection state machine.
#[derive(Debug, Clone, Default)]
pub struct SelectTool {
    state: ToolState,
    press: Option<EntityPress>,
    /// Set when a lasso or drag just ended so the trailing click is ignored.
    suppress_click: bool,
    bus: Option<Rc<EventBus>>,
}

impl SelectTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach_bus(&mut self, bus: Rc<EventBus>) {
        self.bus = Some(bus);
    }

    pub fn state(&self) -> ToolState {
        self.state
    }

    /// Id of the entity being dragged, if a drag is in progress.
    pub fn dragging(&self) -> Option<&Identifier> {
        self.press.as_ref().filter(|p| p.dragging).map(|p| &p.id)
    }

    fn emit(&self, event: ToolEvent) {
        tracing::debug!("{}", event.description());
        if let Some(bus) = &self.bus {
            bus.publish(EditorEvent::Tool(event));
        }
    }

    pub fn pointer_down(
        &mut self,
        ctx: &mut ToolContext<'_>,
        event: &PointerEvent,
    ) -> ToolFeedback {
        if event.button != PointerButton::Primary {
            return ToolFeedback::none();
        }
        self.suppress_click = false;
        let feedback = self.abandon_stale_gesture();

        if let Some(id) = ctx.pick(event.position) {
            tracing::trace!("Pressed entity {}", id);
            self.state = ToolState::Idle;
            self.press = Some(EntityPress {
                id,
                start_screen: event.position,
                last_world: ctx.view.screen_to_world(event.position),
                dragging: false,
            });
            return feedback;
        }

        self.press = None;
        self.state = ToolState::Armed {
            anchor: event.position,
        };
        tracing::trace!("Lasso armed at {:?}", event.position);
        feedback
    }

    /// Ends a gesture whose release never arrived (focus lost mid-drag).
    fn abandon_stale_gesture(&mut self) -> ToolFeedback {
        if let Some(press) = self.press.take().filter(|p| p.dragging) {
            self.emit(ToolEvent::DragFinished { id: press.id });
        }
        if matches!(self.state, ToolState::Lassoing { .. }) {
            self.state = ToolState::Idle;
            self.emit(ToolEvent::LassoCancelled);
            return ToolFeedback::redraw().with_lasso(LassoVisual::Hidden);
        }
        ToolFeedback::none()
    }

    pub fn pointer_move(
        &mut self,
        ctx: &mut ToolContext<'_>,
        event: &PointerEvent,
    ) -> ToolFeedback {
        let threshold = ctx.settings.drag_threshold_px;
        match self.state {
            ToolState::Armed { anchor } => {
                if anchor.distance_to(&event.position) < threshold {
                    return ToolFeedback::none();
                }
                self.state = ToolState::Lassoing {
                    anchor,
                    current: event.position,
                };
                self.emit(ToolEvent::LassoStarted);
                return ToolFeedback::none()
                    .with_lasso(LassoVisual::Show(Rect::from_corners(anchor, event.position)))
                    .with_redraw();
            }
            ToolState::Lassoing { anchor, .. } => {
                self.state = ToolState::Lassoing {
                    anchor,
                    current: event.position,
                };
                tracing::trace!("Lasso to {:?}", event.position);
                return ToolFeedback::none()
                    .with_lasso(LassoVisual::Show(Rect::from_corners(anchor, event.position)))
                    .with_redraw();
            }
            ToolState::Idle => {}
        }

        let Some(press) = self.press.as_mut() else {
            let cursor = if ctx.pick(event.position).is_some() {
                Cursor::Move
            } else {
                Cursor::Crosshair
            };
            return ToolFeedback::none().with_cursor(cursor);
        };

        if !press.dragging {
            if press.start_screen.distance_to(&event.position) < threshold {
                return ToolFeedback::none();
            }
            press.dragging = true;
            let id = press.id.clone();
            if !ctx.selection.contains(&id) {
                ctx.selection
                    .apply_selection([id.clone()], ModifierKeys::none(), ctx.diagram);
            }
            self.emit(ToolEvent::DragStarted { id });
        }

        let Some(press) = self.press.as_mut() else {
            return ToolFeedback::none();
        };
        let world = ctx.view.screen_to_world(event.position);
        let (dx, dy) = (world.x - press.last_world.x, world.y - press.last_world.y);
        press.last_world = world;
        if let Err(e) = drag_entity(ctx.diagram, ctx.selection, &press.id, dx, dy) {
            tracing::warn!("Drag of {} failed: {}", press.id, e);
        }
        ToolFeedback::redraw().with_cursor(Cursor::Grabbing)
    }

    /// Releases the gesture. A release with no matching press is a no-op.
    pub fn pointer_up(&mut self, ctx: &mut ToolContext<'_>, event: &PointerEvent) -> ToolFeedback {
        if event.button != PointerButton::Primary {
            return ToolFeedback::none();
        }
        self.release(ctx, event.modifiers)
    }

    /// Button released anywhere in the window. Finishes a gesture the pointer
    /// carried outside the surface.
    pub fn window_pointer_up(
        &mut self,
        ctx: &mut ToolContext<'_>,
        event: &PointerEvent,
    ) -> ToolFeedback {
        if self.state == ToolState::Idle && self.press.is_none() {
            return ToolFeedback::none();
        }
        self.release(ctx, event.modifiers)
    }

    /// Pointer left the surface. Forces a release when configured to.
    pub fn pointer_leave(
        &mut self,
        ctx: &mut ToolContext<'_>,
        event: &PointerEvent,
    ) -> ToolFeedback {
        if !ctx.settings.release_on_leave {
            return ToolFeedback::none();
        }
        self.release(ctx, event.modifiers)
    }

    fn release(&mut self, ctx: &mut ToolContext<'_>, modifiers: ModifierKeys) -> ToolFeedback {
        if let Some(press) = self.press.take() {
            if press.dragging {
                self.suppress_click = true;
                self.emit(ToolEvent::DragFinished { id: press.id });
                return ToolFeedback::redraw().with_cursor(Cursor::Move);
            }
            return ToolFeedback::none();
        }

        match std::mem::take(&mut self.state) {
            ToolState::Idle => ToolFeedback::none(),
            ToolState::Armed { .. } => {
                tracing::trace!("Lasso disarmed below threshold");
                ToolFeedback::none().with_lasso(LassoVisual::Hidden)
            }
            ToolState::Lassoing { anchor, current } => {
                let rect = Rect::from_corners(anchor, current);
                let hits = HitTester::new(ctx.diagram, ctx.view, ctx.settings).lasso_hits(&rect);
                let count = hits.len();
                ctx.selection.apply_selection(hits, modifiers, ctx.diagram);
                self.suppress_click = true;
                self.emit(ToolEvent::LassoFinished { hits: count });
                ToolFeedback::redraw().with_lasso(LassoVisual::Hidden)
            }
        }
    }

    /// Click without drag: selects the entity under the pointer, or clears
    /// the selection on empty canvas.
    pub fn click(&mut self, ctx: &mut ToolContext<'_>, event: &PointerEvent) -> ToolFeedback {
        if event.button != PointerButton::Primary {
            return ToolFeedback::none();
        }
        if std::mem::take(&mut self.suppress_click) {
            return ToolFeedback::none();
        }
        match ctx.pick(event.position) {
            Some(id) => {
                tracing::debug!("Clicked {}", id);
                ctx.selection.apply_selection([id], event.modifiers, ctx.diagram);
            }
            None => ctx.selection.clear_selection(),
        }
        ToolFeedback::redraw()
    }

    /// Abandons any gesture without touching the selection.
    pub fn cancel(&mut self) -> ToolFeedback {
        let was_lassoing = matches!(self.state, ToolState::Lassoing { .. });
        self.state = ToolState::Idle;
        self.press = None;
        self.suppress_click = false;
        if was_lassoing {
            self.emit(ToolEvent::LassoCancelled);
        }
        ToolFeedback::none().with_lasso(LassoVisual::Hidden)
    }
}
