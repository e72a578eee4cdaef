//! Edit session: the explicitly constructed context owning every store of
//! one open document.

use std::rc::Rc;

use tordie_core::{EventBus, EventBusConfig};
use tordie_settings::Config;

use crate::diagram::Diagram;
use crate::navigation::NavigationController;
use crate::render::RenderList;
use crate::rulers::{build_ruler, RulerModel, RulerOrientation};
use crate::scroll::{apply_scroll, ScrollAxis, ScrollProxy};
use crate::select_tool::{SelectTool, ToolContext};
use crate::selection::Selection;
use crate::surface::{ListenerKind, PointerEvent, ToolFeedback};
use crate::view::ViewTransform;

/// Stores, tools and configuration of one editing session.
///
/// Owns the event bus; every store publishes to it. Surfaces hold the
/// session through `Shared<EditSession>` and reach it from their listeners.
#[derive(Debug)]
pub struct EditSession {
    pub diagram: Diagram,
    pub view: ViewTransform,
    pub selection: Selection,
    pub tool: SelectTool,
    pub navigation: NavigationController,
    pub settings: Config,
    bus: Rc<EventBus>,
}

impl EditSession {
    /// Creates a session with default configuration.
    pub fn new(viewport_width: f64, viewport_height: f64) -> Self {
        Self::from_config(Config::default(), viewport_width, viewport_height)
    }

    /// Creates a session from `settings` for a viewport of the given pixel size.
    pub fn from_config(settings: Config, viewport_width: f64, viewport_height: f64) -> Self {
        Self::with_bus(settings, viewport_width, viewport_height, EventBusConfig::default())
    }

    pub fn with_bus(
        settings: Config,
        viewport_width: f64,
        viewport_height: f64,
        bus_config: EventBusConfig,
    ) -> Self {
        let settings = match settings.validate() {
            Ok(()) => settings,
            Err(e) => {
                tracing::warn!("Invalid settings ({}), using defaults", e);
                Config::default()
            }
        };
        let bus = Rc::new(EventBus::with_config(bus_config));

        let mut diagram = Diagram::new();
        diagram.attach_bus(bus.clone());
        let mut view = ViewTransform::from_settings(
            &settings.viewport,
            &settings.document,
            viewport_width,
            viewport_height,
        );
        view.attach_bus(bus.clone());
        let mut selection = Selection::new();
        selection.attach_bus(bus.clone());
        let mut tool = SelectTool::new();
        tool.attach_bus(bus.clone());

        tracing::info!(
            "Edit session created ({}x{} viewport, document {}x{})",
            viewport_width,
            viewport_height,
            settings.document.width,
            settings.document.height
        );

        Self {
            diagram,
            view,
            selection,
            tool,
            navigation: NavigationController::new(),
            settings,
            bus,
        }
    }

    pub fn bus(&self) -> &Rc<EventBus> {
        &self.bus
    }

    fn tool_context(&mut self) -> (&mut SelectTool, ToolContext<'_>) {
        (
            &mut self.tool,
            ToolContext {
                diagram: &mut self.diagram,
                view: &self.view,
                selection: &mut self.selection,
                settings: &self.settings.selection,
            },
        )
    }

    /// Routes a surface event to the selection tool.
    pub fn handle_select(&mut self, kind: ListenerKind, event: &PointerEvent) -> ToolFeedback {
        let (tool, mut ctx) = self.tool_context();
        match kind {
            ListenerKind::PointerDown => tool.pointer_down(&mut ctx, event),
            ListenerKind::PointerMove => tool.pointer_move(&mut ctx, event),
            ListenerKind::PointerUp => tool.pointer_up(&mut ctx, event),
            ListenerKind::Click => tool.click(&mut ctx, event),
            ListenerKind::WindowPointerUp => tool.window_pointer_up(&mut ctx, event),
            ListenerKind::PointerLeave => tool.pointer_leave(&mut ctx, event),
            ListenerKind::Wheel => ToolFeedback::none(),
        }
    }

    /// Routes a surface event to the navigation controller.
    pub fn handle_navigation(&mut self, kind: ListenerKind, event: &PointerEvent) -> ToolFeedback {
        match kind {
            ListenerKind::PointerDown => self.navigation.pointer_down(&self.view, event),
            ListenerKind::PointerMove => self.navigation.pointer_move(&mut self.view, event),
            ListenerKind::PointerUp => self.navigation.pointer_up(event),
            ListenerKind::WindowPointerUp => self.navigation.window_pointer_up(),
            ListenerKind::PointerLeave => self.navigation.pointer_leave(),
            ListenerKind::Wheel => {
                let factor = self.settings.viewport.wheel_zoom_factor;
                self.navigation.wheel(&mut self.view, event, factor)
            }
            ListenerKind::Click => ToolFeedback::none(),
        }
    }

    /// Abandons any selection gesture in progress.
    pub fn cancel_tool(&mut self) {
        self.tool.cancel();
    }

    pub fn select_all(&mut self) {
        self.selection.select_all(&self.diagram);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear_selection();
    }

    /// Restores the configured default pan, zoom and rotation.
    pub fn reset_view(&mut self) {
        self.view.reset();
    }

    pub fn render_list(&self) -> RenderList {
        RenderList::build(&self.diagram, &self.view, &self.selection, &self.settings.selection)
    }

    pub fn ruler(&self, orientation: RulerOrientation) -> RulerModel {
        let cursor = self.navigation.readout().map(|r| match orientation {
            RulerOrientation::Horizontal => r.screen.x,
            RulerOrientation::Vertical => r.screen.y,
        });
        build_ruler(&self.view, orientation, &self.settings.ruler, cursor)
    }

    fn padding(&self, axis: ScrollAxis) -> f64 {
        match axis {
            ScrollAxis::Horizontal => self.settings.viewport.padding_x,
            ScrollAxis::Vertical => self.settings.viewport.padding_y,
        }
    }

    pub fn scroll_proxy(&self, axis: ScrollAxis) -> ScrollProxy {
        ScrollProxy::from_view(&self.view, axis, self.padding(axis))
    }

    /// Applies a scrollbar drag to the view.
    pub fn scroll_to(&mut self, axis: ScrollAxis, position: f64) {
        let padding = self.padding(axis);
        apply_scroll(&mut self.view, axis, position, padding);
    }
}
