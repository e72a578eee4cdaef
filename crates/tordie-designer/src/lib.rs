//! # Tordie Designer
//!
//! Interactive 2-D diagram engine: the data model, coordinate math and
//! selection logic a canvas renderer consumes. Nothing in this crate draws
//! pixels; hosts plug in through the [`Surface`] trait and the
//! [`RenderList`] draw list.
//!
//! ## Core Components
//!
//! ### Model
//! - **Geometry**: points, lines, circles, parametric curves, groups,
//!   tessellations and imported paths keyed by [`Identifier`]
//! - **Diagram**: geometry, item and modifier stores plus the evaluation cache
//! - **Modifiers**: registry of named transform stages (`Reflect`, `Twist`,
//!   `Translate`)
//!
//! ### View
//! - **View Transform**: pan, zoom and display rotation; the single source of
//!   truth for screen/world conversion
//! - **Navigation**: middle-button pan, wheel zoom about the cursor, cursor readout
//! - **Rulers** and **Scroll proxies** derived from the view
//!
//! ### Selection
//! - **Hit-Tester**: zoom-aware point, segment and circle tests
//! - **Selection**: expansion and replace/toggle/union combination rules
//! - **Select Tool**: click, lasso and drag-to-move state machine
//!
//! ## Architecture
//!
//! ```text
//! Surface (host toolkit)
//!   └── listeners ──> EditSession
//!                       ├── SelectTool ──> HitTester ──> ViewTransform
//!                       │                     └────────> Diagram
//!                       ├── Selection
//!                       ├── NavigationController
//!                       └── EventBus ──> rulers, scroll proxies, renderer
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use tordie_designer::{EditSession, ListenerKind, PointerEvent};
//!
//! let mut session = EditSession::new(800.0, 600.0);
//! session.diagram.seed_if_empty();
//!
//! // lasso around the first seeded point
//! session.handle_select(ListenerKind::PointerDown, &PointerEvent::primary(130.0, 150.0));
//! session.handle_select(ListenerKind::PointerMove, &PointerEvent::primary(150.0, 170.0));
//! session.handle_select(ListenerKind::PointerUp, &PointerEvent::primary(150.0, 170.0));
//!
//! // the point pulls in its line and the far endpoint
//! assert_eq!(session.selection.len(), 3);
//! ```

pub mod diagram;
pub mod drag;
pub mod geometry;
pub mod hit_test;
pub mod item;
pub mod modifier;
pub mod navigation;
pub mod render;
pub mod rulers;
pub mod scroll;
pub mod select_tool;
pub mod selection;
pub mod session;
pub mod surface;
pub mod view;

pub use diagram::Diagram;
pub use drag::drag_entity;
pub use geometry::{Geometry, GeometryKind, GeometryPayload, Point, PointRef, Rect};
pub use hit_test::{point_in_inflated_rect, segment_intersects_rect, segments_intersect, HitTester};
pub use item::{DisplayLabel, Item, ItemOptions, Transform};
pub use modifier::{GeometryEvaluator, Modifier, ModifierParams, ModifierRegistry};
pub use navigation::{CursorReadout, NavigationController};
pub use render::{RedrawGate, RenderList, RenderPrimitive};
pub use rulers::{
    build_ruler, format_label, generate_ticks, nice_step, RulerModel, RulerOrientation, Tick,
    TickLevel,
};
pub use scroll::{apply_scroll, ScrollAxis, ScrollProxy};
pub use select_tool::{SelectTool, ToolContext, ToolState};
pub use selection::{combine, expand, CombineMode, ModifierKeys, Selection};
pub use session::EditSession;
pub use surface::{
    enable_navigation, enable_select_mode, Cursor, LassoVisual, Listener, ListenerId, ListenerKind,
    ListenerRegistry, PointerButton, PointerEvent, Surface, ToolFeedback,
};
pub use view::ViewTransform;

pub use tordie_core::Identifier;
