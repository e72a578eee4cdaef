//! Event type definitions for the event bus.
//!
//! Events are cloneable and serializable so a shell can log or replay them.

use serde::{Deserialize, Serialize};

use crate::id::Identifier;

/// Root event enum for all editor events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EditorEvent {
    /// View transform changes (pan, zoom, rotation, extents)
    View(ViewEvent),
    /// Diagram model mutations
    Diagram(DiagramEvent),
    /// Selection set changes
    Selection(SelectionEvent),
    /// Selection tool gesture lifecycle
    Tool(ToolEvent),
}

impl EditorEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            EditorEvent::View(_) => EventCategory::View,
            EditorEvent::Diagram(_) => EventCategory::Diagram,
            EditorEvent::Selection(_) => EventCategory::Selection,
            EditorEvent::Tool(_) => EventCategory::Tool,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            EditorEvent::View(e) => e.description(),
            EditorEvent::Diagram(e) => e.description(),
            EditorEvent::Selection(e) => e.description(),
            EditorEvent::Tool(e) => e.description(),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// View transform events.
    View,
    /// Diagram model events.
    Diagram,
    /// Selection events.
    Selection,
    /// Tool gesture events.
    Tool,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::View => write!(f, "View"),
            EventCategory::Diagram => write!(f, "Diagram"),
            EventCategory::Selection => write!(f, "Selection"),
            EventCategory::Tool => write!(f, "Tool"),
        }
    }
}

/// Snapshot of the view transform carried by change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewSnapshot {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
    pub rotation_deg: f64,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub document_width: f64,
    pub document_height: f64,
}

/// View transform events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ViewEvent {
    /// The single notification rulers and scroll proxies recompute from.
    TransformChanged(ViewSnapshot),
}

impl ViewEvent {
    pub fn description(&self) -> String {
        match self {
            ViewEvent::TransformChanged(s) => format!(
                "View: zoom {:.3} pan ({:.1}, {:.1}) rotation {:.1}",
                s.zoom, s.pan_x, s.pan_y, s.rotation_deg
            ),
        }
    }
}

/// Diagram model events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DiagramEvent {
    GeometryCreated { id: Identifier },
    GeometryChanged { id: Identifier },
    GeometryRemoved { id: Identifier },
    ItemCreated { id: Identifier },
    ItemChanged { id: Identifier },
    ItemRemoved { id: Identifier },
    ModifierCreated { id: Identifier },
    ModifierChanged { id: Identifier },
    /// Evaluation cache cleared for one item, or all items when `id` is `None`.
    Invalidated { id: Option<Identifier> },
}

impl DiagramEvent {
    pub fn description(&self) -> String {
        match self {
            DiagramEvent::GeometryCreated { id } => format!("Geometry created: {}", id),
            DiagramEvent::GeometryChanged { id } => format!("Geometry changed: {}", id),
            DiagramEvent::GeometryRemoved { id } => format!("Geometry removed: {}", id),
            DiagramEvent::ItemCreated { id } => format!("Item created: {}", id),
            DiagramEvent::ItemChanged { id } => format!("Item changed: {}", id),
            DiagramEvent::ItemRemoved { id } => format!("Item removed: {}", id),
            DiagramEvent::ModifierCreated { id } => format!("Modifier created: {}", id),
            DiagramEvent::ModifierChanged { id } => format!("Modifier changed: {}", id),
            DiagramEvent::Invalidated { id: Some(id) } => format!("Cache invalidated: {}", id),
            DiagramEvent::Invalidated { id: None } => "Cache invalidated: all".to_string(),
        }
    }
}

/// Selection events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SelectionEvent {
    Changed { count: usize },
}

impl SelectionEvent {
    pub fn description(&self) -> String {
        match self {
            SelectionEvent::Changed { count } => format!("Selection changed: {} selected", count),
        }
    }
}

/// Selection tool gesture events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ToolEvent {
    LassoStarted,
    LassoFinished { hits: usize },
    LassoCancelled,
    DragStarted { id: Identifier },
    DragFinished { id: Identifier },
}

impl ToolEvent {
    pub fn description(&self) -> String {
        match self {
            ToolEvent::LassoStarted => "Lasso started".to_string(),
            ToolEvent::LassoFinished { hits } => format!("Lasso finished: {} hits", hits),
            ToolEvent::LassoCancelled => "Lasso cancelled".to_string(),
            ToolEvent::DragStarted { id } => format!("Drag started: {}", id),
            ToolEvent::DragFinished { id } => format!("Drag finished: {}", id),
        }
    }
}
