//! # Tordie
//!
//! An interactive 2-D diagram editing engine with support for:
//! - Pan, zoom and display rotation through a single view transform
//! - Pixel-tolerant hit testing of points, lines and circles
//! - Lasso and click selection with replace, toggle and union modes
//! - Rulers, scroll proxies and a render list for any drawing surface
//!
//! ## Architecture
//!
//! Tordie is organized as a workspace with multiple crates:
//!
//! 1. **tordie-core** - Identifiers, errors, shared handles and the event bus
//! 2. **tordie-settings** - Viewport, document, selection and ruler settings
//! 3. **tordie-designer** - Diagram model, view, hit testing, selection and tools
//! 4. **tordie** - Logging setup and a headless surface that ties the crates together

pub mod headless;

pub use headless::HeadlessSurface;

pub use tordie_core::{
    DiagramError, EditorEvent, EventBus, EventBusConfig, EventCategory, EventFilter, Identifier,
};

pub use tordie_designer::{
    enable_navigation, enable_select_mode, CombineMode, Cursor, Diagram, EditSession, Geometry,
    GeometryKind, GeometryPayload, HitTester, ListenerKind, ModifierKeys, PointerButton,
    PointerEvent, Point, Rect, RenderList, RulerOrientation, ScrollAxis, SelectTool, Selection,
    Surface, ToolState, ViewTransform,
};

pub use tordie_settings::{
    Config, DocumentSettings, RulerSettings, SelectionSettings, ViewportSettings,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
