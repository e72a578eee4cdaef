//! View transform for canvas rendering.
//!
//! Handles conversion between screen pixels and world (document) coordinates
//! under pan and zoom:
//!
//! ```text
//! screen = world * zoom + pan
//! world  = (screen - pan) / zoom
//! ```
//!
//! Rotation is display-only. It feeds ruler and guide overlays through
//! [`ViewTransform::world_to_display`] but never enters the hit-testing or
//! pan/zoom math above.

use std::fmt;
use std::rc::Rc;

use tordie_core::event_bus::{ViewEvent, ViewSnapshot};
use tordie_core::{EditorEvent, EventBus};
use tordie_settings::{DocumentSettings, ViewportSettings};

use crate::geometry::{Point, Rect};

/// Pan, zoom and rotation state shared by rulers, scroll proxies, cursor
/// readouts and the hit-tester.
#[derive(Debug, Clone)]
pub struct ViewTransform {
    pan_x: f64,
    pan_y: f64,
    zoom: f64,
    rotation_deg: f64,
    document_width: f64,
    document_height: f64,
    viewport_width: f64,
    viewport_height: f64,
    limits: ViewportSettings,
    version: u64,
    bus: Option<Rc<EventBus>>,
}

impl ViewTransform {
    /// Creates a view over a viewport of the given pixel size with default
    /// limits and document extents.
    pub fn new(viewport_width: f64, viewport_height: f64) -> Self {
        Self::from_settings(
            &ViewportSettings::default(),
            &DocumentSettings::default(),
            viewport_width,
            viewport_height,
        )
    }

    /// Creates a view from configuration.
    pub fn from_settings(
        viewport: &ViewportSettings,
        document: &DocumentSettings,
        viewport_width: f64,
        viewport_height: f64,
    ) -> Self {
        let limits = sanitized_limits(viewport);
        Self {
            pan_x: limits.default_offset_x,
            pan_y: limits.default_offset_y,
            zoom: limits.default_zoom.clamp(limits.min_zoom, limits.max_zoom),
            rotation_deg: limits.default_rotation,
            document_width: document.width,
            document_height: document.height,
            viewport_width,
            viewport_height,
            limits,
            version: 0,
            bus: None,
        }
    }

    /// Routes `TransformChanged` notifications to `bus`.
    pub fn attach_bus(&mut self, bus: Rc<EventBus>) {
        self.bus = Some(bus);
    }

    /// Monotonic counter bumped by every effective change.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn pan_x(&self) -> f64 {
        self.pan_x
    }

    pub fn pan_y(&self) -> f64 {
        self.pan_y
    }

    pub fn pan(&self) -> Point {
        Point::new(self.pan_x, self.pan_y)
    }

    /// Gets the current zoom level (1.0 = 100%).
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn rotation(&self) -> f64 {
        self.rotation_deg
    }

    pub fn min_zoom(&self) -> f64 {
        self.limits.min_zoom
    }

    pub fn max_zoom(&self) -> f64 {
        self.limits.max_zoom
    }

    pub fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    pub fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    pub fn document_width(&self) -> f64 {
        self.document_width
    }

    pub fn document_height(&self) -> f64 {
        self.document_height
    }

    /// Copy of the state carried by change notifications.
    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            pan_x: self.pan_x,
            pan_y: self.pan_y,
            zoom: self.zoom,
            rotation_deg: self.rotation_deg,
            viewport_width: self.viewport_width,
            viewport_height: self.viewport_height,
            document_width: self.document_width,
            document_height: self.document_height,
        }
    }

    fn notify(&mut self) {
        self.version += 1;
        let snapshot = self.snapshot();
        tracing::trace!(
            "View changed: zoom {:.3} pan ({:.1}, {:.1})",
            snapshot.zoom,
            snapshot.pan_x,
            snapshot.pan_y
        );
        if let Some(bus) = &self.bus {
            bus.publish(EditorEvent::View(ViewEvent::TransformChanged(snapshot)));
        }
    }

    fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.limits.min_zoom, self.limits.max_zoom)
    }

    /// Sets the pan offset. Non-finite values are refused.
    pub fn set_pan(&mut self, x: f64, y: f64) {
        if !x.is_finite() || !y.is_finite() {
            tracing::warn!("Refusing non-finite pan ({}, {})", x, y);
            return;
        }
        if x == self.pan_x && y == self.pan_y {
            return;
        }
        self.pan_x = x;
        self.pan_y = y;
        self.notify();
    }

    /// Pans by a delta amount in screen pixels.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.set_pan(self.pan_x + dx, self.pan_y + dy);
    }

    /// Sets the zoom level, clamped to the configured range.
    ///
    /// Zero, negative and non-finite values are refused.
    pub fn set_zoom(&mut self, zoom: f64) {
        if !zoom.is_finite() || zoom <= 0.0 {
            tracing::warn!("Refusing zoom {}", zoom);
            return;
        }
        let zoom = self.clamp_zoom(zoom);
        if zoom == self.zoom {
            return;
        }
        self.zoom = zoom;
        self.notify();
    }

    /// Changes zoom while keeping the world point under `cursor` fixed.
    ///
    /// `pan' = c - ((c - pan) / z0) * z1`
    pub fn zoom_at(&mut self, cursor: Point, zoom: f64) {
        if !zoom.is_finite() || zoom <= 0.0 || !cursor.is_finite() {
            tracing::warn!("Refusing zoom {} at ({}, {})", zoom, cursor.x, cursor.y);
            return;
        }
        let new_zoom = self.clamp_zoom(zoom);
        if new_zoom == self.zoom {
            return;
        }
        let old_zoom = self.zoom;
        self.pan_x = cursor.x - ((cursor.x - self.pan_x) / old_zoom) * new_zoom;
        self.pan_y = cursor.y - ((cursor.y - self.pan_y) / old_zoom) * new_zoom;
        self.zoom = new_zoom;
        self.notify();
    }

    fn viewport_center(&self) -> Point {
        Point::new(self.viewport_width / 2.0, self.viewport_height / 2.0)
    }

    /// Zooms in one wheel step about the viewport centre.
    pub fn zoom_in(&mut self) {
        let factor = self.limits.wheel_zoom_factor;
        self.zoom_at(self.viewport_center(), self.zoom * factor);
    }

    /// Zooms out one wheel step about the viewport centre.
    pub fn zoom_out(&mut self) {
        let factor = self.limits.wheel_zoom_factor;
        self.zoom_at(self.viewport_center(), self.zoom / factor);
    }

    /// Sets the display rotation in degrees. Non-finite values are refused.
    pub fn set_rotation(&mut self, degrees: f64) {
        if !degrees.is_finite() {
            tracing::warn!("Refusing rotation {}", degrees);
            return;
        }
        if degrees == self.rotation_deg {
            return;
        }
        self.rotation_deg = degrees;
        self.notify();
    }

    /// Sets the viewport dimensions (typically called when the surface resizes).
    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        if !(width.is_finite() && height.is_finite() && width >= 0.0 && height >= 0.0) {
            tracing::warn!("Refusing viewport size {}x{}", width, height);
            return;
        }
        if width == self.viewport_width && height == self.viewport_height {
            return;
        }
        self.viewport_width = width;
        self.viewport_height = height;
        self.notify();
    }

    /// Sets the document extents in world units.
    pub fn set_document_size(&mut self, width: f64, height: f64) {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            tracing::warn!("Refusing document size {}x{}", width, height);
            return;
        }
        self.document_width = width;
        self.document_height = height;
        self.notify();
    }

    /// Converts world coordinates to screen pixels.
    pub fn world_to_screen(&self, p: Point) -> Point {
        Point::new(p.x * self.zoom + self.pan_x, p.y * self.zoom + self.pan_y)
    }

    /// Converts screen pixels to world coordinates.
    pub fn screen_to_world(&self, p: Point) -> Point {
        Point::new((p.x - self.pan_x) / self.zoom, (p.y - self.pan_y) / self.zoom)
    }

    /// Screen rectangle expressed in world coordinates.
    pub fn screen_rect_to_world(&self, rect: &Rect) -> Rect {
        Rect::from_corners(
            self.screen_to_world(Point::new(rect.min_x, rect.min_y)),
            self.screen_to_world(Point::new(rect.max_x, rect.max_y)),
        )
    }

    /// Converts a screen-pixel distance to world units at the current zoom.
    pub fn px_to_world(&self, px: f64) -> f64 {
        px / self.zoom
    }

    /// World to display pixels with the view rotation pre-multiplied about
    /// the world origin. Used by overlays only.
    pub fn world_to_display(&self, p: Point) -> Point {
        self.world_to_screen(rotate_point(p, self.rotation_deg))
    }

    /// Inverse of [`ViewTransform::world_to_display`].
    pub fn display_to_world(&self, p: Point) -> Point {
        rotate_point(self.screen_to_world(p), -self.rotation_deg)
    }

    /// World-space rectangle currently covered by the viewport.
    pub fn visible_world_rect(&self) -> Rect {
        Rect::from_corners(
            self.screen_to_world(Point::ORIGIN),
            self.screen_to_world(Point::new(self.viewport_width, self.viewport_height)),
        )
    }

    /// Fits the given bounding box into the viewport with padding.
    ///
    /// # Arguments
    /// * `bounds` - World-space box to show
    /// * `padding` - Fraction of the viewport reserved on each side (0.0 - 0.5)
    ///
    /// Centers the content and picks the largest zoom within limits that fits.
    pub fn fit_to_bounds(&mut self, bounds: &Rect, padding: f64) {
        let width = bounds.width();
        let height = bounds.height();
        if !(width > 0.0 || height > 0.0)
            || self.viewport_width <= 0.0
            || self.viewport_height <= 0.0
        {
            return;
        }

        let padding_factor = (1.0 - padding.clamp(0.0, 0.49) * 2.0).max(0.0);
        let zoom_x = if width > 0.0 {
            self.viewport_width * padding_factor / width
        } else {
            f64::INFINITY
        };
        let zoom_y = if height > 0.0 {
            self.viewport_height * padding_factor / height
        } else {
            f64::INFINITY
        };
        let new_zoom = self.clamp_zoom(zoom_x.min(zoom_y));

        let center = bounds.center();
        self.zoom = new_zoom;
        self.pan_x = self.viewport_width / 2.0 - center.x * new_zoom;
        self.pan_y = self.viewport_height / 2.0 - center.y * new_zoom;
        self.notify();
    }

    /// Centers the viewport on a world coordinate.
    pub fn center_on(&mut self, world: Point) {
        self.set_pan(
            self.viewport_width / 2.0 - world.x * self.zoom,
            self.viewport_height / 2.0 - world.y * self.zoom,
        );
    }

    /// Restores the configured default pan, zoom and rotation.
    pub fn reset(&mut self) {
        self.pan_x = self.limits.default_offset_x;
        self.pan_y = self.limits.default_offset_y;
        self.zoom = self.clamp_zoom(self.limits.default_zoom);
        self.rotation_deg = self.limits.default_rotation;
        self.notify();
    }
}

/// Rotates `p` about the origin by `degrees`.
pub fn rotate_point(p: Point, degrees: f64) -> Point {
    if degrees == 0.0 {
        return p;
    }
    let (sin, cos) = degrees.to_radians().sin_cos();
    Point::new(p.x * cos - p.y * sin, p.x * sin + p.y * cos)
}

impl fmt::Display for ViewTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Zoom: {:.2}x | Pan: ({:.1}, {:.1}) | Rotation: {:.1}°",
            self.zoom, self.pan_x, self.pan_y, self.rotation_deg
        )
    }
}

/// Zoom bounds that `f64::clamp` accepts; unusable bounds fall back to the defaults.
fn sanitized_limits(viewport: &ViewportSettings) -> ViewportSettings {
    let defaults = ViewportSettings::default();
    let mut limits = viewport.clone();
    let usable = limits.min_zoom.is_finite()
        && limits.max_zoom.is_finite()
        && limits.min_zoom > 0.0
        && limits.max_zoom >= limits.min_zoom;
    if !usable {
        tracing::warn!("Ignoring zoom limits [{}, {}]", limits.min_zoom, limits.max_zoom);
        limits.min_zoom = defaults.min_zoom;
        limits.max_zoom = defaults.max_zoom;
    }
    if !(limits.wheel_zoom_factor.is_finite() && limits.wheel_zoom_factor > 1.0) {
        limits.wheel_zoom_factor = defaults.wheel_zoom_factor;
    }
    if !(limits.default_offset_x.is_finite() && limits.default_offset_y.is_finite()) {
        limits.default_offset_x = defaults.default_offset_x;
        limits.default_offset_y = defaults.default_offset_y;
    }
    if !limits.default_zoom.is_finite() {
        limits.default_zoom = defaults.default_zoom;
    }
    if !limits.default_rotation.is_finite() {
        limits.default_rotation = defaults.default_rotation;
    }
    limits
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new(1200.0, 800.0)
    }
}
