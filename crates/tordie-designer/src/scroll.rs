//! Scrollbar proxies for the canvas.
//!
//! Each axis is modelled as a native scroll container whose content is the
//! viewport plus the range the document (with padding) can travel. The range
//! always covers the current pan so the thumb never jumps when the user pans
//! past the padded document.

use serde::Serialize;

use crate::view::ViewTransform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScrollAxis {
    Horizontal,
    Vertical,
}

/// Scroll container state for one axis, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScrollProxy {
    pub axis: ScrollAxis,
    pub viewport_px: f64,
    /// Total scrollable content length.
    pub content_px: f64,
    /// Scroll offset matching the current pan.
    pub position_px: f64,
    /// Pan at scroll position zero.
    upper_px: f64,
}

impl ScrollProxy {
    /// Computes the proxy for `axis`, padding the document by `padding` world units.
    pub fn from_view(view: &ViewTransform, axis: ScrollAxis, padding: f64) -> Self {
        let zoom = view.zoom();
        let (viewport, document, pan) = match axis {
            ScrollAxis::Horizontal => (view.viewport_width(), view.document_width(), view.pan_x()),
            ScrollAxis::Vertical => (view.viewport_height(), view.document_height(), view.pan_y()),
        };

        let pan_min = zoom * padding;
        let pan_max = pan_min.min(viewport - zoom * (padding + document));
        let low = pan_max.min(pan);
        let high = pan_min.max(pan);

        Self {
            axis,
            viewport_px: viewport,
            content_px: viewport + (high - low).max(1.0),
            position_px: high - pan,
            upper_px: high,
        }
    }

    /// Largest valid scroll offset.
    pub fn max_position(&self) -> f64 {
        (self.content_px - self.viewport_px).max(0.0)
    }

    /// Pan producing scroll offset `position`, clamped to the scrollable range.
    pub fn pan_for_position(&self, position: f64) -> f64 {
        self.upper_px - position.clamp(0.0, self.max_position())
    }

    /// Thumb length and start as fractions of the track.
    pub fn thumb(&self) -> (f64, f64) {
        if self.content_px <= 0.0 {
            return (1.0, 0.0);
        }
        (
            (self.viewport_px / self.content_px).min(1.0),
            self.position_px / self.content_px,
        )
    }
}

/// Pans `view` as if the scrollbar of `axis` was dragged to `position`.
pub fn apply_scroll(view: &mut ViewTransform, axis: ScrollAxis, position: f64, padding: f64) {
    if !position.is_finite() {
        return;
    }
    let proxy = ScrollProxy::from_view(view, axis, padding);
    let pan = proxy.pan_for_position(position);
    match axis {
        ScrollAxis::Horizontal => view.set_pan(pan, view.pan_y()),
        ScrollAxis::Vertical => view.set_pan(view.pan_x(), pan),
    }
}
