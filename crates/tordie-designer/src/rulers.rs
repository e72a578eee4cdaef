//! Ruler tick generation driven by the view transform.
//!
//! Major ticks sit on a "nice" world step (1, 2 or 5 times a power of ten)
//! chosen so that adjacent majors are at least `min_spacing_px` apart on
//! screen. Each major interval is subdivided into minor and sub ticks.

use serde::Serialize;
use tordie_settings::RulerSettings;

use crate::geometry::Point;
use crate::view::{rotate_point, ViewTransform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RulerOrientation {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TickLevel {
    Major,
    Minor,
    Sub,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    /// Position along the ruler in screen pixels.
    pub pos_px: f64,
    pub level: TickLevel,
    /// Present on major ticks only.
    pub label: Option<String>,
}

/// Screen-space extent of the document along one ruler.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DocumentBand {
    pub start_px: f64,
    pub length_px: f64,
}

/// Everything a renderer needs to draw one ruler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RulerModel {
    pub orientation: RulerOrientation,
    pub length_px: f64,
    pub ticks: Vec<Tick>,
    pub band: Option<DocumentBand>,
    pub cursor_px: Option<f64>,
}

/// Smallest 1-2-5 step (world units) whose on-screen size is at least `min_spacing_px`.
pub fn nice_step(zoom: f64, min_spacing_px: f64) -> f64 {
    let raw = min_spacing_px / zoom;
    if !raw.is_finite() || raw <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .into_iter()
        .find(|s| raw <= s * magnitude)
        .unwrap_or(10.0);
    step * magnitude
}

/// Formats a tick value to three significant digits without trailing zeros.
pub fn format_label(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return "0".to_string();
    }
    let digits = 3 - 1 - value.abs().log10().floor() as i32;
    let rounded = if digits >= 0 {
        let factor = 10f64.powi(digits);
        (value * factor).round() / factor
    } else {
        let factor = 10f64.powi(-digits);
        (value / factor).round() * factor
    };
    let text = if digits > 0 {
        format!("{:.*}", digits as usize, rounded)
    } else {
        format!("{:.0}", rounded)
    };
    let text = if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    };
    if text == "-0" {
        "0".to_string()
    } else {
        text
    }
}

/// Tick marks for a ruler of `length_px` whose world origin sits at `offset_px`.
pub fn generate_ticks(
    length_px: f64,
    zoom: f64,
    offset_px: f64,
    settings: &RulerSettings,
) -> Vec<Tick> {
    if length_px <= 0.0 || zoom <= 0.0 || !offset_px.is_finite() {
        return Vec::new();
    }
    let major = nice_step(zoom, settings.min_spacing_px);
    let view_start = -offset_px / zoom;
    let view_end = (length_px - offset_px) / zoom;
    let start_idx = (view_start / major).floor() as i64;
    let end_idx = (view_end / major).ceil() as i64;

    let minor_div = i64::from(settings.minor_divisions.max(1));
    let sub_div = minor_div * i64::from(settings.sub_divisions.max(1));
    let in_range = |pos: f64, margin: f64| pos >= -margin && pos <= length_px + margin;

    let mut ticks = Vec::new();
    for i in start_idx..=end_idx {
        let base = i as f64 * major;
        let major_pos = base * zoom + offset_px;
        if !in_range(major_pos, settings.major_length) {
            continue;
        }
        ticks.push(Tick {
            pos_px: major_pos,
            level: TickLevel::Major,
            label: Some(format_label(base)),
        });

        for (divisions, level, margin) in [
            (minor_div, TickLevel::Minor, settings.minor_length),
            (sub_div, TickLevel::Sub, settings.sub_length),
        ] {
            for j in -divisions..divisions {
                if j == 0 {
                    continue;
                }
                let pos = (base + j as f64 * major / divisions as f64) * zoom + offset_px;
                if in_range(pos, margin) {
                    ticks.push(Tick {
                        pos_px: pos,
                        level,
                        label: None,
                    });
                }
            }
        }
    }
    ticks
}

/// Document extent along the ruler axis, from the rotated document corners.
pub fn document_band(view: &ViewTransform, orientation: RulerOrientation) -> Option<DocumentBand> {
    let (w, h) = (view.document_width(), view.document_height());
    let rotation = view.rotation();
    let coords = [(0.0, 0.0), (0.0, h), (w, 0.0), (w, h)].map(|(x, y)| {
        let p = rotate_point(Point::new(x, y), rotation);
        match orientation {
            RulerOrientation::Horizontal => p.x,
            RulerOrientation::Vertical => p.y,
        }
    });
    let min = coords.iter().copied().fold(f64::INFINITY, f64::min);
    let max = coords.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let offset = match orientation {
        RulerOrientation::Horizontal => view.pan_x(),
        RulerOrientation::Vertical => view.pan_y(),
    };
    let length_px = ((max - min) * view.zoom()).max(0.0);
    if length_px <= 0.0 {
        return None;
    }
    Some(DocumentBand {
        start_px: min * view.zoom() + offset,
        length_px,
    })
}

/// Builds the full model of one ruler.
///
/// # Arguments
/// * `view` - Current view transform
/// * `orientation` - Which viewport edge the ruler runs along
/// * `settings` - Tick geometry
/// * `cursor_screen` - Pointer position along the ruler axis, if known
pub fn build_ruler(
    view: &ViewTransform,
    orientation: RulerOrientation,
    settings: &RulerSettings,
    cursor_screen: Option<f64>,
) -> RulerModel {
    let (length_px, offset) = match orientation {
        RulerOrientation::Horizontal => (view.viewport_width(), view.pan_x()),
        RulerOrientation::Vertical => (view.viewport_height(), view.pan_y()),
    };
    RulerModel {
        orientation,
        length_px,
        ticks: generate_ticks(length_px, view.zoom(), offset, settings),
        band: document_band(view, orientation),
        cursor_px: cursor_screen
            .filter(|c| c.is_finite())
            .map(|c| c.clamp(0.0, length_px.max(0.0))),
    }
}
