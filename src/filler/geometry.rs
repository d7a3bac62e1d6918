//! Fill geometry: viewport resolution, the usable area after margins, and the fill
//! rectangle expressed as SVG path data.

use super::{
    constants::DEFAULT_VIEWPORT_SIZE,
    document::Element,
    params::{parse_js_number, FillParams},
};
use log::{debug, warn};

/// The coordinate space of the document, from `viewBox` or `width`/`height`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    /// True when no usable `viewBox` was present and one must be written to the root.
    pub synthesized: bool,
}

impl Viewport {
    /// The `viewBox` value describing this viewport from the origin.
    pub fn view_box_value(&self) -> String {
        format!(
            "0 0 {} {}",
            format_number(self.width),
            format_number(self.height)
        )
    }
}

/// Reads the viewport size from the root element.
///
/// A non-empty `viewBox` wins: its third and fourth tokens are the width and height, and
/// a token that is missing or not a number degrades to `0`. Otherwise `width`/`height`
/// are used, falling back to `100` when absent, zero, or not plain numbers (`"100%"`).
pub fn resolve_viewport(root: &Element) -> Viewport {
    if let Some(view_box) = root.attr("viewBox").filter(|vb| !vb.is_empty()) {
        let tokens: Vec<&str> = view_box
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
            .collect();
        let token = |index: usize| {
            tokens
                .get(index)
                .and_then(|t| parse_js_number(t))
                .filter(|v| !v.is_nan())
        };
        let (width, height) = match (token(2), token(3)) {
            (Some(w), Some(h)) => (w, h),
            (w, h) => {
                warn!("Malformed viewBox {:?}; missing size treated as 0", view_box);
                (w.unwrap_or(0.0), h.unwrap_or(0.0))
            }
        };
        return Viewport {
            width,
            height,
            synthesized: false,
        };
    }

    let dimension = |name: &str| {
        let raw = root.attr(name);
        match raw.and_then(parse_js_number).filter(|v| *v != 0.0 && !v.is_nan()) {
            Some(v) => v,
            None => {
                if let Some(raw) = raw {
                    warn!(
                        "Unusable {} {:?}; using {}",
                        name, raw, DEFAULT_VIEWPORT_SIZE
                    );
                }
                DEFAULT_VIEWPORT_SIZE
            }
        }
    };
    Viewport {
        width: dimension("width"),
        height: dimension("height"),
        synthesized: true,
    }
}

/// An axis-aligned rectangle in viewport coordinates. Width or height may be negative
/// when the margins overlap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl FillRect {
    /// Path data tracing the rectangle: move, horizontal, vertical, horizontal, close.
    pub fn to_path_data(&self) -> String {
        format!(
            "M{} {}H{}V{}H{}Z",
            format_number(self.x),
            format_number(self.y),
            format_number(self.x + self.width),
            format_number(self.y + self.height),
            format_number(self.x)
        )
    }
}

/// Margins are trusted as given; only NaN is neutralized.
fn margin(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value
    }
}

/// Computes the filled part of the usable area.
///
/// The usable area is the viewport minus the four margins (each a percentage of the
/// viewport width or height). The fill covers the bottom `clamped_percent` of it.
pub fn compute_fill_rect(viewport: &Viewport, params: &FillParams) -> FillRect {
    let (vb_w, vb_h) = (viewport.width, viewport.height);
    let left = margin(params.offset_left);
    let right = margin(params.offset_right);
    let top = margin(params.offset_top);
    let bottom_offset = margin(params.offset_bottom);
    let percent = params.clamped_percent();

    let usable_w = vb_w - (left / 100.0) * vb_w - (right / 100.0) * vb_w;
    let usable_h = vb_h - (top / 100.0) * vb_h - (bottom_offset / 100.0) * vb_h;
    let fill_h = (percent / 100.0) * usable_h;
    let x = (left / 100.0) * vb_w;
    let bottom = vb_h - (bottom_offset / 100.0) * vb_h;
    let y = bottom - fill_h;

    debug!(
        "Fill geometry: viewport {}x{}, usable {}x{}, fill height {} at ({}, {})",
        vb_w, vb_h, usable_w, usable_h, fill_h, x, y
    );

    FillRect {
        x,
        y,
        width: usable_w,
        height: fill_h,
    }
}

/// Formats a number the way a browser stringifies it.
///
/// Integral values print without a fraction, `-0` prints as `0`, very large or very small
/// magnitudes use exponent notation with an explicit sign (`1e+21`), and non-finite values
/// print as `NaN`, `Infinity` or `-Infinity`.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let formatted = format!("{:e}", value);
        return match formatted.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => formatted,
        };
    }
    format!("{}", value)
}
