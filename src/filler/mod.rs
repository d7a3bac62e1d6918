//! Overlays a liquid-level style fill on arbitrary SVG artwork.
//!
//! This module provides the entry points [`render`] and [`render_or_comment`] and splits
//! the work into submodules:
//!
//! *   `sanitize` cleans pasted text (quotes, backslash escapes, whitespace).
//! *   `document` parses the markup into an owned tree and serializes it back.
//! *   `geometry` resolves the viewport and computes the fill rectangle.
//! *   `inject` upserts the `tankFillGrad` gradient and the `__tankFillPath` path.
//!
//! Every call parses a fresh tree from the input text; nothing is retained between calls.

pub mod constants;
pub mod document;
pub mod geometry;
pub mod inject;
pub mod params;
pub mod sanitize;

pub use params::{clamp_percent, coerce_number, FillParams, PartialFillParams};
pub use sanitize::{clean_svg_string, is_blank};

use crate::errors::Result;
use constants::PLACEHOLDER_SVG;
use log::{debug, warn};

/// Injects the fill into already-sanitized markup.
///
/// # Arguments
/// * `sanitized` - Markup as produced by [`clean_svg_string`].
/// * `params` - Fill color, level and margins.
///
/// # Returns
/// The serialized document, or [`crate::FillError::InvalidInput`] when the markup does not
/// parse into a document rooted at `<svg>`.
pub fn process_svg_to_path_filler(sanitized: &str, params: &FillParams) -> Result<String> {
    let root = document::parse(sanitized)?;
    let root = inject::inject_fill(root, params)?;
    let output = document::serialize(&root)?;
    debug!(
        "Injected fill at {}% into {} bytes of SVG",
        params.clamped_percent(),
        sanitized.len()
    );
    Ok(output)
}

/// Cleans raw input and injects the fill: `render(input, params) -> Result<String>`.
pub fn render(raw: &str, params: &FillParams) -> Result<String> {
    let cleaned = clean_svg_string(raw);
    process_svg_to_path_filler(&cleaned, params)
}

/// The user-facing variant of [`render`]: never fails.
///
/// Blank input renders as an empty string; any error is reported as an XML comment
/// (`<!-- Error: Invalid SVG input -->`) in place of the document.
pub fn render_or_comment(raw: &str, params: &FillParams) -> String {
    if is_blank(raw) {
        return String::new();
    }
    match render(raw, params) {
        Ok(svg) => svg,
        Err(e) => {
            warn!("SVG fill failed: {}", e);
            error_comment(&e)
        }
    }
}

/// Wraps an error message in an XML comment. `--` is not allowed inside comments.
pub fn error_comment(err: &dyn std::fmt::Display) -> String {
    format!("<!-- Error: {} -->", err.to_string().replace("--", "- -"))
}

/// The markup to preview: the processed output, or the placeholder artwork when empty.
pub fn preview_or_placeholder(processed: &str) -> &str {
    if processed.is_empty() {
        PLACEHOLDER_SVG
    } else {
        processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FillError;

    const TANK: &str = r##"<svg viewBox="0 0 100 100" xmlns="http://www.w3.org/2000/svg">
  <rect x="5" y="5" width="90" height="90" stroke="#0f172a" fill="none"/>
</svg>"##;

    #[test]
    fn test_render_is_idempotent() {
        let params = FillParams::new("#0ea5e9", 65.0).with_offsets(5.0, 5.0, 5.0, 5.0);
        let once = render(TANK, &params).expect("valid SVG");
        let twice = render(&once, &params).expect("output stays valid");
        assert_eq!(once, twice);
        assert_eq!(twice.matches(r#"id="tankFillGrad""#).count(), 1);
        assert_eq!(twice.matches(r#"id="__tankFillPath""#).count(), 1);
    }

    #[test]
    fn test_rerun_with_new_params_updates_in_place() {
        let first = render(TANK, &FillParams::new("red", 20.0)).expect("valid SVG");
        let second = render(&first, &FillParams::new("blue", 80.0)).expect("valid SVG");
        assert!(!second.contains("red"));
        assert!(second.contains(r#"<stop offset="80%" stop-color="blue"/>"#));
        assert_eq!(second.matches("<linearGradient").count(), 1);
        assert_eq!(second.matches("<path").count(), 1);
    }

    #[test]
    fn test_render_margins_example() {
        let params = FillParams::new("#000000", 50.0).with_offsets(10.0, 10.0, 0.0, 0.0);
        let out = render(r#"<svg viewBox="0 0 100 100"></svg>"#, &params).expect("valid SVG");
        assert!(out.contains(r#"d="M10 50H90V100H10Z""#));
    }

    #[test]
    fn test_render_escaped_paste() {
        let raw = r#""<svg viewBox=\"0 0 10 10\">\n  <circle r=\"4\"/>\n</svg>""#;
        let out = render(raw, &FillParams::new("#00ff00", 100.0)).expect("valid SVG");
        assert!(out.starts_with(
            r#"<svg viewBox="0 0 10 10" xmlns="http://www.w3.org/2000/svg"><defs>"#
        ));
        assert!(out.contains(r#"d="M0 0H10V10H0Z""#));
        // The collapsed line breaks leave a single space before the circle.
        assert!(out.ends_with(r#"fill="url(#tankFillGrad)"/> <circle r="4"/></svg>"#));
    }

    #[test]
    fn test_render_without_view_box() {
        let out = render(r#"<svg width="100" height="50"><g/></svg>"#, &FillParams::default())
            .expect("valid SVG");
        assert!(out.contains(r#"viewBox="0 0 100 50""#));
    }

    #[test]
    fn test_render_rejects_non_svg() {
        for raw in ["<div></div>", "hello", "<svg", "\"\""] {
            assert!(
                matches!(render(raw, &FillParams::default()), Err(FillError::InvalidInput)),
                "expected rejection of {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_render_or_comment() {
        let params = FillParams::default();
        assert_eq!(render_or_comment("  \n ", &params), "");
        assert_eq!(render_or_comment("\u{feff}", &params), "");
        assert_eq!(render_or_comment("\u{feff} \u{feff}\n", &params), "");
        assert_eq!(
            render_or_comment("<div></div>", &params),
            "<!-- Error: Invalid SVG input -->"
        );
        assert!(render_or_comment("<svg/>", &params).starts_with("<svg"));
    }

    #[test]
    fn test_deeply_nested_input_becomes_an_error_comment() {
        let depth = constants::MAX_DEPTH * 4;
        let raw = format!("<svg>{}{}</svg>", "<g>".repeat(depth), "</g>".repeat(depth));
        assert!(matches!(
            render(&raw, &FillParams::default()),
            Err(FillError::InvalidInput)
        ));
        assert_eq!(
            render_or_comment(&raw, &FillParams::default()),
            "<!-- Error: Invalid SVG input -->"
        );
    }

    #[test]
    fn test_error_comment_never_closes_early() {
        assert_eq!(error_comment(&"a -- b"), "<!-- Error: a - - b -->");
    }

    #[test]
    fn test_preview_falls_back_to_placeholder() {
        assert_eq!(preview_or_placeholder(""), PLACEHOLDER_SVG);
        assert_eq!(preview_or_placeholder("<svg/>"), "<svg/>");
        // The placeholder itself is valid input.
        assert!(render(PLACEHOLDER_SVG, &FillParams::default()).is_ok());
    }
}
