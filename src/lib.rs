pub mod errors;
pub mod filler;

pub use errors::{FillError, Result};
pub use filler::{
    clean_svg_string, constants, render, render_or_comment, FillParams, PartialFillParams,
};

// features
pub mod diff;
pub use diff::compare_svg_content;

use wasm_bindgen::prelude::*;

/// Routes `log` output to the browser console and installs the panic hook.
/// Safe to call more than once.
#[wasm_bindgen]
pub fn init_logging() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    // Fails only when a logger is already installed.
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Cleans pasted SVG text without transforming it.
#[wasm_bindgen]
pub fn clean_svg(raw_svg: &str) -> String {
    clean_svg_string(raw_svg)
}

/// Applies the fill and returns the markup to show, or an error comment on failure.
#[wasm_bindgen]
pub fn process_svg(
    raw_svg: &str,
    fill_color: &str,
    fill_percent: f64,
    offset_left: f64,
    offset_right: f64,
    offset_top: f64,
    offset_bottom: f64,
) -> String {
    let params = FillParams::new(fill_color, fill_percent).with_offsets(
        offset_left,
        offset_right,
        offset_top,
        offset_bottom,
    );
    render_or_comment(raw_svg, &params)
}

/// Like [`process_svg`], with parameters given as a JSON object
/// (`{"fillColor":"#0ea5e9","fillPercent":50,"offsetLeft":0,...}`).
#[wasm_bindgen]
pub fn process_svg_with_params(raw_svg: &str, params_json: &str) -> String {
    match FillParams::from_json(params_json) {
        Ok(params) => render_or_comment(raw_svg, &params),
        Err(e) => filler::error_comment(&e),
    }
}

/// The markup for the preview pane: `processed`, or the placeholder artwork if empty.
#[wasm_bindgen]
pub fn preview_svg(processed: &str) -> String {
    filler::preview_or_placeholder(processed).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_svg_matches_render() {
        let raw = r#"<svg viewBox="0 0 100 100"></svg>"#;
        let out = process_svg(raw, "#000000", 50.0, 10.0, 10.0, 0.0, 0.0);
        assert!(out.contains(r#"d="M10 50H90V100H10Z""#));
    }

    #[test]
    fn test_process_svg_nan_percent_is_empty_fill() {
        let out = process_svg(r#"<svg viewBox="0 0 10 10"/>"#, "red", f64::NAN, 0.0, 0.0, 0.0, 0.0);
        assert!(out.contains(r#"<stop offset="0%" stop-color="red"/>"#));
        assert!(out.contains(r#"d="M0 10H10V10H0Z""#));
    }

    #[test]
    fn test_process_svg_with_params() {
        let out = process_svg_with_params(
            r#"<svg viewBox="0 0 10 10"/>"#,
            r#"{"fillColor":"blue","fillPercent":"100"}"#,
        );
        assert!(out.contains(r#"<stop offset="100%" stop-color="blue"/>"#));

        let out = process_svg_with_params("<svg/>", "not json");
        assert!(out.starts_with("<!-- Error: Failed to deserialize fill parameters"));
    }

    #[test]
    fn test_failures_render_as_comments() {
        assert_eq!(
            process_svg("<div/>", "red", 50.0, 0.0, 0.0, 0.0, 0.0),
            "<!-- Error: Invalid SVG input -->"
        );
        assert_eq!(process_svg("", "red", 50.0, 0.0, 0.0, 0.0, 0.0), "");
    }

    #[test]
    fn test_preview_svg() {
        assert!(preview_svg("").contains(r#"id="gradPh""#));
    }
}
