//! Fill parameters: color, level and the four margin offsets.
//!
//! Parameters can be built directly, deserialized from (possibly partial) JSON, or
//! layered from several sources with [`PartialFillParams`]. Numeric inputs are coerced
//! leniently: anything that is not a number becomes `0` instead of an error.

use super::constants::{DEFAULT_FILL_COLOR, DEFAULT_FILL_PERCENT};
use crate::errors::Result;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

/// The user-controlled inputs of a fill transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "PartialFillParams")]
pub struct FillParams {
    /// Any value accepted by the `stop-color` attribute, e.g. `#rrggbb`.
    pub fill_color: String,
    /// Fill level in percent. Clamped to `[0, 100]` when used.
    pub fill_percent: f64,
    /// Margin from the left edge, in percent of the viewport width. Not clamped.
    pub offset_left: f64,
    /// Margin from the right edge, in percent of the viewport width. Not clamped.
    pub offset_right: f64,
    /// Margin from the top edge, in percent of the viewport height. Not clamped.
    pub offset_top: f64,
    /// Margin from the bottom edge, in percent of the viewport height. Not clamped.
    pub offset_bottom: f64,
}

impl Default for FillParams {
    fn default() -> Self {
        Self {
            fill_color: DEFAULT_FILL_COLOR.to_string(),
            fill_percent: DEFAULT_FILL_PERCENT,
            offset_left: 0.0,
            offset_right: 0.0,
            offset_top: 0.0,
            offset_bottom: 0.0,
        }
    }
}

impl FillParams {
    /// Creates parameters with the given color and level and no margins.
    pub fn new(fill_color: impl Into<String>, fill_percent: f64) -> Self {
        Self {
            fill_color: fill_color.into(),
            fill_percent,
            ..Default::default()
        }
    }

    /// Sets the four margins, in left, right, top, bottom order.
    pub fn with_offsets(mut self, left: f64, right: f64, top: f64, bottom: f64) -> Self {
        self.offset_left = left;
        self.offset_right = right;
        self.offset_top = top;
        self.offset_bottom = bottom;
        self
    }

    /// Parses parameters from a JSON object. Missing keys take their default value.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The fill level clamped to `[0, 100]`, with NaN treated as `0`.
    pub fn clamped_percent(&self) -> f64 {
        clamp_percent(self.fill_percent)
    }

    /// Returns a copy with every value present in `overrides` replacing the current one.
    pub fn merged(mut self, overrides: &PartialFillParams) -> Self {
        if let Some(color) = &overrides.fill_color {
            self.fill_color = color.clone();
        }
        let fields = [
            (&mut self.fill_percent, overrides.fill_percent),
            (&mut self.offset_left, overrides.offset_left),
            (&mut self.offset_right, overrides.offset_right),
            (&mut self.offset_top, overrides.offset_top),
            (&mut self.offset_bottom, overrides.offset_bottom),
        ];
        for (slot, value) in fields {
            if let Some(v) = value {
                *slot = v;
            }
        }
        self
    }
}

/// A sparse set of parameter values, used to layer defaults, environment, files and flags.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialFillParams {
    #[serde(default)]
    pub fill_color: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub fill_percent: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub offset_left: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub offset_right: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub offset_top: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub offset_bottom: Option<f64>,
}

impl PartialFillParams {
    /// Environment variables read by [`PartialFillParams::from_lookup`].
    pub const ENV_COLOR: &'static str = "SVG_FILL_COLOR";
    pub const ENV_PERCENT: &'static str = "SVG_FILL_PERCENT";
    pub const ENV_OFFSET_LEFT: &'static str = "SVG_FILL_OFFSET_LEFT";
    pub const ENV_OFFSET_RIGHT: &'static str = "SVG_FILL_OFFSET_RIGHT";
    pub const ENV_OFFSET_TOP: &'static str = "SVG_FILL_OFFSET_TOP";
    pub const ENV_OFFSET_BOTTOM: &'static str = "SVG_FILL_OFFSET_BOTTOM";

    /// Reads overrides through `lookup`, normally a wrapper around `std::env::var`.
    ///
    /// Blank values are ignored; non-numeric values for numeric keys coerce to `0`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let number = |key: &str| get(key).map(|v| coerce_number(&v));
        Self {
            fill_color: get(Self::ENV_COLOR).map(|v| v.trim().to_string()),
            fill_percent: number(Self::ENV_PERCENT),
            offset_left: number(Self::ENV_OFFSET_LEFT),
            offset_right: number(Self::ENV_OFFSET_RIGHT),
            offset_top: number(Self::ENV_OFFSET_TOP),
            offset_bottom: number(Self::ENV_OFFSET_BOTTOM),
        }
    }

    /// Parses a sparse JSON object; keys that are absent stay `None`.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl From<PartialFillParams> for FillParams {
    fn from(partial: PartialFillParams) -> Self {
        FillParams::default().merged(&partial)
    }
}

// --- Lenient Numeric Coercion ---

/// Clamps a percentage to `[0, 100]`. NaN becomes `0`.
pub fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// Parses a string the way `Number(string)` does in a browser.
///
/// Surrounding whitespace is ignored, an empty string is `0`, `Infinity` and `0x` hex
/// literals are accepted. Returns `None` where a browser would produce `NaN`.
pub fn parse_js_number(s: &str) -> Option<f64> {
    let t = s.trim();
    if t.is_empty() {
        return Some(0.0);
    }
    match t {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }
    if let Some(hex) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16).ok().map(|v| v as f64);
    }
    // Rust accepts "inf" and "nan" spellings that browsers reject.
    if t.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return None;
    }
    t.parse::<f64>().ok()
}

/// Coerces a numeric string, mapping anything unparseable to `0`.
pub fn coerce_number(s: &str) -> f64 {
    parse_js_number(s).filter(|v| !v.is_nan()).unwrap_or(0.0)
}

/// Coerces any JSON value to a number; non-numeric values become `0`.
fn coerce_json_number(value: &JsonValue) -> f64 {
    match value {
        JsonValue::Number(n) => n.as_f64().unwrap_or(0.0),
        JsonValue::String(s) => coerce_number(s),
        JsonValue::Bool(b) => f64::from(u8::from(*b)),
        JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => 0.0,
    }
}

fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = JsonValue::deserialize(deserializer)?;
    Ok(Some(coerce_json_number(&value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_match_initial_tool_state() {
        let params = FillParams::default();
        assert_eq!(params.fill_color, "#0ea5e9");
        assert_eq!(params.fill_percent, 50.0);
        assert_eq!(params.offset_left, 0.0);
        assert_eq!(params.offset_bottom, 0.0);
    }

    #[test]
    fn test_clamp_percent() {
        assert_eq!(clamp_percent(150.0), 100.0);
        assert_eq!(clamp_percent(-20.0), 0.0);
        assert_eq!(clamp_percent(42.5), 42.5);
        assert_eq!(clamp_percent(f64::NAN), 0.0);
    }

    #[test]
    fn test_parse_js_number() {
        assert_eq!(parse_js_number(" 12 "), Some(12.0));
        assert_eq!(parse_js_number(""), Some(0.0));
        assert_eq!(parse_js_number("1e2"), Some(100.0));
        assert_eq!(parse_js_number(".5"), Some(0.5));
        assert_eq!(parse_js_number("0x10"), Some(16.0));
        assert_eq!(parse_js_number("-Infinity"), Some(f64::NEG_INFINITY));
        assert_eq!(parse_js_number("100%"), None);
        assert_eq!(parse_js_number("12px"), None);
        assert_eq!(parse_js_number("inf"), None);
        assert_eq!(parse_js_number("NaN"), None);
    }

    #[test]
    fn test_partial_json_fills_in_defaults() {
        let params = FillParams::from_json(r##"{"fillColor":"#ff0000","offsetLeft":10}"##)
            .expect("valid params JSON");
        assert_eq!(params.fill_color, "#ff0000");
        assert_eq!(params.fill_percent, 50.0);
        assert_eq!(params.offset_left, 10.0);
        assert_eq!(params.offset_right, 0.0);
    }

    #[test]
    fn test_non_numeric_json_values_coerce_to_zero() {
        let params = FillParams::from_json(
            r#"{"fillPercent":"abc","offsetLeft":"7","offsetRight":null,"offsetTop":true,"offsetBottom":[1]}"#,
        )
        .expect("lenient params JSON");
        assert_eq!(params.fill_percent, 0.0);
        assert_eq!(params.offset_left, 7.0);
        assert_eq!(params.offset_right, 0.0);
        assert_eq!(params.offset_top, 1.0);
        assert_eq!(params.offset_bottom, 0.0);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(FillParams::from_json("{not json").is_err());
    }

    #[test]
    fn test_serialized_params_use_camel_case() {
        let json = serde_json::to_string(&FillParams::new("red", 30.0)).expect("serializable");
        assert!(json.contains("\"fillColor\":\"red\""));
        assert!(json.contains("\"fillPercent\":30.0"));
        assert!(json.contains("\"offsetBottom\":0.0"));
    }

    #[test]
    fn test_layering_from_lookup_and_json() {
        let env: HashMap<&str, &str> = [
            ("SVG_FILL_COLOR", " #112233 "),
            ("SVG_FILL_PERCENT", "80"),
            ("SVG_FILL_OFFSET_TOP", "oops"),
            ("SVG_FILL_OFFSET_LEFT", "   "),
        ]
        .into_iter()
        .collect();
        let from_env = PartialFillParams::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(from_env.fill_color.as_deref(), Some("#112233"));
        assert_eq!(from_env.fill_percent, Some(80.0));
        assert_eq!(from_env.offset_top, Some(0.0));
        assert_eq!(from_env.offset_left, None);

        let from_file = PartialFillParams::from_json(r#"{"fillPercent":25}"#).expect("valid JSON");
        let params = FillParams::default().merged(&from_env).merged(&from_file);
        assert_eq!(params.fill_color, "#112233");
        assert_eq!(params.fill_percent, 25.0);
        assert_eq!(params.clamped_percent(), 25.0);
    }
}
