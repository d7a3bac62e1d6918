//! Defines constants used throughout the fill injection process.

// Identifiers used for replace-in-place on repeated runs.
pub const GRADIENT_ID: &str = "tankFillGrad";
pub const FILL_PATH_ID: &str = "__tankFillPath";
/// Appended to the id of artwork that clashes with [`GRADIENT_ID`].
pub const ARTWORK_ID_SUFFIX: &str = "-artwork";

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Deepest element nesting accepted from input, root included (libxml2's default).
pub const MAX_DEPTH: usize = 256;

// Default values mirroring the initial state of the interactive tool.
pub const DEFAULT_FILL_COLOR: &str = "#0ea5e9";
pub const DEFAULT_FILL_PERCENT: f64 = 50.0;
pub const DEFAULT_VIEWPORT_SIZE: f64 = 100.0; // Used when width/height are missing or unusable
pub const TRANSPARENT: &str = "transparent";

/// File name offered when the processed SVG is downloaded.
pub const DEFAULT_DOWNLOAD_NAME: &str = "tank-filled.svg";

/// Artwork shown in place of the preview before any input has been processed.
pub const PLACEHOLDER_SVG: &str = r##"
<svg viewBox="0 0 200 200" width="100%" height="220">
  <rect x="20" y="20" width="160" height="160" stroke="#0f172a" fill="none" rx="12"/>
  <defs>
    <linearGradient id="gradPh" x1="0%" y1="100%" x2="0%" y2="0%">
      <stop offset="0%" stop-color="#0ea5e9"/>
      <stop offset="50%" stop-color="#0ea5e9"/>
      <stop offset="50%" stop-color="transparent"/>
      <stop offset="100%" stop-color="transparent"/>
    </linearGradient>
  </defs>
  <path d="M20 100H180V180H20Z" fill="url(#gradPh)" />
</svg>"##;
