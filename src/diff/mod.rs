//! Markdown change reports between two SVG documents.

pub mod svg_diff;

pub use svg_diff::{compare_svg_content, SvgDiffMarkdownReport};
