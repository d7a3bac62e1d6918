use crate::errors::Result;
use similar::{ChangeTag, TextDiff};
use std::fmt::Write;

/// Holds the results of an SVG comparison, formatted as a Markdown report.
#[derive(Debug)]
pub struct SvgDiffMarkdownReport {
    pub markdown_report: String,
    pub has_differences: bool,
    pub added_lines: usize,
    pub removed_lines: usize,
}

/// Puts every tag on its own line so single-line markup diffs element by element.
pub fn split_tags(svg: &str) -> String {
    svg.replace("><", ">\n<")
}

/// Compares two SVG content strings and generates a structured Markdown diff report.
///
/// Both inputs are split one tag per line first, since sanitized and serialized SVG
/// is usually a single line.
///
/// # Arguments
/// * `base_svg_content` - The content of the base SVG (typically the sanitized input).
/// * `changed_svg_content` - The content of the changed SVG (typically the filled output).
/// * `base_filename` - The name to use for the original file in the diff header and report.
/// * `changed_filename` - The name to use for the new file in the diff header and report.
///
/// # Returns
/// An `SvgDiffMarkdownReport` containing the Markdown report, a flag indicating if
/// differences were found, and the added/removed line counts.
pub fn compare_svg_content(
    base_svg_content: &str,
    changed_svg_content: &str,
    base_filename: &str,
    changed_filename: &str,
) -> Result<SvgDiffMarkdownReport> {
    let base = split_tags(base_svg_content);
    let changed = split_tags(changed_svg_content);
    let diff = TextDiff::from_lines(&base, &changed);
    let mut markdown_report = String::new();
    let mut added_lines = 0;
    let mut removed_lines = 0;
    let has_differences = base != changed;

    writeln!(markdown_report, "# Summary of SVG Changes\n")?;
    writeln!(markdown_report, "---")?;
    writeln!(
        markdown_report,
        "## Comparison: `{}` vs `{}`\n",
        base_filename, changed_filename
    )?;

    if has_differences {
        let hunks = diff
            .unified_diff()
            .header(base_filename, changed_filename)
            .context_radius(3)
            .to_string();

        for change in diff.iter_all_changes() {
            match change.tag() {
                ChangeTag::Insert => added_lines += 1,
                ChangeTag::Delete => removed_lines += 1,
                ChangeTag::Equal => (),
            }
        }

        writeln!(markdown_report, "> SVG files differ.")?;
        writeln!(markdown_report, "> - Lines Added: {}", added_lines)?;
        writeln!(markdown_report, "> - Lines Removed: {}\n", removed_lines)?;

        writeln!(markdown_report, "```diff")?;
        markdown_report.push_str(&hunks);
        if !hunks.ends_with('\n') {
            markdown_report.push('\n');
        }
        writeln!(markdown_report, "```")?;
    } else {
        writeln!(
            markdown_report,
            "> No textual differences found between SVG files."
        )?;
    }

    writeln!(markdown_report, "\n---")?;

    Ok(SvgDiffMarkdownReport {
        markdown_report,
        has_differences,
        added_lines,
        removed_lines,
    })
}
