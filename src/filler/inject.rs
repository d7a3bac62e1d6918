//! Tree edits of the fill transform.
//!
//! Each step takes the tree by value and hands back the edited tree, so a run owns its
//! document from parse to serialization. Edits are keyed by fixed identifiers, which
//! makes a second run over already-processed output replace rather than accumulate.

use super::{
    constants::{ARTWORK_ID_SUFFIX, FILL_PATH_ID, GRADIENT_ID, SVG_NAMESPACE, TRANSPARENT},
    document::{Element, Node},
    geometry::{compute_fill_rect, format_number, resolve_viewport},
    params::FillParams,
};
use crate::errors::{FillError, Result};
use log::{debug, trace};

/// Injects the fill gradient and fill path into a parsed document.
///
/// # Arguments
/// * `root` - The document's root element. Must be named `svg`.
/// * `params` - Fill color, level and margins.
///
/// # Returns
/// The edited root, or [`FillError::InvalidInput`] if the root is not an `<svg>` element.
pub fn inject_fill(root: Element, params: &FillParams) -> Result<Element> {
    if root.name != "svg" {
        debug!("Root element is <{}>, expected <svg>", root.name);
        return Err(FillError::InvalidInput);
    }

    let mut root = ensure_namespace(root);
    let viewport = resolve_viewport(&root);
    if viewport.synthesized {
        root.set_attr("viewBox", viewport.view_box_value());
    }

    let gradient = build_gradient(&params.fill_color, params.clamped_percent());
    let (root, defs_index) = upsert_gradient(root, gradient);

    let path_data = compute_fill_rect(&viewport, params).to_path_data();
    Ok(upsert_fill_path(root, defs_index, path_data))
}

/// Adds the SVG namespace declaration when the root has none (or an empty one).
fn ensure_namespace(mut root: Element) -> Element {
    if root.attr("xmlns").map_or(true, str::is_empty) {
        root.set_attr("xmlns", SVG_NAMESPACE);
    }
    root
}

/// Builds the vertical, hard-edged gradient: solid `color` from the bottom up to
/// `percent`, transparent above it.
pub fn build_gradient(color: &str, percent: f64) -> Element {
    let level = format!("{}%", format_number(percent));
    let stops = [
        ("0%", color),
        (level.as_str(), color),
        (level.as_str(), TRANSPARENT),
        ("100%", TRANSPARENT),
    ];

    stops.iter().fold(
        Element::new("linearGradient")
            .with_attr("id", GRADIENT_ID)
            .with_attr("x1", "0%")
            .with_attr("y1", "100%")
            .with_attr("x2", "0%")
            .with_attr("y2", "0%"),
        |gradient, (offset, stop_color)| {
            gradient.with_child(
                Element::new("stop")
                    .with_attr("offset", *offset)
                    .with_attr("stop-color", *stop_color),
            )
        },
    )
}

/// Replaces any existing gradient with the same identifier and appends `gradient` to the
/// root's `defs`, creating `defs` as the first child when there is none.
///
/// Stale copies are anything carrying the identifier inside that `defs`, plus
/// `linearGradient` elements carrying it elsewhere. Other artwork that happens to use the
/// identifier is kept under [`ARTWORK_ID_SUFFIX`] so the gradient's id stays unique.
///
/// Returns the edited root and the index of `defs` among the root's children.
fn upsert_gradient(mut root: Element, gradient: Element) -> (Element, usize) {
    let defs_index = match root.position_of_child("defs") {
        Some(index) => index,
        None => {
            trace!("Creating <defs> as first child of <svg>");
            root.children.insert(0, Node::Element(Element::new("defs")));
            0
        }
    };

    let mut removed = match root.children.get_mut(defs_index) {
        Some(Node::Element(defs)) => defs.remove_descendants_by_id(GRADIENT_ID),
        _ => 0,
    };
    removed += root.remove_descendants_where(|el| {
        el.name == "linearGradient" && el.id() == Some(GRADIENT_ID)
    });
    if removed > 0 {
        trace!("Removed {} stale #{} element(s)", removed, GRADIENT_ID);
    }

    let kept_id = format!("{}{}", GRADIENT_ID, ARTWORK_ID_SUFFIX);
    let renamed = root.rename_descendant_ids(GRADIENT_ID, &kept_id);
    if renamed > 0 {
        debug!(
            "Renamed {} artwork element(s) from #{} to #{}",
            renamed, GRADIENT_ID, kept_id
        );
    }

    if let Some(Node::Element(defs)) = root.children.get_mut(defs_index) {
        defs.children.push(Node::Element(gradient));
    }
    (root, defs_index)
}

/// Points the fill path at the gradient with the given path data.
///
/// An existing element with the fill path identifier is updated in place (later
/// duplicates are dropped); otherwise a new path is inserted right after `defs`.
fn upsert_fill_path(mut root: Element, defs_index: usize, path_data: String) -> Element {
    let fill = format!("url(#{})", GRADIENT_ID);

    let removed = root.dedupe_descendants_by_id(FILL_PATH_ID);
    if removed > 0 {
        trace!("Removed {} duplicate #{} element(s)", removed, FILL_PATH_ID);
    }

    match root.find_descendant_by_id_mut(FILL_PATH_ID) {
        Some(path) => {
            path.set_attr("d", path_data);
            path.set_attr("fill", fill);
        }
        None => {
            let path = Element::new("path")
                .with_attr("id", FILL_PATH_ID)
                .with_attr("d", path_data)
                .with_attr("fill", fill);
            root.children.insert(defs_index + 1, Node::Element(path));
        }
    }
    root
}
