//! An owned SVG document tree, with parsing from markup and serialization back to it.
//!
//! Parsing is done with `quick-xml`'s pull reader; every call builds a fresh tree that
//! belongs to the caller. Serialization writes the root element only, in the form a
//! browser's `XMLSerializer` produces: childless elements self-close as `<name/>`,
//! attribute values are always double-quoted.

use super::constants::MAX_DEPTH;
use crate::errors::{FillError, Result};
use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fmt::Write;

/// A node inside an element.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Character data, stored unescaped.
    Text(String),
    CData(String),
    Comment(String),
    /// Raw processing instruction content, target included (`xml-stylesheet href="a.css"`).
    ProcessingInstruction(String),
}

/// An element with its attributes in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    /// Qualified tag name as written, prefix included.
    pub name: String,
    /// `(qualified name, unescaped value)` pairs.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder-style child appender.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Updates an attribute in place, or appends it if absent.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, slot)) => *slot = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }

    /// Index into `children` of the first direct child element named `name`.
    pub fn position_of_child(&self, name: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|node| matches!(node, Node::Element(el) if el.name == name))
    }

    /// Finds the first descendant (not `self`) with the given `id`, in document order.
    pub fn find_descendant_by_id(&self, id: &str) -> Option<&Element> {
        for child in self.child_elements() {
            if child.id() == Some(id) {
                return Some(child);
            }
            if let Some(found) = child.find_descendant_by_id(id) {
                return Some(found);
            }
        }
        None
    }

    /// Mutable variant of [`Element::find_descendant_by_id`].
    pub fn find_descendant_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        for node in self.children.iter_mut() {
            if let Node::Element(child) = node {
                if child.id() == Some(id) {
                    return Some(child);
                }
                if let Some(found) = child.find_descendant_by_id_mut(id) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Removes every descendant with the given `id`, returning how many were removed.
    pub fn remove_descendants_by_id(&mut self, id: &str) -> usize {
        self.remove_descendants_where(|el| el.id() == Some(id))
    }

    /// Removes every descendant matching `predicate`, returning how many were removed.
    pub fn remove_descendants_where<P>(&mut self, predicate: P) -> usize
    where
        P: Fn(&Element) -> bool,
    {
        let mut seen = 0;
        self.retain_descendants(&mut |el| {
            if predicate(el) {
                seen += 1;
                false
            } else {
                true
            }
        });
        seen
    }

    /// Gives every descendant carrying `id` the id `replacement` instead.
    /// Returns how many were renamed.
    pub fn rename_descendant_ids(&mut self, id: &str, replacement: &str) -> usize {
        let mut renamed = 0;
        for node in self.children.iter_mut() {
            if let Node::Element(child) = node {
                if child.id() == Some(id) {
                    child.set_attr("id", replacement);
                    renamed += 1;
                }
                renamed += child.rename_descendant_ids(id, replacement);
            }
        }
        renamed
    }

    /// Keeps the first descendant with the given `id` and removes the rest.
    /// Returns how many were removed.
    pub fn dedupe_descendants_by_id(&mut self, id: &str) -> usize {
        let mut kept = false;
        let mut removed = 0;
        self.retain_descendants(&mut |el| {
            if el.id() != Some(id) {
                return true;
            }
            if kept {
                removed += 1;
                false
            } else {
                kept = true;
                true
            }
        });
        removed
    }

    /// Pre-order walk that drops every descendant element for which `keep` returns false.
    /// The subtree of a dropped element is not visited.
    fn retain_descendants<F>(&mut self, keep: &mut F)
    where
        F: FnMut(&Element) -> bool,
    {
        let children = std::mem::take(&mut self.children);
        self.children = children
            .into_iter()
            .filter_map(|node| match node {
                Node::Element(el) if !keep(&el) => None,
                Node::Element(mut el) => {
                    el.retain_descendants(&mut *keep);
                    Some(Node::Element(el))
                }
                other => Some(other),
            })
            .collect();
    }
}

// --- Parsing ---

/// Logs why the markup was rejected and returns the single public error kind.
fn invalid(reason: impl std::fmt::Display) -> FillError {
    debug!("Rejecting SVG input: {}", reason);
    FillError::InvalidInput
}

fn decode_utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(invalid)
}

/// Builds an element (without children) from a start or empty tag.
fn element_from_start(start: &BytesStart<'_>) -> Result<Element> {
    let mut element = Element::new(decode_utf8(start.name().as_ref())?);
    for attr in start.attributes() {
        let attr = attr.map_err(invalid)?;
        let key = decode_utf8(attr.key.as_ref())?;
        let value = attr.unescape_value().map_err(invalid)?;
        element.attributes.push((key.to_string(), value.into_owned()));
    }
    Ok(element)
}

/// Rejects an element that would sit `depth` levels deep (the root is level 1).
fn check_depth(depth: usize) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(invalid(format!("nesting deeper than {} elements", MAX_DEPTH)));
    }
    Ok(())
}

/// Appends a finished node to the open parent, or installs it as the document root.
fn attach(stack: &mut [Element], root: &mut Option<Element>, node: Node) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        return Ok(());
    }
    match node {
        Node::Element(el) if root.is_none() => {
            *root = Some(el);
            Ok(())
        }
        Node::Element(el) => Err(invalid(format!("second root element <{}>", el.name))),
        _ => Ok(()), // Comments and PIs outside the root are not part of the output.
    }
}

/// Parses markup into its root element.
///
/// Fails with [`FillError::InvalidInput`] when the markup is empty or not well-formed:
/// mismatched or unclosed tags, undefined entities, duplicate attributes, text outside
/// the root, or more than one root element. Nesting deeper than [`MAX_DEPTH`] elements is
/// rejected too, which keeps every recursive walk over the tree within a bounded stack.
/// The root's name is not checked here.
pub fn parse(markup: &str) -> Result<Element> {
    let mut reader = Reader::from_str(markup);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| invalid(format!("{} at byte {}", e, reader.error_position())))?;
        match event {
            Event::Start(start) => {
                if stack.is_empty() && root.is_some() {
                    return Err(invalid("content after the root element"));
                }
                check_depth(stack.len() + 1)?;
                stack.push(element_from_start(&start)?);
            }
            Event::Empty(start) => {
                check_depth(stack.len() + 1)?;
                let element = element_from_start(&start)?;
                attach(&mut stack, &mut root, Node::Element(element))?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| invalid("closing tag without an open element"))?;
                attach(&mut stack, &mut root, Node::Element(element))?;
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(invalid)?;
                if stack.is_empty() {
                    if !text.trim().is_empty() {
                        return Err(invalid("text outside the root element"));
                    }
                } else {
                    attach(&mut stack, &mut root, Node::Text(text.into_owned()))?;
                }
            }
            Event::CData(cdata) => {
                if stack.is_empty() {
                    return Err(invalid("CDATA outside the root element"));
                }
                let content = decode_utf8(&cdata)?.to_string();
                attach(&mut stack, &mut root, Node::CData(content))?;
            }
            Event::Comment(comment) => {
                let content = decode_utf8(&comment)?.to_string();
                attach(&mut stack, &mut root, Node::Comment(content))?;
            }
            Event::PI(pi) => {
                let content = decode_utf8(&pi)?.to_string();
                attach(&mut stack, &mut root, Node::ProcessingInstruction(content))?;
            }
            Event::Decl(_) | Event::DocType(_) => {
                if !stack.is_empty() || root.is_some() {
                    return Err(invalid("declaration after the document start"));
                }
            }
            Event::Eof => break,
        }
    }

    if let Some(open) = stack.last() {
        return Err(invalid(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| invalid("no root element"))
}

// --- Serialization ---

/// Escapes an attribute value for a double-quoted attribute.
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\t' => out.push_str("&#9;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes special XML characters (`&`, `<`, `>`) for use in text content.
pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn write_element(out: &mut String, element: &Element) -> Result<()> {
    write!(out, "<{}", element.name)?;
    for (name, value) in &element.attributes {
        write!(out, r#" {}="{}""#, name, escape_attr(value))?;
    }
    if element.children.is_empty() {
        out.push_str("/>");
        return Ok(());
    }
    out.push('>');
    for child in &element.children {
        match child {
            Node::Element(el) => write_element(out, el)?,
            Node::Text(text) => out.push_str(&escape_text(text)),
            Node::CData(content) => write!(out, "<![CDATA[{}]]>", content)?,
            Node::Comment(content) => write!(out, "<!--{}-->", content)?,
            Node::ProcessingInstruction(content) => write!(out, "<?{}?>", content)?,
        }
    }
    write!(out, "</{}>", element.name)?;
    Ok(())
}

/// Serializes an element and its subtree to markup.
pub fn serialize(root: &Element) -> Result<String> {
    let mut out = String::new();
    write_element(&mut out, root)?;
    Ok(out)
}
