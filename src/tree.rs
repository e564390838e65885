// SPDX-License-Identifier: PMPL-1.0-or-later
//! Read-only helpers over the parsed HTML tree.
//!
//! The tree comes from `scraper` (html5ever): a document node, an optional
//! doctype, the outer `<html>` element and its descendants. Nothing here
//! mutates it.

use ego_tree::NodeRef;
use scraper::node::Element;
use scraper::Node;
use std::collections::HashMap;
use thiserror::Error;

/// Borrowed handle to a node of a parsed document
pub type HtmlNode<'a> = NodeRef<'a, Node>;

/// A key appeared twice where each key must be unique
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("duplicate key found: {0}")]
pub struct DuplicateKey(pub String);

/// Trimmed text of the node and every descendant text node, joined by single
/// spaces. Empty fragments are dropped.
pub fn text_content(node: HtmlNode<'_>) -> String {
    node.descendants()
        .filter_map(|n| n.value().as_text())
        .map(|text| text.trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collect element attributes into a map, rejecting repeated names
pub fn parse_attributes(element: &Element) -> Result<HashMap<&str, &str>, DuplicateKey> {
    let mut attributes = HashMap::new();
    for (name, value) in element.attrs() {
        if attributes.insert(name, value).is_some() {
            return Err(DuplicateKey(name.to_string()));
        }
    }
    Ok(attributes)
}

/// Parse `key=value, key2=value2` lists such as the viewport meta content.
/// Empty keys are skipped and values are trimmed.
pub fn parse_comma_separated_keyed_values(
    s: &str,
) -> Result<HashMap<String, String>, DuplicateKey> {
    let mut values = HashMap::new();
    for pair in s.split(',') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        if values
            .insert(key.to_string(), value.trim().to_string())
            .is_some()
        {
            return Err(DuplicateKey(key.to_string()));
        }
    }
    Ok(values)
}

/// Whitespace-only text between elements
pub fn is_padding(node: HtmlNode<'_>) -> bool {
    node.value()
        .as_text()
        .is_some_and(|text| text.trim().is_empty())
}

/// Tag name when the node is an element
pub fn tag_name<'a>(node: HtmlNode<'a>) -> Option<&'a str> {
    node.value().as_element().map(Element::name)
}

/// Element children in document order
pub fn element_children<'a>(node: HtmlNode<'a>) -> impl Iterator<Item = HtmlNode<'a>> {
    node.children().filter(|child| child.value().is_element())
}

/// Element names from the outermost ancestor down to `node`, `/`-joined
pub fn node_path(node: HtmlNode<'_>) -> String {
    let mut names: Vec<&str> = node.ancestors().filter_map(tag_name).collect();
    names.reverse();
    names.extend(tag_name(node));
    names.join("/")
}
