// SPDX-License-Identifier: PMPL-1.0-or-later
//! Structural assertions over a parsed HTML tree.
//!
//! A [`Pattern`] describes the expected shape of a fragment: tag name,
//! attribute validators, an optional content validator and the expected
//! children in order. Matching is independent of any SEO rule and every
//! failure carries the tag path down to the node that did not match.

use crate::error::ValidationError;
use crate::tree::{element_children, is_padding, parse_attributes, tag_name, text_content, HtmlNode};
use crate::validator::Validator;
use scraper::node::Element;
use scraper::Node;
use std::collections::BTreeMap;
use thiserror::Error;

/// Expected shape of a node and its subtree
#[derive(Debug, Clone, Default)]
pub struct Pattern {
    /// Tag name; ignored for text and comment nodes
    pub name: String,
    /// Applied to the trimmed text of the node
    pub content: Option<Validator>,
    pub attributes: BTreeMap<String, Validator>,
    /// Paired in order with the non-padding children of the node
    pub children: Vec<Pattern>,
}

/// Why a node did not match its pattern
#[derive(Error, Debug)]
pub enum MatchFailure {
    #[error("expected tag name {expected:?} does not match the discovered tag name {found:?}")]
    TagMismatch { expected: String, found: String },

    #[error("expected attribute {0:?} does not exist")]
    MissingAttribute(String),

    #[error("attribute {name:?} is invalid: {source}")]
    InvalidAttribute {
        name: String,
        #[source]
        source: ValidationError,
    },

    #[error("duplicate tag attribute found: {0}")]
    DuplicateAttribute(String),

    #[error("expected child node #{index} {name:?} does not exist")]
    MissingChild { index: usize, name: String },

    #[error("content is invalid: {0}")]
    Content(#[source] ValidationError),

    #[error("{0}")]
    EmptyDocument(&'static str),

    #[error("cannot match a {0} node")]
    UnexpectedNode(&'static str),
}

/// A pattern mismatch located by the tag path from the root
#[derive(Error, Debug)]
#[error("HTML \"{}\" node does not match the expected pattern: {cause}", display_path(.path))]
pub struct MatchError {
    pub path: Vec<String>,
    pub cause: MatchFailure,
}

impl MatchError {
    fn new(path: &[String], cause: MatchFailure) -> Self {
        Self {
            path: path.to_vec(),
            cause,
        }
    }

    /// Slash-joined tag path, `/` for the root
    pub fn path_string(&self) -> String {
        display_path(&self.path)
    }
}

fn display_path(path: &[String]) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        path.join("/")
    }
}

impl Pattern {
    /// Pattern for an element with the given tag name
    pub fn element(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Pattern for a text node
    pub fn text(content: Validator) -> Self {
        Self {
            content: Some(content),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, validator: Validator) -> Self {
        self.attributes.insert(name.into(), validator);
        self
    }

    pub fn with_content(mut self, content: Validator) -> Self {
        self.content = Some(content);
        self
    }

    pub fn with_child(mut self, child: Pattern) -> Self {
        self.children.push(child);
        self
    }

    /// Match starting from the root of the path
    pub fn matches(&self, node: HtmlNode<'_>) -> Result<(), MatchError> {
        self.match_node(node, &[])
    }

    /// Match `node`, prefixing failures with `path`.
    ///
    /// Document nodes are unwrapped first: the doctype, the `<html>` element
    /// and the `<head>` are skipped and the pattern is matched against the
    /// first content node after them.
    pub fn match_node(&self, node: HtmlNode<'_>, path: &[String]) -> Result<(), MatchError> {
        match node.value() {
            Node::Text(text) => self.match_content(text.trim(), path),
            Node::Comment(comment) => self.match_content(comment.trim(), path),
            Node::Document | Node::Fragment => self.match_document(node, path),
            Node::Element(element) => self.match_element(node, element, path),
            Node::Doctype(_) => Err(MatchError::new(path, MatchFailure::UnexpectedNode("doctype"))),
            Node::ProcessingInstruction(_) => Err(MatchError::new(
                path,
                MatchFailure::UnexpectedNode("processing instruction"),
            )),
        }
    }

    fn match_content(&self, content: &str, path: &[String]) -> Result<(), MatchError> {
        match &self.content {
            Some(validator) => validator
                .validate(content)
                .map_err(|source| MatchError::new(path, MatchFailure::Content(source))),
            None => Ok(()),
        }
    }

    fn match_document(&self, node: HtmlNode<'_>, path: &[String]) -> Result<(), MatchError> {
        let outer = element_children(node).next().ok_or_else(|| {
            MatchError::new(path, MatchFailure::EmptyDocument("document node has no children"))
        })?;

        let mut path = path.to_vec();
        path.extend(tag_name(outer).map(str::to_string));

        let content = outer
            .children()
            .filter(|child| !is_padding(*child) && !child.value().is_comment())
            .find(|child| tag_name(*child) != Some("head"))
            .ok_or_else(|| {
                MatchError::new(&path, MatchFailure::EmptyDocument("<HTML> node has no children"))
            })?;

        self.match_node(content, &path)
    }

    fn match_element(
        &self,
        node: HtmlNode<'_>,
        element: &Element,
        path: &[String],
    ) -> Result<(), MatchError> {
        let mut path = path.to_vec();
        path.push(element.name().to_string());

        if element.name() != self.name {
            return Err(MatchError::new(
                &path,
                MatchFailure::TagMismatch {
                    expected: self.name.clone(),
                    found: element.name().to_string(),
                },
            ));
        }

        let attributes = parse_attributes(element)
            .map_err(|duplicate| MatchError::new(&path, MatchFailure::DuplicateAttribute(duplicate.0)))?;
        for (name, validator) in &self.attributes {
            let value = attributes.get(name.as_str()).ok_or_else(|| {
                MatchError::new(&path, MatchFailure::MissingAttribute(name.clone()))
            })?;
            validator.validate(value).map_err(|source| {
                MatchError::new(
                    &path,
                    MatchFailure::InvalidAttribute {
                        name: name.clone(),
                        source,
                    },
                )
            })?;
        }

        if let Some(validator) = &self.content {
            validator
                .validate(&text_content(node))
                .map_err(|source| MatchError::new(&path, MatchFailure::Content(source)))?;
        }

        let mut children = node.children().filter(|child| !is_padding(*child));
        for (index, expected) in self.children.iter().enumerate() {
            let child = children.next().ok_or_else(|| {
                MatchError::new(
                    &path,
                    MatchFailure::MissingChild {
                        index,
                        name: expected.name.clone(),
                    },
                )
            })?;
            expected.match_node(child, &path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn list_pattern() -> Pattern {
        Pattern::element("body").with_child(
            Pattern::element("ul")
                .with_child(Pattern::element("li").with_content(Validator::exact("one")))
                .with_child(Pattern::element("li").with_content(Validator::exact("two"))),
        )
    }

    #[test]
    fn test_padding_is_skipped() {
        let document = Html::parse_document(
            "<body>\n  <ul>\n    <li>one</li>\n    <li>two</li>\n  </ul>\n</body>",
        );
        list_pattern().matches(document.tree.root()).unwrap();
    }

    #[test]
    fn test_missing_child_is_located() {
        let document = Html::parse_document("<body><ul><li>one</li></ul></body>");
        let err = list_pattern().matches(document.tree.root()).unwrap_err();
        assert!(matches!(err.cause, MatchFailure::MissingChild { index: 1, .. }));
        assert_eq!(err.path_string(), "html/body/ul");
    }

    #[test]
    fn test_tag_mismatch() {
        let document = Html::parse_document("<body><ol><li>one</li></ol></body>");
        let err = list_pattern().matches(document.tree.root()).unwrap_err();
        assert!(matches!(err.cause, MatchFailure::TagMismatch { .. }));
        assert_eq!(err.path_string(), "html/body/ol");
    }

    #[test]
    fn test_missing_attribute() {
        let document = Html::parse_document("<body><div>x</div></body>");
        let pattern = Pattern::element("body")
            .with_child(Pattern::element("div").with_attribute("id", Validator::Skip));
        let err = pattern.matches(document.tree.root()).unwrap_err();
        assert!(matches!(err.cause, MatchFailure::MissingAttribute(ref name) if name == "id"));
    }

    #[test]
    fn test_text_content_pattern() {
        let document = Html::parse_document("<body><p>  Hello  </p></body>");
        let hello = Pattern::element("body").with_child(
            Pattern::element("p").with_child(Pattern::text(Validator::exact("Hello"))),
        );
        hello.matches(document.tree.root()).unwrap();

        let bye = Pattern::element("body").with_child(
            Pattern::element("p").with_child(Pattern::text(Validator::exact("Bye"))),
        );
        let err = bye.matches(document.tree.root()).unwrap_err();
        assert!(matches!(err.cause, MatchFailure::Content(_)));
        assert_eq!(err.path_string(), "html/body/p");
    }

    #[test]
    fn test_root_path_display() {
        let err = MatchError::new(&[], MatchFailure::EmptyDocument("document node has no children"));
        assert!(err.to_string().starts_with("HTML \"/\" node"));
    }
}
