// SPDX-License-Identifier: PMPL-1.0-or-later
//! Page-level SEO rules.
//!
//! [`PageValidator`] walks a parsed document in a fixed order: doctype,
//! root shape, language, head, body headings, then a sweep over every link
//! and image. Violations are collected per check and nothing short-circuits
//! the run except a missing `<html>` element.
//!
//! Title, description and the card title/description values are guarded by
//! deduplicators owned by the validator, so one instance rejects a value the
//! second time it sees it, across every document it checks.

mod cards;
mod head;
mod headings;
mod images;
mod links;

pub use cards::{
    load_card, load_open_graph_card, load_twitter_card, Card, CardKeys, OPEN_GRAPH_KEYS, TWITTER_KEYS,
};

use crate::error::{Error, Result};
use crate::report::{Check, Report, Violation};
use crate::requirements::{Requirements, UniqueField};
use crate::tree::{element_children, parse_attributes, tag_name, HtmlNode};
use crate::validator::Validator;
use scraper::{Html, Node};
use std::io::Read;
use tracing::{debug, info};
use url::Url;

pub const DOCUMENT_CHECK: &str = "document";
pub const HEAD_CHECK: &str = "<HEAD> tag contains every required element";
pub const OPEN_GRAPH_CHECK: &str = "validate Open Graph card";
pub const TWITTER_CHECK: &str = "validate Twitter card";
pub const BODY_CHECK: &str = "<BODY> tag contains valid headings";

/// Fully resolved rule set of one engine instance
#[derive(Debug, Clone)]
struct Rules {
    title: Validator,
    description: Validator,
    open_graph_title: Validator,
    open_graph_description: Validator,
    twitter_title: Validator,
    twitter_description: Validator,
    heading: Validator,
    language: Validator,
    url: Validator,
    link_text: Validator,
    image_alt_text: Validator,
    base_url: Option<Url>,
}

impl Rules {
    fn new(requirements: Requirements) -> Self {
        let requirements = requirements.resolve();
        // every slot is filled by resolve
        let slot = |validator: &Option<Validator>| validator.clone().unwrap_or(Validator::Skip);
        let unique = |field: UniqueField, validator: &Validator| {
            if validator.is_skip() {
                Validator::Skip
            } else {
                requirements.deduplicator(field).wrap(validator.clone())
            }
        };

        let title = slot(&requirements.title);
        let description = slot(&requirements.description);
        Self {
            open_graph_title: unique(UniqueField::OpenGraphTitle, &title),
            open_graph_description: unique(UniqueField::OpenGraphDescription, &description),
            twitter_title: unique(UniqueField::TwitterTitle, &title),
            twitter_description: unique(UniqueField::TwitterDescription, &description),
            title: unique(UniqueField::Title, &title),
            description: unique(UniqueField::Description, &description),
            heading: slot(&requirements.heading),
            link_text: slot(&requirements.link_text),
            image_alt_text: slot(&requirements.image_alt_text),
            language: slot(&requirements.language),
            url: slot(&requirements.url),
            base_url: requirements.base_url.clone(),
        }
    }
}

/// SEO conformance checker for HTML documents.
///
/// Safe to share between threads; documents validated concurrently against
/// one instance share its deduplication state.
#[derive(Debug, Clone)]
pub struct PageValidator {
    rules: Rules,
}

impl Default for PageValidator {
    fn default() -> Self {
        Self::new(Requirements::with_defaults())
    }
}

impl PageValidator {
    pub fn new(requirements: Requirements) -> Self {
        Self {
            rules: Rules::new(requirements),
        }
    }

    /// Lenient rules
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Canonical text forms required everywhere
    pub fn strict() -> Self {
        Self::new(Requirements::with_strict_defaults())
    }

    /// Check an already parsed document
    pub fn validate(&self, document: &Html) -> Report {
        let root = document.tree.root();
        let mut report = Report::new();
        let mut document_check = Check::new(DOCUMENT_CHECK);
        let mut checks = Vec::new();

        debug!("Checking document root");
        if let Some(outer) = self.check_root(root, &mut document_check) {
            self.check_outer(outer, &mut document_check, &mut checks);
        }
        report.add(document_check);
        for check in checks {
            report.add(check);
        }

        debug!("Sweeping links and images");
        for node in root.descendants() {
            match tag_name(node) {
                Some("a") => report.add(links::check_link(&self.rules, node)),
                Some("img") => report.add(images::check_image(&self.rules, node)),
                _ => {}
            }
        }

        info!(
            "Checked document: {} violations in {} checks",
            report.len(),
            report.checks.len()
        );
        report
    }

    /// Parse and check HTML text
    pub fn validate_str(&self, html: &str) -> Report {
        self.validate(&Html::parse_document(html))
    }

    /// Read the whole stream, then parse and check it
    pub fn validate_reader<R: Read>(&self, mut reader: R) -> Result<Report> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let html = String::from_utf8(bytes)
            .map_err(|e| Error::Parse(format!("document is not valid UTF-8: {}", e)))?;
        Ok(self.validate_str(&html))
    }

    /// Doctype, root shape and language. Returns the `<html>` element.
    fn check_root<'a>(&self, root: HtmlNode<'a>, check: &mut Check) -> Option<HtmlNode<'a>> {
        let nodes: Vec<HtmlNode<'a>> = root.children().collect();

        match nodes.first().map(|node| node.value()) {
            Some(Node::Doctype(doctype)) if doctype.name().eq_ignore_ascii_case("html") => {}
            Some(Node::Doctype(doctype)) => check.add(Violation::structural(format!(
                "<!DOCTYPE> tag contains unexpected root element: {}",
                doctype.name()
            ))),
            _ => check.add(Violation::structural(
                "page does not begin with a <!DOCTYPE html> tag",
            )),
        }

        if nodes.len() > 2 {
            check.add(Violation::structural(format!(
                "page has {} root nodes: should include only <!DOCTYPE> and <HTML> tags",
                nodes.len()
            )));
        }

        let Some(outer) = nodes.into_iter().find(|node| tag_name(*node) == Some("html")) else {
            check.add(Violation::structural("page is missing an <HTML> tag"));
            return None;
        };
        let element = outer.value().as_element()?;

        match parse_attributes(element) {
            Err(duplicate) => check.add(Violation::parse(format!(
                "failed to parse <HTML> tag attributes: {}",
                duplicate
            ))),
            Ok(attributes) => match attributes.get("lang") {
                None => check.add(Violation::content("<HTML> tag is missing a lang attribute")),
                Some(language) => {
                    if let Err(e) = self.rules.language.validate(language) {
                        check.add(Violation::invalid(
                            &format!("<HTML> tag has an invalid lang attribute {:?}", language),
                            &e,
                        ));
                    }
                }
            },
        }

        Some(outer)
    }

    /// Expect exactly `<head>` then `<body>` under the outer tag
    fn check_outer(&self, outer: HtmlNode<'_>, document: &mut Check, checks: &mut Vec<Check>) {
        let mut elements = element_children(outer);

        match elements.next() {
            Some(head) if tag_name(head) == Some("head") => {
                debug!("Checking <HEAD>");
                checks.extend(head::check_head(&self.rules, head));
            }
            Some(other) => document.add(Violation::structural(format!(
                "first child element tag is not a <HEAD> tag: {}",
                tag_name(other).unwrap_or_default()
            ))),
            None => {
                document.add(Violation::structural("<HTML> tag is missing a <HEAD> tag"));
                return;
            }
        }

        match elements.next() {
            Some(body) if tag_name(body) == Some("body") => {
                debug!("Checking <BODY> headings");
                checks.extend(headings::check_headings(&self.rules, body));
            }
            Some(other) => document.add(Violation::structural(format!(
                "second child element tag is not a <BODY> tag: {}",
                tag_name(other).unwrap_or_default()
            ))),
            None => document.add(Violation::structural("<HTML> tag is missing a <BODY> tag")),
        }

        if let Some(extra) = elements.next() {
            document.add(Violation::structural(format!(
                "<HTML> tag contains more than two child elements: {}",
                tag_name(extra).unwrap_or_default()
            )));
        }
    }
}
