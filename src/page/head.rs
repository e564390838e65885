// SPDX-License-Identifier: PMPL-1.0-or-later
//! `<head>` requirements: one valid title, description, viewport and charset.

use super::{cards, Rules, HEAD_CHECK};
use crate::report::{Check, Violation, ViolationKind};
use crate::tree::{
    element_children, parse_attributes, parse_comma_separated_keyed_values, tag_name,
    text_content, HtmlNode,
};
use std::collections::HashMap;
use tracing::debug;

/// Occurrence counts gathered in one pass over the head children
#[derive(Debug, Default)]
struct HeadScan {
    titles: usize,
    descriptions: usize,
    viewports: usize,
    charsets: usize,
    open_graph: bool,
    twitter: bool,
}

pub(super) fn check_head(rules: &Rules, head: HtmlNode<'_>) -> Vec<Check> {
    let mut check = Check::new(HEAD_CHECK);
    let mut scan = HeadScan::default();

    for child in element_children(head) {
        match tag_name(child) {
            Some("title") => scan.title(rules, child, &mut check),
            Some("meta") => scan.meta(rules, child, &mut check),
            _ => {}
        }
    }
    scan.finish(&mut check);

    let mut checks = vec![check];
    if scan.open_graph {
        debug!("Open Graph properties found, checking card");
        checks.push(cards::check_open_graph(rules, head));
    }
    if scan.twitter {
        debug!("Twitter properties found, checking card");
        checks.push(cards::check_twitter(rules, head));
    }
    checks
}

fn duplicate(message: &str) -> Violation {
    Violation::new(ViolationKind::Duplicate, message)
}

impl HeadScan {
    fn title(&mut self, rules: &Rules, node: HtmlNode<'_>, check: &mut Check) {
        self.titles += 1;
        if self.titles > 1 {
            check.add(duplicate("there are multiple <TITLE> tags"));
            return;
        }
        if let Err(e) = rules.title.validate(&text_content(node)) {
            check.add(Violation::invalid("<TITLE> tag is not valid", &e));
        }
    }

    fn meta(&mut self, rules: &Rules, node: HtmlNode<'_>, check: &mut Check) {
        let Some(element) = node.value().as_element() else {
            return;
        };
        let attributes = match parse_attributes(element) {
            Ok(attributes) => attributes,
            Err(e) => {
                check.add(Violation::parse(format!(
                    "unable to collect <META> tag attributes: {}",
                    e
                )));
                return;
            }
        };

        if let Some(raw_name) = attributes.get("name") {
            let name = raw_name.to_ascii_lowercase();
            if name.starts_with("twitter:") {
                self.twitter = true;
            }
            match name.as_str() {
                "description" => self.description(rules, &attributes, check),
                "viewport" => self.viewport(&attributes, check),
                _ if !attributes.contains_key("content") => {
                    check.add(Violation::content(format!(
                        "<META name={:?}> tag is missing a content attribute",
                        raw_name
                    )))
                }
                _ => {}
            }
        }

        if let Some(charset) = attributes.get("charset") {
            self.charset(charset, check);
        }

        if let Some(property) = attributes.get("property") {
            if !attributes.contains_key("content") {
                check.add(Violation::content(format!(
                    "<META property={:?}> tag is missing a content attribute",
                    property
                )));
            }
            if property.to_ascii_lowercase().starts_with("og:") {
                self.open_graph = true;
            }
        }
    }

    fn description(&mut self, rules: &Rules, attributes: &HashMap<&str, &str>, check: &mut Check) {
        self.descriptions += 1;
        if self.descriptions > 1 {
            check.add(duplicate("there are multiple <META name=\"description\"> tags"));
            return;
        }
        let Some(content) = attributes.get("content") else {
            check.add(Violation::content(
                "<META name=\"description\"> tag is missing a content attribute",
            ));
            return;
        };
        if let Err(e) = rules.description.validate(content.trim()) {
            check.add(Violation::invalid(
                "<META name=\"description\"> content is not valid",
                &e,
            ));
        }
    }

    fn viewport(&mut self, attributes: &HashMap<&str, &str>, check: &mut Check) {
        self.viewports += 1;
        if self.viewports > 1 {
            check.add(duplicate("there are multiple <META name=\"viewport\"> tags"));
            return;
        }
        let Some(content) = attributes.get("content") else {
            check.add(Violation::content(
                "<META name=\"viewport\"> tag is missing a content attribute",
            ));
            return;
        };
        let values = match parse_comma_separated_keyed_values(content) {
            Ok(values) => values,
            Err(e) => {
                check.add(Violation::parse(format!(
                    "viewport content {:?} is not valid: {}",
                    content, e
                )));
                return;
            }
        };

        if values.get("width").is_some_and(String::is_empty) {
            check.add(Violation::content(format!(
                "viewport content {:?} has an empty width",
                content
            )));
        }
        match values.get("initial-scale").map(String::as_str) {
            None => check.add(Violation::content(format!(
                "viewport content {:?} is missing initial-scale",
                content
            ))),
            Some("") => check.add(Violation::content(format!(
                "viewport content {:?} has an empty initial-scale",
                content
            ))),
            Some(scale) => {
                if scale.parse::<f32>().is_err() {
                    check.add(Violation::content(format!(
                        "viewport initial-scale {:?} is not a number",
                        scale
                    )));
                }
            }
        }
    }

    fn charset(&mut self, charset: &str, check: &mut Check) {
        self.charsets += 1;
        if self.charsets > 1 {
            check.add(duplicate("there are multiple <META> tags with a charset attribute"));
            return;
        }
        if !charset.trim().eq_ignore_ascii_case("utf-8") {
            check.add(Violation::content(format!(
                "<META> charset must be utf-8, found {:?}",
                charset
            )));
        }
    }

    /// Report every required tag that never appeared
    fn finish(&self, check: &mut Check) {
        if self.titles == 0 {
            check.add(Violation::content("<TITLE> tag not found"));
        }
        if self.descriptions == 0 {
            check.add(Violation::content("<META name=\"description\"> tag not found"));
        }
        if self.viewports == 0 {
            check.add(Violation::content("<META name=\"viewport\"> tag not found"));
        }
        if self.charsets == 0 {
            check.add(Violation::content("<META charset> tag not found"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::PageValidator;
    use super::*;

    fn head_messages(head: &str) -> Vec<String> {
        let html = format!(
            "<!DOCTYPE html><html lang=\"en\"><head>{}</head><body><h1>Heading</h1></body></html>",
            head
        );
        let report = PageValidator::default().validate_str(&html);
        report
            .check(HEAD_CHECK)
            .map(|check| check.violations.iter().map(|v| v.message.clone()).collect())
            .unwrap_or_default()
    }

    const VALID_HEAD: &str = concat!(
        "<title>Head checks</title>",
        "<meta name=\"description\" content=\"Every head requirement in one place.\">",
        "<meta charset=\"UTF-8\">",
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">"
    );

    #[test]
    fn test_valid_head() {
        assert!(head_messages(VALID_HEAD).is_empty());
    }

    #[test]
    fn test_empty_head_reports_every_absence() {
        assert_eq!(
            head_messages(""),
            vec![
                "<TITLE> tag not found",
                "<META name=\"description\"> tag not found",
                "<META name=\"viewport\"> tag not found",
                "<META charset> tag not found",
            ]
        );
    }

    #[test]
    fn test_second_title_is_a_duplicate() {
        let head = format!("{}<title>Another title</title>", VALID_HEAD);
        assert_eq!(head_messages(&head), vec!["there are multiple <TITLE> tags"]);
    }

    #[test]
    fn test_viewport_rules() {
        let head = VALID_HEAD.replace("width=device-width, initial-scale=1.0", "width=, initial-scale=large");
        assert_eq!(
            head_messages(&head),
            vec![
                "viewport content \"width=, initial-scale=large\" has an empty width",
                "viewport initial-scale \"large\" is not a number",
            ]
        );

        let head = VALID_HEAD.replace("width=device-width, initial-scale=1.0", "width=device-width");
        assert_eq!(
            head_messages(&head),
            vec!["viewport content \"width=device-width\" is missing initial-scale"]
        );
    }

    #[test]
    fn test_charset_must_be_utf8() {
        let head = VALID_HEAD.replace("UTF-8", "latin1");
        assert_eq!(
            head_messages(&head),
            vec!["<META> charset must be utf-8, found \"latin1\""]
        );
    }

    #[test]
    fn test_property_without_content() {
        let head = format!(
            "{}<meta property=\"article:author\">",
            VALID_HEAD
        );
        assert_eq!(
            head_messages(&head),
            vec!["<META property=\"article:author\"> tag is missing a content attribute"]
        );
    }

    #[test]
    fn test_named_meta_without_content() {
        let head = format!(
            "{}<meta name=\"robots\"><meta name=\"twitter:site\">",
            VALID_HEAD
        );
        assert_eq!(
            head_messages(&head),
            vec![
                "<META name=\"robots\"> tag is missing a content attribute",
                "<META name=\"twitter:site\"> tag is missing a content attribute",
            ]
        );
    }
}
