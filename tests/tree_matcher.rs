// SPDX-License-Identifier: PMPL-1.0-or-later
//! Integration tests for structural pattern matching

use pageseo::{MatchFailure, Pattern, ValidationError, Validator};
use scraper::{Html, Selector};

fn content_pattern(class: &str) -> Pattern {
    Pattern::element("body").with_child(
        Pattern::element("div")
            .with_attribute("class", Validator::exact("content"))
            .with_child(
                Pattern::element("p")
                    .with_attribute("class", Validator::exact(class))
                    .with_child(Pattern::text(Validator::exact("Hello"))),
            ),
    )
}

const DOCUMENT: &str = concat!(
    "<!DOCTYPE html><html><head><title>Matcher</title></head>",
    "<body>\n  <div class=\"content\">\n    <p class=\"title\">Hello</p>\n  </div>\n</body></html>"
);

#[test]
fn test_identical_tree_matches() {
    let document = Html::parse_document(DOCUMENT);
    content_pattern("title")
        .matches(document.tree.root())
        .expect("pattern matches");
}

#[test]
fn test_attribute_mismatch_is_path_qualified() {
    let document = Html::parse_document(DOCUMENT);
    let err = content_pattern("subtitle")
        .matches(document.tree.root())
        .expect_err("class differs");

    assert_eq!(err.path, vec!["html", "body", "div", "p"]);
    match &err.cause {
        MatchFailure::InvalidAttribute { name, source } => {
            assert_eq!(name, "class");
            assert!(matches!(source, ValidationError::Mismatch { .. }));
        }
        other => panic!("unexpected failure: {:?}", other),
    }
    assert!(err
        .to_string()
        .starts_with("HTML \"html/body/div/p\" node does not match"));
}

#[test]
fn test_matching_from_an_element() {
    let document = Html::parse_document(DOCUMENT);
    let selector = Selector::parse("div").expect("valid selector");
    let div = *document.select(&selector).next().expect("div exists");

    let pattern = Pattern::element("div")
        .with_content(Validator::exact("Hello"))
        .with_child(Pattern::element("p"));
    pattern.matches(div).expect("pattern matches");

    let err = Pattern::element("div")
        .with_child(Pattern::element("p"))
        .with_child(Pattern::element("p"))
        .matches(div)
        .expect_err("second paragraph is missing");
    assert_eq!(err.path_string(), "div");
    assert!(matches!(err.cause, MatchFailure::MissingChild { index: 1, .. }));
}
