// SPDX-License-Identifier: PMPL-1.0-or-later
//! Heading rules for the `<body>` subtree.

use super::{Rules, BODY_CHECK};
use crate::report::{Check, Violation, ViolationKind};
use crate::tree::{node_path, tag_name, text_content, HtmlNode};
use tracing::debug;

const HEADINGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// Every heading must carry valid text and there must be exactly one `<h1>`.
/// Returns `None` when heading validation is switched off.
pub(super) fn check_headings(rules: &Rules, body: HtmlNode<'_>) -> Option<Check> {
    if rules.heading.is_skip() {
        debug!("Heading validation is skipped");
        return None;
    }

    let mut check = Check::new(BODY_CHECK);
    let mut h1_count = 0;

    for node in body.descendants() {
        let Some(name) = tag_name(node).filter(|name| HEADINGS.contains(name)) else {
            continue;
        };
        let tag = name.to_ascii_uppercase();

        if name == "h1" {
            h1_count += 1;
            if h1_count > 1 {
                check.add(
                    Violation::new(ViolationKind::Duplicate, "there are multiple <H1> tags")
                        .with_path(node_path(node)),
                );
            }
        }

        let text = text_content(node);
        if text.is_empty() {
            check.add(
                Violation::content(format!("<{}> tag has no text content", tag))
                    .with_path(node_path(node)),
            );
            continue;
        }
        if let Err(e) = rules.heading.validate(&text) {
            check.add(
                Violation::invalid(&format!("<{}> tag text content is not valid", tag), &e)
                    .with_path(node_path(node)),
            );
        }
    }

    if h1_count == 0 {
        check.add(Violation::content("<H1> tag not found under <BODY> tag"));
    }
    Some(check)
}
