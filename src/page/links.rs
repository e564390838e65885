// SPDX-License-Identifier: PMPL-1.0-or-later
//! Anchor rules: link text, `target="_blank"` hygiene and dead-link detection.

use super::Rules;
use crate::link::join_url;
use crate::report::{Check, Violation};
use crate::tree::{node_path, parse_attributes, tag_name, text_content, HtmlNode};
use tracing::debug;

/// Elements that make a link meaningful without text of its own
const GRAPHIC_CONTENT: [&str; 4] = ["svg", "img", "picture", "a"];

fn has_graphic_content(node: HtmlNode<'_>) -> bool {
    node.descendants()
        .skip(1)
        .filter_map(tag_name)
        .any(|name| GRAPHIC_CONTENT.contains(&name))
}

fn has_rel_token(rel: Option<&&str>, token: &str) -> bool {
    rel.is_some_and(|rel| {
        rel.split_whitespace()
            .any(|value| value.eq_ignore_ascii_case(token))
    })
}

/// Check one `<a>` element: text, then `target`/`rel`, then `href`.
pub(super) fn check_link(rules: &Rules, node: HtmlNode<'_>) -> Check {
    let path = node_path(node);
    let mut check = Check::new(path.clone());
    let Some(element) = node.value().as_element() else {
        return check;
    };
    let attributes = match parse_attributes(element) {
        Ok(attributes) => attributes,
        Err(e) => {
            check.add(
                Violation::parse(format!("unable to collect <A> tag attributes: {}", e))
                    .with_path(path),
            );
            return check;
        }
    };

    if has_graphic_content(node) {
        debug!("Link {} wraps graphic content, text check exempt", path);
    } else if let Err(e) = rules.link_text.validate(&text_content(node)) {
        check.add(Violation::invalid("link text is not valid", &e).with_path(path.clone()));
    }

    let opens_new_tab = attributes
        .get("target")
        .is_some_and(|target| target.eq_ignore_ascii_case("_blank"));
    if opens_new_tab && !has_rel_token(attributes.get("rel"), "noopener") {
        check.add(
            Violation::content(
                "link with target=\"_blank\" is missing the \"noopener\" token in its rel attribute",
            )
            .with_path(path.clone()),
        );
    }

    if let Some(href) = attributes.get("href") {
        let resolved = if href.starts_with('#') {
            Ok(None)
        } else {
            join_url(rules.base_url.as_ref(), href).map(Some)
        };
        let result = resolved.and_then(|url| match url {
            Some(url) => rules.url.validate(&url),
            None => Ok(()),
        });
        if let Err(e) = result {
            check.add(
                Violation::invalid(&format!("link {:?} is not valid", href), &e)
                    .with_path(path),
            );
        }
    }

    check
}
