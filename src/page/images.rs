// SPDX-License-Identifier: PMPL-1.0-or-later
//! Image rules: resolvable sources and alternative text.

use super::Rules;
use crate::link::join_url;
use crate::report::{Check, Violation};
use crate::tree::{element_children, node_path, parse_attributes, tag_name, HtmlNode};

/// URLs of a `srcset` value, descriptors dropped
fn srcset_urls(srcset: &str) -> impl Iterator<Item = &str> {
    srcset
        .split(',')
        .filter_map(|candidate| candidate.split_whitespace().next())
}

/// Every source the browser could pick for this image: `src`, otherwise the
/// image's own `srcset`, otherwise the `<source>` siblings inside a
/// `<picture>`.
fn image_sources(node: HtmlNode<'_>, src: Option<&str>, srcset: Option<&str>) -> Vec<String> {
    if let Some(src) = src.map(str::trim).filter(|src| !src.is_empty()) {
        return vec![src.to_string()];
    }
    if let Some(srcset) = srcset {
        let urls: Vec<String> = srcset_urls(srcset).map(str::to_string).collect();
        if !urls.is_empty() {
            return urls;
        }
    }

    let Some(picture) = node.parent().filter(|parent| tag_name(*parent) == Some("picture")) else {
        return Vec::new();
    };
    element_children(picture)
        .filter(|child| tag_name(*child) == Some("source"))
        .filter_map(|source| source.value().as_element())
        .filter_map(|source| source.attr("srcset"))
        .flat_map(srcset_urls)
        .map(str::to_string)
        .collect()
}

/// Check one `<img>` element
pub(super) fn check_image(rules: &Rules, node: HtmlNode<'_>) -> Check {
    let path = node_path(node);
    let mut check = Check::new(path.clone());
    let Some(element) = node.value().as_element() else {
        return check;
    };
    let attributes = match parse_attributes(element) {
        Ok(attributes) => attributes,
        Err(e) => {
            check.add(
                Violation::parse(format!("unable to collect <IMG> tag attributes: {}", e))
                    .with_path(path),
            );
            return check;
        }
    };

    let sources = image_sources(
        node,
        attributes.get("src").copied(),
        attributes.get("srcset").copied(),
    );
    if sources.is_empty() {
        check.add(
            Violation::content("<IMG> tag has no image source").with_path(path.clone()),
        );
    }
    for source in &sources {
        let result = join_url(rules.base_url.as_ref(), source)
            .and_then(|url| rules.url.validate(&url));
        if let Err(e) = result {
            check.add(
                Violation::invalid(&format!("image source {:?} is not valid", source), &e)
                    .with_path(path.clone()),
            );
        }
    }

    match attributes.get("alt") {
        None => check.add(
            Violation::content("<IMG> tag is missing an alt attribute").with_path(path),
        ),
        Some(alt) if alt.trim().is_empty() => check.add(
            Violation::content("<IMG> tag has an empty alt attribute").with_path(path),
        ),
        Some(alt) => {
            if let Err(e) = rules.image_alt_text.validate(alt) {
                check.add(
                    Violation::invalid("image alternative text is not valid", &e)
                        .with_path(path),
                );
            }
        }
    }

    check
}
