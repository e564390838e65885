// SPDX-License-Identifier: PMPL-1.0-or-later
//! Open Graph and Twitter card extraction.
//!
//! Cards are read from the `<meta>` children of `<head>`. Keys are compared
//! case-insensitively, tags without content are ignored and a repeated key
//! overwrites the earlier value.

use super::{Rules, OPEN_GRAPH_CHECK, TWITTER_CHECK};
use crate::report::{Check, Violation};
use crate::tree::{element_children, parse_attributes, tag_name, DuplicateKey, HtmlNode};
use crate::validator::Validator;

/// Meta keys one card flavor is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardKeys {
    /// Attribute holding the key: `property` or `name`
    pub attribute: &'static str,
    pub kind: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub site: &'static str,
    pub url: &'static str,
    pub image: &'static str,
}

pub const OPEN_GRAPH_KEYS: CardKeys = CardKeys {
    attribute: "property",
    kind: "og:type",
    title: "og:title",
    description: "og:description",
    site: "og:site_name",
    url: "og:url",
    image: "og:image",
};

pub const TWITTER_KEYS: CardKeys = CardKeys {
    attribute: "name",
    kind: "twitter:card",
    title: "twitter:title",
    description: "twitter:description",
    site: "twitter:site",
    url: "twitter:url",
    image: "twitter:image",
};

/// Values of one card; absent keys stay empty
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Card {
    /// `og:type` or `twitter:card`
    pub kind: String,
    pub title: String,
    pub description: String,
    pub site: String,
    pub url: String,
    pub image: String,
}

impl Card {
    fn slot(&mut self, keys: &CardKeys, key: &str) -> Option<&mut String> {
        let slot = match key {
            k if k == keys.kind => &mut self.kind,
            k if k == keys.title => &mut self.title,
            k if k == keys.description => &mut self.description,
            k if k == keys.site => &mut self.site,
            k if k == keys.url => &mut self.url,
            k if k == keys.image => &mut self.image,
            _ => return None,
        };
        Some(slot)
    }
}

/// Read a card of the given flavor from the `<meta>` children of `head`
pub fn load_card(head: HtmlNode<'_>, keys: &CardKeys) -> Result<Card, DuplicateKey> {
    let mut card = Card::default();
    for meta in element_children(head).filter(|child| tag_name(*child) == Some("meta")) {
        let Some(element) = meta.value().as_element() else {
            continue;
        };
        let attributes = parse_attributes(element)?;
        let Some(key) = attributes.get(keys.attribute).filter(|key| !key.is_empty()) else {
            continue;
        };
        let Some(content) = attributes.get("content").filter(|content| !content.is_empty()) else {
            continue;
        };
        if let Some(slot) = card.slot(keys, &key.to_ascii_lowercase()) {
            *slot = content.to_string();
        }
    }
    Ok(card)
}

pub fn load_open_graph_card(head: HtmlNode<'_>) -> Result<Card, DuplicateKey> {
    load_card(head, &OPEN_GRAPH_KEYS)
}

pub fn load_twitter_card(head: HtmlNode<'_>) -> Result<Card, DuplicateKey> {
    load_card(head, &TWITTER_KEYS)
}

pub(super) fn check_open_graph(rules: &Rules, head: HtmlNode<'_>) -> Check {
    check_card(
        OPEN_GRAPH_CHECK,
        head,
        &OPEN_GRAPH_KEYS,
        &rules.open_graph_title,
        &rules.open_graph_description,
        false,
    )
}

pub(super) fn check_twitter(rules: &Rules, head: HtmlNode<'_>) -> Check {
    check_card(
        TWITTER_CHECK,
        head,
        &TWITTER_KEYS,
        &rules.twitter_title,
        &rules.twitter_description,
        true,
    )
}

fn check_card(
    name: &str,
    head: HtmlNode<'_>,
    keys: &CardKeys,
    title: &Validator,
    description: &Validator,
    require_site: bool,
) -> Check {
    let mut check = Check::new(name);
    let card = match load_card(head, keys) {
        Ok(card) => card,
        Err(e) => {
            check.add(Violation::parse(format!("unable to load card: {}", e)));
            return check;
        }
    };

    let missing = |key: &str| Violation::content(format!("{} not found", key));

    if card.kind.is_empty() {
        check.add(missing(keys.kind));
    }
    if card.title.is_empty() {
        check.add(missing(keys.title));
    } else if let Err(e) = title.validate(&card.title) {
        check.add(Violation::invalid(&format!("{} is not valid", keys.title), &e));
    }
    if card.description.is_empty() {
        check.add(missing(keys.description));
    } else if let Err(e) = description.validate(&card.description) {
        check.add(Violation::invalid(
            &format!("{} is not valid", keys.description),
            &e,
        ));
    }
    if require_site && card.site.is_empty() {
        check.add(missing(keys.site));
    }
    if card.image.is_empty() {
        check.add(missing(keys.image));
    }
    check
}

#[cfg(test)]
mod tests {
    use super::super::PageValidator;
    use super::*;
    use crate::report::ViolationKind;
    use scraper::{Html, Selector};

    const HEAD: &str = concat!(
        "<title>Cards</title>",
        "<meta name=\"description\" content=\"Social card checks.\">",
        "<meta charset=\"utf-8\">",
        "<meta name=\"viewport\" content=\"initial-scale=1\">"
    );

    fn page(extra_head: &str) -> String {
        format!(
            "<!DOCTYPE html><html lang=\"en\"><head>{}{}</head><body><h1>Cards</h1></body></html>",
            HEAD, extra_head
        )
    }

    fn messages(validator: &PageValidator, extra_head: &str, check: &str) -> Vec<String> {
        validator
            .validate_str(&page(extra_head))
            .check(check)
            .map(|check| check.violations.iter().map(|v| v.message.clone()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_load_card_last_wins_case_insensitive() {
        let document = Html::parse_document(&page(concat!(
            "<meta property=\"OG:Title\" content=\"First\">",
            "<meta property=\"og:title\" content=\"Second\">",
            "<meta property=\"og:image\" content=\"\">",
            "<meta property=\"og:type\">",
        )));
        let selector = Selector::parse("head").unwrap();
        let head = *document.select(&selector).next().unwrap();

        let card = load_open_graph_card(head).unwrap();
        assert_eq!(card.title, "Second");
        assert!(card.image.is_empty());
        assert!(card.kind.is_empty());
        assert_eq!(load_twitter_card(head).unwrap(), Card::default());
    }

    #[test]
    fn test_complete_open_graph_card() {
        let card = concat!(
            "<meta property=\"og:type\" content=\"website\">",
            "<meta property=\"og:title\" content=\"Cards\">",
            "<meta property=\"og:description\" content=\"Social card checks.\">",
            "<meta property=\"og:image\" content=\"/card.png\">",
        );
        let report = PageValidator::default().validate_str(&page(card));
        assert!(report.passed(), "{:#?}", report);
        assert!(report.check(OPEN_GRAPH_CHECK).is_some());
        assert!(report.check(TWITTER_CHECK).is_none());
    }

    #[test]
    fn test_incomplete_open_graph_card() {
        let card = "<meta property=\"og:title\" content=\"Cards\">";
        assert_eq!(
            messages(&PageValidator::default(), card, OPEN_GRAPH_CHECK),
            vec!["og:type not found", "og:description not found", "og:image not found"]
        );
    }

    #[test]
    fn test_twitter_card_requires_site() {
        let card = concat!(
            "<meta name=\"twitter:card\" content=\"summary\">",
            "<meta name=\"twitter:title\" content=\"Cards\">",
            "<meta name=\"twitter:description\" content=\"Social card checks.\">",
            "<meta name=\"twitter:image\" content=\"/card.png\">",
        );
        assert_eq!(
            messages(&PageValidator::default(), card, TWITTER_CHECK),
            vec!["twitter:site not found"]
        );
    }

    #[test]
    fn test_card_titles_are_deduplicated() {
        let validator = PageValidator::default();
        let page_with = |title: &str, description: &str| {
            format!(
                concat!(
                    "<!DOCTYPE html><html lang=\"en\"><head>",
                    "<title>{title}</title>",
                    "<meta name=\"description\" content=\"{description}\">",
                    "<meta charset=\"utf-8\">",
                    "<meta name=\"viewport\" content=\"initial-scale=1\">",
                    "<meta property=\"og:type\" content=\"article\">",
                    "<meta property=\"og:title\" content=\"Shared card title\">",
                    "<meta property=\"og:description\" content=\"{description}\">",
                    "<meta property=\"og:image\" content=\"/a.png\">",
                    "</head><body><h1>Cards</h1></body></html>"
                ),
                title = title,
                description = description
            )
        };

        let first = validator.validate_str(&page_with("First page", "First description."));
        assert!(first.passed(), "{:#?}", first);

        let second = validator.validate_str(&page_with("Second page", "Second description."));
        let duplicates = second.by_kind(ViolationKind::Duplicate);
        assert_eq!(duplicates.len(), 1, "{:#?}", second);
        assert!(duplicates[0].message.starts_with("og:title is not valid"));
        assert_eq!(second.check(OPEN_GRAPH_CHECK).map(Check::len), Some(1));
    }
}
