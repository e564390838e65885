// SPDX-License-Identifier: PMPL-1.0-or-later
//! Rule configuration for a [`crate::PageValidator`].
//!
//! Every validator slot is optional. A slot left `None` receives the default
//! of the preset when the engine is built; [`Validator::Skip`] turns the
//! check off explicitly.

use crate::dedup::{Deduplicator, Middleware};
use crate::link::UrlValidator;
use crate::normalize::Normalizer;
use crate::validator::{
    StringConstraints, TextKind, TextValidator, Validator, DEFAULT_MAXIMUM_HEADING_LENGTH,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};
use url::Url;

static LANGUAGE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]{2}(-[A-Za-z]{2})?$").expect("valid regex"));

/// Accepts `xx` and `xx-XX` language tags
pub fn language_validator() -> Validator {
    Validator::pattern(LANGUAGE_CODE.clone(), "invalid language code")
}

/// Named bundle of default rules
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Passthrough normalization and permissive bounds
    #[default]
    Default,
    /// Canonical text forms and the tight bounds of each text kind
    Strict,
}

impl Preset {
    /// Constraints this preset applies to a kind of page text
    pub fn constraints(self, kind: TextKind) -> StringConstraints {
        match self {
            Preset::Strict => StringConstraints::new(),
            Preset::Default => {
                let constraints = StringConstraints::new().with_normalizer(Normalizer::Passthrough);
                match kind {
                    TextKind::Heading => {
                        constraints.with_bounds(1, DEFAULT_MAXIMUM_HEADING_LENGTH * 2)
                    }
                    TextKind::LinkText => constraints.with_minimum(1),
                    _ => constraints,
                }
            }
        }
    }

    pub fn text_validator(self, kind: TextKind) -> Validator {
        Validator::Text(TextValidator::new(kind, self.constraints(kind)))
    }
}

/// Values that must be unique across every document checked by one engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniqueField {
    Title,
    Description,
    OpenGraphTitle,
    OpenGraphDescription,
    TwitterTitle,
    TwitterDescription,
}

/// Overridable rules for page validation
#[derive(Clone, Default)]
pub struct Requirements {
    pub preset: Preset,
    pub title: Option<Validator>,
    pub description: Option<Validator>,
    pub heading: Option<Validator>,
    pub language: Option<Validator>,
    pub url: Option<Validator>,
    pub link_text: Option<Validator>,
    pub image_alt_text: Option<Validator>,
    /// Key space shared by the default deduplicators
    pub namespace: String,
    /// Origin relative links and image sources are resolved against
    pub base_url: Option<Url>,
    deduplicators: HashMap<UniqueField, Arc<dyn Middleware>>,
}

impl Requirements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lenient rules: passthrough normalization, permissive bounds and the
    /// language code check
    pub fn with_defaults() -> Self {
        Self::preset(Preset::Default)
    }

    /// Canonical text forms required everywhere
    pub fn with_strict_defaults() -> Self {
        Self::preset(Preset::Strict)
    }

    pub fn preset(preset: Preset) -> Self {
        Self {
            preset,
            ..Self::default()
        }
        .resolve()
    }

    pub fn with_title(mut self, validator: Validator) -> Self {
        self.title = Some(validator);
        self
    }

    pub fn with_description(mut self, validator: Validator) -> Self {
        self.description = Some(validator);
        self
    }

    pub fn with_heading(mut self, validator: Validator) -> Self {
        self.heading = Some(validator);
        self
    }

    pub fn with_language(mut self, validator: Validator) -> Self {
        self.language = Some(validator);
        self
    }

    pub fn with_url(mut self, validator: Validator) -> Self {
        self.url = Some(validator);
        self
    }

    pub fn with_link_text(mut self, validator: Validator) -> Self {
        self.link_text = Some(validator);
        self
    }

    pub fn with_image_alt_text(mut self, validator: Validator) -> Self {
        self.image_alt_text = Some(validator);
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Inject the uniqueness middleware for one field
    pub fn with_deduplicator(mut self, field: UniqueField, middleware: Arc<dyn Middleware>) -> Self {
        self.deduplicators.insert(field, middleware);
        self
    }

    /// Middleware guarding `field`. Fields without an injected middleware get
    /// a fresh [`Deduplicator`] in the configured namespace.
    pub fn deduplicator(&self, field: UniqueField) -> Arc<dyn Middleware> {
        self.deduplicators
            .get(&field)
            .cloned()
            .unwrap_or_else(|| Arc::new(Deduplicator::new(self.namespace.clone())))
    }

    /// Fill every unset validator slot from the preset
    pub fn resolve(mut self) -> Self {
        let preset = self.preset;
        self.title
            .get_or_insert_with(|| preset.text_validator(TextKind::Title));
        self.description
            .get_or_insert_with(|| preset.text_validator(TextKind::Description));
        self.heading
            .get_or_insert_with(|| preset.text_validator(TextKind::Heading));
        self.link_text
            .get_or_insert_with(|| preset.text_validator(TextKind::LinkText));
        self.image_alt_text
            .get_or_insert_with(|| preset.text_validator(TextKind::ImageAltText));
        self.language.get_or_insert_with(language_validator);
        self.url
            .get_or_insert_with(|| Validator::Url(UrlValidator::new()));
        self
    }
}

impl fmt::Debug for Requirements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut injected: Vec<_> = self.deduplicators.keys().collect();
        injected.sort_by_key(|field| format!("{:?}", field));
        f.debug_struct("Requirements")
            .field("preset", &self.preset)
            .field("title", &self.title)
            .field("description", &self.description)
            .field("heading", &self.heading)
            .field("language", &self.language)
            .field("url", &self.url)
            .field("link_text", &self.link_text)
            .field("image_alt_text", &self.image_alt_text)
            .field("namespace", &self.namespace)
            .field("base_url", &self.base_url.as_ref().map(Url::as_str))
            .field("deduplicators", &injected)
            .finish()
    }
}
