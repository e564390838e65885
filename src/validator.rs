// SPDX-License-Identifier: PMPL-1.0-or-later
//! Value validators.
//!
//! A [`Validator`] checks one string and either accepts it or explains why
//! not. The set of rule shapes is closed (length-bounded text, URL
//! reachability, exact match, pattern, skip) with [`Validator::Custom`] as
//! the extension point for anything else, including middleware output.

use crate::error::ValidationError;
use crate::link::UrlValidator;
use crate::normalize::Normalizer;
use regex::Regex;
use std::fmt;
use std::sync::Arc;

pub const DEFAULT_MINIMUM_TITLE_LENGTH: usize = 4;
pub const DEFAULT_MAXIMUM_TITLE_LENGTH: usize = 55;
pub const DEFAULT_MINIMUM_DESCRIPTION_LENGTH: usize = 4;
pub const DEFAULT_MAXIMUM_DESCRIPTION_LENGTH: usize = 150;
pub const DEFAULT_MINIMUM_HEADING_LENGTH: usize = 4;
pub const DEFAULT_MAXIMUM_HEADING_LENGTH: usize = DEFAULT_MAXIMUM_TITLE_LENGTH;
pub const DEFAULT_MINIMUM_LINK_TEXT_LENGTH: usize = 4;
pub const DEFAULT_MAXIMUM_LINK_TEXT_LENGTH: usize = DEFAULT_MAXIMUM_TITLE_LENGTH * 6;
pub const DEFAULT_MINIMUM_IMAGE_ALT_TEXT_LENGTH: usize = 0;
pub const DEFAULT_MAXIMUM_IMAGE_ALT_TEXT_LENGTH: usize = DEFAULT_MAXIMUM_TITLE_LENGTH * 12;

/// Signature of a user-supplied validation rule
pub type ValidateFn = Arc<dyn Fn(&str) -> Result<(), ValidationError> + Send + Sync>;

/// A capability that checks one string value
#[derive(Clone)]
pub enum Validator {
    /// Always succeeds. Marks a check as explicitly disabled, which is
    /// different from leaving a requirement unset (that picks a default).
    Skip,
    /// Normalization and length bounds for a kind of page text
    Text(TextValidator),
    /// Dead-link detection
    Url(UrlValidator),
    /// Value must equal the expected string
    Exact(String),
    /// Value must match the regular expression
    Pattern { regex: Regex, message: String },
    /// Arbitrary rule
    Custom(ValidateFn),
}

impl Validator {
    pub fn validate(&self, value: &str) -> Result<(), ValidationError> {
        match self {
            Validator::Skip => Ok(()),
            Validator::Text(text) => text.validate(value),
            Validator::Url(url) => url.validate(value),
            Validator::Exact(expected) => {
                if value == expected {
                    Ok(())
                } else {
                    Err(ValidationError::Mismatch {
                        expected: expected.clone(),
                        actual: value.to_string(),
                    })
                }
            }
            Validator::Pattern { regex, message } => {
                if regex.is_match(value) {
                    Ok(())
                } else {
                    Err(ValidationError::Pattern(message.clone()))
                }
            }
            Validator::Custom(f) => f(value),
        }
    }

    /// Wrap a closure as a validator
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&str) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        Validator::Custom(Arc::new(f))
    }

    pub fn exact(expected: impl Into<String>) -> Self {
        Validator::Exact(expected.into())
    }

    pub fn pattern(regex: Regex, message: impl Into<String>) -> Self {
        Validator::Pattern {
            regex,
            message: message.into(),
        }
    }

    pub fn title(constraints: StringConstraints) -> Self {
        Validator::Text(TextValidator::new(TextKind::Title, constraints))
    }

    pub fn description(constraints: StringConstraints) -> Self {
        Validator::Text(TextValidator::new(TextKind::Description, constraints))
    }

    pub fn heading(constraints: StringConstraints) -> Self {
        Validator::Text(TextValidator::new(TextKind::Heading, constraints))
    }

    pub fn link_text(constraints: StringConstraints) -> Self {
        Validator::Text(TextValidator::new(TextKind::LinkText, constraints))
    }

    pub fn image_alt_text(constraints: StringConstraints) -> Self {
        Validator::Text(TextValidator::new(TextKind::ImageAltText, constraints))
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, Validator::Skip)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validator::Skip => write!(f, "Skip"),
            Validator::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Validator::Url(url) => f.debug_tuple("Url").field(url).finish(),
            Validator::Exact(expected) => f.debug_tuple("Exact").field(expected).finish(),
            Validator::Pattern { regex, .. } => {
                f.debug_tuple("Pattern").field(&regex.as_str()).finish()
            }
            Validator::Custom(_) => write!(f, "Custom"),
        }
    }
}

/// Kind of page text a [`TextValidator`] guards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextKind {
    Title,
    Description,
    Heading,
    LinkText,
    ImageAltText,
}

impl TextKind {
    /// Noun used in failure messages
    pub fn subject(self) -> &'static str {
        match self {
            TextKind::Title => "page title",
            TextKind::Description => "page description",
            TextKind::Heading => "page heading",
            TextKind::LinkText => "link text",
            TextKind::ImageAltText => "image alternative text",
        }
    }

    pub fn default_normalizer(self) -> Normalizer {
        match self {
            TextKind::Description => Normalizer::BlockNfc,
            _ => Normalizer::LineNfc,
        }
    }

    pub fn default_minimum(self) -> usize {
        match self {
            TextKind::Title => DEFAULT_MINIMUM_TITLE_LENGTH,
            TextKind::Description => DEFAULT_MINIMUM_DESCRIPTION_LENGTH,
            TextKind::Heading => DEFAULT_MINIMUM_HEADING_LENGTH,
            TextKind::LinkText => DEFAULT_MINIMUM_LINK_TEXT_LENGTH,
            TextKind::ImageAltText => DEFAULT_MINIMUM_IMAGE_ALT_TEXT_LENGTH,
        }
    }

    pub fn default_maximum(self) -> usize {
        match self {
            TextKind::Title => DEFAULT_MAXIMUM_TITLE_LENGTH,
            TextKind::Description => DEFAULT_MAXIMUM_DESCRIPTION_LENGTH,
            TextKind::Heading => DEFAULT_MAXIMUM_HEADING_LENGTH,
            TextKind::LinkText => DEFAULT_MAXIMUM_LINK_TEXT_LENGTH,
            TextKind::ImageAltText => DEFAULT_MAXIMUM_IMAGE_ALT_TEXT_LENGTH,
        }
    }

    /// Whether an empty value is rejected regardless of the bounds
    pub fn requires_content(self) -> bool {
        !matches!(self, TextKind::ImageAltText)
    }
}

/// Optional overrides for a [`TextValidator`]; unset fields take the
/// defaults of the text kind.
#[derive(Debug, Clone, Default)]
pub struct StringConstraints {
    pub normalizer: Option<Normalizer>,
    pub minimum_length: Option<usize>,
    pub maximum_length: Option<usize>,
}

impl StringConstraints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    pub fn with_bounds(mut self, minimum: usize, maximum: usize) -> Self {
        self.minimum_length = Some(minimum);
        self.maximum_length = Some(maximum);
        self
    }

    pub fn with_minimum(mut self, minimum: usize) -> Self {
        self.minimum_length = Some(minimum);
        self
    }

    pub fn with_maximum(mut self, maximum: usize) -> Self {
        self.maximum_length = Some(maximum);
        self
    }
}

/// Rejects text that is not in canonical form or falls outside its bounds.
///
/// Length counts UTF-8 bytes of the canonical form, so multi-byte characters
/// weigh more than one unit.
#[derive(Debug, Clone)]
pub struct TextValidator {
    kind: TextKind,
    normalizer: Normalizer,
    minimum_length: usize,
    maximum_length: usize,
}

impl TextValidator {
    pub fn new(kind: TextKind, constraints: StringConstraints) -> Self {
        Self {
            kind,
            normalizer: constraints
                .normalizer
                .unwrap_or_else(|| kind.default_normalizer()),
            minimum_length: constraints
                .minimum_length
                .unwrap_or_else(|| kind.default_minimum()),
            maximum_length: constraints
                .maximum_length
                .unwrap_or_else(|| kind.default_maximum()),
        }
    }

    pub fn kind(&self) -> TextKind {
        self.kind
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn bounds(&self) -> (usize, usize) {
        (self.minimum_length, self.maximum_length)
    }

    pub fn validate(&self, value: &str) -> Result<(), ValidationError> {
        let subject = self.kind.subject();
        let normalized = self.normalizer.normalize(value)?;
        if normalized != value {
            return Err(ValidationError::NotNormalized { subject });
        }

        match normalized.len() {
            0 if self.kind.requires_content() => Err(ValidationError::Empty { subject }),
            length if length < self.minimum_length => Err(ValidationError::TooShort {
                subject,
                length,
                minimum: self.minimum_length,
            }),
            length if length > self.maximum_length => Err(ValidationError::TooLong {
                subject,
                length,
                maximum: self.maximum_length,
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounded_title() -> Validator {
        Validator::title(StringConstraints::new().with_bounds(4, 55))
    }

    #[test]
    fn test_title_length_boundaries() {
        let title = bounded_title();
        assert!(title.validate("abcd").is_ok());
        assert!(title.validate(&"a".repeat(55)).is_ok());
        assert!(matches!(
            title.validate("abc"),
            Err(ValidationError::TooShort { length: 3, minimum: 4, .. })
        ));
        assert!(matches!(
            title.validate(&"a".repeat(56)),
            Err(ValidationError::TooLong { length: 56, maximum: 55, .. })
        ));
    }

    #[test]
    fn test_empty_title_is_reported_as_empty() {
        assert!(matches!(
            bounded_title().validate(""),
            Err(ValidationError::Empty { subject: "page title" })
        ));
    }

    #[test]
    fn test_whitespace_runs_fail_normalizing_validator_only() {
        let value = "Two  spaces inside";
        let normalizing = bounded_title();
        let passthrough = Validator::title(
            StringConstraints::new()
                .with_normalizer(Normalizer::Passthrough)
                .with_bounds(4, 55),
        );
        assert!(matches!(
            normalizing.validate(value),
            Err(ValidationError::NotNormalized { .. })
        ));
        assert!(passthrough.validate(value).is_ok());
    }

    #[test]
    fn test_length_counts_bytes() {
        // four characters, eight bytes
        let title = Validator::title(StringConstraints::new().with_bounds(4, 7));
        assert!(matches!(
            title.validate("\u{e4}\u{e4}\u{e4}\u{e4}"),
            Err(ValidationError::TooLong { length: 8, .. })
        ));
    }

    #[test]
    fn test_kind_defaults() {
        let link = TextValidator::new(TextKind::LinkText, StringConstraints::new());
        assert_eq!(link.bounds(), (4, 330));
        let alt = TextValidator::new(TextKind::ImageAltText, StringConstraints::new());
        assert_eq!(alt.bounds(), (0, 660));
        assert!(alt.validate("").is_ok());
        let description = TextValidator::new(TextKind::Description, StringConstraints::new());
        assert_eq!(description.normalizer().name(), "block-nfc");
    }

    #[test]
    fn test_exact_and_pattern() {
        let exact = Validator::exact("content");
        assert!(exact.validate("content").is_ok());
        assert_eq!(
            exact.validate("other").unwrap_err().to_string(),
            "expected \"content\", got \"other\""
        );

        let pattern = Validator::pattern(Regex::new("^[a-z]{2}$").unwrap(), "invalid language code");
        assert!(pattern.validate("en").is_ok());
        assert_eq!(
            pattern.validate("english").unwrap_err().to_string(),
            "invalid language code"
        );
    }

    #[test]
    fn test_skip_accepts_everything() {
        assert!(Validator::Skip.validate("").is_ok());
        assert!(Validator::Skip.is_skip());
        assert!(!bounded_title().is_skip());
    }
}
