// SPDX-License-Identifier: PMPL-1.0-or-later
//! Canonical text forms.
//!
//! Validators normalize their input and reject it when the canonical form
//! differs, so upstream content has to be rendered already normalized.
//!
//! - **Line**: trimmed, every whitespace run collapsed to one space
//! - **Block**: line-normalized paragraphs separated by exactly one blank line
//!
//! Both forms optionally apply Unicode canonical composition (NFC). Every
//! built-in form is idempotent.

use crate::error::ValidationError;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use unicode_normalization::UnicodeNormalization;

/// Signature of a user-supplied normalizer
pub type NormalizeFn = Arc<dyn Fn(&str) -> Result<String, ValidationError> + Send + Sync>;

/// A pure text canonicalization function
#[derive(Clone, Default)]
pub enum Normalizer {
    /// Returns the input unchanged
    #[default]
    Passthrough,
    /// Line form without Unicode composition
    Line,
    /// Line form followed by NFC composition
    LineNfc,
    /// Block form without Unicode composition
    Block,
    /// Block form with NFC composition applied per paragraph
    BlockNfc,
    /// Caller-provided canonical form
    Custom(NormalizeFn),
}

impl Normalizer {
    /// Wrap a closure as a normalizer
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&str) -> Result<String, ValidationError> + Send + Sync + 'static,
    {
        Normalizer::Custom(Arc::new(f))
    }

    /// Produce the canonical form of `text`.
    ///
    /// Built-in forms never fail; errors from custom normalizers are passed
    /// through untouched.
    pub fn normalize(&self, text: &str) -> Result<String, ValidationError> {
        match self {
            Normalizer::Passthrough => Ok(text.to_string()),
            Normalizer::Line => Ok(normalize_line(text)),
            Normalizer::LineNfc => Ok(normalize_line_nfc(text)),
            Normalizer::Block => Ok(normalize_block(text)),
            Normalizer::BlockNfc => Ok(normalize_block_nfc(text)),
            Normalizer::Custom(f) => f(text),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Normalizer::Passthrough => "passthrough",
            Normalizer::Line => "line",
            Normalizer::LineNfc => "line-nfc",
            Normalizer::Block => "block",
            Normalizer::BlockNfc => "block-nfc",
            Normalizer::Custom(_) => "custom",
        }
    }

    pub fn is_passthrough(&self) -> bool {
        matches!(self, Normalizer::Passthrough)
    }
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Normalizer({})", self.name())
    }
}

impl FromStr for Normalizer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "passthrough" | "none" => Ok(Normalizer::Passthrough),
            "line" => Ok(Normalizer::Line),
            "line-nfc" => Ok(Normalizer::LineNfc),
            "block" | "text" => Ok(Normalizer::Block),
            "block-nfc" | "text-nfc" => Ok(Normalizer::BlockNfc),
            other => Err(format!("Unknown normalizer: {}", other)),
        }
    }
}

/// Trim and collapse every whitespace run to a single space
pub fn normalize_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// [`normalize_line`] followed by canonical composition
pub fn normalize_line_nfc(text: &str) -> String {
    normalize_line(text).nfc().collect()
}

/// Split on line breaks, line-normalize each paragraph, drop the empty ones
/// and rejoin them with one blank line.
pub fn normalize_block(text: &str) -> String {
    join_paragraphs(text, normalize_line)
}

/// [`normalize_block`] with canonical composition per paragraph
pub fn normalize_block_nfc(text: &str) -> String {
    join_paragraphs(text, normalize_line_nfc)
}

fn join_paragraphs(text: &str, line: fn(&str) -> String) -> String {
    text.split(['\n', '\r'])
        .map(line)
        .filter(|paragraph| !paragraph.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
