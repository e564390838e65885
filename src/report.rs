// SPDX-License-Identifier: PMPL-1.0-or-later
//! Validation results for one document.
//!
//! A [`Report`] holds named [`Check`]s in the order they ran. Each check
//! collects its own [`Violation`]s so a reporter can render pass/fail per
//! check with the detail underneath.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Class of a rule violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationKind {
    /// Missing doctype, wrong root shape, missing head or body
    Structural,
    /// Bad normalization, out-of-bounds length, missing meta field
    Content,
    /// Second occurrence of a value that must be unique
    Duplicate,
    /// Dead link, unreachable image, unsupported URL scheme
    ExternalResource,
    /// Markup that cannot be interpreted, such as repeated attribute names
    Parse,
}

impl ViolationKind {
    /// Classify a validator failure
    pub fn of(error: &ValidationError) -> Self {
        if error.is_duplicate() {
            ViolationKind::Duplicate
        } else if error.is_external() {
            ViolationKind::ExternalResource
        } else {
            ViolationKind::Content
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::Structural => write!(f, "STRUCTURAL"),
            ViolationKind::Content => write!(f, "CONTENT"),
            ViolationKind::Duplicate => write!(f, "DUPLICATE"),
            ViolationKind::ExternalResource => write!(f, "EXTERNAL"),
            ViolationKind::Parse => write!(f, "PARSE"),
        }
    }
}

/// One failed rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub message: String,
    /// Element path such as `html/body/p/a`
    pub path: Option<String>,
}

impl Violation {
    pub fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            path: None,
        }
    }

    pub fn structural(message: impl Into<String>) -> Self {
        Self::new(ViolationKind::Structural, message)
    }

    pub fn content(message: impl Into<String>) -> Self {
        Self::new(ViolationKind::Content, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ViolationKind::Parse, message)
    }

    /// Describe a validator failure in the context of the value it rejected
    pub fn invalid(context: &str, error: &ValidationError) -> Self {
        Self::new(ViolationKind::of(error), format!("{}: {}", context, error))
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "[{}] {} ({})", self.kind, self.message, path),
            None => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}

/// A named group of violations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Check {
    pub name: String,
    pub violations: Vec<Violation>,
}

impl Check {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            violations: Vec::new(),
        }
    }

    pub fn add(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Every check run against one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub checks: Vec<Check>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, check: Check) {
        self.checks.push(check);
    }

    /// True iff no check recorded a violation
    pub fn passed(&self) -> bool {
        self.checks.iter().all(Check::passed)
    }

    /// Look up a check by name
    pub fn check(&self, name: &str) -> Option<&Check> {
        self.checks.iter().find(|check| check.name == name)
    }

    /// All violations across checks, in check order
    pub fn violations(&self) -> impl Iterator<Item = &Violation> {
        self.checks.iter().flat_map(|check| check.violations.iter())
    }

    pub fn by_kind(&self, kind: ViolationKind) -> Vec<&Violation> {
        self.violations().filter(|v| v.kind == kind).collect()
    }

    pub fn failed_checks(&self) -> Vec<&Check> {
        self.checks.iter().filter(|check| !check.passed()).collect()
    }

    /// Total violation count
    pub fn len(&self) -> usize {
        self.checks.iter().map(Check::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> Report {
        let mut head = Check::new("head");
        head.add(Violation::content("<TITLE> tag is missing"));
        head.add(Violation::invalid(
            "<META name=\"description\"> content",
            &ValidationError::DuplicateValue,
        ));

        let mut link = Check::new("html/body/a");
        link.add(
            Violation::invalid("href", &ValidationError::UnsupportedScheme("gopher".into()))
                .with_path("html/body/a"),
        );

        let mut report = Report::new();
        report.add(head);
        report.add(Check::new("document"));
        report.add(link);
        report
    }

    #[test]
    fn test_report_aggregation() {
        let report = sample_report();
        assert!(!report.passed());
        assert_eq!(report.len(), 3);
        assert_eq!(report.failed_checks().len(), 2);
        assert_eq!(report.by_kind(ViolationKind::Duplicate).len(), 1);
        assert_eq!(report.by_kind(ViolationKind::ExternalResource).len(), 1);
        assert!(report.check("document").is_some_and(Check::passed));
    }

    #[test]
    fn test_empty_report_passes() {
        let mut report = Report::new();
        report.add(Check::new("document"));
        assert!(report.passed());
        assert!(report.is_empty());
    }

    #[test]
    fn test_violation_display() {
        let violation = Violation::structural("missing <BODY> tag").with_path("html");
        assert_eq!(violation.to_string(), "[STRUCTURAL] missing <BODY> tag (html)");
    }

    #[test]
    fn test_report_serializes() {
        let json = serde_json::to_string(&sample_report()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
        assert_eq!(parsed["checks"][0]["violations"][1]["kind"], "duplicate");
        assert_eq!(parsed["checks"][2]["violations"][0]["kind"], "external-resource");
        assert_eq!(parsed["checks"][2]["violations"][0]["path"], "html/body/a");
    }
}
