// SPDX-License-Identifier: PMPL-1.0-or-later
//! pageseo - SEO conformance checks for rendered HTML
//!
//! Validates a document against configurable search engine optimization
//! conventions and reports every violation found rather than the first.
//!
//! ## Building blocks
//!
//! - **Normalizers**: canonical line and block text forms
//! - **Validators**: length-bounded text, URL reachability, exact and pattern matches
//! - **Deduplicator**: middleware making a validator accept each value once
//! - **Pattern**: generic structural matcher over a parsed tree
//! - **PageValidator**: doctype, root shape, language, head, headings,
//!   links, images and social cards
//!
//! ```no_run
//! use pageseo::{PageValidator, Requirements};
//!
//! let validator = PageValidator::new(Requirements::with_strict_defaults());
//! let report = validator.validate_str("<!DOCTYPE html><html lang=\"en\">...</html>");
//! for violation in report.violations() {
//!     println!("{}", violation);
//! }
//! ```

pub mod config;
pub mod dedup;
pub mod error;
pub mod link;
pub mod matcher;
pub mod normalize;
pub mod page;
pub mod report;
pub mod requirements;
pub mod tree;
pub mod validator;

pub use config::{load_config, SeoConfig};
pub use dedup::{Deduplicator, Middleware};
pub use error::{Error, Result, ValidationError};
pub use link::{Cancellation, UrlValidator};
pub use matcher::{MatchError, MatchFailure, Pattern};
pub use normalize::Normalizer;
pub use page::PageValidator;
pub use report::{Check, Report, Violation, ViolationKind};
pub use requirements::{Preset, Requirements, UniqueField};
pub use validator::{StringConstraints, TextKind, TextValidator, Validator};
