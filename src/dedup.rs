// SPDX-License-Identifier: PMPL-1.0-or-later
//! Uniqueness enforcement across validation runs.
//!
//! A [`Deduplicator`] turns any validator into a "first occurrence wins"
//! constraint: the first time a value is seen it is recorded and handed to
//! the wrapped validator, every later occurrence fails with
//! [`ValidationError::DuplicateValue`]. Entries are never evicted.

use crate::error::ValidationError;
use crate::validator::Validator;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

/// Wraps a validator to add cross-cutting behavior
pub trait Middleware: Send + Sync {
    fn wrap(&self, next: Validator) -> Validator;
}

/// Set of claimed keys behind a single exclusive lock
#[derive(Debug, Default)]
struct DeduplicationIndex {
    known: Mutex<HashSet<String>>,
}

impl DeduplicationIndex {
    /// Record `key`, returning false when it was already present
    fn claim(&self, key: String) -> bool {
        self.known
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key)
    }
}

/// Middleware rejecting values it has already seen in its namespace
#[derive(Debug, Clone)]
pub struct Deduplicator {
    namespace: String,
    index: Arc<DeduplicationIndex>,
}

impl Deduplicator {
    /// Create a deduplicator with a fresh, private registry. Clones share
    /// the registry.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            index: Arc::new(DeduplicationIndex::default()),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn key(&self, value: &str) -> String {
        format!("{}\u{0}{}", self.namespace, value)
    }
}

impl Middleware for Deduplicator {
    fn wrap(&self, next: Validator) -> Validator {
        let this = self.clone();
        Validator::custom(move |value| {
            // lock is released before delegating
            if this.index.claim(this.key(value)) {
                next.validate(value)
            } else {
                Err(ValidationError::DuplicateValue)
            }
        })
    }
}
