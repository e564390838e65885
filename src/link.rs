// SPDX-License-Identifier: PMPL-1.0-or-later
//! Link resolution and dead-link detection.

use crate::error::{Result, ValidationError};
use reqwest::blocking::Client;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Cooperative cancellation flag shared between a caller and the URL
/// validators of a running page check. It is consulted before every fetch.
#[derive(Debug, Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Checks that a URL points at something that exists.
///
/// - `http`/`https`: GET must answer with an accepted status code
/// - `file`: the path must exist
/// - relative references that were never resolved against a base pass
/// - every other scheme is rejected
///
/// There is no retry. Fetch failures become validation failures, never
/// fatal errors. The HTTP client is built on first use.
#[derive(Clone)]
pub struct UrlValidator {
    client: Arc<OnceLock<Client>>,
    timeout: Option<Duration>,
    accept_status: Vec<u16>,
    cancellation: Option<Cancellation>,
}

impl Default for UrlValidator {
    fn default() -> Self {
        Self {
            client: Arc::new(OnceLock::new()),
            timeout: None,
            accept_status: vec![200],
            cancellation: None,
        }
    }
}

impl fmt::Debug for UrlValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlValidator")
            .field("timeout", &self.timeout)
            .field("accept_status", &self.accept_status)
            .field("cancellable", &self.cancellation.is_some())
            .finish()
    }
}

impl UrlValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured HTTP client
    pub fn with_client(self, client: Client) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(client);
        Self {
            client: Arc::new(cell),
            ..self
        }
    }

    /// Per-request deadline applied to the lazily built client
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Replace the accepted HTTP status codes (default: 200 only)
    pub fn with_accept_status(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.accept_status = codes.into_iter().collect();
        if self.accept_status.is_empty() {
            self.accept_status.push(200);
        }
        self
    }

    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = Some(cancellation);
        self
    }

    pub fn validate(&self, value: &str) -> std::result::Result<(), ValidationError> {
        let parsed = match Url::parse(value) {
            Ok(parsed) => parsed,
            Err(url::ParseError::RelativeUrlWithoutBase) => return Ok(()),
            Err(source) => {
                return Err(ValidationError::InvalidUrl {
                    url: value.to_string(),
                    source,
                })
            }
        };

        match parsed.scheme() {
            "http" | "https" => self.fetch(&parsed),
            "file" => check_file(&parsed),
            other => Err(ValidationError::UnsupportedScheme(other.to_string())),
        }
    }

    fn fetch(&self, url: &Url) -> std::result::Result<(), ValidationError> {
        if self
            .cancellation
            .as_ref()
            .is_some_and(Cancellation::is_cancelled)
        {
            return Err(ValidationError::Cancelled(url.to_string()));
        }

        debug!("Fetching {}", url);
        let response = self
            .client()
            .and_then(|client| client.get(url.as_str()).send())
            .map_err(|source| {
                warn!("Unable to fetch {}: {}", url, source);
                ValidationError::Fetch {
                    url: url.to_string(),
                    source,
                }
            })?;

        let status = response.status();
        if self.accept_status.contains(&status.as_u16()) {
            Ok(())
        } else {
            warn!("{} answered with status {}", url, status);
            Err(ValidationError::UnexpectedStatus {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("unknown").to_string(),
            })
        }
    }

    fn client(&self) -> reqwest::Result<&Client> {
        if self.client.get().is_none() {
            let mut builder = Client::builder();
            if let Some(timeout) = self.timeout {
                builder = builder.timeout(timeout);
            }
            // a concurrent caller may win the race; either client is fine
            let _ = self.client.set(builder.build()?);
        }
        Ok(self.client.get_or_init(Client::new))
    }
}

fn check_file(url: &Url) -> std::result::Result<(), ValidationError> {
    let path = url.to_file_path().map_err(|_| ValidationError::MissingFile {
        path: url.to_string(),
        source: std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "URL does not name a local path",
        ),
    })?;
    std::fs::metadata(&path)
        .map(|_| ())
        .map_err(|source| ValidationError::MissingFile {
            path: path.display().to_string(),
            source,
        })
}

/// Whether `reference` is relative to the page it appears on (no scheme and
/// no `//` authority prefix).
pub fn is_local_url(reference: &str) -> bool {
    matches!(
        Url::parse(reference),
        Err(url::ParseError::RelativeUrlWithoutBase)
    ) && !reference.starts_with("//")
}

/// Resolve `reference` against `base`. Absolute references pass through and
/// relative ones stay relative when there is no base.
pub fn join_url(base: Option<&Url>, reference: &str) -> std::result::Result<String, ValidationError> {
    match Url::parse(reference) {
        Ok(_) => Ok(reference.to_string()),
        Err(url::ParseError::RelativeUrlWithoutBase) => match base {
            Some(base) => base
                .join(reference)
                .map(String::from)
                .map_err(|source| ValidationError::InvalidUrl {
                    url: reference.to_string(),
                    source,
                }),
            None => Ok(reference.to_string()),
        },
        Err(source) => Err(ValidationError::InvalidUrl {
            url: reference.to_string(),
            source,
        }),
    }
}

/// Parse the origin that relative links are resolved against
pub fn parse_base_url(base: &str) -> Result<Url> {
    Ok(Url::parse(base)?)
}
