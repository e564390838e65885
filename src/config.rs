// SPDX-License-Identifier: PMPL-1.0-or-later
//! File-based configuration for pageseo

use crate::error::{Error, Result};
use crate::link::{parse_base_url, UrlValidator};
use crate::normalize::Normalizer;
use crate::requirements::{Preset, Requirements};
use crate::validator::{TextKind, TextValidator, Validator};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeoConfig {
    pub preset: Preset,
    /// Deduplication key space
    pub namespace: String,
    pub base_url: Option<String>,
    pub title: TextConfig,
    pub description: TextConfig,
    pub heading: TextConfig,
    pub link_text: TextConfig,
    pub image_alt_text: TextConfig,
    pub links: LinkConfig,
}

/// Overrides for one kind of page text
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Turn the check off
    pub skip: bool,
    pub minimum_length: Option<usize>,
    pub maximum_length: Option<usize>,
    /// `passthrough`, `line`, `line-nfc`, `block` or `block-nfc`
    pub normalizer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub check_links: bool,
    pub accept_status: Vec<u16>,
    pub timeout_secs: Option<u64>,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            check_links: true,
            accept_status: vec![200],
            timeout_secs: None,
        }
    }
}

impl TextConfig {
    fn is_default(&self) -> bool {
        !self.skip
            && self.minimum_length.is_none()
            && self.maximum_length.is_none()
            && self.normalizer.is_none()
    }

    fn validator(&self, preset: Preset, kind: TextKind) -> Result<Option<Validator>> {
        if self.skip {
            return Ok(Some(Validator::Skip));
        }
        if self.is_default() {
            return Ok(None);
        }

        let mut constraints = preset.constraints(kind);
        if let Some(name) = &self.normalizer {
            constraints.normalizer = Some(name.parse::<Normalizer>().map_err(Error::Config)?);
        }
        if let Some(minimum) = self.minimum_length {
            constraints.minimum_length = Some(minimum);
        }
        if let Some(maximum) = self.maximum_length {
            constraints.maximum_length = Some(maximum);
        }

        let validator = TextValidator::new(kind, constraints);
        let (minimum, maximum) = validator.bounds();
        if minimum > maximum {
            return Err(Error::Config(format!(
                "{} minimum length {} exceeds maximum length {}",
                kind.subject(),
                minimum,
                maximum
            )));
        }
        Ok(Some(Validator::Text(validator)))
    }
}

impl SeoConfig {
    /// Build the rule set this configuration describes
    pub fn into_requirements(self) -> Result<Requirements> {
        let preset = self.preset;
        let mut requirements = Requirements::new().with_namespace(self.namespace);
        requirements.preset = preset;
        requirements.title = self.title.validator(preset, TextKind::Title)?;
        requirements.description = self.description.validator(preset, TextKind::Description)?;
        requirements.heading = self.heading.validator(preset, TextKind::Heading)?;
        requirements.link_text = self.link_text.validator(preset, TextKind::LinkText)?;
        requirements.image_alt_text = self
            .image_alt_text
            .validator(preset, TextKind::ImageAltText)?;

        if let Some(base_url) = &self.base_url {
            requirements.base_url = Some(parse_base_url(base_url)?);
        }

        requirements.url = Some(if self.links.check_links {
            let mut links = UrlValidator::new().with_accept_status(self.links.accept_status);
            if let Some(seconds) = self.links.timeout_secs {
                links = links.with_timeout(Duration::from_secs(seconds));
            }
            Validator::Url(links)
        } else {
            Validator::Skip
        });

        Ok(requirements.resolve())
    }
}

/// Read a TOML or YAML configuration file. A missing file yields the
/// default configuration.
pub fn load_config(path: &Path) -> Result<SeoConfig> {
    if !path.exists() {
        return Ok(SeoConfig::default());
    }

    let content = std::fs::read_to_string(path)?;

    if path.extension().and_then(|s| s.to_str()) == Some("toml") {
        toml::from_str(&content).map_err(|e| Error::Config(format!("TOML parse error: {}", e)))
    } else {
        serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("YAML parse error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn text_bounds(validator: &Option<Validator>) -> (usize, usize) {
        match validator {
            Some(Validator::Text(text)) => text.bounds(),
            other => panic!("expected a text validator, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(&dir.path().join("pageseo.toml")).unwrap();
        assert_eq!(config.preset, Preset::Default);
        assert!(config.links.check_links);
        assert_eq!(config.links.accept_status, vec![200]);
    }

    #[test]
    fn test_toml_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pageseo.toml");
        std::fs::write(
            &path,
            r#"
preset = "strict"
namespace = "example.com"
base_url = "https://example.com/"

[title]
minimum_length = 10
maximum_length = 60

[heading]
skip = true

[links]
accept_status = [200, 301]
timeout_secs = 5
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.preset, Preset::Strict);
        assert_eq!(config.links.accept_status, vec![200, 301]);

        let requirements = config.into_requirements().unwrap();
        assert_eq!(requirements.namespace, "example.com");
        assert_eq!(
            requirements.base_url.as_ref().map(|url| url.as_str()),
            Some("https://example.com/")
        );
        assert_eq!(text_bounds(&requirements.title), (10, 60));
        assert!(requirements.heading.as_ref().is_some_and(Validator::is_skip));
        assert!(matches!(requirements.url, Some(Validator::Url(_))));
    }

    #[test]
    fn test_yaml_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pageseo.yml");
        std::fs::write(
            &path,
            "description:\n  normalizer: block-nfc\n  maximum_length: 160\nlinks:\n  check_links: false\n",
        )
        .unwrap();

        let requirements = load_config(&path).unwrap().into_requirements().unwrap();
        match &requirements.description {
            Some(Validator::Text(text)) => {
                assert_eq!(text.normalizer().name(), "block-nfc");
                assert_eq!(text.bounds(), (4, 160));
            }
            other => panic!("expected a text validator, got {:?}", other),
        }
        assert!(requirements.url.as_ref().is_some_and(Validator::is_skip));
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        let unknown = SeoConfig {
            title: TextConfig {
                normalizer: Some("shouting".to_string()),
                ..TextConfig::default()
            },
            ..SeoConfig::default()
        };
        assert!(matches!(unknown.into_requirements(), Err(Error::Config(_))));

        let inverted = SeoConfig {
            heading: TextConfig {
                minimum_length: Some(20),
                maximum_length: Some(10),
                ..TextConfig::default()
            },
            ..SeoConfig::default()
        };
        assert!(matches!(inverted.into_requirements(), Err(Error::Config(_))));

        let bad_base = SeoConfig {
            base_url: Some("not a url".to_string()),
            ..SeoConfig::default()
        };
        assert!(matches!(bad_base.into_requirements(), Err(Error::Url(_))));
    }

    #[test]
    fn test_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pageseo.toml");
        std::fs::write(&path, "preset = [").unwrap();
        assert!(matches!(load_config(&path), Err(Error::Config(_))));
    }
}
