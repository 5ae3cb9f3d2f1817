//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables: `LOREWEAVE__SECTION__KEY`
//! 3. Config file (`--config`, else the platform config dir)
//! 4. Built-in defaults (always present)

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use loreweave_adapters::GeneratorConfig;
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Output settings.
    pub output: OutputConfig,
    /// Content generation settings.
    pub generator: GeneratorSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub no_color: bool,
    /// Default root for `generate`.
    pub templates_dir: PathBuf,
    /// Formats written when none is requested.
    pub formats: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorSection {
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        let generator = GeneratorConfig::default();
        Self {
            output: OutputConfig {
                no_color: false,
                templates_dir: PathBuf::from("lore/templates"),
                formats: vec!["yaml".into(), "json".into()],
            },
            generator: GeneratorSection {
                endpoint: generator.endpoint,
                api_key: None,
                model: generator.model,
                timeout_secs: generator.timeout.as_secs(),
                temperature: generator.temperature,
                max_tokens: generator.max_tokens,
            },
        }
    }
}

impl GeneratorSection {
    /// Adapter settings for this section.
    pub fn to_generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            endpoint: self.endpoint.clone(),
            api_key: self.api_key.clone().filter(|k| !k.is_empty()),
            model: self.model.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

impl AppConfig {
    /// Load configuration: defaults, then the file, then the environment.
    ///
    /// An explicit `--config` file must exist; the default location is
    /// optional.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let (path, required) = match config_file {
            Some(path) => (path.clone(), true),
            None => (Self::config_path(), false),
        };

        let defaults = config::Config::try_from(&Self::default())
            .context("Failed to prepare default configuration")?;

        config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::from(path.as_path()).required(required))
            .add_source(
                config::Environment::with_prefix("LOREWEAVE")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("output.formats")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to load configuration from '{}'", path.display()))?
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.loreweave.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("org", "loreweave", "loreweave")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".loreweave.toml"))
    }

    /// Look up a dotted key, rendered for display.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "output.no_color" => self.output.no_color.to_string(),
            "output.templates_dir" => self.output.templates_dir.display().to_string(),
            "output.formats" => self.output.formats.join(", "),
            "generator.endpoint" => self.generator.endpoint.clone(),
            "generator.api_key" => match &self.generator.api_key {
                Some(_) => "********".into(),
                None => String::new(),
            },
            "generator.model" => self.generator.model.clone(),
            "generator.timeout_secs" => self.generator.timeout_secs.to_string(),
            "generator.temperature" => self.generator.temperature.to_string(),
            "generator.max_tokens" => self.generator.max_tokens.to_string(),
            _ => return None,
        };
        Some(value)
    }

    pub const KEYS: &'static [&'static str] = &[
        "output.no_color",
        "output.templates_dir",
        "output.formats",
        "generator.endpoint",
        "generator.api_key",
        "generator.model",
        "generator.timeout_secs",
        "generator.temperature",
        "generator.max_tokens",
    ];
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use loreweave_adapters::generator;

    use super::*;

    #[test]
    fn defaults_match_generator_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.generator.endpoint, generator::DEFAULT_ENDPOINT);
        assert_eq!(cfg.generator.model, generator::DEFAULT_MODEL);
        assert_eq!(cfg.generator.timeout_secs, 120);
        assert_eq!(cfg.output.formats, ["yaml", "json"]);
        assert!(!cfg.output.no_color);
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[output]\ntemplates_dir = \"custom\"\n\n[generator]\nmodel = \"tiny\"\ntimeout_secs = 5"
        )
        .unwrap();

        let cfg = AppConfig::load(Some(&file.path().to_path_buf())).unwrap();
        assert_eq!(cfg.output.templates_dir, PathBuf::from("custom"));
        assert_eq!(cfg.generator.model, "tiny");
        assert_eq!(cfg.generator.timeout_secs, 5);
        assert_eq!(cfg.generator.endpoint, generator::DEFAULT_ENDPOINT);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let path = PathBuf::from("/definitely/not/here/loreweave.toml");
        assert!(AppConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn every_listed_key_resolves() {
        let cfg = AppConfig::default();
        for key in AppConfig::KEYS {
            assert!(cfg.get(key).is_some(), "missing key {key}");
        }
        assert!(cfg.get("does.not.exist").is_none());
    }

    #[test]
    fn api_key_is_masked() {
        let mut cfg = AppConfig::default();
        cfg.generator.api_key = Some("secret".into());
        assert_eq!(cfg.get("generator.api_key").as_deref(), Some("********"));
        assert_eq!(
            cfg.generator.to_generator_config().api_key.as_deref(),
            Some("secret")
        );
    }

    #[test]
    fn config_path_is_not_empty() {
        assert!(!AppConfig::config_path().as_os_str().is_empty());
    }
}
