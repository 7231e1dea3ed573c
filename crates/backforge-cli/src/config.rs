//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value. The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables: `BACKFORGE__DEFAULTS__FRAMEWORK=hono`,
//!    `BACKFORGE__DEFAULTS__FEATURES=cors,docker`
//! 3. Config file (`--config FILE`, or the per-user file from [`AppConfig::config_path`])
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use anyhow::Context;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

use backforge_core::domain::{AuthStrategy, Database, Feature, Framework, Language, LockBackend, Queue};

use crate::error::{CliError, CliResult};

const ENV_PREFIX: &str = "BACKFORGE";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Used by `backforge new` when a flag is left out.
    pub defaults: Defaults,
    pub output: OutputConfig,
    pub templates: TemplateConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub framework: String,
    pub language: String,
    pub database: String,
    pub auth: String,
    pub queue: String,
    pub lock: String,
    pub features: Vec<String>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            framework: Framework::default().as_str().into(),
            language: Language::default().as_str().into(),
            database: Database::None.as_str().into(),
            auth: AuthStrategy::None.as_str().into(),
            queue: Queue::None.as_str().into(),
            lock: LockBackend::None.as_str().into(),
            features: Feature::DEFAULTS.iter().map(|f| f.as_str().into()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    /// `auto`, `human`, `plain` or `json`.
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "auto".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Overlay directory layered over the built-in templates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration: defaults, then the config file, then environment.
    ///
    /// A file given with `--config` must exist; the default per-user file is
    /// optional.
    pub fn load(config_file: Option<&Path>) -> anyhow::Result<Self> {
        let defaults = Config::try_from(&Self::default())
            .context("failed to serialise built-in defaults")?;

        let file = match config_file {
            Some(path) => File::from(path).format(FileFormat::Toml).required(true),
            None => File::from(Self::config_path())
                .format(FileFormat::Toml)
                .required(false),
        };

        let environment = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("defaults.features")
            .try_parsing(true);

        let config: Self = Config::builder()
            .add_source(defaults)
            .add_source(file)
            .add_source(environment)
            .build()
            .context("failed to read configuration")?
            .try_deserialize()
            .context("invalid configuration")?;

        debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// Path to the default configuration file.
    ///
    /// Falls back to `.backforge.toml` in the current directory when no home
    /// directory can be determined.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "backforge", "backforge")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".backforge.toml"))
    }

    pub fn to_toml(&self) -> CliResult<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::ConfigError {
            message: format!("failed to serialise configuration: {e}"),
            source: Some(Box::new(e)),
        })
    }

    pub fn to_json(&self) -> CliResult<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| CliError::ConfigError {
            message: format!("failed to serialise configuration: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Value at a dotted key such as `defaults.framework`.
    pub fn get(&self, key: &str) -> CliResult<serde_json::Value> {
        let root = self.to_json()?;
        key.split('.')
            .try_fold(&root, |value, segment| value.get(segment))
            .cloned()
            .ok_or_else(|| CliError::ConfigError {
                message: format!("unknown config key '{key}'"),
                source: None,
            })
    }
}

// ── Typed defaults ────────────────────────────────────────────────────────────

impl Defaults {
    pub fn framework(&self) -> CliResult<Framework> {
        parse_default("defaults.framework", &self.framework)
    }

    pub fn language(&self) -> CliResult<Language> {
        parse_default("defaults.language", &self.language)
    }

    pub fn database(&self) -> CliResult<Database> {
        parse_default("defaults.database", &self.database)
    }

    pub fn auth(&self) -> CliResult<AuthStrategy> {
        parse_default("defaults.auth", &self.auth)
    }

    pub fn queue(&self) -> CliResult<Queue> {
        parse_default("defaults.queue", &self.queue)
    }

    pub fn lock(&self) -> CliResult<LockBackend> {
        parse_default("defaults.lock", &self.lock)
    }

    pub fn features(&self) -> CliResult<Vec<Feature>> {
        self.features
            .iter()
            .map(|f| parse_default("defaults.features", f))
            .collect()
    }
}

fn parse_default<T>(key: &str, value: &str) -> CliResult<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.trim().parse().map_err(|e: T::Err| CliError::ConfigError {
        message: format!("{key} = '{value}': {e}"),
        source: Some(Box::new(e)),
    })
}
