//! The `ProjectConfig` aggregate root and its typestate builder.
//!
//! A `ProjectConfig` is the validated description of one generated project.
//! Once built it is guaranteed consistent; a config read back from
//! `backforge.json` goes through the same [`ProjectConfig::validate`].
//!
//! # Typestate builder
//!
//! The builder carries the project name in its state type (`NoName` /
//! `HasName`), so every other option is only reachable once a name is set.
//! Cross-field rules are still checked at `build()`.
//!
//! This module must not import `tracing`.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{
    capabilities,
    error::DomainError,
    value_objects::{AuthStrategy, Database, Feature, Framework, Language, LockBackend, Queue},
};

// ── Aggregate root ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    name: String,
    #[serde(default)]
    framework: Framework,
    #[serde(default)]
    language: Language,
    #[serde(default)]
    database: Database,
    #[serde(default)]
    auth: AuthStrategy,
    #[serde(default)]
    queue: Queue,
    #[serde(default)]
    lock: LockBackend,
    #[serde(default)]
    features: BTreeSet<Feature>,
}

impl ProjectConfig {
    pub fn builder() -> ProjectConfigBuilder<NoName> {
        ProjectConfigBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub const fn framework(&self) -> Framework {
        self.framework
    }
    pub const fn language(&self) -> Language {
        self.language
    }
    pub const fn database(&self) -> Database {
        self.database
    }
    pub const fn auth(&self) -> AuthStrategy {
        self.auth
    }
    pub const fn queue(&self) -> Queue {
        self.queue
    }
    pub const fn lock(&self) -> LockBackend {
        self.lock
    }
    pub fn features(&self) -> &BTreeSet<Feature> {
        &self.features
    }

    pub fn has_feature(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    /// `ts` or `js`.
    pub const fn extension(&self) -> &'static str {
        self.language.file_extension()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        validate_project_name(&self.name)?;

        if let Err(reason) = capabilities::validate_auth_framework(self.auth, self.framework) {
            return Err(DomainError::IncompatibleOptions {
                option: "auth",
                value: self.auth.to_string(),
                reason,
            });
        }

        if let Err(reason) = capabilities::validate_lock_database(self.lock, self.database) {
            return Err(DomainError::IncompatibleOptions {
                option: "lock",
                value: self.lock.to_string(),
                reason,
            });
        }

        Ok(())
    }
}

impl fmt::Display for ProjectConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} + {})", self.name, self.framework, self.language)?;
        if self.database.is_some() {
            write!(f, ", db: {}", self.database)?;
        }
        if self.auth.is_some() {
            write!(f, ", auth: {}", self.auth)?;
        }
        if self.queue.is_some() {
            write!(f, ", queue: {}", self.queue)?;
        }
        if self.lock.is_some() {
            write!(f, ", lock: {}", self.lock)?;
        }
        Ok(())
    }
}

/// Project names become directory names and npm package names.
pub fn validate_project_name(name: &str) -> Result<(), DomainError> {
    let invalid = |reason: &str| DomainError::InvalidProjectName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.trim().is_empty() {
        return Err(invalid("name cannot be empty"));
    }
    if name.starts_with('.') {
        return Err(invalid("name cannot start with '.'"));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(invalid("name cannot contain path separators"));
    }
    if name.len() > 214 {
        return Err(invalid("name is longer than 214 characters"));
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(invalid(&format!("character '{c}' is not allowed")));
    }
    Ok(())
}

// ── Typestate markers ─────────────────────────────────────────────────────────

/// Marker: no name yet.
pub struct NoName;
/// Marker: name set; other options may now be configured.
pub struct HasName(String);

// ── Builder ───────────────────────────────────────────────────────────────────

pub struct ProjectConfigBuilder<S> {
    state: S,
    framework: Framework,
    language: Language,
    database: Database,
    auth: AuthStrategy,
    queue: Queue,
    lock: LockBackend,
    features: BTreeSet<Feature>,
}

impl ProjectConfigBuilder<NoName> {
    pub fn new() -> Self {
        Self {
            state: NoName,
            framework: Framework::default(),
            language: Language::default(),
            database: Database::default(),
            auth: AuthStrategy::default(),
            queue: Queue::default(),
            lock: LockBackend::default(),
            features: Feature::DEFAULTS.into_iter().collect(),
        }
    }

    pub fn name(self, name: impl Into<String>) -> ProjectConfigBuilder<HasName> {
        ProjectConfigBuilder {
            state: HasName(name.into()),
            framework: self.framework,
            language: self.language,
            database: self.database,
            auth: self.auth,
            queue: self.queue,
            lock: self.lock,
            features: self.features,
        }
    }
}

impl Default for ProjectConfigBuilder<NoName> {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectConfigBuilder<HasName> {
    pub fn framework(mut self, framework: Framework) -> Self {
        self.framework = framework;
        self
    }

    pub fn language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn database(mut self, database: Database) -> Self {
        self.database = database;
        self
    }

    pub fn auth(mut self, auth: AuthStrategy) -> Self {
        self.auth = auth;
        self
    }

    pub fn queue(mut self, queue: Queue) -> Self {
        self.queue = queue;
        self
    }

    pub fn lock(mut self, lock: LockBackend) -> Self {
        self.lock = lock;
        self
    }

    pub fn feature(mut self, feature: Feature) -> Self {
        self.features.insert(feature);
        self
    }

    pub fn features(mut self, features: impl IntoIterator<Item = Feature>) -> Self {
        self.features.extend(features);
        self
    }

    /// Drop the default feature set; only features added afterwards remain.
    pub fn without_default_features(mut self) -> Self {
        for feature in Feature::DEFAULTS {
            self.features.remove(&feature);
        }
        self
    }

    pub fn build(self) -> Result<ProjectConfig, DomainError> {
        let config = ProjectConfig {
            name: self.state.0,
            framework: self.framework,
            language: self.language,
            database: self.database,
            auth: self.auth,
            queue: self.queue,
            lock: self.lock,
            features: self.features,
        };
        config.validate()?;
        Ok(config)
    }
}
