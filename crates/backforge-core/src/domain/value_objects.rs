//! Domain value objects: the choices a generated project is made of.
//!
//! These are pure value types (`Copy`, equality by value). They hold no
//! capability logic; packages, environment variables and compatibility rules
//! live in `capabilities.rs`. This file defines the types, their canonical
//! strings and their lenient `FromStr` parsers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

fn unknown(kind: &'static str, value: &str) -> DomainError {
    DomainError::UnknownOption {
        kind,
        value: value.to_string(),
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_ascii_lowercase().replace('_', "-")
}

// ── Framework ─────────────────────────────────────────────────────────────────

/// HTTP framework of the generated server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    #[default]
    Express,
    Hono,
}

impl Framework {
    pub const ALL: [Framework; 2] = [Self::Express, Self::Hono];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Express => "express",
            Self::Hono => "hono",
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Framework {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "express" | "expressjs" => Ok(Self::Express),
            "hono" => Ok(Self::Hono),
            _ => Err(unknown("framework", s)),
        }
    }
}

// ── Language ──────────────────────────────────────────────────────────────────

/// Source language of the generated project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    TypeScript,
    JavaScript,
}

impl Language {
    pub const ALL: [Language; 2] = [Self::TypeScript, Self::JavaScript];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TypeScript => "typescript",
            Self::JavaScript => "javascript",
        }
    }

    pub const fn file_extension(&self) -> &'static str {
        match self {
            Self::TypeScript => "ts",
            Self::JavaScript => "js",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "typescript" | "ts" => Ok(Self::TypeScript),
            "javascript" | "js" | "node" => Ok(Self::JavaScript),
            _ => Err(unknown("language", s)),
        }
    }
}

// ── Database ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    #[default]
    None,
    Postgres,
    Mysql,
    Mongodb,
    Sqlite,
}

impl Database {
    pub const ALL: [Database; 5] = [
        Self::None,
        Self::Postgres,
        Self::Mysql,
        Self::Mongodb,
        Self::Sqlite,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Postgres => "postgres",
            Self::Mysql => "mysql",
            Self::Mongodb => "mongodb",
            Self::Sqlite => "sqlite",
        }
    }

    pub const fn is_some(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Database {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "none" | "" => Ok(Self::None),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "mysql" | "mariadb" => Ok(Self::Mysql),
            "mongodb" | "mongo" => Ok(Self::Mongodb),
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            _ => Err(unknown("database", s)),
        }
    }
}

// ── AuthStrategy ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthStrategy {
    #[default]
    None,
    Jwt,
    Session,
    ApiKey,
}

impl AuthStrategy {
    pub const ALL: [AuthStrategy; 4] = [Self::None, Self::Jwt, Self::Session, Self::ApiKey];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Jwt => "jwt",
            Self::Session => "session",
            Self::ApiKey => "api-key",
        }
    }

    pub const fn is_some(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for AuthStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthStrategy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "none" | "" => Ok(Self::None),
            "jwt" => Ok(Self::Jwt),
            "session" | "sessions" => Ok(Self::Session),
            "api-key" | "apikey" | "api-keys" => Ok(Self::ApiKey),
            _ => Err(unknown("auth strategy", s)),
        }
    }
}

// ── Queue ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Queue {
    #[default]
    None,
    BullMq,
    RabbitMq,
}

impl Queue {
    pub const ALL: [Queue; 3] = [Self::None, Self::BullMq, Self::RabbitMq];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::BullMq => "bullmq",
            Self::RabbitMq => "rabbitmq",
        }
    }

    pub const fn is_some(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for Queue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Queue {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "none" | "" => Ok(Self::None),
            "bullmq" | "bull" => Ok(Self::BullMq),
            "rabbitmq" | "rabbit" | "amqp" => Ok(Self::RabbitMq),
            _ => Err(unknown("queue", s)),
        }
    }
}

// ── LockBackend ───────────────────────────────────────────────────────────────

/// Backend of the generated mutual-exclusion helper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockBackend {
    #[default]
    None,
    File,
    Redis,
    Postgres,
    Mysql,
}

impl LockBackend {
    pub const ALL: [LockBackend; 5] = [
        Self::None,
        Self::File,
        Self::Redis,
        Self::Postgres,
        Self::Mysql,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::File => "file",
            Self::Redis => "redis",
            Self::Postgres => "postgres",
            Self::Mysql => "mysql",
        }
    }

    pub const fn is_some(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for LockBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LockBackend {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "none" | "" => Ok(Self::None),
            "file" | "fs" => Ok(Self::File),
            "redis" => Ok(Self::Redis),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "mysql" => Ok(Self::Mysql),
            _ => Err(unknown("lock backend", s)),
        }
    }
}

// ── Feature ───────────────────────────────────────────────────────────────────

/// Optional add-ons. Ordered so feature sets serialize deterministically.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Feature {
    Docker,
    Cors,
    RateLimit,
    RequestLogging,
}

impl Feature {
    pub const ALL: [Feature; 4] = [
        Self::Docker,
        Self::Cors,
        Self::RateLimit,
        Self::RequestLogging,
    ];

    /// Enabled unless the user opts out.
    pub const DEFAULTS: [Feature; 2] = [Self::Cors, Self::RequestLogging];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Docker => "docker",
            Self::Cors => "cors",
            Self::RateLimit => "rate-limit",
            Self::RequestLogging => "request-logging",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "docker" => Ok(Self::Docker),
            "cors" => Ok(Self::Cors),
            "rate-limit" | "ratelimit" | "rate-limiting" => Ok(Self::RateLimit),
            "request-logging" | "logging" | "logger" => Ok(Self::RequestLogging),
            _ => Err(unknown("feature", s)),
        }
    }
}
