//! Components added to an existing project with `backforge add`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{
    entities::template::RenderContext,
    error::DomainError,
    naming::{split_words, to_camel_case, to_kebab_case, to_pascal_case},
    value_objects::Language,
};
use crate::routing::{HandlerRef, HttpMethod, RouteDefinition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Route,
    Service,
    Middleware,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 3] = [Self::Route, Self::Service, Self::Middleware];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Route => "route",
            Self::Service => "service",
            Self::Middleware => "middleware",
        }
    }

    /// Directory under `src/` holding this kind of component.
    pub const fn directory(&self) -> &'static str {
        match self {
            Self::Route => "src/controllers",
            Self::Service => "src/services",
            Self::Middleware => "src/middleware",
        }
    }

    /// The barrel file new components are registered in.
    pub fn index_path(&self, language: Language) -> String {
        format!("{}/index.{}", self.directory(), language.file_extension())
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "route" | "routes" | "controller" => Ok(Self::Route),
            "service" | "services" => Ok(Self::Service),
            "middleware" | "mw" => Ok(Self::Middleware),
            _ => Err(DomainError::UnknownOption {
                kind: "component kind",
                value: s.to_string(),
            }),
        }
    }
}

/// A validated component name with its case variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentName {
    raw: String,
}

impl ComponentName {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let invalid = |reason: &str| DomainError::InvalidComponentName {
            name: raw.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(invalid("name cannot be empty"));
        }
        if !trimmed.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Err(invalid("name must start with a letter"));
        }
        if let Some(c) = trimmed
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(invalid(&format!("character '{c}' is not allowed")));
        }
        if split_words(trimmed).is_empty() {
            return Err(invalid("name has no words"));
        }

        Ok(Self {
            raw: trimmed.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Registry name and JS identifier: `userProfile`.
    pub fn camel(&self) -> String {
        to_camel_case(&self.raw)
    }

    /// File stem and URL segment: `user-profile`.
    pub fn kebab(&self) -> String {
        to_kebab_case(&self.raw)
    }

    pub fn pascal(&self) -> String {
        to_pascal_case(&self.raw)
    }
}

impl fmt::Display for ComponentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Everything needed to generate one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentSpec {
    pub kind: ComponentKind,
    pub name: ComponentName,
    /// URL prefix for routes; defaults to `/<kebab>`.
    pub base_path: Option<String>,
}

impl ComponentSpec {
    pub fn new(kind: ComponentKind, name: ComponentName) -> Self {
        Self {
            kind,
            name,
            base_path: None,
        }
    }

    pub fn with_base_path(mut self, path: impl Into<String>) -> Result<Self, DomainError> {
        let path = path.into();
        if !path.starts_with('/') {
            return Err(DomainError::InvalidComponentName {
                name: path,
                reason: "route paths must start with '/'".into(),
            });
        }
        self.base_path = Some(path.trim_end_matches('/').to_string());
        Ok(self)
    }

    pub fn base_path(&self) -> String {
        match &self.base_path {
            Some(p) if !p.is_empty() => p.clone(),
            _ => format!("/{}", self.name.kebab()),
        }
    }

    /// Relative path of the generated file.
    pub fn file_path(&self, language: Language) -> String {
        let ext = language.file_extension();
        let stem = self.name.kebab();
        match self.kind {
            ComponentKind::Route => format!("src/controllers/{stem}.controller.{ext}"),
            ComponentKind::Service => format!("src/services/{stem}.service.{ext}"),
            ComponentKind::Middleware => format!("src/middleware/{stem}.{ext}"),
        }
    }

    /// Module specifier used from the kind's index file (always `.js`, which
    /// TypeScript's NodeNext resolution maps back to `.ts`).
    pub fn import_specifier(&self) -> String {
        let stem = self.name.kebab();
        match self.kind {
            ComponentKind::Route => format!("./{stem}.controller.js"),
            ComponentKind::Service => format!("./{stem}.service.js"),
            ComponentKind::Middleware => format!("./{stem}.js"),
        }
    }

    /// Identifier exported by the generated file.
    pub fn export_name(&self) -> String {
        match self.kind {
            ComponentKind::Route => format!("{}Controller", self.name.camel()),
            ComponentKind::Service => format!("{}Service", self.name.camel()),
            ComponentKind::Middleware => self.name.camel(),
        }
    }

    /// Extend a project render context with the component variables.
    pub fn render_context(&self, base: RenderContext) -> RenderContext {
        base.with_variable("COMPONENT_NAME", self.name.as_str())
            .with_variable("COMPONENT_CAMEL", self.name.camel())
            .with_variable("COMPONENT_KEBAB", self.name.kebab())
            .with_variable("COMPONENT_PASCAL", self.name.pascal())
            .with_variable("COMPONENT_EXPORT", self.export_name())
            .with_variable("BASE_PATH", self.base_path())
    }

    /// The REST routes a new controller contributes to `routes.json`.
    pub fn default_routes(&self) -> Vec<RouteDefinition> {
        if self.kind != ComponentKind::Route {
            return Vec::new();
        }
        let base = self.base_path();
        let item = format!("{base}/:id");
        let controller = self.name.camel();
        let handler = |method: &str| HandlerRef::new(&controller, method);

        vec![
            RouteDefinition::new(HttpMethod::Get, &base, handler("list")),
            RouteDefinition::new(HttpMethod::Get, &item, handler("get")),
            RouteDefinition::new(HttpMethod::Post, &base, handler("create")),
            RouteDefinition::new(HttpMethod::Put, &item, handler("update")),
            RouteDefinition::new(HttpMethod::Delete, &item, handler("remove")),
        ]
    }
}
