//! Route table data model.
//!
//! Everything in here is plain data: names, handler references and the
//! route definitions that reference them. Nothing is resolved at
//! construction time; resolution happens in [`super::validator`] and
//! [`super::mount`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::routing::error::RouterError;

/// Registry name of the synthesized role-check middleware.
pub const ROLE_CHECK: &str = "roleCheck";

// ── MiddlewareName ────────────────────────────────────────────────────────────

/// Symbolic name of a middleware unit.
///
/// Order of names inside a chain is execution order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MiddlewareName(String);

impl MiddlewareName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MiddlewareName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MiddlewareName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for MiddlewareName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<str> for MiddlewareName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for MiddlewareName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

// ── HandlerRef ────────────────────────────────────────────────────────────────

/// Reference to a controller method, written `controller.method`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HandlerRef {
    controller: String,
    method: String,
}

impl HandlerRef {
    pub fn new(controller: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            controller: controller.into(),
            method: method.into(),
        }
    }

    /// Parse `"controller.method"`. Both halves must be non-empty and the
    /// method half may not contain another `.`.
    pub fn parse(s: &str) -> Result<Self, RouterError> {
        let invalid = || RouterError::InvalidHandlerRef {
            value: s.to_string(),
        };

        let (controller, method) = s.trim().split_once('.').ok_or_else(invalid)?;
        if controller.is_empty() || method.is_empty() || method.contains('.') {
            return Err(invalid());
        }
        Ok(Self::new(controller, method))
    }

    pub fn controller(&self) -> &str {
        &self.controller
    }

    pub fn method(&self) -> &str {
        &self.method
    }
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.controller, self.method)
    }
}

impl FromStr for HandlerRef {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for HandlerRef {
    type Error = RouterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HandlerRef> for String {
    fn from(handler: HandlerRef) -> Self {
        handler.to_string()
    }
}

// ── HttpMethod ────────────────────────────────────────────────────────────────

/// HTTP verbs a route may be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 5] = [
        Self::Get,
        Self::Post,
        Self::Put,
        Self::Delete,
        Self::Patch,
    ];

    /// Canonical uppercase form.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
        }
    }

    pub const fn as_lower(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Delete => "delete",
            Self::Patch => "patch",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            "PATCH" => Ok(Self::Patch),
            _ => Err(RouterError::UnknownMethod {
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for HttpMethod {
    type Error = RouterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HttpMethod> for String {
    fn from(method: HttpMethod) -> Self {
        method.as_str().to_string()
    }
}

// ── RouteDefinition ───────────────────────────────────────────────────────────

/// One entry of the route table.
///
/// Immutable once built: the `with_*` methods consume the value and are meant
/// for declaration time only. An empty list means "not set".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDefinition {
    method: HttpMethod,
    path: String,
    handler: HandlerRef,
    #[serde(
        default,
        deserialize_with = "unique_list",
        rename = "middlewares",
        alias = "enabledExtra",
        skip_serializing_if = "Vec::is_empty"
    )]
    enabled_extra: Vec<MiddlewareName>,
    #[serde(
        default,
        deserialize_with = "unique_list",
        rename = "disableMiddlewares",
        alias = "disabledDefaults",
        skip_serializing_if = "Vec::is_empty"
    )]
    disabled_defaults: Vec<MiddlewareName>,
    #[serde(default, deserialize_with = "unique_list", skip_serializing_if = "Vec::is_empty")]
    roles: Vec<String>,
    #[serde(default, deserialize_with = "unique_list", skip_serializing_if = "Vec::is_empty")]
    exclude_roles: Vec<String>,
}

impl RouteDefinition {
    pub fn new(method: HttpMethod, path: impl Into<String>, handler: HandlerRef) -> Self {
        Self {
            method,
            path: path.into(),
            handler,
            enabled_extra: Vec::new(),
            disabled_defaults: Vec::new(),
            roles: Vec::new(),
            exclude_roles: Vec::new(),
        }
    }

    /// Extra middleware appended after the surviving defaults, in this order.
    pub fn with_middlewares<I, N>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<MiddlewareName>,
    {
        push_unique(&mut self.enabled_extra, names.into_iter().map(Into::into));
        self
    }

    /// Default middleware this route opts out of.
    pub fn without_defaults<I, N>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<MiddlewareName>,
    {
        push_unique(&mut self.disabled_defaults, names.into_iter().map(Into::into));
        self
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        push_unique(&mut self.roles, roles.into_iter().map(Into::into));
        self
    }

    pub fn excluding_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        push_unique(&mut self.exclude_roles, roles.into_iter().map(Into::into));
        self
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn handler(&self) -> &HandlerRef {
        &self.handler
    }

    pub fn enabled_extra(&self) -> &[MiddlewareName] {
        &self.enabled_extra
    }

    pub fn disabled_defaults(&self) -> &[MiddlewareName] {
        &self.disabled_defaults
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    pub fn exclude_roles(&self) -> &[String] {
        &self.exclude_roles
    }

    /// Both `roles` and `excludeRoles` are set. The exclusion has no effect
    /// in that case because `roles` replaces the role set afterwards.
    pub fn has_ambiguous_roles(&self) -> bool {
        !self.roles.is_empty() && !self.exclude_roles.is_empty()
    }
}

impl fmt::Display for RouteDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.method, self.path, self.handler)
    }
}

/// Appends the values not yet in `target`, keeping first-seen order.
fn push_unique<T: PartialEq>(target: &mut Vec<T>, values: impl IntoIterator<Item = T>) {
    for value in values {
        if !target.contains(&value) {
            target.push(value);
        }
    }
}

/// Role and middleware lists are sets; repeats in a route table are dropped.
fn unique_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + PartialEq,
{
    let mut unique = Vec::new();
    push_unique(&mut unique, Vec::<T>::deserialize(deserializer)?);
    Ok(unique)
}

// ── RouterConfig ──────────────────────────────────────────────────────────────

/// Global defaults plus the ordered route table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterConfig {
    #[serde(default, deserialize_with = "unique_list")]
    default_middlewares: Vec<MiddlewareName>,
    #[serde(default, deserialize_with = "unique_list")]
    default_roles: Vec<String>,
    #[serde(default)]
    routes: Vec<RouteDefinition>,
}

impl RouterConfig {
    pub fn new(
        default_middlewares: Vec<MiddlewareName>,
        default_roles: Vec<String>,
        routes: Vec<RouteDefinition>,
    ) -> Self {
        let mut config = Self {
            routes,
            ..Self::default()
        };
        push_unique(&mut config.default_middlewares, default_middlewares);
        push_unique(&mut config.default_roles, default_roles);
        config
    }

    pub fn default_middlewares(&self) -> &[MiddlewareName] {
        &self.default_middlewares
    }

    pub fn default_roles(&self) -> &[String] {
        &self.default_roles
    }

    pub fn routes(&self) -> &[RouteDefinition] {
        &self.routes
    }

    /// A new table with `route` appended.
    pub fn with_route(mut self, route: RouteDefinition) -> Self {
        self.routes.push(route);
        self
    }

    /// Whether a route with the same method and path is already declared.
    pub fn declares(&self, method: HttpMethod, path: &str) -> bool {
        self.routes
            .iter()
            .any(|r| r.method == method && r.path == path)
    }

    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}
