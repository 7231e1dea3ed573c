//! Template model and the render context.
//!
//! ```text
//! TemplateFile ── path ("src/app.{{EXT}}")
//!              ├─ body (TemplateSource: static or owned text)
//!              ├─ when (Inclusion predicate over ProjectConfig)
//!              └─ executable
//!
//! RenderContext ── variables  {{PROJECT_NAME}} -> "orders-api"
//!               └─ flags      {{#jwt}} ... {{/jwt}}, {{^database}} ... {{/database}}
//! ```
//!
//! Rendering is deliberately small: variable substitution plus boolean
//! sections. Anything smarter belongs in the generated code.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::Datelike;

use crate::domain::{
    entities::project_config::ProjectConfig,
    error::DomainError,
    naming::{to_camel_case, to_kebab_case, to_pascal_case, to_snake_case},
    value_objects::{AuthStrategy, Database, Feature, Framework, Language, LockBackend, Queue},
};

// ── Render context ────────────────────────────────────────────────────────────

/// Variables and flags available to a template.
///
/// ## Built-in variables
///
/// | Variable | Example |
/// |----------|---------|
/// | `PROJECT_NAME` | `orders-api` |
/// | `PROJECT_NAME_SNAKE` | `orders_api` |
/// | `PROJECT_NAME_KEBAB` | `orders-api` |
/// | `PROJECT_NAME_PASCAL` | `OrdersApi` |
/// | `PROJECT_NAME_CAMEL` | `ordersApi` |
/// | `YEAR` | current year |
///
/// [`RenderContext::for_project`] adds `EXT`, `FRAMEWORK`, `LANGUAGE`,
/// `DATABASE`, `AUTH`, `QUEUE`, `LOCK` and one flag per enabled option.
#[derive(Debug, Clone)]
pub struct RenderContext {
    project_name: String,
    variables: HashMap<String, String>,
    flags: HashMap<String, bool>,
}

impl RenderContext {
    pub fn new(project_name: impl Into<String>) -> Self {
        let name = project_name.into();
        let mut variables = HashMap::new();

        variables.insert("PROJECT_NAME".to_string(), name.clone());
        variables.insert("PROJECT_NAME_SNAKE".to_string(), to_snake_case(&name));
        variables.insert("PROJECT_NAME_KEBAB".to_string(), to_kebab_case(&name));
        variables.insert("PROJECT_NAME_PASCAL".to_string(), to_pascal_case(&name));
        variables.insert("PROJECT_NAME_CAMEL".to_string(), to_camel_case(&name));
        variables.insert("YEAR".to_string(), chrono::Utc::now().year().to_string());

        Self {
            project_name: name,
            variables,
            flags: HashMap::new(),
        }
    }

    /// Context with every variable and flag derived from `config`.
    pub fn for_project(config: &ProjectConfig) -> Self {
        let ctx = Self::new(config.name())
            .with_variable("EXT", config.extension())
            .with_variable("FRAMEWORK", config.framework().as_str())
            .with_variable("LANGUAGE", config.language().as_str())
            .with_variable("DATABASE", config.database().as_str())
            .with_variable("AUTH", config.auth().as_str())
            .with_variable("QUEUE", config.queue().as_str())
            .with_variable("LOCK", config.lock().as_str());

        let framework = config.framework();
        let language = config.language();
        let database = config.database();
        let auth = config.auth();
        let queue = config.queue();
        let lock = config.lock();

        ctx.with_flag("typescript", language == Language::TypeScript)
            .with_flag("javascript", language == Language::JavaScript)
            .with_flag("express", framework == Framework::Express)
            .with_flag("hono", framework == Framework::Hono)
            .with_flag("database", database.is_some())
            .with_flag("postgres", database == Database::Postgres)
            .with_flag("mysql", database == Database::Mysql)
            .with_flag("mongodb", database == Database::Mongodb)
            .with_flag("sqlite", database == Database::Sqlite)
            .with_flag("auth", auth.is_some())
            .with_flag("jwt", auth == AuthStrategy::Jwt)
            .with_flag("session", auth == AuthStrategy::Session)
            .with_flag("apiKey", auth == AuthStrategy::ApiKey)
            .with_flag("queue", queue.is_some())
            .with_flag("bullmq", queue == Queue::BullMq)
            .with_flag("rabbitmq", queue == Queue::RabbitMq)
            .with_flag("lock", lock.is_some())
            .with_flag("lockFile", lock == LockBackend::File)
            .with_flag("lockRedis", lock == LockBackend::Redis)
            .with_flag("lockPostgres", lock == LockBackend::Postgres)
            .with_flag("lockMysql", lock == LockBackend::Mysql)
            .with_flag("docker", config.has_feature(Feature::Docker))
            .with_flag("cors", config.has_feature(Feature::Cors))
            .with_flag("rateLimit", config.has_feature(Feature::RateLimit))
            .with_flag("requestLogging", config.has_feature(Feature::RequestLogging))
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    pub fn with_flag(mut self, name: impl Into<String>, enabled: bool) -> Self {
        self.flags.insert(name.into(), enabled);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }

    /// Unknown flags are off.
    pub fn flag(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    /// Render sections, then substitute variables.
    ///
    /// - `{{#flag}}…{{/flag}}` keeps its body when the flag is on
    /// - `{{^flag}}…{{/flag}}` keeps its body when the flag is off
    /// - a line holding nothing but a section tag is removed entirely
    /// - `{{UNKNOWN}}` and unterminated sections stay as literal text
    pub fn render(&self, template: &str) -> String {
        let collapsed = collapse_standalone_tags(template);
        let sectioned = self.render_sections(&collapsed);
        self.substitute(&sectioned)
    }

    fn render_sections(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some((at, tag)) = next_open_tag(rest) {
            out.push_str(&rest[..at]);
            let after = &rest[at + tag.len..];

            match find_close(after, tag.name) {
                Some((body_end, close_len)) => {
                    let enabled = self.flag(tag.name);
                    let keep = if tag.kind == TagKind::Inverted {
                        !enabled
                    } else {
                        enabled
                    };
                    if keep {
                        out.push_str(&self.render_sections(&after[..body_end]));
                    }
                    rest = &after[body_end + close_len..];
                }
                None => {
                    out.push_str(&rest[at..at + tag.len]);
                    rest = after;
                }
            }
        }

        out.push_str(rest);
        out
    }

    fn substitute(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let candidate = &rest[start..];
            match parse_tag(candidate) {
                Some(tag) if tag.kind == TagKind::Variable => {
                    match self.get(tag.name) {
                        Some(value) => out.push_str(value),
                        None => out.push_str(&candidate[..tag.len]),
                    }
                    rest = &candidate[tag.len..];
                }
                _ => {
                    out.push_str("{{");
                    rest = &candidate[2..];
                }
            }
        }

        out.push_str(rest);
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKind {
    Open,
    Inverted,
    Close,
    Variable,
}

#[derive(Debug, Clone, Copy)]
struct Tag<'a> {
    kind: TagKind,
    name: &'a str,
    /// Length of the whole tag including braces.
    len: usize,
}

/// Parse a tag at the start of `s` (which begins with `{{`).
fn parse_tag(s: &str) -> Option<Tag<'_>> {
    let inner_start = 2;
    let end = s[inner_start..].find("}}")? + inner_start;
    let inner = &s[inner_start..end];

    let (kind, name) = match inner.chars().next()? {
        '#' => (TagKind::Open, &inner[1..]),
        '^' => (TagKind::Inverted, &inner[1..]),
        '/' => (TagKind::Close, &inner[1..]),
        _ => (TagKind::Variable, inner),
    };

    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    valid.then_some(Tag {
        kind,
        name,
        len: end + 2,
    })
}

fn next_open_tag(text: &str) -> Option<(usize, Tag<'_>)> {
    let mut offset = 0;
    while let Some(found) = text[offset..].find("{{") {
        let at = offset + found;
        if let Some(tag) = parse_tag(&text[at..])
            && matches!(tag.kind, TagKind::Open | TagKind::Inverted)
        {
            return Some((at, tag));
        }
        offset = at + 2;
    }
    None
}

/// Locate the `{{/name}}` closing the section whose body starts `text`.
/// Returns the body length and the closing tag length.
fn find_close(text: &str, name: &str) -> Option<(usize, usize)> {
    let mut depth = 0usize;
    let mut offset = 0;
    while let Some(found) = text[offset..].find("{{") {
        let at = offset + found;
        match parse_tag(&text[at..]) {
            Some(tag) if tag.name == name => match tag.kind {
                TagKind::Open | TagKind::Inverted => depth += 1,
                TagKind::Close if depth == 0 => return Some((at, tag.len)),
                TagKind::Close => depth -= 1,
                TagKind::Variable => {}
            },
            _ => {}
        }
        offset = at + 2;
    }
    None
}

/// Lines consisting of a single section tag lose their indentation and
/// newline so sections do not leave blank lines behind.
fn collapse_standalone_tags(template: &str) -> String {
    let mut out = String::with_capacity(template.len());
    for line in template.split_inclusive('\n') {
        let trimmed = line.trim();
        let standalone = trimmed.starts_with("{{")
            && parse_tag(trimmed).is_some_and(|tag| {
                tag.kind != TagKind::Variable && tag.len == trimmed.len()
            });
        if standalone {
            out.push_str(trimmed);
        } else {
            out.push_str(line);
        }
    }
    out
}

// ── Template source ───────────────────────────────────────────────────────────

/// Template text, either compiled into the binary or loaded at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Static(&'static str),
    Owned(String),
}

impl TemplateSource {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Static(s) => s,
            Self::Owned(s) => s,
        }
    }
}

impl From<&'static str> for TemplateSource {
    fn from(s: &'static str) -> Self {
        Self::Static(s)
    }
}

impl From<String> for TemplateSource {
    fn from(s: String) -> Self {
        Self::Owned(s)
    }
}

// ── Template file ─────────────────────────────────────────────────────────────

/// One file a project may contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    /// Relative output path; may use variables such as `{{EXT}}`.
    pub path: String,
    pub body: TemplateSource,
    pub when: Inclusion,
    pub executable: bool,
}

impl TemplateFile {
    pub fn new(path: impl Into<String>, body: impl Into<TemplateSource>) -> Self {
        Self {
            path: path.into(),
            body: body.into(),
            when: Inclusion::Always,
            executable: false,
        }
    }

    pub fn when(mut self, when: Inclusion) -> Self {
        self.when = when;
        self
    }

    pub fn executable(mut self) -> Self {
        self.executable = true;
        self
    }

    pub fn applies_to(&self, config: &ProjectConfig) -> bool {
        self.when.matches(config)
    }
}

// ── Inclusion ─────────────────────────────────────────────────────────────────

/// Predicate deciding whether a template file belongs in a project.
///
/// Textual form (used by template overlays):
///
/// | Rule | Meaning |
/// |------|---------|
/// | `always` | every project |
/// | `database`, `auth`, `queue`, `lock` | any backend of that kind |
/// | `framework:hono`, `language:ts` | exact framework / language |
/// | `database:postgres`, `auth:jwt`, `queue:bullmq`, `lock:redis` | exact backend |
/// | `feature:docker` | feature enabled |
/// | `a,b` | both rules hold |
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Inclusion {
    #[default]
    Always,
    Framework(Framework),
    Language(Language),
    AnyDatabase,
    Database(Database),
    AnyAuth,
    Auth(AuthStrategy),
    AnyQueue,
    Queue(Queue),
    AnyLock,
    Lock(LockBackend),
    Feature(Feature),
    AllOf(Vec<Inclusion>),
}

impl Inclusion {
    pub fn matches(&self, config: &ProjectConfig) -> bool {
        match self {
            Self::Always => true,
            Self::Framework(f) => config.framework() == *f,
            Self::Language(l) => config.language() == *l,
            Self::AnyDatabase => config.database().is_some(),
            Self::Database(d) => config.database() == *d,
            Self::AnyAuth => config.auth().is_some(),
            Self::Auth(a) => config.auth() == *a,
            Self::AnyQueue => config.queue().is_some(),
            Self::Queue(q) => config.queue() == *q,
            Self::AnyLock => config.lock().is_some(),
            Self::Lock(l) => config.lock() == *l,
            Self::Feature(f) => config.has_feature(*f),
            Self::AllOf(rules) => rules.iter().all(|r| r.matches(config)),
        }
    }
}

impl FromStr for Inclusion {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).filter(|p| !p.is_empty()).collect();
        match parts.as_slice() {
            [] => Err(DomainError::InvalidInclusion {
                rule: s.to_string(),
                reason: "rule is empty".into(),
            }),
            [single] => parse_single(single),
            many => Ok(Self::AllOf(
                many.iter().map(|p| parse_single(p)).collect::<Result<_, _>>()?,
            )),
        }
    }
}

fn parse_single(rule: &str) -> Result<Inclusion, DomainError> {
    let invalid = |reason: String| DomainError::InvalidInclusion {
        rule: rule.to_string(),
        reason,
    };
    // Unknown option values surface as inclusion errors naming the rule.
    let option = |e: DomainError| invalid(e.to_string());

    let Some((kind, value)) = rule.split_once(':') else {
        return match rule.to_ascii_lowercase().as_str() {
            "always" => Ok(Inclusion::Always),
            "database" | "db" => Ok(Inclusion::AnyDatabase),
            "auth" => Ok(Inclusion::AnyAuth),
            "queue" => Ok(Inclusion::AnyQueue),
            "lock" => Ok(Inclusion::AnyLock),
            other => Err(invalid(format!("unknown rule '{other}'"))),
        };
    };

    let value = value.trim();
    match kind.trim().to_ascii_lowercase().as_str() {
        "framework" => value.parse().map(Inclusion::Framework).map_err(option),
        "language" | "lang" => value.parse().map(Inclusion::Language).map_err(option),
        "database" | "db" => value.parse().map(Inclusion::Database).map_err(option),
        "auth" => value.parse().map(Inclusion::Auth).map_err(option),
        "queue" => value.parse().map(Inclusion::Queue).map_err(option),
        "lock" => value.parse().map(Inclusion::Lock).map_err(option),
        "feature" => value.parse().map(Inclusion::Feature).map_err(option),
        other => Err(invalid(format!("unknown rule kind '{other}'"))),
    }
}

impl fmt::Display for Inclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => f.write_str("always"),
            Self::Framework(v) => write!(f, "framework:{v}"),
            Self::Language(v) => write!(f, "language:{v}"),
            Self::AnyDatabase => f.write_str("database"),
            Self::Database(v) => write!(f, "database:{v}"),
            Self::AnyAuth => f.write_str("auth"),
            Self::Auth(v) => write!(f, "auth:{v}"),
            Self::AnyQueue => f.write_str("queue"),
            Self::Queue(v) => write!(f, "queue:{v}"),
            Self::AnyLock => f.write_str("lock"),
            Self::Lock(v) => write!(f, "lock:{v}"),
            Self::Feature(v) => write!(f, "feature:{v}"),
            Self::AllOf(rules) => {
                let parts: Vec<String> = rules.iter().map(ToString::to_string).collect();
                f.write_str(&parts.join(","))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RenderContext {
        RenderContext::new("orders-api")
            .with_flag("on", true)
            .with_flag("off", false)
    }

    #[test]
    fn derives_name_variants() {
        let ctx = RenderContext::new("orders-api");
        assert_eq!(ctx.get("PROJECT_NAME_SNAKE"), Some("orders_api"));
        assert_eq!(ctx.get("PROJECT_NAME_PASCAL"), Some("OrdersApi"));
        assert_eq!(ctx.get("PROJECT_NAME_CAMEL"), Some("ordersApi"));
        assert_eq!(ctx.get("YEAR").map(str::len), Some(4));
    }

    #[test]
    fn unknown_variables_are_left_alone() {
        assert_eq!(
            ctx().render("{{PROJECT_NAME}} {{NOPE}} {{ not a tag }}"),
            "orders-api {{NOPE}} {{ not a tag }}"
        );
    }

    #[test]
    fn substituted_values_are_not_rendered_again() {
        let ctx = RenderContext::new("x").with_variable("A", "{{PROJECT_NAME}}");
        assert_eq!(ctx.render("{{A}}"), "{{PROJECT_NAME}}");
    }

    #[test]
    fn sections_follow_flags() {
        assert_eq!(ctx().render("a{{#on}}b{{/on}}c"), "abc");
        assert_eq!(ctx().render("a{{#off}}b{{/off}}c"), "ac");
        assert_eq!(ctx().render("a{{^off}}b{{/off}}c"), "abc");
        assert_eq!(ctx().render("a{{#missing}}b{{/missing}}c"), "ac");
    }

    #[test]
    fn nested_sections_of_the_same_flag() {
        let tpl = "{{#on}}1{{#on}}2{{/on}}3{{/on}}4";
        assert_eq!(ctx().render(tpl), "1234");
        let tpl = "{{#off}}1{{#off}}2{{/off}}3{{/off}}4";
        assert_eq!(ctx().render(tpl), "4");
    }

    #[test]
    fn standalone_tag_lines_leave_no_blank_lines() {
        let tpl = "import a;\n{{#off}}\nimport b;\n{{/off}}\n  {{#on}}\nimport c;\n  {{/on}}\nrest\n";
        assert_eq!(ctx().render(tpl), "import a;\nimport c;\nrest\n");
    }

    #[test]
    fn unterminated_section_is_literal() {
        assert_eq!(ctx().render("a{{#on}}b"), "a{{#on}}b");
    }

    #[test]
    fn project_flags() {
        let config = ProjectConfig::builder()
            .name("svc")
            .framework(Framework::Hono)
            .auth(AuthStrategy::Jwt)
            .build()
            .unwrap();
        let ctx = RenderContext::for_project(&config);
        assert!(ctx.flag("hono"));
        assert!(ctx.flag("auth"));
        assert!(ctx.flag("jwt"));
        assert!(!ctx.flag("database"));
        assert!(ctx.flag("cors"));
        assert_eq!(ctx.get("EXT"), Some("ts"));
        assert_eq!(ctx.render("src/app.{{EXT}}"), "src/app.ts");
    }

    #[test]
    fn inclusion_rules_parse_and_match() {
        let config = ProjectConfig::builder()
            .name("svc")
            .database(Database::Postgres)
            .feature(Feature::Docker)
            .build()
            .unwrap();

        let rule: Inclusion = "database".parse().unwrap();
        assert!(rule.matches(&config));
        let rule: Inclusion = "database:mysql".parse().unwrap();
        assert!(!rule.matches(&config));
        let rule: Inclusion = "feature:docker, language:ts".parse().unwrap();
        assert!(matches!(rule, Inclusion::AllOf(ref r) if r.len() == 2));
        assert!(rule.matches(&config));
        assert_eq!(rule.to_string(), "feature:docker,language:typescript");
        assert!(!"auth".parse::<Inclusion>().unwrap().matches(&config));
    }

    #[test]
    fn inclusion_rejects_unknown_rules() {
        assert!(matches!(
            "planet:mars".parse::<Inclusion>(),
            Err(DomainError::InvalidInclusion { .. })
        ));
        assert!(matches!(
            "database:oracle".parse::<Inclusion>(),
            Err(DomainError::InvalidInclusion { .. })
        ));
        assert!("".parse::<Inclusion>().is_err());
    }
}
