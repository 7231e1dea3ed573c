//! CLI argument definitions using the clap derive API.
//!
//! This module is the only place that knows about argument names, aliases,
//! help text and value enums. Value enums convert into their core
//! counterparts with `From`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use backforge_core::domain::{
    AuthStrategy, ComponentKind, Database, Feature, Framework, Language, LockBackend, Queue,
};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(
    name     = "backforge",
    bin_name = "backforge",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Node backend scaffolding with declarative routes",
    long_about = "backforge generates Express or Hono backends whose routes and \
                  middleware chains are declared in src/routes/routes.json, then \
                  keeps the project consistent as you add to it.",
    after_help = "EXAMPLES:\n\
        \x20 backforge new shop-api --db postgres --auth jwt\n\
        \x20 backforge add route orders --project shop-api\n\
        \x20 backforge validate shop-api\n\
        \x20 backforge completions bash > /usr/share/bash-completion/completions/backforge",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(
        visible_alias = "n",
        about = "Create a new project",
        after_help = "EXAMPLES:\n\
            \x20 backforge new shop-api\n\
            \x20 backforge new edge-api --framework hono --lang js --auth api-key\n\
            \x20 backforge new jobs --queue bullmq --lock redis --feature docker"
    )]
    New(NewArgs),

    #[command(
        about = "Add a route, service or middleware to a project",
        after_help = "EXAMPLES:\n\
            \x20 backforge add route orders\n\
            \x20 backforge add route order-items --path /orders/items\n\
            \x20 backforge add middleware audit-trail --project ../shop-api"
    )]
    Add(AddArgs),

    #[command(
        visible_alias = "check",
        about = "Check imports and the route table of a project"
    )]
    Validate(ProjectArgs),

    #[command(about = "Show the middleware chain of every route")]
    Routes(ProjectArgs),

    #[command(
        about = "Write a default configuration file",
        after_help = "EXAMPLES:\n\
            \x20 backforge init\n\
            \x20 backforge init --force"
    )]
    Init(InitArgs),

    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 backforge completions bash > ~/.local/share/bash-completion/completions/backforge\n\
            \x20 backforge completions zsh  > ~/.zfunc/_backforge\n\
            \x20 backforge completions fish > ~/.config/fish/completions/backforge.fish"
    )]
    Completions(CompletionsArgs),

    #[command(
        about = "Inspect the configuration",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 backforge config get defaults.framework\n\
            \x20 backforge config list\n\
            \x20 backforge config path"
    )]
    Config(ConfigCommands),
}

// ── new ───────────────────────────────────────────────────────────────────────

/// Arguments for `backforge new`. Options left out fall back to the
/// configuration file, then to built-in defaults.
#[derive(Debug, Args)]
pub struct NewArgs {
    /// A plain name creates `./name`; a path like `../foo` places the
    /// project there and names it `foo`.
    #[arg(value_name = "NAME", help = "Project name or path")]
    pub name: String,

    #[arg(short = 'f', long = "framework", value_enum, help = "HTTP framework")]
    pub framework: Option<FrameworkArg>,

    #[arg(short = 'l', long = "lang", value_enum, help = "Source language")]
    pub language: Option<LanguageArg>,

    #[arg(long = "db", value_enum, help = "Database client")]
    pub database: Option<DatabaseArg>,

    #[arg(long = "auth", value_enum, help = "Authentication strategy")]
    pub auth: Option<AuthArg>,

    #[arg(long = "queue", value_enum, help = "Job queue")]
    pub queue: Option<QueueArg>,

    #[arg(long = "lock", value_enum, help = "Distributed lock backend")]
    pub lock: Option<LockArg>,

    #[arg(
        long = "feature",
        value_enum,
        value_name = "FEATURE",
        help = "Enable an optional feature (repeatable)"
    )]
    pub features: Vec<FeatureArg>,

    #[arg(
        long = "no-default-features",
        help = "Start without the default features (cors, logging)"
    )]
    pub no_default_features: bool,

    #[arg(
        short = 'y',
        long = "yes",
        help = "Skip confirmation and create immediately"
    )]
    pub yes: bool,

    /// Destructive: the existing directory is deleted first.
    #[arg(long = "force", help = "Overwrite an existing directory")]
    pub force: bool,

    #[arg(long = "dry-run", help = "Show what would be created without writing")]
    pub dry_run: bool,
}

// ── add ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(value_enum, help = "What to add")]
    pub kind: ComponentKindArg,

    /// camelCase, kebab-case and snake_case are all accepted.
    #[arg(value_name = "NAME", help = "Component name")]
    pub name: String,

    #[arg(
        short = 'p',
        long = "project",
        value_name = "DIR",
        default_value = ".",
        help = "Project directory"
    )]
    pub project: PathBuf,

    /// Only meaningful for routes; defaults to `/<name>`.
    #[arg(long = "path", value_name = "URL", help = "Base URL path for a route")]
    pub path: Option<String>,
}

// ── validate / routes ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProjectArgs {
    #[arg(value_name = "DIR", default_value = ".", help = "Project directory")]
    pub dir: PathBuf,
}

// ── init ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct InitArgs {
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `defaults.framework`.
        key: String,
    },
    /// Print the effective configuration.
    List,
    /// Print the path of the default configuration file.
    Path,
}

// ── value enums ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FrameworkArg {
    Express,
    Hono,
}

impl From<FrameworkArg> for Framework {
    fn from(arg: FrameworkArg) -> Self {
        match arg {
            FrameworkArg::Express => Self::Express,
            FrameworkArg::Hono => Self::Hono,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LanguageArg {
    #[value(name = "ts", alias = "typescript")]
    TypeScript,
    #[value(name = "js", alias = "javascript")]
    JavaScript,
}

impl From<LanguageArg> for Language {
    fn from(arg: LanguageArg) -> Self {
        match arg {
            LanguageArg::TypeScript => Self::TypeScript,
            LanguageArg::JavaScript => Self::JavaScript,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DatabaseArg {
    None,
    #[value(alias = "pg")]
    Postgres,
    Mysql,
    #[value(alias = "mongo")]
    Mongodb,
    Sqlite,
}

impl From<DatabaseArg> for Database {
    fn from(arg: DatabaseArg) -> Self {
        match arg {
            DatabaseArg::None => Self::None,
            DatabaseArg::Postgres => Self::Postgres,
            DatabaseArg::Mysql => Self::Mysql,
            DatabaseArg::Mongodb => Self::Mongodb,
            DatabaseArg::Sqlite => Self::Sqlite,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AuthArg {
    None,
    Jwt,
    Session,
    ApiKey,
}

impl From<AuthArg> for AuthStrategy {
    fn from(arg: AuthArg) -> Self {
        match arg {
            AuthArg::None => Self::None,
            AuthArg::Jwt => Self::Jwt,
            AuthArg::Session => Self::Session,
            AuthArg::ApiKey => Self::ApiKey,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum QueueArg {
    None,
    Bullmq,
    Rabbitmq,
}

impl From<QueueArg> for Queue {
    fn from(arg: QueueArg) -> Self {
        match arg {
            QueueArg::None => Self::None,
            QueueArg::Bullmq => Self::BullMq,
            QueueArg::Rabbitmq => Self::RabbitMq,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LockArg {
    None,
    File,
    Redis,
    Postgres,
    Mysql,
}

impl From<LockArg> for LockBackend {
    fn from(arg: LockArg) -> Self {
        match arg {
            LockArg::None => Self::None,
            LockArg::File => Self::File,
            LockArg::Redis => Self::Redis,
            LockArg::Postgres => Self::Postgres,
            LockArg::Mysql => Self::Mysql,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FeatureArg {
    Docker,
    Cors,
    RateLimit,
    #[value(alias = "request-logging")]
    Logging,
}

impl From<FeatureArg> for Feature {
    fn from(arg: FeatureArg) -> Self {
        match arg {
            FeatureArg::Docker => Self::Docker,
            FeatureArg::Cors => Self::Cors,
            FeatureArg::RateLimit => Self::RateLimit,
            FeatureArg::Logging => Self::RequestLogging,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ComponentKindArg {
    #[value(alias = "controller")]
    Route,
    Service,
    Middleware,
}

impl From<ComponentKindArg> for ComponentKind {
    fn from(arg: ComponentKindArg) -> Self {
        match arg {
            ComponentKindArg::Route => Self::Route,
            ComponentKindArg::Service => Self::Service,
            ComponentKindArg::Middleware => Self::Middleware,
        }
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────
