//! `backforge new`: generate a project.
//!
//! Sequence:
//! 1. Resolve the project name and output path
//! 2. Merge flags over config defaults into a `ProjectConfig`
//! 3. `--dry-run`: list the files and stop
//! 4. Refuse an existing directory unless `--force`
//! 5. Show the configuration and confirm, unless `--yes` or `--quiet`
//! 6. Scaffold and print next steps

use std::io::IsTerminal as _;
use std::path::{Path, PathBuf};

use serde_json::json;
use tracing::{debug, info, instrument};

use backforge_adapters::{LocalFilesystem, SimpleRenderer};
use backforge_core::{
    application::{ScaffoldService, WriteMode},
    domain::{Feature, Language, ProjectConfig},
};

use crate::{
    cli::NewArgs,
    commands::template_catalog,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[instrument(skip_all, fields(project = %args.name))]
pub fn execute(args: NewArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let (project_name, project_path) = resolve_project_path(&args.name)?;
    let project = build_config(&project_name, &args, &config)?;
    debug!(%project, features = ?project.features(), "project configuration resolved");

    let service = ScaffoldService::new(
        template_catalog(&config),
        Box::new(SimpleRenderer::new()),
        Box::new(LocalFilesystem::new()),
    );

    if args.dry_run {
        return dry_run(&service, &project, &project_path, &output);
    }

    let exists = project_path.exists();
    if exists && !args.force {
        return Err(CliError::ProjectExists { path: project_path });
    }

    if !output.is_quiet() && !args.yes && !output.is_json() {
        show_configuration(&project, &project_path, &output)?;
    }
    if exists {
        output.warning(&format!(
            "{} exists and will be deleted",
            project_path.display()
        ))?;
        if !args.yes && !confirm("Overwrite the existing directory?", false)? {
            return Err(CliError::Cancelled);
        }
    } else if !output.is_quiet() && !args.yes && !output.is_json() && !confirm("Continue?", true)? {
        return Err(CliError::Cancelled);
    }

    let mode = if exists {
        WriteMode::Overwrite
    } else {
        WriteMode::CreateNew
    };

    output.header(&format!("Creating '{project_name}'..."))?;
    let report = service.scaffold(&project, &project_path, mode)?;
    info!(files = report.files.len(), bytes = report.bytes, "scaffold completed");

    output.json(&json!({
        "project": project.name(),
        "path": report.root,
        "framework": project.framework().as_str(),
        "language": project.language().as_str(),
        "files": &report.files,
        "middlewares": &report.middlewares,
        "routes": report.routes,
    }))?;

    output.success(&format!(
        "Project '{project_name}' created: {} files, {} routes",
        report.files.len(),
        report.routes
    ))?;
    output.print(&format!(
        "  middleware: {}",
        report.middlewares.join(", ")
    ))?;
    print_next_steps(&project, &project_path, &output)?;
    Ok(())
}

// ── Path resolution ───────────────────────────────────────────────────────────

/// `shop-api` → (`shop-api`, `./shop-api`); `../apps/shop-api` → (`shop-api`, `../apps/shop-api`).
pub fn resolve_project_path(name: &str) -> CliResult<(String, PathBuf)> {
    let path = Path::new(name);

    let project_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| CliError::InvalidInput {
            message: format!("cannot take a project name from '{name}'"),
            source: None,
        })?
        .to_string();

    Ok((project_name, path.to_path_buf()))
}

// ── Configuration ─────────────────────────────────────────────────────────────

/// Flags win over config defaults. Default features come from the config
/// unless `--no-default-features` is given; `--feature` always adds.
fn build_config(name: &str, args: &NewArgs, config: &AppConfig) -> CliResult<ProjectConfig> {
    let defaults = &config.defaults;

    let base_features: Vec<Feature> = if args.no_default_features {
        Vec::new()
    } else {
        defaults.features()?
    };

    let project = ProjectConfig::builder()
        .name(name)
        .framework(args.framework.map_or_else(|| defaults.framework(), |f| Ok(f.into()))?)
        .language(args.language.map_or_else(|| defaults.language(), |l| Ok(l.into()))?)
        .database(args.database.map_or_else(|| defaults.database(), |d| Ok(d.into()))?)
        .auth(args.auth.map_or_else(|| defaults.auth(), |a| Ok(a.into()))?)
        .queue(args.queue.map_or_else(|| defaults.queue(), |q| Ok(q.into()))?)
        .lock(args.lock.map_or_else(|| defaults.lock(), |l| Ok(l.into()))?)
        .without_default_features()
        .features(base_features)
        .features(args.features.iter().copied().map(Feature::from))
        .build()
        .map_err(|e| CliError::Core(e.into()))?;
    Ok(project)
}

// ── Dry run ───────────────────────────────────────────────────────────────────

fn dry_run(
    service: &ScaffoldService,
    project: &ProjectConfig,
    project_path: &Path,
    output: &OutputManager,
) -> CliResult<()> {
    let structure = service.plan(project, project_path)?;
    let files: Vec<String> = structure.files().map(|f| f.path.to_string()).collect();

    output.json(&json!({
        "dry_run": true,
        "project": project.name(),
        "path": project_path,
        "files": &files,
        "bytes": structure.total_bytes(),
    }))?;

    output.info(&format!(
        "Dry run: would create '{}' at {}",
        project.name(),
        project_path.display()
    ))?;
    output.print(&format!("  {project}"))?;
    for file in &files {
        output.print(&format!("  + {file}"))?;
    }
    output.print(&format!(
        "  {} files, {} bytes",
        files.len(),
        structure.total_bytes()
    ))?;
    Ok(())
}

// ── UI helpers ────────────────────────────────────────────────────────────────

fn show_configuration(
    project: &ProjectConfig,
    project_path: &Path,
    out: &OutputManager,
) -> CliResult<()> {
    let features: Vec<&str> = project.features().iter().map(|f| f.as_str()).collect();

    out.header("Configuration")?;
    out.print(&format!("  Project:    {}", project.name()))?;
    out.print(&format!("  Framework:  {}", project.framework()))?;
    out.print(&format!("  Language:   {}", project.language()))?;
    out.print(&format!("  Database:   {}", project.database()))?;
    out.print(&format!("  Auth:       {}", project.auth()))?;
    out.print(&format!("  Queue:      {}", project.queue()))?;
    out.print(&format!("  Lock:       {}", project.lock()))?;
    out.print(&format!(
        "  Features:   {}",
        if features.is_empty() {
            "none".to_string()
        } else {
            features.join(", ")
        }
    ))?;
    out.print(&format!("  Location:   {}", project_path.display()))?;
    out.print("")?;
    Ok(())
}

fn print_next_steps(project: &ProjectConfig, path: &Path, out: &OutputManager) -> CliResult<()> {
    out.print("")?;
    out.print("Next steps:")?;
    out.print(&format!("  cd {}", path.display()))?;
    out.print("  npm install")?;
    out.print("  cp .env.example .env")?;
    out.print("  npm run dev")?;
    if project.language() == Language::TypeScript {
        out.print("")?;
        out.print("Routes live in src/routes/routes.json; run 'backforge routes' to see their chains.")?;
    }
    Ok(())
}

/// Prompts only on a terminal; piped stdin takes `default`.
fn confirm(prompt: &str, default: bool) -> CliResult<bool> {
    if !std::io::stdin().is_terminal() {
        debug!(prompt, default, "stdin is not a terminal, skipping prompt");
        return if default {
            Ok(true)
        } else {
            Err(CliError::InvalidInput {
                message: "refusing to overwrite without confirmation; pass --yes".into(),
                source: None,
            })
        };
    }
    prompt_user(prompt, default)
}

#[cfg(feature = "interactive")]
fn prompt_user(prompt: &str, default: bool) -> CliResult<bool> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(|e| CliError::IoError {
            message: "failed to read confirmation".into(),
            source: std::io::Error::other(e),
        })
}

#[cfg(not(feature = "interactive"))]
fn prompt_user(_prompt: &str, _default: bool) -> CliResult<bool> {
    Err(CliError::FeatureNotAvailable {
        feature: "interactive",
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use clap::Parser;

    use backforge_core::domain::{AuthStrategy, Database, Framework};

    use super::*;
    use crate::cli::{Cli, Commands};

    fn new_args(argv: &[&str]) -> NewArgs {
        let cli = Cli::parse_from(["backforge", "new"].iter().chain(argv));
        match cli.command {
            Commands::New(args) => args,
            other => panic!("expected New, got {other:?}"),
        }
    }

    #[test]
    fn simple_name_resolves_to_relative_dir() {
        let (name, dir) = resolve_project_path("my-app").unwrap();
        assert_eq!(name, "my-app");
        assert_eq!(dir, PathBuf::from("my-app"));
    }

    #[test]
    fn nested_path_keeps_its_parent() {
        let sep = std::path::MAIN_SEPARATOR;
        let (name, dir) = resolve_project_path(&format!("..{sep}apps{sep}shop-api")).unwrap();
        assert_eq!(name, "shop-api");
        assert_eq!(dir, PathBuf::from("..").join("apps").join("shop-api"));
    }

    #[test]
    fn parent_only_path_is_rejected() {
        assert!(matches!(
            resolve_project_path(".."),
            Err(CliError::InvalidInput { .. })
        ));
    }

    #[test]
    fn flags_override_config_defaults() {
        let mut config = AppConfig::default();
        config.defaults.framework = "hono".into();
        config.defaults.database = "mongodb".into();

        let args = new_args(&["api", "--db", "postgres", "--auth", "jwt"]);
        let project = build_config("api", &args, &config).unwrap();

        assert_eq!(project.framework(), Framework::Hono);
        assert_eq!(project.database(), Database::Postgres);
        assert_eq!(project.auth(), AuthStrategy::Jwt);
        assert!(project.has_feature(Feature::Cors));
    }

    #[test]
    fn no_default_features_keeps_only_explicit_ones() {
        let args = new_args(&["api", "--no-default-features", "--feature", "docker"]);
        let project = build_config("api", &args, &AppConfig::default()).unwrap();
        assert_eq!(project.features().iter().copied().collect::<Vec<_>>(), [Feature::Docker]);
    }

    #[test]
    fn config_features_replace_core_defaults() {
        let mut config = AppConfig::default();
        config.defaults.features = vec!["rate-limit".into()];
        let project = build_config("api", &new_args(&["api"]), &config).unwrap();

        assert!(project.has_feature(Feature::RateLimit));
        assert!(!project.has_feature(Feature::Cors));
    }

    #[test]
    fn incompatible_options_are_core_errors() {
        let args = new_args(&["api", "--framework", "hono", "--auth", "session"]);
        let err = build_config("api", &args, &AppConfig::default()).unwrap_err();
        assert!(matches!(err, CliError::Core(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn bad_config_default_is_a_config_error() {
        let mut config = AppConfig::default();
        config.defaults.queue = "kafka".into();
        let err = build_config("api", &new_args(&["api"]), &config).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }
}
