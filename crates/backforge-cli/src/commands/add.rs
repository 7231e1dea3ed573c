//! `backforge add`: generate a route, service or middleware inside an
//! existing project and wire it into the matching index file.

use serde_json::json;
use tracing::{info, instrument};

use backforge_adapters::{LocalFilesystem, SimpleRenderer};
use backforge_core::{
    application::ComponentService,
    domain::{ComponentKind, ComponentName, ComponentSpec},
};

use crate::{
    cli::AddArgs,
    commands::template_catalog,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[instrument(skip_all, fields(kind = ?args.kind, name = %args.name))]
pub fn execute(args: AddArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let spec = build_spec(&args)?;

    let service = ComponentService::new(
        template_catalog(&config),
        Box::new(SimpleRenderer::new()),
        Box::new(LocalFilesystem::new()),
    );
    let report = service.add(&args.project, &spec)?;
    info!(
        created = report.created.len(),
        modified = report.modified.len(),
        "component added"
    );

    output.json(&json!({
        "kind": spec.kind.as_str(),
        "name": spec.name.as_str(),
        "export": spec.export_name(),
        "created": &report.created,
        "modified": &report.modified,
        "routes": &report.routes_added,
    }))?;

    output.success(&format!("Added {} '{}'", spec.kind, spec.export_name()))?;
    for path in &report.created {
        output.print(&format!("  + {path}"))?;
    }
    for path in &report.modified {
        output.print(&format!("  ~ {path}"))?;
    }
    if !report.routes_added.is_empty() {
        output.print("")?;
        output.print("Routes:")?;
        for route in &report.routes_added {
            output.print(&format!("  {route}"))?;
        }
    }
    Ok(())
}

fn build_spec(args: &AddArgs) -> CliResult<ComponentSpec> {
    let kind = ComponentKind::from(args.kind);
    let name = ComponentName::parse(&args.name).map_err(|e| CliError::Core(e.into()))?;
    let spec = ComponentSpec::new(kind, name);

    match (&args.path, kind) {
        (None, _) => Ok(spec),
        (Some(path), ComponentKind::Route) => spec
            .with_base_path(path.as_str())
            .map_err(|e| CliError::Core(e.into())),
        (Some(_), other) => Err(CliError::InvalidInput {
            message: format!("--path only applies to routes, not to a {other}"),
            source: None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::{Cli, Commands};

    fn add_args(argv: &[&str]) -> AddArgs {
        let cli = Cli::parse_from(["backforge", "add"].iter().chain(argv));
        match cli.command {
            Commands::Add(args) => args,
            other => panic!("expected Add, got {other:?}"),
        }
    }

    #[test]
    fn route_defaults_to_kebab_path() {
        let spec = build_spec(&add_args(&["route", "orderItems"])).unwrap();
        assert_eq!(spec.base_path(), "/order-items");
        assert_eq!(spec.kind, ComponentKind::Route);
    }

    #[test]
    fn route_path_is_taken_from_flag() {
        let spec = build_spec(&add_args(&["route", "orders", "--path", "/shop/orders/"])).unwrap();
        assert_eq!(spec.base_path(), "/shop/orders");
    }

    #[test]
    fn relative_route_path_is_rejected() {
        let err = build_spec(&add_args(&["route", "orders", "--path", "orders"])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn path_on_a_service_is_rejected() {
        let err = build_spec(&add_args(&["service", "billing", "--path", "/billing"])).unwrap_err();
        assert!(matches!(err, CliError::InvalidInput { .. }));
    }

    #[test]
    fn invalid_component_name_is_rejected() {
        assert!(build_spec(&add_args(&["middleware", "9lives"])).is_err());
    }
}
