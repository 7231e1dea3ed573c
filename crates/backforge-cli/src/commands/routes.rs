//! `backforge routes`: the computed middleware chain of every route.

use serde_json::json;
use tracing::instrument;

use backforge_adapters::LocalFilesystem;
use backforge_core::application::{PlannedRoute, RoutePlanService};

use crate::{cli::ProjectArgs, error::CliResult, output::OutputManager};

#[instrument(skip_all, fields(dir = %args.dir.display()))]
pub fn execute(args: ProjectArgs, output: OutputManager) -> CliResult<()> {
    let service = RoutePlanService::new(Box::new(LocalFilesystem::new()));
    let plans = service.plan(&args.dir)?;

    output.json(&json!(plans.iter().map(plan_json).collect::<Vec<_>>()))?;

    if plans.is_empty() {
        output.info("No routes declared")?;
        return Ok(());
    }
    for line in table(&plans) {
        output.data(&line)?;
    }
    for plan in plans.iter().filter(|p| p.ambiguous_roles) {
        output.warning(&format!(
            "{} {} declares roles and excludeRoles; only roles is applied",
            plan.method, plan.path
        ))?;
    }
    Ok(())
}

/// `METHOD  /path  controller.method  [chain]`, columns padded to the widest entry.
fn table(plans: &[PlannedRoute]) -> Vec<String> {
    let path_width = plans.iter().map(|p| p.path.len()).max().unwrap_or(0);
    let handler_width = plans
        .iter()
        .map(|p| p.handler.to_string().len())
        .max()
        .unwrap_or(0);

    plans
        .iter()
        .map(|p| {
            format!(
                "{:<7} {:<path_width$}  {:<handler_width$}  {}",
                p.method.to_string(),
                p.path,
                p.handler.to_string(),
                p.chain
            )
        })
        .collect()
}

fn plan_json(plan: &PlannedRoute) -> serde_json::Value {
    json!({
        "method": plan.method.to_string(),
        "path": plan.path,
        "handler": plan.handler.to_string(),
        "chain": plan.chain.labels(),
        "roles": plan.chain.roles,
        "ambiguousRoles": plan.ambiguous_roles,
    })
}
