//! `backforge validate`: check relative imports and the route table.

use serde_json::json;
use tracing::instrument;

use backforge_adapters::LocalFilesystem;
use backforge_core::application::{AuditReport, AuditService};

use crate::{
    cli::ProjectArgs,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Prints every problem, then fails with exit code 2 if there were any.
#[instrument(skip_all, fields(dir = %args.dir.display()))]
pub fn execute(args: ProjectArgs, output: OutputManager) -> CliResult<()> {
    let service = AuditService::new(Box::new(LocalFilesystem::new()));
    let report = service.audit(&args.dir)?;

    output.json(&report_json(&report))?;

    if report.is_clean() {
        output.success(&format!(
            "{} source files and {} routes checked, no problems found",
            report.files_scanned, report.routes
        ))?;
        return Ok(());
    }

    for issue in report.errors() {
        output.error(&issue)?;
    }
    Err(CliError::ValidationFailed {
        issues: report.issues.len(),
        path: args.dir,
    })
}

fn report_json(report: &AuditReport) -> serde_json::Value {
    json!({
        "clean": report.is_clean(),
        "files_scanned": report.files_scanned,
        "routes": report.routes,
        "issues": report.errors(),
    })
}
