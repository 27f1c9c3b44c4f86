//! Commands over individual runs.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use taas_types::{CurrentRun, RunDocument};
use taas_util::{Row, format_time_of_day};

use crate::{CommandContext, CommandError};

static UUID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("uuid regex should compile")
});

const INVALID_RUN_ID: &str = "!!Invalid run ID!!";

pub fn is_uuid(value: &str) -> bool {
    UUID.is_match(value)
}

/// Fetch a run document, reporting unknown ids. `None` means reported.
async fn valid_run(ctx: &CommandContext, run_id: &str) -> Result<Option<RunDocument>, CommandError> {
    let run = ctx.api.run_info(run_id).await?;
    if run.is_valid() {
        Ok(Some(run))
    } else {
        ctx.terminal.error(INVALID_RUN_ID);
        Ok(None)
    }
}

pub async fn info(ctx: &CommandContext, run_id: &str) -> Result<(), CommandError> {
    if let Some(run) = valid_run(ctx, run_id).await? {
        ctx.terminal.vtable(&Value::Object(run.without_logs()));
    }
    Ok(())
}

/// Print the log lines of a run.
///
/// `id` is either a run id or a test name, in which case the test's latest run
/// is used.
pub async fn output(ctx: &CommandContext, id: &str) -> Result<(), CommandError> {
    let run_id = if is_uuid(id) {
        id.to_string()
    } else {
        let test = ctx.api.get_test(id).await?;
        ctx.api
            .test_runs(&test)
            .await?
            .runs
            .and_then(|runs| runs.last().map(|run| run.id.clone()))
            .ok_or_else(|| CommandError::message(format!("No runs found for ***{id}***")))?
    };
    for line in ctx.api.log_lines(&run_id).await? {
        ctx.terminal.raw(&line);
    }
    Ok(())
}

pub async fn rerun(ctx: &CommandContext, run_id: &str) -> Result<(), CommandError> {
    if let Some(run) = valid_run(ctx, run_id).await? {
        ctx.api.rerun(&run).await?;
        ctx.terminal.print("^^ rerun initiated ^^");
    }
    Ok(())
}

pub async fn artifacts(ctx: &CommandContext, run_id: &str) -> Result<(), CommandError> {
    if valid_run(ctx, run_id).await?.is_some() {
        ctx.terminal
            .print(&format!("\n~~Artifacts:~~ {}", ctx.api.artifacts_url(run_id)));
        if cfg!(target_os = "macos") {
            ctx.terminal.print("###CMD + Click to open###");
        }
    }
    Ok(())
}

fn current_run_row(run: &CurrentRun) -> Row {
    let marker = if run.is_starting() { "~~●~~" } else { "^^●^^" };
    IndexMap::from([
        ("status".to_string(), format!("{marker} {}", run.overallstatus)),
        ("id".to_string(), run.runid.clone()),
        ("app".to_string(), format!("{}-{}", run.app, run.space)),
        ("test".to_string(), format!("{}-{}", run.job, run.jobspace)),
        ("image".to_string(), run.image.clone()),
        ("started".to_string(), run.started_at().map(format_time_of_day).unwrap_or_default()),
        (
            "timeout".to_string(),
            run.timeout.map(|timeout| timeout.to_string()).unwrap_or_else(|| "cron".to_string()),
        ),
    ])
}

/// Release-triggered runs first, then cron runs.
pub async fn running(ctx: &CommandContext) -> Result<(), CommandError> {
    let current = ctx.api.current_runs().await?;
    let rows: Vec<Row> = current.all().map(current_run_row).collect();
    if rows.is_empty() {
        ctx.terminal.print("**No tests are currently running...**");
    } else {
        ctx.terminal.table(&rows);
    }
    Ok(())
}
