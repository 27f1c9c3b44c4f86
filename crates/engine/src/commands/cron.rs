//! Cron schedules bound to tests.

use indexmap::IndexMap;
use taas_types::{CronJob, NewCronJob, RunFilter};
use taas_util::Row;

use crate::{CommandContext, CommandError};

fn cron_pairs(job: &CronJob) -> Vec<(String, String)> {
    [
        ("id", job.id.clone()),
        ("job", job.test_name()),
        ("cronspec", job.cs.clone()),
        ("command", job.command.clone()),
        ("disabled", job.disabled.to_string()),
        ("prev", job.prev.clone()),
        ("next", job.next.clone()),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value))
    .collect()
}

pub async fn jobs(ctx: &CommandContext) -> Result<(), CommandError> {
    let jobs = ctx.api.cron_jobs().await?;
    if jobs.is_empty() {
        ctx.terminal.error("No cronjobs found");
        return Ok(());
    }
    let rows: Vec<Row> = jobs
        .iter()
        .map(|job| cron_pairs(job).into_iter().collect::<IndexMap<_, _>>())
        .collect();
    ctx.terminal.table(&rows);
    Ok(())
}

pub async fn info(ctx: &CommandContext, id: &str) -> Result<(), CommandError> {
    let job = ctx.api.cron_job(id).await?;
    ctx.terminal.pairs(&cron_pairs(&job));
    Ok(())
}

/// Schedule the test `id` with `cronspec`, optionally overriding its command.
pub async fn create(ctx: &CommandContext, id: &str, cronspec: &str, command: Option<&str>) -> Result<(), CommandError> {
    let test = ctx.api.get_test(id).await?;
    let cron_job = NewCronJob {
        job: test.job,
        jobspace: test.jobspace,
        cs: cronspec.to_string(),
        command: command.filter(|command| !command.is_empty()).map(str::to_string),
    };
    let response = ctx.api.create_cron_job(&cron_job).await?;
    ctx.terminal.vtable(&response);
    Ok(())
}

pub async fn destroy(ctx: &CommandContext, id: &str) -> Result<(), CommandError> {
    let response = ctx.api.destroy_cron_job(id).await?;
    ctx.terminal.vtable(&response);
    Ok(())
}

pub async fn set_enabled(ctx: &CommandContext, id: &str, enabled: bool) -> Result<(), CommandError> {
    let response = ctx.api.set_cron_job_disabled(id, !enabled).await?;
    ctx.terminal.vtable(&response);
    Ok(())
}

/// Runs of a cron job; failed and timed out runs link to their logs and artifacts.
pub async fn runs(ctx: &CommandContext, id: &str, limit: Option<u32>, filter: Option<RunFilter>) -> Result<(), CommandError> {
    let runs = ctx.api.cron_job_runs(id, limit, filter).await?;
    if runs.is_empty() {
        ctx.terminal.error("No cronjob runs found");
        return Ok(());
    }
    let rows: Vec<Row> = runs
        .iter()
        .map(|run| {
            let links = if run.needs_attention() {
                format!(
                    "Logs: {}\nArtifacts: {}",
                    ctx.api.logs_url(&run.runid),
                    ctx.api.artifacts_url(&run.runid)
                )
            } else {
                String::new()
            };
            IndexMap::from([
                ("start".to_string(), run.starttime.clone()),
                ("end".to_string(), run.endtime.clone()),
                ("result".to_string(), run.overallstatus.clone()),
                ("links".to_string(), links),
            ])
        })
        .collect();
    ctx.terminal.table(&rows);
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use taas_api::Method;

    use super::*;
    use crate::testing::{FakeTransport, harness};

    #[tokio::test]
    async fn create_binds_test_job_and_jobspace() {
        let harness = harness(
            FakeTransport::new()
                .on(Method::GET, "/v1/diagnostic/ui-tests-taas", json!({"job": "ui-tests", "jobspace": "taas"}))
                .on(Method::POST, "/v1/cronjob", json!({"id": "c1"})),
        );
        create(&harness.context, "ui-tests-taas", "0 * * * *", None).await.expect("create");
        assert_eq!(
            harness.transport.bodies(Method::POST, "/v1/cronjob"),
            vec![json!({"job": "ui-tests", "jobspace": "taas", "cs": "0 * * * *"})]
        );
    }

    #[tokio::test]
    async fn enable_and_disable_patch_the_flag() {
        let harness = harness(FakeTransport::new().on(Method::PATCH, "/v1/cronjob/c1", json!({})));
        set_enabled(&harness.context, "c1", false).await.expect("disable");
        set_enabled(&harness.context, "c1", true).await.expect("enable");
        assert_eq!(
            harness.transport.bodies(Method::PATCH, "/v1/cronjob/c1"),
            vec![json!({"disabled": true}), json!({"disabled": false})]
        );
    }

    #[tokio::test]
    async fn runs_pass_limit_and_filter() {
        let harness = harness(FakeTransport::new().on(
            Method::GET,
            "/v1/cronjob/c1/runs",
            json!([
                {"runid": "r1", "starttime": "s", "endtime": "e", "overallstatus": "timedout"},
                {"runid": "r2", "starttime": "s", "endtime": "e", "overallstatus": "success"}
            ]),
        ));
        runs(&harness.context, "c1", Some(5), Some(RunFilter::Failed)).await.expect("runs");
        assert_eq!(
            harness.transport.requests()[0].query,
            vec![("runs".to_string(), "5".to_string()), ("filter".to_string(), "failed".to_string())]
        );
        let table = &harness.terminal.tables()[0];
        assert_eq!(
            table[0]["links"],
            "Logs: https://taas.example.com/v1/diagnostic/logs/r1\nArtifacts: https://taas.example.com/v1/artifacts/r1/"
        );
        assert_eq!(table[1]["links"], "");
    }

    #[tokio::test]
    async fn empty_collections_are_reported() {
        let harness = harness(
            FakeTransport::new()
                .on(Method::GET, "/v1/cronjobs", json!(null))
                .on(Method::GET, "/v1/cronjob/c1/runs", json!([])),
        );
        jobs(&harness.context).await.expect("jobs");
        runs(&harness.context, "c1", None, None).await.expect("runs");
        assert_eq!(harness.terminal.errors(), vec!["No cronjobs found", "No cronjob runs found"]);
        assert!(harness.transport.requests()[1].query.is_empty());
    }

    #[tokio::test]
    async fn jobs_show_composite_test_name() {
        let harness = harness(FakeTransport::new().on(
            Method::GET,
            "/v1/cronjobs",
            json!([{"id": "c1", "job": "ui-tests", "jobspace": "taas", "cs": "@hourly", "command": null}]),
        ));
        jobs(&harness.context).await.expect("jobs");
        let table = &harness.terminal.tables()[0];
        assert_eq!(table[0]["job"], "ui-tests-taas");
        assert_eq!(table[0]["command"], "");
    }
}
