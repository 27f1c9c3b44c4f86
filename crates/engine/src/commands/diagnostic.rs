//! Commands over registered tests.

use indexmap::IndexMap;
use taas_types::{ReleaseHookApp, ReleaseHookBuild, ReleaseHookEvent, ReleaseHookRelease, ReleaseHookSpace};
use taas_types::{EnvVar, TestDefinition, UpdatableProperty};
use taas_util::Row;
use tracing::debug;

use crate::{CommandContext, CommandError};

pub async fn list(ctx: &CommandContext) -> Result<(), CommandError> {
    let tests = {
        let _spinner = ctx.terminal.spinner("Fetching tests");
        ctx.api.list_tests().await?
    };
    if tests.is_empty() {
        ctx.terminal
            .error("No tests found. Register a test with ^^taas tests register^^");
        return Ok(());
    }
    let rows: Vec<Row> = tests
        .iter()
        .map(|test| {
            IndexMap::from([
                ("id".to_string(), test.id.clone()),
                ("test".to_string(), test.test_name()),
                ("app".to_string(), test.app_name()),
                ("action".to_string(), test.action.clone()),
                ("result".to_string(), test.result.clone()),
                ("preview".to_string(), test.ispreview.to_string()),
            ])
        })
        .collect();
    ctx.terminal.table(&rows);
    Ok(())
}

/// The image name and tag without its registry path.
fn image_name(image: &str) -> &str {
    image.rsplit('/').next().unwrap_or(image)
}

/// Tests grouped by image, one row per test.
pub async fn images(ctx: &CommandContext) -> Result<(), CommandError> {
    let mut tests = ctx.api.list_tests().await?;
    // Stable sort keeps the service order within each image.
    tests.sort_by(|a, b| image_name(&a.image).cmp(image_name(&b.image)));
    let rows: Vec<Row> = tests
        .iter()
        .map(|test| {
            IndexMap::from([
                ("image".to_string(), image_name(&test.image).to_string()),
                ("test".to_string(), test.test_name()),
                ("app".to_string(), test.app_name()),
                ("id".to_string(), test.id.clone()),
            ])
        })
        .collect();
    ctx.terminal.table(&rows);
    Ok(())
}

fn optional_number(value: Option<i64>) -> String {
    value.map(|number| number.to_string()).unwrap_or_default()
}

fn properties(test: &TestDefinition) -> Vec<(String, String)> {
    [
        ("id", test.id.clone()),
        ("test", test.test_name()),
        ("app", test.app_name()),
        ("testpreviews", test.testpreviews.to_string()),
        ("action", test.action.clone()),
        ("result", test.result.clone()),
        ("image", test.image.clone()),
        ("pipelinename", test.pipelinename.clone()),
        ("transitionfrom", test.transitionfrom.clone()),
        ("transitionto", test.transitionto.clone()),
        ("timeout", optional_number(test.timeout)),
        ("startdelay", optional_number(test.startdelay)),
        ("slackchannel", test.slackchannel.clone()),
        ("command", test.command_display().to_string()),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value))
    .collect()
}

pub(crate) fn env_rows(env: &[EnvVar]) -> Vec<Row> {
    env.iter()
        .map(|var| {
            IndexMap::from([
                ("name".to_string(), var.name.clone()),
                ("value".to_string(), var.value.clone()),
            ])
        })
        .collect()
}

pub async fn info(ctx: &CommandContext, id: &str) -> Result<(), CommandError> {
    let test = ctx.api.get_test(id).await?;
    if test.ispreview {
        ctx.terminal.print("###===### !!Preview App Test!! ###===###");
    }
    ctx.terminal.print("^^ properties: ^^");
    ctx.terminal.pairs(&properties(&test));
    ctx.terminal.print("^^ env: ^^");
    let env = env_rows(test.env.as_deref().unwrap_or_default());
    if env.is_empty() {
        ctx.terminal.print("  ***n/a***");
    } else {
        ctx.terminal.table(&env);
    }
    Ok(())
}

/// Change one property and send the full definition back.
///
/// The value is validated against an empty definition first so a bad value
/// never reaches the service.
pub async fn update(ctx: &CommandContext, id: &str, property: UpdatableProperty, value: &str) -> Result<(), CommandError> {
    property.apply(&mut TestDefinition::default(), value)?;

    let mut test = ctx.api.get_test(id).await?;
    property.apply(&mut test, value)?;
    debug!(test = %id, property = %property, "updating test");
    let response = ctx.api.update_test(&test).await?;
    ctx.terminal.vtable(&response);
    Ok(())
}

pub async fn destroy(ctx: &CommandContext, id: &str) -> Result<(), CommandError> {
    ctx.api.delete_test(id).await?;
    ctx.terminal.print("^^ deleted ^^");
    Ok(())
}

/// Replay the target app's latest release through the release hook.
pub async fn trigger(ctx: &CommandContext, id: &str) -> Result<(), CommandError> {
    let test = ctx.api.get_test(id).await?;
    let app = test.app_name();
    let releases = ctx.api.releases(&app).await?;
    let builds = ctx.api.builds(&app).await?;

    let release = releases
        .last()
        .ok_or_else(|| CommandError::message(format!("No releases found for ***{app}***")))?;
    let build_id = builds.last().map(|build| build.id.clone()).unwrap_or_default();

    let event = ReleaseHookEvent {
        action: test.action.clone(),
        app: ReleaseHookApp {
            id: test.id.clone(),
            name: test.app.clone(),
        },
        space: ReleaseHookSpace {
            name: test.space.clone(),
        },
        release: ReleaseHookRelease {
            result: test.result.clone(),
            id: release.id.clone(),
        },
        build: ReleaseHookBuild { id: build_id },
    };
    ctx.api.trigger_release(&event).await?;
    ctx.terminal.print("^^ run initiated ^^");
    Ok(())
}

pub async fn runs(ctx: &CommandContext, id: &str) -> Result<(), CommandError> {
    let test = ctx.api.get_test(id).await?;
    let runs = ctx
        .api
        .test_runs(&test)
        .await?
        .runs
        .ok_or_else(|| CommandError::message(format!("No runs found for ***{id}***")))?;

    let rows: Vec<Row> = runs
        .iter()
        .map(|run| {
            let status = if run.overallstatus == "success" {
                "^^ success ^^".to_string()
            } else {
                format!("!! {} !!", run.overallstatus)
            };
            IndexMap::from([
                ("runid".to_string(), run.id.clone()),
                ("app".to_string(), format!("{}-{}", run.app, run.space)),
                ("test".to_string(), format!("{}-{}", run.job, run.jobspace)),
                ("time".to_string(), run.hrtimestamp.clone()),
                ("status".to_string(), status),
            ])
        })
        .collect();
    ctx.terminal.table(&rows);
    Ok(())
}

pub async fn audits(ctx: &CommandContext, id: &str) -> Result<(), CommandError> {
    let records = ctx.api.audits(id).await?;
    if records.is_empty() {
        ctx.terminal.error(&format!("No audits found for ***{id}***"));
        return Ok(());
    }
    let rows: Vec<Row> = records
        .iter()
        .map(|record| {
            IndexMap::from([
                ("date".to_string(), record.created_at.clone()),
                ("user".to_string(), record.audituser.clone()),
                ("type".to_string(), record.audittype.clone()),
                ("key".to_string(), record.auditkey.clone()),
                ("newvalue".to_string(), record.change().describe()),
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

    fn sample_test() -> serde_json::Value {
        json!({
            "id": "b3c0",
            "job": "ui-tests",
            "jobspace": "taas",
            "app": "portal",
            "space": "qa",
            "action": "release",
            "result": "succeeded",
            "image": "registry.example.com/org/ui-tests:1.2",
            "pipelinename": "manual",
            "transitionfrom": "manual",
            "transitionto": "manual",
            "timeout": 1800,
            "startdelay": 0,
            "slackchannel": "qa-alerts",
            "env": [{"name": "FOO", "value": "bar"}]
        })
    }

    #[tokio::test]
    async fn list_reports_empty_service() {
        let harness = harness(FakeTransport::new().on(Method::GET, "/v1/diagnostics", json!([])));
        list(&harness.context).await.expect("list");
        assert_eq!(harness.terminal.errors(), vec!["No tests found. Register a test with taas tests register"]);
    }

    #[tokio::test]
    async fn list_renders_composite_names() {
        let harness = harness(FakeTransport::new().on(Method::GET, "/v1/diagnostics", json!([sample_test()])));
        list(&harness.context).await.expect("list");
        let tables = harness.terminal.tables();
        assert_eq!(tables[0][0]["test"], "ui-tests-taas");
        assert_eq!(tables[0][0]["app"], "portal-qa");
        assert_eq!(tables[0][0]["preview"], "false");
        assert_eq!(harness.transport.requests()[0].query, vec![("simple".to_string(), "true".to_string())]);
    }

    #[tokio::test]
    async fn images_strip_registry_path() {
        let harness = harness(FakeTransport::new().on(Method::GET, "/v1/diagnostics", json!([sample_test()])));
        images(&harness.context).await.expect("images");
        assert_eq!(harness.terminal.tables()[0][0]["image"], "ui-tests:1.2");
    }

    #[tokio::test]
    async fn info_shows_properties_and_env() {
        let harness = harness(FakeTransport::new().on(Method::GET, "/v1/diagnostic/ui-tests-taas", sample_test()));
        info(&harness.context, "ui-tests-taas").await.expect("info");
        assert_eq!(harness.terminal.lines(), vec![" properties: ", " env: "]);
        assert!(harness.terminal.vtables()[0].contains("command         Default command in image"));
        assert_eq!(harness.terminal.tables()[0][0]["name"], "FOO");
    }

    #[tokio::test]
    async fn update_rejects_bad_values_before_fetching() {
        let harness = harness(FakeTransport::new());
        let error = update(&harness.context, "ui-tests-taas", UpdatableProperty::Timeout, "soon")
            .await
            .expect_err("must fail");
        assert_eq!(error.to_string(), "Must be an Integer");
        assert!(harness.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn update_patches_full_definition() {
        let harness = harness(
            FakeTransport::new()
                .on(Method::GET, "/v1/diagnostic/ui-tests-taas", sample_test())
                .on(Method::PATCH, "/v1/diagnostic", json!({"status": "ok"})),
        );
        update(&harness.context, "ui-tests-taas", UpdatableProperty::Timeout, "60")
            .await
            .expect("update");
        let body = &harness.transport.bodies(Method::PATCH, "/v1/diagnostic")[0];
        assert_eq!(body["timeout"], 60);
        assert_eq!(body["job"], "ui-tests");
        assert_eq!(body["env"][0]["name"], "FOO");
    }

    #[tokio::test]
    async fn trigger_posts_latest_release_and_build() {
        let harness = harness(
            FakeTransport::new()
                .on(Method::GET, "/v1/diagnostic/ui-tests-taas", sample_test())
                .on(Method::GET, "/apps/portal-qa/releases", json!([{"id": "r1"}, {"id": "r2"}]))
                .on(Method::GET, "/apps/portal-qa/builds", json!([]))
                .on(Method::POST, "/v1/releasehook", json!({})),
        );
        trigger(&harness.context, "ui-tests-taas").await.expect("trigger");
        let body = &harness.transport.bodies(Method::POST, "/v1/releasehook")[0];
        assert_eq!(
            body,
            &json!({
                "action": "release",
                "app": {"id": "b3c0", "name": "portal"},
                "space": {"name": "qa"},
                "release": {"result": "succeeded", "id": "r2"},
                "build": {"id": ""}
            })
        );
        assert_eq!(harness.terminal.lines(), vec![" run initiated "]);
    }

    #[tokio::test]
    async fn runs_mark_status() {
        let harness = harness(
            FakeTransport::new()
                .on(Method::GET, "/v1/diagnostic/ui-tests-taas", sample_test())
                .on(
                    Method::GET,
                    "/v1/diagnostic/jobspace/taas/job/ui-tests/runs",
                    json!({"runs": [
                        {"id": "r1", "app": "portal", "space": "qa", "job": "ui-tests", "jobspace": "taas", "hrtimestamp": "t1", "overallstatus": "success"},
                        {"id": "r2", "app": "portal", "space": "qa", "job": "ui-tests", "jobspace": "taas", "hrtimestamp": "t2", "overallstatus": "failed"}
                    ]}),
                ),
        );
        runs(&harness.context, "ui-tests-taas").await.expect("runs");
        let table = &harness.terminal.tables()[0];
        assert_eq!(table[0]["status"], " success ");
        assert_eq!(table[1]["status"], " failed ");
    }

    #[tokio::test]
    async fn audits_describe_snapshots() {
        let snapshot = json!({"app": "portal", "space": "qa", "job": "ui-tests", "jobspace": "taas", "image": "img"}).to_string();
        let harness = harness(FakeTransport::new().on(
            Method::GET,
            "/v1/diagnostic/ui-tests-taas/audits",
            json!([
                {"created_at": "d1", "audituser": "me", "audittype": "register", "auditkey": "", "newvalue": snapshot},
                {"created_at": "d2", "audituser": "me", "audittype": "config_set", "auditkey": "FOO", "newvalue": "bar"}
            ]),
        ));
        audits(&harness.context, "ui-tests-taas").await.expect("audits");
        let table = &harness.terminal.tables()[0];
        assert!(table[0]["newvalue"].starts_with("APP: portal-qa\nJOB: ui-tests-taas\nIMAGE: img"));
        assert_eq!(table[1]["newvalue"], "bar");
    }

    #[tokio::test]
    async fn audits_report_empty_trail() {
        let harness = harness(FakeTransport::new().on(Method::GET, "/v1/diagnostic/x/audits", json!([])));
        audits(&harness.context, "x").await.expect("audits");
        assert_eq!(harness.terminal.errors(), vec!["No audits found for x"]);
    }
}
