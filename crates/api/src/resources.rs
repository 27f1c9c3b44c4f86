//! Typed endpoints of the TaaS service and the platform API.
//!
//! [`TaasApi`] turns each remote operation into a single method so command
//! handlers never assemble paths or decode payloads themselves.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use taas_types::{
    AddonPlan, App, AuditRecord, Build, ConfigVar, CronJob, CronJobRun, CronToggle, CurrentRuns, Hook, NewCronJob,
    NewHook, NewTest, Pipeline, PipelineCoupling, Release, ReleaseHookEvent, RunDocument, RunFilter, RunList,
    TestDefinition,
};

use crate::client::{ApiRequest, Service, Transport};
use crate::error::ApiError;
use crate::path::build_path;

/// Kind of platform webhook the TaaS service listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    Release,
    Build,
}

impl HookKind {
    /// Path of the TaaS endpoint receiving this hook.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Release => "/v1/releasehook",
            Self::Build => "/v1/buildhook",
        }
    }

    /// Platform event name the hook subscribes to.
    pub fn event(&self) -> &'static str {
        match self {
            Self::Release => "release",
            Self::Build => "build",
        }
    }
}

#[derive(Clone)]
pub struct TaasApi {
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for TaasApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaasApi")
            .field("taas", &self.transport.base_url(Service::Taas))
            .field("platform", &self.transport.base_url(Service::Platform))
            .finish()
    }
}

impl TaasApi {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub fn taas_url(&self, path: &str) -> String {
        format!("{}{}", self.transport.base_url(Service::Taas), path)
    }

    /// Browser link to a run's artifacts.
    pub fn artifacts_url(&self, run_id: &str) -> String {
        self.taas_url(&build_path("/v1/artifacts/{run}/", &[("run", run_id)]))
    }

    /// Browser link to a run's logs.
    pub fn logs_url(&self, run_id: &str) -> String {
        self.taas_url(&build_path("/v1/diagnostic/logs/{run}", &[("run", run_id)]))
    }

    pub fn hook_url(&self, kind: HookKind) -> String {
        self.taas_url(kind.path())
    }

    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        self.transport.execute(request).await
    }

    async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let path = request.path.clone();
        let value = self.send(request).await?;
        serde_json::from_value(value).map_err(|error| ApiError::decode(path, error))
    }

    /// Like [`Self::fetch`] for list endpoints; an empty body is an empty list.
    async fn fetch_list<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<Vec<T>, ApiError> {
        let path = request.path.clone();
        match self.send(request).await? {
            Value::Null => Ok(Vec::new()),
            value => serde_json::from_value(value).map_err(|error| ApiError::decode(path, error)),
        }
    }

    fn with_body(request: ApiRequest, body: &impl Serialize) -> Result<ApiRequest, ApiError> {
        Ok(request.json(serde_json::to_value(body)?))
    }

    // Tests

    pub async fn list_tests(&self) -> Result<Vec<TestDefinition>, ApiError> {
        self.fetch_list(ApiRequest::get(Service::Taas, "/v1/diagnostics").query("simple", "true"))
            .await
    }

    pub async fn get_test(&self, id: &str) -> Result<TestDefinition, ApiError> {
        self.fetch(ApiRequest::get(Service::Taas, build_path("/v1/diagnostic/{id}", &[("id", id)])))
            .await
    }

    pub async fn create_test(&self, test: &NewTest) -> Result<Value, ApiError> {
        let request = Self::with_body(ApiRequest::post(Service::Taas, "/v1/diagnostic"), test)?;
        self.send(request).await
    }

    /// Replace a test definition with `test`.
    pub async fn update_test(&self, test: &TestDefinition) -> Result<Value, ApiError> {
        let request = Self::with_body(ApiRequest::patch(Service::Taas, "/v1/diagnostic"), test)?;
        self.send(request).await
    }

    pub async fn delete_test(&self, id: &str) -> Result<Value, ApiError> {
        self.send(ApiRequest::delete(Service::Taas, build_path("/v1/diagnostic/{id}", &[("id", id)])))
            .await
    }

    pub async fn audits(&self, id: &str) -> Result<Vec<AuditRecord>, ApiError> {
        self.fetch_list(ApiRequest::get(
            Service::Taas,
            build_path("/v1/diagnostic/{id}/audits", &[("id", id)]),
        ))
        .await
    }

    // Config and secrets

    pub async fn set_config(&self, id: &str, var: &ConfigVar) -> Result<Value, ApiError> {
        let request = ApiRequest::post(Service::Taas, build_path("/v1/diagnostic/{id}/config", &[("id", id)]));
        self.send(Self::with_body(request, var)?).await
    }

    pub async fn unset_config(&self, id: &str, name: &str) -> Result<Value, ApiError> {
        self.send(ApiRequest::delete(
            Service::Taas,
            build_path("/v1/diagnostic/{id}/config/{var}", &[("id", id), ("var", name)]),
        ))
        .await
    }

    pub async fn bind_secret(&self, id: &str, spec: &str) -> Result<Value, ApiError> {
        self.send(ApiRequest::post(
            Service::Taas,
            build_path("/v1/diagnostic/{id}/bind/{spec}", &[("id", id), ("spec", spec)]),
        ))
        .await
    }

    pub async fn unbind_secret(&self, id: &str, spec: &str) -> Result<Value, ApiError> {
        self.send(ApiRequest::delete(
            Service::Taas,
            build_path("/v1/diagnostic/{id}/bind/{spec}", &[("id", id), ("spec", spec)]),
        ))
        .await
    }

    /// Ask the service to install its own platform hooks for a test.
    ///
    /// Older deployments answer 404; see the engine's hook fallback.
    pub async fn install_hooks(&self, id: &str) -> Result<Value, ApiError> {
        self.send(ApiRequest::post(
            Service::Taas,
            build_path("/v1/diagnostic/{id}/hooks", &[("id", id)]),
        ))
        .await
    }

    // Runs

    pub async fn trigger_release(&self, event: &ReleaseHookEvent) -> Result<Value, ApiError> {
        let request = Self::with_body(ApiRequest::post(Service::Taas, HookKind::Release.path()), event)?;
        self.send(request).await
    }

    pub async fn run_info(&self, run_id: &str) -> Result<RunDocument, ApiError> {
        self.fetch(ApiRequest::get(
            Service::Taas,
            build_path("/v1/diagnostics/runs/info/{run}", &[("run", run_id)]),
        ))
        .await
    }

    /// Re-run the release described by a stored run document.
    pub async fn rerun(&self, run: &RunDocument) -> Result<Value, ApiError> {
        let request = ApiRequest::get(Service::Taas, "/v1/diagnostic/rerun")
            .query("space", run.space())
            .query("app", run.app())
            .query("action", "release")
            .query("result", "succeeded")
            .query("buildid", run.build_id());
        self.send(request).await
    }

    pub async fn test_runs(&self, test: &TestDefinition) -> Result<RunList, ApiError> {
        let path = build_path(
            "/v1/diagnostic/jobspace/{jobspace}/job/{job}/runs",
            &[("jobspace", test.jobspace.as_str()), ("job", test.job.as_str())],
        );
        match self.send(ApiRequest::get(Service::Taas, path.clone())).await? {
            Value::Null => Ok(RunList::default()),
            value => serde_json::from_value(value).map_err(|error| ApiError::decode(path, error)),
        }
    }

    pub async fn log_lines(&self, run_id: &str) -> Result<Vec<String>, ApiError> {
        let path = build_path("/v1/diagnostic/logs/{run}/array", &[("run", run_id)]);
        let lines: Vec<Value> = self.fetch_list(ApiRequest::get(Service::Taas, path)).await?;
        Ok(lines
            .into_iter()
            .map(|line| match line {
                Value::String(text) => text,
                other => other.to_string(),
            })
            .collect())
    }

    pub async fn current_runs(&self) -> Result<CurrentRuns, ApiError> {
        match self.send(ApiRequest::get(Service::Taas, "/v1/status/runs")).await? {
            Value::Null => Ok(CurrentRuns::default()),
            value => serde_json::from_value(value).map_err(|error| ApiError::decode("/v1/status/runs", error)),
        }
    }

    // Cron jobs

    pub async fn cron_jobs(&self) -> Result<Vec<CronJob>, ApiError> {
        self.fetch_list(ApiRequest::get(Service::Taas, "/v1/cronjobs")).await
    }

    pub async fn cron_job(&self, id: &str) -> Result<CronJob, ApiError> {
        self.fetch(ApiRequest::get(Service::Taas, build_path("/v1/cronjob/{id}", &[("id", id)])))
            .await
    }

    pub async fn create_cron_job(&self, cron_job: &NewCronJob) -> Result<Value, ApiError> {
        let request = Self::with_body(ApiRequest::post(Service::Taas, "/v1/cronjob"), cron_job)?;
        self.send(request).await
    }

    pub async fn destroy_cron_job(&self, id: &str) -> Result<Value, ApiError> {
        self.send(ApiRequest::delete(Service::Taas, build_path("/v1/cronjob/{id}", &[("id", id)])))
            .await
    }

    pub async fn set_cron_job_disabled(&self, id: &str, disabled: bool) -> Result<Value, ApiError> {
        let request = ApiRequest::patch(Service::Taas, build_path("/v1/cronjob/{id}", &[("id", id)]));
        self.send(Self::with_body(request, &CronToggle { disabled })?).await
    }

    pub async fn cron_job_runs(
        &self,
        id: &str,
        limit: Option<u32>,
        filter: Option<RunFilter>,
    ) -> Result<Vec<CronJobRun>, ApiError> {
        let mut request = ApiRequest::get(Service::Taas, build_path("/v1/cronjob/{id}/runs", &[("id", id)]));
        if let Some(limit) = limit {
            request = request.query("runs", limit.to_string());
        }
        if let Some(filter) = filter {
            request = request.query("filter", filter.as_str());
        }
        self.fetch_list(request).await
    }

    // Platform

    pub async fn apps(&self) -> Result<Vec<App>, ApiError> {
        self.fetch_list(ApiRequest::get(Service::Platform, "/apps")).await
    }

    pub async fn releases(&self, app: &str) -> Result<Vec<Release>, ApiError> {
        self.fetch_list(ApiRequest::get(
            Service::Platform,
            build_path("/apps/{app}/releases", &[("app", app)]),
        ))
        .await
    }

    pub async fn builds(&self, app: &str) -> Result<Vec<Build>, ApiError> {
        self.fetch_list(ApiRequest::get(
            Service::Platform,
            build_path("/apps/{app}/builds", &[("app", app)]),
        ))
        .await
    }

    pub async fn app_hooks(&self, app: &str) -> Result<Vec<Hook>, ApiError> {
        self.fetch_list(ApiRequest::get(Service::Platform, build_path("/apps/{app}/hooks", &[("app", app)])))
            .await
    }

    pub async fn create_app_hook(&self, app: &str, hook: &NewHook) -> Result<Value, ApiError> {
        let request = ApiRequest::post(Service::Platform, build_path("/apps/{app}/hooks", &[("app", app)]));
        self.send(Self::with_body(request, hook)?).await
    }

    pub async fn addon_plan(&self, service: &str, plan: &str) -> Result<AddonPlan, ApiError> {
        self.fetch(ApiRequest::get(
            Service::Platform,
            build_path("/addon-services/{service}/plans/{plan}", &[("service", service), ("plan", plan)]),
        ))
        .await
    }

    pub async fn pipelines(&self) -> Result<Vec<Pipeline>, ApiError> {
        self.fetch_list(ApiRequest::get(Service::Platform, "/pipelines")).await
    }

    pub async fn pipeline_couplings(&self, pipeline: &str) -> Result<Vec<PipelineCoupling>, ApiError> {
        self.fetch_list(ApiRequest::get(
            Service::Platform,
            build_path("/pipelines/{pipeline}/pipeline-couplings", &[("pipeline", pipeline)]),
        ))
        .await
    }
}
