//! Platform resources the CLI reads or writes alongside the TaaS service.

use serde::{Deserialize, Serialize};

use crate::null_as_default;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct App {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Release {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Build {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
}

/// A webhook subscription on an app.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Hook {
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub events: Vec<String>,
}

/// Creation payload for an app webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewHook {
    pub url: String,
    pub active: bool,
    pub secret: String,
    pub events: Vec<String>,
}

/// Addon plan; `spec` names the binding target on the TaaS side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AddonPlan {
    #[serde(default, deserialize_with = "null_as_default")]
    pub spec: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Pipeline {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// Membership of an app in one stage of a pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PipelineCoupling {
    #[serde(default, deserialize_with = "null_as_default")]
    pub app: App,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stage: String,
}

/// Synthetic release hook used to trigger a run by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseHookEvent {
    pub action: String,
    pub app: ReleaseHookApp,
    pub space: ReleaseHookSpace,
    pub release: ReleaseHookRelease,
    pub build: ReleaseHookBuild,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseHookApp {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseHookSpace {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseHookRelease {
    pub result: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseHookBuild {
    pub id: String,
}
