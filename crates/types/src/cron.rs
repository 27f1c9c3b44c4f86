//! Cron jobs bound to tests.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::null_as_default;
use crate::validation::ValidationError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CronJob {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub job: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub jobspace: String,
    /// Cron expression.
    #[serde(default, deserialize_with = "null_as_default")]
    pub cs: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub command: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub disabled: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub prev: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub next: String,
}

impl CronJob {
    pub fn test_name(&self) -> String {
        format!("{}-{}", self.job, self.jobspace)
    }
}

/// Creation payload for a cron job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCronJob {
    pub job: String,
    pub jobspace: String,
    pub cs: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

/// Body of the enable/disable patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CronToggle {
    pub disabled: bool,
}

/// One run fired by a cron job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CronJobRun {
    #[serde(default, deserialize_with = "null_as_default")]
    pub runid: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub starttime: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub endtime: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overallstatus: String,
}

impl CronJobRun {
    /// Runs whose logs and artifacts are worth linking.
    pub fn needs_attention(&self) -> bool {
        matches!(self.overallstatus.as_str(), "failed" | "timedout")
    }
}

/// Outcome filter for cron run history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunFilter {
    Failed,
    Success,
}

impl RunFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Failed => "failed",
            Self::Success => "success",
        }
    }
}

impl FromStr for RunFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "failed" | "fail" | "borked" | "pizzled" => Ok(Self::Failed),
            "success" | "pass" | "passed" => Ok(Self::Success),
            other => Err(ValidationError::UnknownRunFilter { input: other.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_filter_aliases() {
        for alias in ["failed", "fail", "borked", "pizzled"] {
            assert_eq!(alias.parse::<RunFilter>(), Ok(RunFilter::Failed));
        }
        for alias in ["success", "pass", "passed"] {
            assert_eq!(alias.parse::<RunFilter>(), Ok(RunFilter::Success));
        }
        assert!("flaky".parse::<RunFilter>().is_err());
    }

    #[test]
    fn new_cron_job_omits_missing_command() {
        let body = serde_json::to_value(NewCronJob {
            job: "ui-tests".into(),
            jobspace: "taas".into(),
            cs: "0 * * * *".into(),
            command: None,
        })
        .unwrap();
        assert!(body.get("command").is_none());
        assert_eq!(body["cs"], "0 * * * *");
    }
}
