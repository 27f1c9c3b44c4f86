//! Test runs: history entries, stored run documents and in-flight runs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::null_as_default;

/// One entry in a test's run history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Run {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub app: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub space: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub job: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub jobspace: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hrtimestamp: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overallstatus: String,
}

/// Wrapper returned by the run history endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunList {
    #[serde(default)]
    pub runs: Option<Vec<Run>>,
}

/// The stored document for a single run.
///
/// The document is displayed mostly verbatim, so its fields stay untyped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunDocument {
    #[serde(rename = "_source", default)]
    pub source: Map<String, Value>,
}

impl RunDocument {
    fn text(&self, key: &str) -> Option<&str> {
        self.source.get(key).and_then(Value::as_str)
    }

    /// A document without a job name means the run id was unknown.
    pub fn is_valid(&self) -> bool {
        self.text("job").is_some_and(|job| !job.is_empty())
    }

    pub fn app(&self) -> &str {
        self.text("app").unwrap_or_default()
    }

    pub fn space(&self) -> &str {
        self.text("space").unwrap_or_default()
    }

    pub fn build_id(&self) -> String {
        match self.source.get("buildid") {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    /// The document fields for display, minus the bulky log payload.
    pub fn without_logs(&self) -> Map<String, Value> {
        let mut source = self.source.clone();
        source.remove("logs");
        source
    }
}

/// A run currently executing on the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentRun {
    #[serde(default, deserialize_with = "null_as_default")]
    pub runid: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub app: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub space: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub job: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub jobspace: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,
    #[serde(default)]
    pub run_on: Option<String>,
    #[serde(default)]
    pub starttime: Option<String>,
    #[serde(default)]
    pub timeout: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overallstatus: String,
}

impl CurrentRun {
    /// Start timestamp, preferring the scheduled time.
    pub fn started_at(&self) -> Option<&str> {
        self.run_on
            .as_deref()
            .filter(|value| !value.is_empty())
            .or(self.starttime.as_deref())
    }

    pub fn is_starting(&self) -> bool {
        self.overallstatus == "starting"
    }
}

/// Payload of the running-tests endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrentRuns {
    #[serde(default, deserialize_with = "null_as_default")]
    pub current_runs: Vec<CurrentRun>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub current_cron_runs: Vec<CurrentRun>,
}

impl CurrentRuns {
    /// Release-triggered runs first, then cron runs.
    pub fn all(&self) -> impl Iterator<Item = &CurrentRun> {
        self.current_runs.iter().chain(self.current_cron_runs.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn run_document_validity_and_log_removal() {
        let document: RunDocument = serde_json::from_value(json!({
            "_source": {"job": "ui-tests", "app": "portal", "space": "qa", "buildid": 42, "logs": ["a", "b"]}
        }))
        .unwrap();
        assert!(document.is_valid());
        assert_eq!(document.build_id(), "42");
        assert!(!document.without_logs().contains_key("logs"));

        let empty: RunDocument = serde_json::from_value(json!({"_source": {"job": ""}})).unwrap();
        assert!(!empty.is_valid());
        let missing: RunDocument = serde_json::from_value(json!({})).unwrap();
        assert!(!missing.is_valid());
    }

    #[test]
    fn current_runs_chain_cron_after_release_runs() {
        let runs: CurrentRuns = serde_json::from_value(json!({
            "current_runs": [{"runid": "a", "run_on": "2024-05-01T10:00:00Z", "overallstatus": "starting"}],
            "current_cron_runs": [{"runid": "b", "starttime": "2024-05-01T11:00:00Z"}]
        }))
        .unwrap();
        let ids: Vec<&str> = runs.all().map(|run| run.runid.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert!(runs.current_runs[0].is_starting());
        assert_eq!(runs.current_cron_runs[0].started_at(), Some("2024-05-01T11:00:00Z"));

        let none: CurrentRuns = serde_json::from_value(json!({"current_runs": null})).unwrap();
        assert_eq!(none.all().count(), 0);
    }
}
