//! Test definitions ("diagnostics" on the wire) and their configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::null_as_default;
use crate::validation::{ValidationError, parse_env_list, parse_integer, validate_slack_channel};

/// A name/value pair attached to a test.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,
}

/// Body of a single config mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigVar {
    pub varname: String,
    pub varvalue: String,
}

impl From<EnvVar> for ConfigVar {
    fn from(var: EnvVar) -> Self {
        Self {
            varname: var.name,
            varvalue: var.value,
        }
    }
}

/// A registered test job as returned by the service.
///
/// Unknown fields are kept in `extra` so a fetched definition can be patched
/// back without dropping anything the CLI does not model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestDefinition {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub job: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub jobspace: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub app: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub space: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub action: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub result: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pipelinename: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub transitionfrom: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub transitionto: String,
    #[serde(default)]
    pub timeout: Option<i64>,
    #[serde(default)]
    pub startdelay: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slackchannel: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhookurls: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub testpreviews: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ispreview: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<Vec<EnvVar>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TestDefinition {
    /// Composite `job-jobspace` name used to address the test.
    pub fn test_name(&self) -> String {
        format!("{}-{}", self.job, self.jobspace)
    }

    /// Composite `app-space` name of the app under test.
    pub fn app_name(&self) -> String {
        format!("{}-{}", self.app, self.space)
    }

    /// The command override, or a note that the image default is used.
    pub fn command_display(&self) -> &str {
        self.command
            .as_deref()
            .filter(|command| !command.is_empty())
            .unwrap_or("Default command in image")
    }
}

/// Creation payload for a new test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTest {
    pub app: String,
    pub space: String,
    pub action: String,
    pub result: String,
    pub job: String,
    pub jobspace: String,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    pub pipelinename: String,
    pub transitionfrom: String,
    pub transitionto: String,
    pub timeout: i64,
    pub startdelay: i64,
    pub slackchannel: String,
    pub testpreviews: bool,
    pub env: Vec<EnvVar>,
}

/// Properties that `tests update` may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatableProperty {
    Image,
    PipelineName,
    TransitionFrom,
    TransitionTo,
    Timeout,
    StartDelay,
    SlackChannel,
    Command,
    TestPreviews,
    Env,
}

impl UpdatableProperty {
    pub const ALL: [UpdatableProperty; 10] = [
        Self::Image,
        Self::PipelineName,
        Self::TransitionFrom,
        Self::TransitionTo,
        Self::Timeout,
        Self::StartDelay,
        Self::SlackChannel,
        Self::Command,
        Self::TestPreviews,
        Self::Env,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::PipelineName => "pipelinename",
            Self::TransitionFrom => "transitionfrom",
            Self::TransitionTo => "transitionto",
            Self::Timeout => "timeout",
            Self::StartDelay => "startdelay",
            Self::SlackChannel => "slackchannel",
            Self::Command => "command",
            Self::TestPreviews => "testpreviews",
            Self::Env => "env",
        }
    }

    /// Parse `value` for this property and write it into `test`.
    pub fn apply(self, test: &mut TestDefinition, value: &str) -> Result<(), ValidationError> {
        match self {
            Self::Image => test.image = value.to_string(),
            Self::PipelineName => test.pipelinename = value.to_string(),
            Self::TransitionFrom => test.transitionfrom = value.to_string(),
            Self::TransitionTo => test.transitionto = value.to_string(),
            Self::Timeout => test.timeout = Some(parse_integer(value)?),
            Self::StartDelay => test.startdelay = Some(parse_integer(value)?),
            Self::SlackChannel => {
                validate_slack_channel(value)?;
                test.slackchannel = value.to_string();
            }
            Self::Command => test.command = Some(value.to_string()),
            Self::TestPreviews => test.testpreviews = value == "true" || value == "t",
            Self::Env => test.env = Some(parse_env_list(value)?),
        }
        Ok(())
    }
}

impl fmt::Display for UpdatableProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpdatableProperty {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|property| property.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownProperty {
                name: s.to_string(),
                expected: Self::ALL.map(|property| property.as_str()).join(", "),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn definition_tolerates_nulls_and_keeps_unknown_fields() {
        let test: TestDefinition = serde_json::from_value(json!({
            "id": "d5f0",
            "job": "ui-tests",
            "jobspace": "taas",
            "app": "portal",
            "space": "qa",
            "image": "docker.io/org/ui-tests:1.2",
            "command": null,
            "timeout": 300,
            "startdelay": null,
            "slackchannel": null,
            "testpreviews": null,
            "created_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(test.test_name(), "ui-tests-taas");
        assert_eq!(test.app_name(), "portal-qa");
        assert_eq!(test.timeout, Some(300));
        assert_eq!(test.startdelay, None);
        assert_eq!(test.slackchannel, "");
        assert!(!test.testpreviews);
        assert_eq!(test.command_display(), "Default command in image");

        let round_trip = serde_json::to_value(&test).unwrap();
        assert_eq!(round_trip["created_at"], "2024-01-01T00:00:00Z");
        assert!(round_trip.get("command").is_none());
    }

    #[test]
    fn property_names_parse() {
        assert_eq!("timeout".parse::<UpdatableProperty>(), Ok(UpdatableProperty::Timeout));
        let error = "colour".parse::<UpdatableProperty>().unwrap_err();
        assert!(error.to_string().contains("image, pipelinename"));
    }

    #[test]
    fn apply_converts_values_by_property() {
        let mut test = TestDefinition::default();
        UpdatableProperty::Timeout.apply(&mut test, "45").unwrap();
        UpdatableProperty::TestPreviews.apply(&mut test, "t").unwrap();
        UpdatableProperty::Env.apply(&mut test, "A=1 B=2").unwrap();
        UpdatableProperty::Command.apply(&mut test, "npm test").unwrap();

        assert_eq!(test.timeout, Some(45));
        assert!(test.testpreviews);
        assert_eq!(test.env.as_ref().map(Vec::len), Some(2));
        assert_eq!(test.command_display(), "npm test");

        assert!(UpdatableProperty::StartDelay.apply(&mut test, "later").is_err());
        assert!(UpdatableProperty::SlackChannel.apply(&mut test, "#qa").is_err());
        UpdatableProperty::TestPreviews.apply(&mut test, "no").unwrap();
        assert!(!test.testpreviews);
    }
}
