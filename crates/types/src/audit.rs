//! Audit trail of changes made to a test.

use serde::Deserialize;

use crate::null_as_default;

/// A single audit entry as stored by the service.
///
/// `newvalue` is a string whose meaning depends on `audittype`; use
/// [`AuditRecord::change`] to interpret it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AuditRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub audituser: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub audittype: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub auditkey: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub newvalue: String,
}

/// Snapshot of a test's properties recorded with register/update/destroy audits.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TestSnapshot {
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
    #[serde(default)]
    pub command: Option<String>,
}

/// Interpreted audit payload, keyed by audit type.
#[derive(Debug, Clone, PartialEq)]
pub enum AuditChange {
    Register(TestSnapshot),
    Properties(TestSnapshot),
    Destroy(TestSnapshot),
    /// Any other audit type; the payload is shown as-is.
    Value(String),
}

impl AuditRecord {
    /// Decode `newvalue` according to `audittype`.
    ///
    /// Snapshot payloads that fail to parse fall back to [`AuditChange::Value`]
    /// so a single malformed entry does not hide the rest of the trail.
    pub fn change(&self) -> AuditChange {
        let wrap: fn(TestSnapshot) -> AuditChange = match self.audittype.as_str() {
            "register" => AuditChange::Register,
            "properties" => AuditChange::Properties,
            "destroy" => AuditChange::Destroy,
            _ => return AuditChange::Value(self.newvalue.clone()),
        };
        match serde_json::from_str::<TestSnapshot>(&self.newvalue) {
            Ok(snapshot) => wrap(snapshot),
            Err(_) => AuditChange::Value(self.newvalue.clone()),
        }
    }
}

impl AuditChange {
    /// Multi-line description used in the audit table.
    pub fn describe(&self) -> String {
        let (snapshot, with_names) = match self {
            Self::Value(value) => return value.clone(),
            Self::Properties(snapshot) => (snapshot, false),
            Self::Register(snapshot) | Self::Destroy(snapshot) => (snapshot, true),
        };

        let mut lines = Vec::new();
        if with_names {
            lines.push(format!("APP: {}-{}", snapshot.app, snapshot.space));
            lines.push(format!("JOB: {}-{}", snapshot.job, snapshot.jobspace));
        }
        lines.push(format!("IMAGE: {}", snapshot.image));
        lines.push(format!("PIPELINE: {}", snapshot.pipelinename));
        lines.push(format!("TRANSITION FROM: {}", snapshot.transitionfrom));
        lines.push(format!("TRANSITION TO: {}", snapshot.transitionto));
        lines.push(format!("TIMEOUT: {}", optional_number(snapshot.timeout)));
        lines.push(format!("START DELAY: {}", optional_number(snapshot.startdelay)));
        lines.push(format!("SLACK CHANNEL: {}", snapshot.slackchannel));
        let command = snapshot
            .command
            .as_deref()
            .filter(|command| !command.is_empty())
            .unwrap_or("Default command in image");
        lines.push(format!("COMMAND: {command}"));
        lines.join("\n")
    }
}

fn optional_number(value: Option<i64>) -> String {
    value.map(|number| number.to_string()).unwrap_or_default()
}
