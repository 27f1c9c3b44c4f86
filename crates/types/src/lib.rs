//! Shared types for the TaaS CLI.
//!
//! Everything in this crate is request/response shaped: the remote service
//! owns the data and the CLI only ever holds it for the duration of a single
//! command. Validation of user-supplied values that must happen before any
//! network call also lives here so every consumer applies the same rules.

pub mod audit;
pub mod cron;
pub mod diagnostic;
pub mod pipeline;
pub mod platform;
pub mod run;
pub mod validation;

pub use audit::{AuditChange, AuditRecord, TestSnapshot};
pub use cron::{CronJob, CronJobRun, CronToggle, NewCronJob, RunFilter};
pub use diagnostic::{ConfigVar, EnvVar, NewTest, TestDefinition, UpdatableProperty};
pub use pipeline::{PipelineStage, promotable_pairs};
pub use platform::{
    AddonPlan, App, Build, Hook, NewHook, Pipeline, PipelineCoupling, Release, ReleaseHookApp, ReleaseHookBuild,
    ReleaseHookEvent, ReleaseHookRelease, ReleaseHookSpace,
};
pub use run::{CurrentRun, CurrentRuns, Run, RunDocument, RunList};
pub use validation::{NameFilter, ValidationError, parse_env_list, parse_env_pair};

use serde::{Deserialize, Deserializer};

/// Deserialize a possibly-null field into its default value.
///
/// The service is inconsistent about omitting vs. nulling empty fields, and
/// the CLI treats both the same way.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
