//! Setting or unsetting one variable across every test matching a name filter.

use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use serde_json::Value;
use taas_api::{ApiError, TaasApi};
use taas_types::{ConfigVar, NameFilter, TestDefinition, parse_env_pair};
use tracing::debug;

use crate::{CommandContext, CommandError};

/// The change applied to each matched test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkMutation {
    Set(ConfigVar),
    Unset(String),
}

impl BulkMutation {
    /// Parse and validate a `KEY=value` pair for a bulk set.
    pub fn set(pair: &str) -> Result<Self, CommandError> {
        Ok(Self::Set(ConfigVar::from(parse_env_pair(pair)?)))
    }

    pub fn unset(name: impl Into<String>) -> Self {
        Self::Unset(name.into())
    }

    fn describe(&self) -> String {
        match self {
            Self::Set(var) => format!("About to set {} to {} for:", var.varname, var.varvalue),
            Self::Unset(name) => format!("About to unset {name} for:"),
        }
    }

    async fn apply(&self, api: &TaasApi, test: &str) -> Result<Value, ApiError> {
        match self {
            Self::Set(var) => api.set_config(test, var).await,
            Self::Unset(name) => api.unset_config(test, name).await,
        }
    }
}

/// Composite names of the tests selected by `filter`, in service order.
pub fn matching_tests(tests: &[TestDefinition], filter: &NameFilter) -> Vec<String> {
    tests
        .iter()
        .map(TestDefinition::test_name)
        .filter(|name| filter.matches(name))
        .collect()
}

/// Apply `mutation` to every matching test after confirmation.
///
/// Mutations run concurrently. Each outcome is reported as it completes and a
/// failure does not stop the others; the call returns once all have finished.
pub async fn run(ctx: &CommandContext, mutation: BulkMutation, filter: NameFilter) -> Result<(), CommandError> {
    let tests = ctx.api.list_tests().await?;
    let matches = matching_tests(&tests, &filter);
    if matches.is_empty() {
        ctx.terminal
            .print(&format!("No matches for the {} {}", filter.kind(), filter.value()));
        return Ok(());
    }

    ctx.terminal.print(&mutation.describe());
    ctx.terminal.raw(&matches.join("\n"));
    if !ctx.prompter.confirm("Continue?", false)? {
        return Ok(());
    }
    ctx.terminal.print("Continuing ... ");

    let api = &ctx.api;
    let mutation = &mutation;
    let mut pending: FuturesUnordered<_> = matches
        .iter()
        .map(|test| async move { (test, mutation.apply(api, test).await) })
        .collect();

    while let Some((test, outcome)) = pending.next().await {
        match outcome {
            Ok(response) => {
                debug!(test = %test, "bulk mutation applied");
                ctx.terminal.vtable(&response);
            }
            Err(error) => ctx.terminal.error(&format!("***{test}***: {error}")),
        }
    }
    Ok(())
}
