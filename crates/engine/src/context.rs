use std::sync::Arc;

use taas_api::TaasApi;
use taas_util::{Prompter, Terminal};

use crate::error::CommandError;

/// Collaborators shared by every command handler.
#[derive(Clone)]
pub struct CommandContext {
    pub api: TaasApi,
    pub terminal: Arc<dyn Terminal>,
    pub prompter: Arc<dyn Prompter>,
}

impl std::fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContext").field("api", &self.api).finish_non_exhaustive()
    }
}

impl CommandContext {
    pub fn new(api: TaasApi, terminal: Arc<dyn Terminal>, prompter: Arc<dyn Prompter>) -> Self {
        Self { api, terminal, prompter }
    }

    /// Report the outcome of a command and return the process exit status.
    pub fn report(&self, result: Result<(), CommandError>) -> i32 {
        match result {
            Ok(()) => 0,
            Err(error) => {
                tracing::debug!(error = ?error, "command failed");
                self.terminal.error(&error.to_string());
                error.exit_code()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeTransport, harness};

    #[test]
    fn report_prints_errors_and_maps_exit_status() {
        let harness = harness(FakeTransport::new());
        assert_eq!(harness.context.report(Ok(())), 0);
        assert_eq!(harness.context.report(Err(CommandError::message("!!Invalid run ID!!"))), 0);
        assert_eq!(
            harness.context.report(Err(CommandError::RetryCeilingExceeded { restarts: 21 })),
            1
        );
        assert_eq!(
            harness.terminal.errors(),
            vec!["Invalid run ID", "Log stream restarted 21 times, giving up"]
        );
    }
}
