//! Routing parsed arguments to command handlers.

use std::sync::Arc;

use clap::ArgMatches;
use taas_api::LogStreamer;
use taas_engine::commands::config::ListFormat;
use taas_engine::commands::{bulk, config, cron, diagnostic, hooks, register, run, secret};
use taas_engine::{CommandContext, CommandError, RestartCounter, tail};
use taas_types::{NameFilter, RunFilter, UpdatableProperty, ValidationError};
use tracing::debug;

use crate::cli::is_beta;

/// Everything a command may need, built once per process.
pub struct Session {
    pub context: CommandContext,
    pub streamer: Arc<dyn LogStreamer>,
    pub restarts: RestartCounter,
    pub beta: bool,
}

fn value<'a>(matches: &'a ArgMatches, id: &str) -> Option<&'a str> {
    matches.get_one::<String>(id).map(String::as_str)
}

/// Required arguments are enforced by clap; an absent one reads as empty.
fn required<'a>(matches: &'a ArgMatches, id: &str) -> &'a str {
    value(matches, id).unwrap_or_default()
}

/// A value given either positionally or through its legacy flag.
fn positional_or_flag<'a>(matches: &'a ArgMatches, positional: &str, flag: &str) -> Result<&'a str, ValidationError> {
    value(matches, positional)
        .or_else(|| value(matches, flag))
        .ok_or(ValidationError::Required)
}

fn name_filter(matches: &ArgMatches) -> Result<NameFilter, ValidationError> {
    NameFilter::from_options(value(matches, "prefix"), value(matches, "suffix"))
}

/// Run the command selected by `matches`.
pub async fn dispatch(session: &Session, matches: &ArgMatches) -> Result<(), CommandError> {
    let Some((group, group_matches)) = matches.subcommand() else {
        return Err(CommandError::message("No command given. Run ***taas --help*** for usage."));
    };
    let (command, command_matches) = group_matches.subcommand().unwrap_or(("", group_matches));

    if !session.beta && is_beta(group, command) {
        return Err(CommandError::message(
            "This command is in beta. Set ***TAAS_BETA=true*** to enable it.",
        ));
    }
    debug!(group, command, "dispatching");

    let ctx = &session.context;
    let m = command_matches;
    let id = || required(m, "id");

    match (group, command) {
        ("tests", "list") => diagnostic::list(ctx).await,
        ("tests", "info") => diagnostic::info(ctx, id()).await,
        ("tests", "register") => register::register(ctx).await,
        ("tests", "update") => {
            let property: UpdatableProperty = positional_or_flag(m, "property_arg", "property")?.parse()?;
            let new_value = positional_or_flag(m, "value_arg", "value")?;
            diagnostic::update(ctx, id(), property, new_value).await
        }
        ("tests", "destroy") => diagnostic::destroy(ctx, id()).await,
        ("tests", "trigger") => diagnostic::trigger(ctx, id()).await,
        ("tests", "runs") => diagnostic::runs(ctx, id()).await,
        ("tests", "audits") => diagnostic::audits(ctx, id()).await,
        ("images", _) => diagnostic::images(ctx).await,

        ("runs", "info") => run::info(ctx, id()).await,
        ("runs", "output") | ("logs", _) => run::output(ctx, id()).await,
        ("runs", "rerun") => run::rerun(ctx, id()).await,
        ("runs", "artifacts") => run::artifacts(ctx, id()).await,
        ("runs", "current") | ("running", _) => run::running(ctx).await,
        ("tail", _) => tail(session.streamer.as_ref(), ctx.terminal.as_ref(), id(), &session.restarts).await,

        ("config", "list") => {
            let format = ListFormat {
                simple: m.get_flag("simple"),
                exports: m.get_flag("exports"),
            };
            config::list(ctx, id(), format).await
        }
        ("config", "set") => config::set(ctx, id(), required(m, "pair")).await,
        ("config", "unset") => config::unset(ctx, id(), required(m, "name")).await,
        ("config", "multiset") => {
            let mutation = bulk::BulkMutation::set(required(m, "pair"))?;
            bulk::run(ctx, mutation, name_filter(m)?).await
        }
        ("config", "multiunset") => {
            let filter = name_filter(m)?;
            bulk::run(ctx, bulk::BulkMutation::unset(required(m, "name")), filter).await
        }

        ("secret", "create") => secret::create(ctx, id(), positional_or_flag(m, "plan_arg", "plan")?).await,
        ("secret", "remove") => secret::remove(ctx, id(), positional_or_flag(m, "plan_arg", "plan")?).await,
        ("hooks", "create") => hooks::install(ctx, id(), false).await,

        ("cron", "jobs") => cron::jobs(ctx).await,
        ("cron", "info") => cron::info(ctx, id()).await,
        ("cron", "create") => {
            let cronspec = positional_or_flag(m, "cronspec_arg", "cronspec")?;
            let command = value(m, "command_arg").or_else(|| value(m, "command"));
            cron::create(ctx, id(), cronspec, command).await
        }
        ("cron", "destroy") => cron::destroy(ctx, id()).await,
        ("cron", "enable") => cron::set_enabled(ctx, id(), true).await,
        ("cron", "disable") => cron::set_enabled(ctx, id(), false).await,
        ("cron", "runs") => {
            let filter = value(m, "filter").map(str::parse::<RunFilter>).transpose()?;
            cron::runs(ctx, id(), m.get_one::<u32>("runs").copied(), filter).await
        }

        (group, command) => Err(CommandError::message(format!(
            "Unknown command ***{}***",
            format!("{group} {command}").trim()
        ))),
    }
}
