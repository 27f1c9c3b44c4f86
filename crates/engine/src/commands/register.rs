//! Interactive registration of a new test.
//!
//! The wizard only gathers [`RegistrationAnswers`]; turning them into the
//! service payload is the pure [`build_new_test`] so the mapping can be
//! checked without a prompt.

use futures_util::future::try_join_all;
use taas_api::{ApiError, TaasApi};
use taas_types::validation::{parse_integer, validate_required, validate_slack_channel};
use taas_types::{NewTest, PipelineStage, ValidationError, parse_env_list, promotable_pairs};
use tracing::debug;

use super::hooks;
use crate::{CommandContext, CommandError};

/// Value used for the pipeline fields when promotion is off.
const MANUAL: &str = "manual";

const NO_YES: [&str; 2] = ["No", "Yes"];
const IMAGE_SOURCES: [&str; 2] = ["Yes - select an app", "No - specify an image"];

/// Automatic promotion after a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Promotion {
    pub pipeline: String,
    pub from: PipelineStage,
    pub to: PipelineStage,
}

/// Everything the wizard asks, as answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationAnswers {
    /// Target app name, `<app>-<space>`.
    pub app: String,
    pub test_previews: bool,
    pub job: String,
    pub jobspace: String,
    pub image: String,
    /// Present only when the image command is overridden.
    pub command: Option<String>,
    pub promotion: Option<Promotion>,
    pub timeout: i64,
    pub startdelay: i64,
    pub slackchannel: String,
    /// Space separated `KEY=value` tokens, possibly empty.
    pub env: String,
}

/// Split an app name at its first `-` into app and space.
fn split_app_name(name: &str) -> (&str, &str) {
    name.split_once('-').unwrap_or((name, ""))
}

pub fn build_new_test(answers: &RegistrationAnswers) -> Result<NewTest, ValidationError> {
    let (app, space) = split_app_name(&answers.app);
    let (pipelinename, transitionfrom, transitionto) = match &answers.promotion {
        Some(promotion) => (
            promotion.pipeline.clone(),
            promotion.from.to_string(),
            promotion.to.to_string(),
        ),
        None => (MANUAL.to_string(), MANUAL.to_string(), MANUAL.to_string()),
    };

    Ok(NewTest {
        app: app.to_string(),
        space: space.to_string(),
        action: "release".to_string(),
        result: "succeeded".to_string(),
        job: answers.job.clone(),
        jobspace: answers.jobspace.clone(),
        image: answers.image.clone(),
        command: answers.command.clone(),
        pipelinename,
        transitionfrom,
        transitionto,
        timeout: answers.timeout,
        startdelay: answers.startdelay,
        slackchannel: answers.slackchannel.clone(),
        testpreviews: answers.test_previews,
        env: parse_env_list(&answers.env)?,
    })
}

fn required(input: &str) -> Result<(), String> {
    validate_required(input).map_err(|error| error.to_string())
}

fn integer(input: &str) -> Result<(), String> {
    parse_integer(input).map(|_| ()).map_err(|error| error.to_string())
}

fn slack_channel(input: &str) -> Result<(), String> {
    validate_slack_channel(input).map_err(|error| error.to_string())
}

fn env_list(input: &str) -> Result<(), String> {
    parse_env_list(input).map(|_| ()).map_err(|error| error.to_string())
}

/// Pipelines that have at least one promotable stage pair, with those pairs.
async fn promotable_pipelines(api: &TaasApi) -> Result<Vec<(String, Vec<(PipelineStage, PipelineStage)>)>, ApiError> {
    let pipelines = api.pipelines().await?;
    let couplings = try_join_all(pipelines.iter().map(|pipeline| api.pipeline_couplings(&pipeline.name))).await?;
    Ok(pipelines
        .into_iter()
        .zip(couplings)
        .map(|(pipeline, couplings)| (pipeline.name, promotable_pairs(&couplings)))
        .filter(|(_, pairs)| !pairs.is_empty())
        .collect())
}

fn stage_names(stages: impl Iterator<Item = PipelineStage>) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for stage in stages {
        let name = stage.to_string();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

fn parse_stage(name: &str) -> Result<PipelineStage, CommandError> {
    name.parse::<PipelineStage>().map_err(CommandError::Message)
}

async fn ask_promotion(ctx: &CommandContext) -> Result<Option<Promotion>, CommandError> {
    let pipelines = promotable_pipelines(&ctx.api).await?;
    if pipelines.is_empty() {
        ctx.terminal
            .error("No pipelines with promotable stages were found. Promotion stays ***manual***.");
        return Ok(None);
    }

    let names: Vec<String> = pipelines.iter().map(|(name, _)| name.clone()).collect();
    let pipeline = ctx.prompter.autocomplete("Pipeline Name:", &names)?;
    let pairs = pipelines
        .into_iter()
        .find(|(name, _)| *name == pipeline)
        .map(|(_, pairs)| pairs)
        .unwrap_or_default();

    let sources = stage_names(pairs.iter().map(|(from, _)| *from));
    let from = parse_stage(&ctx.prompter.autocomplete("Transition From:", &sources)?)?;
    let targets = stage_names(pairs.iter().filter(|(source, _)| *source == from).map(|(_, to)| *to));
    let to = parse_stage(&ctx.prompter.autocomplete("Transition To:", &targets)?)?;

    Ok(Some(Promotion { pipeline, from, to }))
}

async fn ask(ctx: &CommandContext, app_names: &[String]) -> Result<RegistrationAnswers, CommandError> {
    let prompter = &ctx.prompter;

    let app = prompter.autocomplete("Select an App:", app_names)?;
    let test_previews = prompter.select("Do you want to test preview apps?", &NO_YES)? == 1;
    let job = prompter.input("Test Name:", &required)?;
    let jobspace = prompter.input("Test Space:", &required)?;

    let image = if prompter.select("Is test suite an Akkeris app?", &IMAGE_SOURCES)? == 0 {
        format!("akkeris://{}", prompter.autocomplete("Select the test suite app:", app_names)?)
    } else {
        prompter.input("Provide image location:", &required)?
    };

    let command = if prompter.select("Override command in docker image?", &NO_YES)? == 1 {
        Some(prompter.input("Command:", &required)?)
    } else {
        None
    };

    let promotion = if prompter.select("Automatically promote?", &NO_YES)? == 1 {
        ask_promotion(ctx).await?
    } else {
        None
    };

    let timeout = parse_integer(&prompter.input("Timeout:", &integer)?)?;
    let startdelay = parse_integer(&prompter.input("Start Delay:", &integer)?)?;
    let slackchannel = prompter.input("Slack Channel (no leading #):", &slack_channel)?;
    let env = prompter.input(
        "Environment Variables:\n  (e.g. KEY=\"value\" KEY2=value2)\n>",
        &env_list,
    )?;

    Ok(RegistrationAnswers {
        app,
        test_previews,
        job,
        jobspace,
        image,
        command,
        promotion,
        timeout,
        startdelay,
        slackchannel,
        env,
    })
}

/// Run the registration wizard, create the test and install its hooks.
pub async fn register(ctx: &CommandContext) -> Result<(), CommandError> {
    let app_names: Vec<String> = ctx.api.apps().await?.into_iter().map(|app| app.name).collect();
    if app_names.is_empty() {
        return Err(CommandError::message(
            "###===### No apps were found. At least one app must exist in order to use this command.",
        ));
    }

    ctx.terminal.print("\n###===### New Test Registration ###===###");
    ctx.terminal.print("###(Press [CTRL+C] to cancel at any time)###\n");

    let answers = ask(ctx, &app_names).await?;
    let test = build_new_test(&answers)?;
    debug!(job = %test.job, jobspace = %test.jobspace, "registering test");
    let response = ctx.api.create_test(&test).await?;
    ctx.terminal.vtable(&response);

    hooks::install(ctx, &format!("{}-{}", answers.job, answers.jobspace), true).await
}
