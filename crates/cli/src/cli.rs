//! Command tree of the `taas` binary.
//!
//! Beta commands are always registered so they can be refused with a clear
//! message, but they are hidden from help unless beta commands are enabled.

use clap::{Arg, ArgAction, Command, value_parser};

/// Every `(group, command)` pair, with `""` as the command for top-level
/// commands, that is only available with beta commands enabled. `"*"` covers
/// a whole group.
pub const BETA_COMMANDS: [(&str, &str); 5] = [
    ("tests", "audits"),
    ("tail", ""),
    ("config", "multiset"),
    ("config", "multiunset"),
    ("cron", "*"),
];

/// Whether `group`/`command` needs beta commands enabled.
pub fn is_beta(group: &str, command: &str) -> bool {
    BETA_COMMANDS
        .iter()
        .any(|(beta_group, beta_command)| *beta_group == group && (*beta_command == command || *beta_command == "*"))
}

/// Build the complete command tree.
///
/// # Arguments
///
/// * `beta` - Whether beta commands are listed in help output
pub fn build_cli(beta: bool) -> Command {
    Command::new("taas")
        .about("Manage tests-as-a-service: register tests, inspect runs, tail logs")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(tests_command(beta))
        .subcommand(Command::new("images").about("List the images used by registered tests"))
        .subcommand(runs_command())
        .subcommand(Command::new("logs").about("Show the log output of a run").arg(id_arg("Run UUID or test name")))
        .subcommand(
            Command::new("tail")
                .about("Follow the live logs of a test")
                .hide(!beta)
                .arg(id_arg("Test name")),
        )
        .subcommand(config_command(beta))
        .subcommand(secret_command())
        .subcommand(
            Command::new("hooks")
                .about("Manage the platform hooks that trigger tests")
                .subcommand_required(true)
                .subcommand(
                    Command::new("create")
                        .about("Install the release and build hooks for a test")
                        .arg(id_arg("Test name")),
                ),
        )
        .subcommand(Command::new("running").about("List the tests that are currently running"))
        .subcommand(cron_command(beta))
}

fn id_arg(help: &'static str) -> Arg {
    Arg::new("id").value_name("ID").help(help).required(true)
}

fn tests_command(beta: bool) -> Command {
    let test = || id_arg("Test name");
    Command::new("tests")
        .about("Manage registered tests")
        .subcommand_required(true)
        .subcommand(Command::new("list").about("List registered tests"))
        .subcommand(Command::new("info").about("Show a test's configuration").arg(test()))
        .subcommand(Command::new("register").about("Register a new test interactively"))
        .subcommand(
            Command::new("update")
                .about("Change a single property of a test")
                .arg(test())
                .arg(
                    Arg::new("property_arg")
                        .value_name("PROPERTY")
                        .help("Property to change")
                        .required_unless_present("property")
                        .conflicts_with("property"),
                )
                .arg(
                    Arg::new("value_arg")
                        .value_name("VALUE")
                        .help("New value")
                        .required_unless_present("value")
                        .conflicts_with("value"),
                )
                .arg(Arg::new("property").short('p').long("property").value_name("PROPERTY").hide(true))
                .arg(Arg::new("value").short('v').long("value").value_name("VALUE").hide(true)),
        )
        .subcommand(Command::new("destroy").about("Delete a test").arg(test()))
        .subcommand(Command::new("trigger").about("Run a test against the latest release").arg(test()))
        .subcommand(Command::new("runs").about("List the runs of a test").arg(test()))
        .subcommand(
            Command::new("audits")
                .about("Show the change history of a test")
                .hide(!beta)
                .arg(test()),
        )
}

fn runs_command() -> Command {
    let run = || id_arg("Run UUID");
    Command::new("runs")
        .about("Inspect test runs")
        .subcommand_required(true)
        .subcommand(Command::new("info").about("Show the details of a run").arg(run()))
        .subcommand(
            Command::new("output")
                .about("Show the log output of a run")
                .arg(id_arg("Run UUID or test name")),
        )
        .subcommand(Command::new("rerun").about("Run a test again with a run's release").arg(run()))
        .subcommand(Command::new("artifacts").about("Print the artifacts link of a run").arg(run()))
        .subcommand(Command::new("current").about("List the tests that are currently running").hide(true))
}

fn filter_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("prefix")
                .short('p')
                .long("prefix")
                .value_name("PREFIX")
                .help("Select tests whose name starts with PREFIX"),
        )
        .arg(
            Arg::new("suffix")
                .short('s')
                .long("suffix")
                .value_name("SUFFIX")
                .help("Select tests whose name ends with SUFFIX"),
        )
}

fn config_command(beta: bool) -> Command {
    let test = || id_arg("Test name");
    Command::new("config")
        .about("Manage a test's environment variables")
        .subcommand_required(true)
        .subcommand(
            Command::new("list")
                .about("List environment variables")
                .arg(test())
                .arg(
                    Arg::new("simple")
                        .short('s')
                        .long("simple")
                        .help("Print KEY=value lines")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("exports")
                        .short('e')
                        .long("exports")
                        .help("Print shell export statements")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("set")
                .about("Set an environment variable")
                .arg(test())
                .arg(Arg::new("pair").value_name("KVPAIR").help("KEY=value").required(true)),
        )
        .subcommand(
            Command::new("unset")
                .about("Remove an environment variable")
                .arg(test())
                .arg(Arg::new("name").value_name("VAR").required(true)),
        )
        .subcommand(filter_args(
            Command::new("multiset")
                .about("Set a variable on every matching test")
                .hide(!beta)
                .arg(Arg::new("pair").value_name("KVPAIR").help("KEY=value").required(true)),
        ))
        .subcommand(filter_args(
            Command::new("multiunset")
                .about("Remove a variable from every matching test")
                .hide(!beta)
                .arg(Arg::new("name").value_name("KEY").required(true)),
        ))
}

fn plan_command(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .arg(id_arg("Test name"))
        .arg(
            Arg::new("plan_arg")
                .value_name("PLAN")
                .help("Addon plan as service:plan")
                .required_unless_present("plan")
                .conflicts_with("plan"),
        )
        .arg(Arg::new("plan").short('p').long("plan").value_name("PLAN").hide(true))
}

fn secret_command() -> Command {
    Command::new("secret")
        .about("Manage addon secrets bound to a test")
        .subcommand_required(true)
        .subcommand(plan_command("create", "Bind an addon plan's secrets"))
        .subcommand(plan_command("remove", "Unbind an addon plan's secrets"))
}

fn cron_command(beta: bool) -> Command {
    let job = || id_arg("Cron job ID");
    Command::new("cron")
        .about("Manage scheduled test runs")
        .hide(!beta)
        .subcommand_required(true)
        .subcommand(Command::new("jobs").about("List cron jobs"))
        .subcommand(
            Command::new("create")
                .about("Schedule a test")
                .arg(id_arg("Test name"))
                .arg(
                    Arg::new("cronspec_arg")
                        .value_name("CRONSPEC")
                        .help("Cron expression")
                        .required_unless_present("cronspec")
                        .conflicts_with("cronspec"),
                )
                .arg(
                    Arg::new("command_arg")
                        .value_name("COMMAND")
                        .help("Command overriding the test's")
                        .conflicts_with("command"),
                )
                .arg(Arg::new("cronspec").short('s').long("cronspec").value_name("CRONSPEC").hide(true))
                .arg(Arg::new("command").short('c').long("command").value_name("COMMAND").hide(true)),
        )
        .subcommand(Command::new("destroy").about("Delete a cron job").arg(job()))
        .subcommand(Command::new("info").about("Show a cron job").arg(job()))
        .subcommand(Command::new("enable").about("Enable a cron job").arg(job()))
        .subcommand(Command::new("disable").about("Disable a cron job").arg(job()))
        .subcommand(
            Command::new("runs")
                .about("List the runs of a cron job")
                .arg(job())
                .arg(
                    Arg::new("runs")
                        .short('n')
                        .long("runs")
                        .value_name("N")
                        .help("Number of runs to show")
                        .value_parser(value_parser!(u32)),
                )
                .arg(
                    Arg::new("filter")
                        .short('f')
                        .long("filter")
                        .value_name("FILTER")
                        .help("Only failed or successful runs"),
                ),
        )
}
