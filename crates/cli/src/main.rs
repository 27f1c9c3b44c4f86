use std::sync::Arc;

use anyhow::{Context, Result};
use taas_api::{TaasApi, TaasClient, TaasConfig};
use taas_engine::{CommandContext, RestartCounter};
use taas_util::{StdTerminal, StdinPrompter};
use tracing_subscriber::EnvFilter;

mod cli;
mod dispatch;

use dispatch::{Session, dispatch};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let config = TaasConfig::load().context("loading configuration")?;
    let matches = cli::build_cli(config.beta).get_matches();

    let client = Arc::new(TaasClient::new(&config).context("building HTTP client")?);
    let context = CommandContext::new(
        TaasApi::new(client.clone()),
        Arc::new(StdTerminal::new()),
        Arc::new(StdinPrompter::new()),
    );
    let session = Session {
        context,
        streamer: client,
        restarts: RestartCounter::new(),
        beta: config.beta,
    };

    let code = session.context.report(dispatch(&session, &matches).await);
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

/// Logs go to stderr; `RUST_LOG` overrides the default `warn` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
