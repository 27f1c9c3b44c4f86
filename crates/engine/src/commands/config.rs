//! Environment variables of a single test.

use taas_types::{ConfigVar, parse_env_pair};

use super::diagnostic::env_rows;
use crate::{CommandContext, CommandError};

/// How `config list` prints variables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListFormat {
    /// `NAME=value` lines.
    pub simple: bool,
    /// `export NAME=value` lines.
    pub exports: bool,
}

pub async fn list(ctx: &CommandContext, id: &str, format: ListFormat) -> Result<(), CommandError> {
    let test = ctx.api.get_test(id).await?;
    let env = test.env.unwrap_or_default();
    if env.is_empty() {
        ctx.terminal
            .print(&format!("\nNo environment variables set on ***{id}***!"));
        return Ok(());
    }

    if !format.simple && !format.exports {
        ctx.terminal.table(&env_rows(&env));
        return Ok(());
    }
    if format.simple {
        for var in &env {
            ctx.terminal.raw(&format!("{}={}", var.name, var.value));
        }
    }
    if format.exports {
        for var in &env {
            ctx.terminal.raw(&format!("export {}={}", var.name, var.value));
        }
    }
    Ok(())
}

pub async fn set(ctx: &CommandContext, id: &str, pair: &str) -> Result<(), CommandError> {
    let var = ConfigVar::from(parse_env_pair(pair)?);
    let response = ctx.api.set_config(id, &var).await?;
    ctx.terminal.vtable(&response);
    Ok(())
}

pub async fn unset(ctx: &CommandContext, id: &str, name: &str) -> Result<(), CommandError> {
    let response = ctx.api.unset_config(id, name).await?;
    ctx.terminal.vtable(&response);
    Ok(())
}
