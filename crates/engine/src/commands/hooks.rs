//! Installing the platform webhooks that trigger test runs.

use taas_api::{ApiError, HookKind};
use taas_types::{Hook, NewHook};
use tracing::{debug, info};

use crate::{CommandContext, CommandError};

/// Shared secret sent with hooks created by the CLI.
const HOOK_SECRET: &str = "merpderp";

/// Host markers identifying a hook as pointing at the TaaS service.
const SERVICE_MARKERS: [&str; 2] = ["taas", "alamo-self-diagnostics"];

/// Whether `hooks` already contain a TaaS hook of `kind`.
pub fn has_hook(hooks: &[Hook], kind: HookKind) -> bool {
    hooks
        .iter()
        .any(|hook| hook.url.contains(kind.path()) && SERVICE_MARKERS.iter().any(|marker| hook.url.contains(marker)))
}

/// Make sure the test's target app notifies the service of releases and builds.
///
/// Current services install their own hooks. Older ones answer 404, in which
/// case the missing hooks are created on the app directly. `quiet` suppresses
/// the final `done`.
pub async fn install(ctx: &CommandContext, id: &str, quiet: bool) -> Result<(), CommandError> {
    match ctx.api.install_hooks(id).await {
        Ok(_) => {
            if !quiet {
                ctx.terminal.print("^^ done ^^");
            }
            return Ok(());
        }
        Err(error) if error.is_not_found() => {
            debug!(test = %id, "hook endpoint missing, creating hooks on the app");
        }
        Err(error) => return Err(error.into()),
    }

    let test = ctx.api.get_test(id).await?;
    let app = test.app_name();
    let hooks = ctx.api.app_hooks(&app).await?;

    for kind in [HookKind::Release, HookKind::Build] {
        if has_hook(&hooks, kind) {
            continue;
        }
        create_hook(ctx, &app, kind).await?;
        ctx.terminal.print(&format!("^^ {} hook added ^^", kind.event()));
    }
    if !quiet {
        ctx.terminal.print("^^ done ^^");
    }
    Ok(())
}

async fn create_hook(ctx: &CommandContext, app: &str, kind: HookKind) -> Result<(), ApiError> {
    let hook = NewHook {
        url: ctx.api.hook_url(kind),
        active: true,
        secret: HOOK_SECRET.to_string(),
        events: vec![kind.event().to_string()],
    };
    info!(app = %app, url = %hook.url, "creating hook");
    ctx.api.create_app_hook(app, &hook).await?;
    Ok(())
}
