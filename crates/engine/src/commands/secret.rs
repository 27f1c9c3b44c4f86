//! Binding addon secrets to a test.

use taas_types::ValidationError;

use crate::{CommandContext, CommandError};

/// Split a `service:plan` argument.
pub fn parse_plan(input: &str) -> Result<(&str, &str), ValidationError> {
    match input.split_once(':') {
        Some((service, plan)) if !service.is_empty() && !plan.is_empty() && !plan.contains(':') => Ok((service, plan)),
        _ => Err(ValidationError::InvalidPlan { input: input.to_string() }),
    }
}

/// The binding spec the platform uses for a plan.
async fn plan_spec(ctx: &CommandContext, plan: &str) -> Result<String, CommandError> {
    let (service, plan) = parse_plan(plan)?;
    Ok(ctx.api.addon_plan(service, plan).await?.spec)
}

pub async fn create(ctx: &CommandContext, id: &str, plan: &str) -> Result<(), CommandError> {
    let spec = plan_spec(ctx, plan).await?;
    let response = ctx.api.bind_secret(id, &spec).await?;
    ctx.terminal.vtable(&response);
    Ok(())
}

pub async fn remove(ctx: &CommandContext, id: &str, plan: &str) -> Result<(), CommandError> {
    let spec = plan_spec(ctx, plan).await?;
    let response = ctx.api.unbind_secret(id, &spec).await?;
    ctx.terminal.vtable(&response);
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use taas_api::Method;

    use super::*;
    use crate::testing::{FakeTransport, harness};

    #[test]
    fn plans_need_service_and_plan() {
        assert_eq!(parse_plan("xisoap-ws:dev").expect("plan"), ("xisoap-ws", "dev"));
        assert!(parse_plan("xisoap-ws").is_err());
        assert!(parse_plan(":dev").is_err());
        assert!(parse_plan("a:b:c").is_err());
    }

    #[tokio::test]
    async fn create_binds_resolved_spec() {
        let harness = harness(
            FakeTransport::new()
                .on(Method::GET, "/addon-services/xisoap-ws/plans/dev", json!({"spec": "xisoap-ws:dev-creds"}))
                .on(Method::POST, "/v1/diagnostic/ui-tests-taas/bind/xisoap-ws%3Adev-creds", json!({"ok": true})),
        );
        create(&harness.context, "ui-tests-taas", "xisoap-ws:dev").await.expect("create");
        assert_eq!(
            harness.transport.paths(Method::POST),
            vec!["/v1/diagnostic/ui-tests-taas/bind/xisoap-ws%3Adev-creds"]
        );
    }

    #[tokio::test]
    async fn remove_unbinds_resolved_spec() {
        let harness = harness(
            FakeTransport::new()
                .on(Method::GET, "/addon-services/svc/plans/basic", json!({"spec": "svc-basic"}))
                .on(Method::DELETE, "/v1/diagnostic/t/bind/svc-basic", json!({})),
        );
        remove(&harness.context, "t", "svc:basic").await.expect("remove");
        assert_eq!(harness.transport.paths(Method::DELETE), vec!["/v1/diagnostic/t/bind/svc-basic"]);
    }

    #[tokio::test]
    async fn invalid_plan_makes_no_request() {
        let harness = harness(FakeTransport::new());
        assert!(create(&harness.context, "t", "nocolon").await.is_err());
        assert!(harness.transport.requests().is_empty());
    }
}
