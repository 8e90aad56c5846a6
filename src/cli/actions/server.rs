use crate::{
    api,
    auth::{
        codes::CodeClient,
        flow::FlowConfig,
        provider::AuthClient,
        redirect::RedirectPolicy,
        AuthConfig, AuthState,
    },
    cli::globals::GlobalArgs,
    datastore::Datastore,
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub backend_url: String,
    pub anon_key: String,
    pub service_role_key: String,
    pub site_url: String,
    pub functions_url: Option<String>,
    pub admin_emails: String,
    pub verified_redirect_path: String,
    pub resend_cooldown_seconds: u64,
    pub verification_session_ttl_seconds: u64,
    pub expose_debug_codes: bool,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the clients cannot be constructed or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let globals = GlobalArgs::new(
        args.backend_url,
        args.anon_key.into(),
        args.service_role_key.into(),
    );

    debug!("Global args: {:?}", globals);

    let flow = FlowConfig::new()
        .with_resend_cooldown_seconds(args.resend_cooldown_seconds)
        .with_session_ttl_seconds(args.verification_session_ttl_seconds)
        .with_expose_debug_codes(args.expose_debug_codes);

    let policy = RedirectPolicy::new(
        args.admin_emails
            .split(',')
            .map(|email| email.trim().to_string()),
    );

    let auth_config = AuthConfig::new(args.site_url)
        .with_flow(flow)
        .with_policy(policy)
        .with_verified_redirect_path(args.verified_redirect_path);

    let provider = AuthClient::new(&globals.backend_url, globals.anon_key.clone())
        .map_err(|err| anyhow::anyhow!("{err}"))
        .context("Failed to build auth provider client")?;

    let codes = match &args.functions_url {
        Some(functions_url) => Some(
            CodeClient::new(functions_url, globals.anon_key.clone())
                .map_err(|err| anyhow::anyhow!("{err}"))
                .context("Failed to build verification functions client")?,
        ),
        None => None,
    };

    let datastore = Arc::new(
        Datastore::new(&globals.backend_url, globals.service_role_key.clone())
            .context("Failed to build datastore client")?,
    );

    let auth_state = Arc::new(AuthState::new(auth_config, provider, codes));

    api::new(args.port, auth_state, datastore).await
}
