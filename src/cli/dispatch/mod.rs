//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to the action the binary executes.

use crate::cli::actions::{server::Args, Action};
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let backend_url = matches
        .get_one::<String>("backend-url")
        .cloned()
        .context("missing required argument: --backend-url")?;
    let anon_key = matches
        .get_one::<String>("anon-key")
        .cloned()
        .context("missing required argument: --anon-key")?;
    let service_role_key = matches
        .get_one::<String>("service-role-key")
        .cloned()
        .context("missing required argument: --service-role-key")?;

    Ok(Action::Server(Args {
        port,
        backend_url,
        anon_key,
        service_role_key,
        site_url: matches
            .get_one::<String>("site-url")
            .cloned()
            .unwrap_or_else(|| "https://hirely.dev".to_string()),
        functions_url: matches.get_one::<String>("functions-url").cloned(),
        admin_emails: matches
            .get_one::<String>("admin-emails")
            .cloned()
            .unwrap_or_default(),
        verified_redirect_path: matches
            .get_one::<String>("verified-redirect-path")
            .cloned()
            .unwrap_or_else(|| "/dashabi/login?verified=true".to_string()),
        resend_cooldown_seconds: matches
            .get_one::<u64>("resend-cooldown-seconds")
            .copied()
            .unwrap_or(60),
        verification_session_ttl_seconds: matches
            .get_one::<u64>("verification-session-ttl-seconds")
            .copied()
            .unwrap_or(900),
        expose_debug_codes: matches.get_flag("expose-debug-codes"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_server_action_from_env() {
        temp_env::with_vars(
            [
                ("HIRELY_BACKEND_URL", Some("https://project.example.co")),
                ("HIRELY_ANON_KEY", Some("anon")),
                ("HIRELY_SERVICE_ROLE_KEY", Some("service")),
                ("HIRELY_FUNCTIONS_URL", Some("https://project.example.co/functions/v1")),
            ],
            || {
                let command = crate::cli::commands::new();
                let matches = command.get_matches_from(vec!["hirely"]);
                let action = handler(&matches).expect("action");
                let Action::Server(args) = action;
                assert_eq!(args.port, 8080);
                assert_eq!(args.backend_url, "https://project.example.co");
                assert_eq!(
                    args.functions_url.as_deref(),
                    Some("https://project.example.co/functions/v1")
                );
                assert_eq!(args.resend_cooldown_seconds, 60);
                assert!(!args.expose_debug_codes);
            },
        );
    }
}
