use clap::{Arg, ArgAction, Command};

pub fn with_args(command: Command) -> Command {
    let command = with_redirect_args(command);
    with_verification_args(command)
}

fn with_redirect_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("admin-emails")
                .long("admin-emails")
                .help("Comma-separated accounts that always land on the admin dashboard")
                .env("HIRELY_ADMIN_EMAILS")
                .default_value("admin@example.com,mz2503687@gmail.com,it@haixin.org"),
        )
        .arg(
            Arg::new("verified-redirect-path")
                .long("verified-redirect-path")
                .help("Path the provider's confirmation link lands on")
                .env("HIRELY_VERIFIED_REDIRECT_PATH")
                .default_value("/dashabi/login?verified=true"),
        )
}

fn with_verification_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("resend-cooldown-seconds")
                .long("resend-cooldown-seconds")
                .help("Cooldown before the verification code can be re-sent")
                .env("HIRELY_RESEND_COOLDOWN_SECONDS")
                .default_value("60")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("verification-session-ttl-seconds")
                .long("verification-session-ttl-seconds")
                .help("How long an abandoned verification session is kept")
                .env("HIRELY_VERIFICATION_SESSION_TTL_SECONDS")
                .default_value("900")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("expose-debug-codes")
                .long("expose-debug-codes")
                .help("Surface development-mode debug codes from the functions endpoint; never enable in production")
                .env("HIRELY_EXPOSE_DEBUG_CODES")
                .action(ArgAction::SetTrue),
        )
}

#[cfg(test)]
mod tests {
    use super::super::new;

    #[test]
    fn verification_defaults() {
        temp_env::with_vars(
            [
                ("HIRELY_BACKEND_URL", Some("https://project.example.co")),
                ("HIRELY_ANON_KEY", Some("anon")),
                ("HIRELY_SERVICE_ROLE_KEY", Some("service")),
            ],
            || {
                let matches = new().get_matches_from(vec!["hirely"]);
                assert_eq!(
                    matches.get_one::<u64>("resend-cooldown-seconds").copied(),
                    Some(60)
                );
                assert_eq!(
                    matches
                        .get_one::<u64>("verification-session-ttl-seconds")
                        .copied(),
                    Some(900)
                );
                assert_eq!(matches.get_flag("expose-debug-codes"), false);
                let admins = matches.get_one::<String>("admin-emails").cloned();
                assert_eq!(
                    admins.as_deref(),
                    Some("admin@example.com,mz2503687@gmail.com,it@haixin.org")
                );
            },
        );
    }

    #[test]
    fn expose_debug_codes_flag() {
        temp_env::with_vars(
            [
                ("HIRELY_BACKEND_URL", Some("https://project.example.co")),
                ("HIRELY_ANON_KEY", Some("anon")),
                ("HIRELY_SERVICE_ROLE_KEY", Some("service")),
            ],
            || {
                let matches =
                    new().get_matches_from(vec!["hirely", "--expose-debug-codes"]);
                assert!(matches.get_flag("expose-debug-codes"));
            },
        );
    }
}
