pub mod auth;

use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ColorChoice, Command,
};

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let command = Command::new("hirely")
        .about("Multilingual job board service")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("HIRELY_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("backend-url")
                .short('b')
                .long("backend-url")
                .help("Base URL of the hosted platform, example: https://project.example.co")
                .env("HIRELY_BACKEND_URL")
                .required(true),
        )
        .arg(
            Arg::new("anon-key")
                .long("anon-key")
                .help("Public API key used for auth calls")
                .env("HIRELY_ANON_KEY")
                .required(true),
        )
        .arg(
            Arg::new("service-role-key")
                .long("service-role-key")
                .help("Service key used for table access")
                .env("HIRELY_SERVICE_ROLE_KEY")
                .required(true),
        )
        .arg(
            Arg::new("site-url")
                .long("site-url")
                .help("Public origin of the site, used for OAuth and CORS")
                .env("HIRELY_SITE_URL")
                .default_value("https://hirely.dev"),
        )
        .arg(
            Arg::new("functions-url")
                .long("functions-url")
                .help("Verification functions base URL; omit to use the provider's confirmation links")
                .env("HIRELY_FUNCTIONS_URL"),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("HIRELY_LOG_LEVEL")
                .global(true)
                .action(clap::ArgAction::Count)
                .value_parser(validator_log_level()),
        );

    auth::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "hirely");
        assert_eq!(
            command.get_about().unwrap().to_string(),
            "Multilingual job board service"
        );
        assert_eq!(
            command.get_version().unwrap().to_string(),
            env!("CARGO_PKG_VERSION")
        );
    }

    #[test]
    fn test_check_port_and_backend() {
        let command = new();
        let matches = command.get_matches_from(vec![
            "hirely",
            "--port",
            "8080",
            "--backend-url",
            "https://project.example.co",
            "--anon-key",
            "anon",
            "--service-role-key",
            "service",
        ]);

        assert_eq!(matches.get_one::<u16>("port").copied(), Some(8080));
        assert_eq!(
            matches.get_one::<String>("backend-url").cloned(),
            Some("https://project.example.co".to_string())
        );
        assert_eq!(
            matches.get_one::<String>("site-url").cloned(),
            Some("https://hirely.dev".to_string())
        );
        assert_eq!(matches.get_one::<String>("functions-url"), None);
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("HIRELY_BACKEND_URL", Some("https://project.example.co")),
                ("HIRELY_ANON_KEY", Some("anon")),
                ("HIRELY_SERVICE_ROLE_KEY", Some("service")),
                ("HIRELY_PORT", Some("443")),
                ("HIRELY_SITE_URL", Some("http://localhost:5173")),
                ("HIRELY_LOG_LEVEL", Some("info")),
            ],
            || {
                let command = new();
                let matches = command.get_matches_from(vec!["hirely"]);
                assert_eq!(matches.get_one::<u16>("port").copied(), Some(443));
                assert_eq!(
                    matches.get_one::<String>("backend-url").cloned(),
                    Some("https://project.example.co".to_string())
                );
                assert_eq!(
                    matches.get_one::<String>("site-url").cloned(),
                    Some("http://localhost:5173".to_string())
                );
                assert_eq!(matches.get_one::<u8>("verbosity").copied(), Some(2));
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        // loop cover all possible value_parse
        let levels = vec!["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars(
                [
                    ("HIRELY_LOG_LEVEL", Some(level)),
                    ("HIRELY_BACKEND_URL", Some("https://project.example.co")),
                    ("HIRELY_ANON_KEY", Some("anon")),
                    ("HIRELY_SERVICE_ROLE_KEY", Some("service")),
                ],
                || {
                    let command = new();
                    let matches = command.get_matches_from(vec!["hirely"]);
                    assert_eq!(
                        matches.get_one::<u8>("verbosity").copied(),
                        Some(index as u8)
                    );
                },
            );
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        let levels = vec!["error", "warn", "info", "debug", "trace"];
        for (index, _) in levels.iter().enumerate() {
            temp_env::with_vars([("HIRELY_LOG_LEVEL", None::<String>)], || {
                let mut args = vec![
                    "hirely".to_string(),
                    "--backend-url".to_string(),
                    "https://project.example.co".to_string(),
                    "--anon-key".to_string(),
                    "anon".to_string(),
                    "--service-role-key".to_string(),
                    "service".to_string(),
                ];

                // Add the appropriate number of "-v" flags based on the index
                if index > 0 {
                    let v = format!("-{}", "v".repeat(index));
                    args.push(v);
                }

                let command = new();

                let matches = command.get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>("verbosity").copied(),
                    Some(index as u8)
                );
            });
        }
    }
}
