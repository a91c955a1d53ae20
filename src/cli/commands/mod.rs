use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        PossibleValuesParser, ValueParser,
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

    Command::new("deckside")
        .about("Marketing site API for a boat detailing business")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("3001")
                .env("DECKSIDE_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("admin-username")
                .long("admin-username")
                .help("Admin account username")
                .env("DECKSIDE_ADMIN_USERNAME")
                .required(true),
        )
        .arg(
            Arg::new("admin-password")
                .long("admin-password")
                .help("Admin account password")
                .env("DECKSIDE_ADMIN_PASSWORD")
                .required(true),
        )
        .arg(
            // No fallback here: a missing signing secret aborts startup
            // instead of degrading to a default value.
            Arg::new("jwt-secret")
                .long("jwt-secret")
                .help("Secret used to sign bearer tokens")
                .env("DECKSIDE_JWT_SECRET")
                .required(true),
        )
        .arg(
            Arg::new("frontend-url")
                .long("frontend-url")
                .help("Frontend origin allowed by CORS")
                .default_value("http://localhost:5173")
                .env("DECKSIDE_FRONTEND_URL"),
        )
        .arg(
            Arg::new("uploads-dir")
                .long("uploads-dir")
                .help("Directory where uploaded images are stored")
                .default_value("./uploads")
                .env("DECKSIDE_UPLOADS_DIR"),
        )
        .arg(
            Arg::new("env")
                .long("env")
                .help("Deployment environment, cookies are marked Secure in production")
                .default_value("dev")
                .env("DECKSIDE_ENV")
                .value_parser(PossibleValuesParser::new(["dev", "production"])),
        )
        .arg(
            Arg::new("token-ttl-hours")
                .long("token-ttl-hours")
                .help("Bearer token validity window in hours")
                .default_value("24")
                .env("DECKSIDE_TOKEN_TTL_HOURS")
                .value_parser(clap::value_parser!(i64).range(1..=24)),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("DECKSIDE_LOG_LEVEL")
                .global(true)
                .action(clap::ArgAction::Count)
                .value_parser(validator_log_level()),
        )
}
