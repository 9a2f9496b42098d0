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

    Command::new("clinigate")
        .about("Hospital administration session client")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("api-url")
                .short('u')
                .long("api-url")
                .help("Base URL of the hospital administration API, example: https://api.hospital.tld")
                .env("CLINIGATE_API_URL")
                .global(true)
                .required(false),
        )
        .arg(
            Arg::new("state-dir")
                .long("state-dir")
                .help("Directory holding the remembered session state (default: $HOME/.clinigate)")
                .env("CLINIGATE_STATE_DIR")
                .global(true),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("CLINIGATE_LOG_LEVEL")
                .global(true)
                .action(clap::ArgAction::Count)
                .value_parser(validator_log_level()),
        )
        .subcommand(
            Command::new("login")
                .about("Sign in and cache the session")
                .arg(
                    Arg::new("login")
                        .short('l')
                        .long("login")
                        .help("Login name")
                        .env("CLINIGATE_LOGIN")
                        .required(true),
                )
                .arg(
                    Arg::new("password")
                        .short('p')
                        .long("password")
                        .help("Password")
                        .env("CLINIGATE_PASSWORD")
                        .required(true),
                )
                .arg(
                    Arg::new("remember")
                        .long("remember")
                        .help("Keep the session across restarts (pass --remember=false for a session-only login)")
                        .value_parser(clap::value_parser!(bool))
                        .default_value("true")
                        .num_args(0..=1)
                        .require_equals(true)
                        .default_missing_value("true"),
                )
                .arg(
                    Arg::new("code")
                        .long("code")
                        .help("6-digit second-factor code, when the account has 2FA enabled"),
                ),
        )
        .subcommand(Command::new("whoami").about("Show the signed-in user"))
        .subcommand(Command::new("menus").about("Show the navigation menu tree"))
        .subcommand(
            Command::new("can")
                .about("Check a capability, example: clinigate can patients create")
                .arg(Arg::new("module").help("Module name").required(true))
                .arg(Arg::new("action").help("Action name").required(true)),
        )
        .subcommand(Command::new("logout").about("Clear the cached session"))
}
