use clap::{Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("fleet-console")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Drive the fleet console's shared data refresh from the terminal")
        .long_about("Runs the console's refresh coordinator against the data sources declared in ~/.fleet-console/config.toml and ./.fleet-console/config.toml. Every registered source reloads in parallel; one failing source never blocks the others.")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("refresh")
                .about("Run one refresh cycle over every configured source")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue)
                )
        )
        .subcommand(
            Command::new("watch")
                .about("Refresh on the configured interval and print the live status")
                .arg(
                    Arg::new("cycles")
                        .long("cycles")
                        .short('n')
                        .help("Number of completed cycles to wait for before exiting")
                        .value_parser(clap::value_parser!(u32).range(1..))
                        .default_value("3")
                )
                .arg(
                    Arg::new("interval-ms")
                        .long("interval-ms")
                        .short('i')
                        .help("Polling interval in milliseconds (overrides config)")
                        .value_parser(clap::value_parser!(u64).range(1..))
                )
        )
        .subcommand(
            Command::new("config")
                .about("Print the effective merged configuration as TOML")
        )
}
