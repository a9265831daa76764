use clap::{App, Arg, SubCommand};
use ecballot::{ElectionConfig, Error};

mod command_e2e;
mod command_keygen;
mod command_params;
mod config;

use command_e2e::*;
use command_keygen::*;
use command_params::*;
use config::Config;

fn main() {
    let election_args = [
        Arg::with_name("candidates")
            .long("candidates")
            .short("c")
            .takes_value(true)
            .default_value("3")
            .help("Number of candidates"),
        Arg::with_name("voters")
            .long("voters")
            .short("n")
            .takes_value(true)
            .default_value("5")
            .help("Maximum number of voters"),
    ];

    let matches = App::new("ECBallot CLI")
        .version("0.1")
        .about("Runs elliptic-curve homomorphic elections")
        .arg(
            Arg::with_name("v")
                .short("v")
                .multiple(true)
                .help("Sets the level of verbosity"),
        )
        .subcommand(SubCommand::with_name("keygen").about("Generate a voter key and print its public part"))
        .subcommand(
            SubCommand::with_name("params")
                .about("Set up an authority and print its public parameters as JSON")
                .args(&election_args),
        )
        .subcommand(
            SubCommand::with_name("e2e")
                .about("Run a complete election in memory")
                .args(&election_args)
                .arg(
                    Arg::with_name("CHOICES")
                        .index(1)
                        .multiple(true)
                        .help("Candidate index chosen by each voter"),
                )
                .arg(
                    Arg::with_name("print-tally")
                        .long("print-tally")
                        .help("Print the per-candidate counts"),
                )
                .arg(
                    Arg::with_name("print-ledger")
                        .long("print-ledger")
                        .help("Print the full audit ledger as JSON"),
                ),
        )
        .get_matches();

    let level = match matches.occurrences_of("v") {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = Config::from_env().unwrap_or_else(|e| fail("config", e));
    log::info!(
        "challenge {:?}, {}-bit voter keys, curve over a {}-bit prime",
        config.challenge,
        config.key_bits,
        config.curve.p.bits()
    );

    let (command, result) = match matches.subcommand() {
        ("keygen", Some(matches)) => ("keygen", command_keygen(matches, &config)),
        ("params", Some(matches)) => ("params", command_params(matches, &config)),
        ("e2e", Some(matches)) => ("e2e", command_e2e(matches, &config)),
        _ => {
            eprintln!("{}", matches.usage());
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        fail(command, e);
    }
}

/// Build the election configuration from `--candidates` / `--voters` and the environment
pub(crate) fn election_config(
    matches: &clap::ArgMatches,
    config: &Config,
) -> Result<ElectionConfig, Error> {
    let number = |name: &str| -> Result<usize, Error> {
        let value = matches.value_of(name).unwrap_or_default();
        value
            .parse()
            .map_err(|_| Error::Configuration(format!("--{} must be a number, got {}", name, value)))
    };

    Ok(
        ElectionConfig::new(number("candidates")?, number("voters")?, config.curve.clone())
            .with_challenge(config.challenge),
    )
}

fn exit_code(e: &Error) -> i32 {
    match e {
        e if e.is_rejection() => 2,
        Error::Configuration(_) | Error::Curve(_) => 3,
        Error::Tally => 4,
        _ => 1,
    }
}

fn fail(command: &str, e: Error) -> ! {
    eprintln!("ecballot {}: {}", command, e);
    std::process::exit(exit_code(&e));
}
