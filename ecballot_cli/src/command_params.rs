use crate::config::Config;
use ecballot::*;

pub fn command_params(matches: &clap::ArgMatches, config: &Config) -> Result<(), Error> {
    let election = crate::election_config(matches, config)?;
    let authority = TallyAuthority::setup(&mut rand::thread_rng(), &election)?;

    let json = serde_json::to_string_pretty(authority.parameters())?;
    println!("{}", json);
    Ok(())
}
