use crate::config::Config;
use ecballot::*;

pub fn command_keygen(_matches: &clap::ArgMatches, config: &Config) -> Result<(), Error> {
    let voter = Voter::generate(&mut rand::thread_rng(), config.key_bits)?;
    let public_key = voter.public_key();

    println!("modulus: {}", hex::encode(public_key.n.to_bytes_be()));
    println!("exponent: {}", hex::encode(public_key.e.to_bytes_be()));
    Ok(())
}
