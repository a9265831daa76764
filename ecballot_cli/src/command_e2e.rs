use crate::config::Config;
use ecballot::*;

/// Run a complete election in memory, one fresh voter per listed choice
pub fn command_e2e(matches: &clap::ArgMatches, config: &Config) -> Result<(), Error> {
    let election = crate::election_config(matches, config)?;

    let mut choices = Vec::new();
    for choice in matches.values_of("CHOICES").into_iter().flatten() {
        let choice: usize = choice.parse().map_err(|_| {
            Error::Configuration(format!("candidate choice {} is not a number", choice))
        })?;
        choices.push(choice);
    }

    let store = MemStore::new(config.key_bits);
    let authority = store.create_authority(&election)?;

    for choice in choices {
        let voter = store.create_voter()?;
        store.submit_vote(voter, authority, choice)?;
    }
    println!("> {} ballots verified OK", store.public_result(authority)?.voter_count);

    let results = store.open_vote(authority)?;
    println!("> Election opened OK");

    if matches.is_present("print-tally") {
        println!("Tally:");
        for (candidate, count) in results.iter().enumerate() {
            println!("  candidate {} got {} votes", candidate, count);
        }
    }

    if matches.is_present("print-ledger") {
        let ledger = store.public_result(authority)?;
        println!("{}", serde_json::to_string_pretty(&ledger)?);
    }

    Ok(())
}
