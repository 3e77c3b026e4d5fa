use crate::rest::RestClient;
use blindballot::VotingSession;

pub fn command_vote(matches: &clap::ArgMatches, uri: &str) {
    let identity = matches.value_of("IDENTITY").unwrap();
    let choice = matches.value_of("CHOICE").unwrap();

    let client = RestClient::new(uri);
    let mut session = VotingSession::new(client);

    run_step(session.submit_identity(identity));
    println!("step 1 complete: identity accepted");

    run_step(session.select_ballot(choice));
    let ballot = session.ballot().unwrap();
    println!(
        "step 2 complete: ballot \"{}\" encoded as {}",
        ballot.text(),
        ballot.encoded()
    );
    let params = session.scheme().unwrap().parameters();
    println!(
        "authority parameters: {}",
        serde_json::to_string_pretty(&params).unwrap()
    );

    run_step(session.blind_ballot());
    println!(
        "step 3 complete: blinded ballot {}",
        session.blinded_ballot().unwrap()
    );

    run_step(session.request_signature());
    println!(
        "step 4 complete: blind signature {}",
        session.blind_signature().unwrap()
    );

    run_step(session.unblind_signature());
    println!(
        "step 5 complete: unblinded signature {}",
        session.unblinded_signature().unwrap()
    );

    let receipt = session.submit_vote().unwrap_or_else(|e| {
        eprintln!("blindballot vote: {}", e);
        std::process::exit(1);
    });
    println!("step 6 complete: vote accepted (success = {})", receipt.success);
}

fn run_step(result: Result<(), blindballot::Error>) {
    if let Err(e) = result {
        eprintln!("blindballot vote: {}", e);
        std::process::exit(1);
    }
}
