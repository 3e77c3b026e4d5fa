use clap::{App, Arg, SubCommand};
use num_enum::TryFromPrimitive;

mod command_vote;
mod rest;

#[derive(TryFromPrimitive, PartialEq, Copy, Clone)]
#[repr(u8)]
enum Verbosity {
    Silent = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
}

fn main() {
    let matches = App::new("BlindBallot CLI")
        .version("0.1")
        .about("Runs a blind-signature voting session against an authority")
        .arg(
            Arg::with_name("uri")
                .help("Set the authority uri - can also be set with BLINDBALLOT_URI")
                .required(false),
        )
        .arg(
            Arg::with_name("v")
                .short("v")
                .multiple(true)
                .help("Sets the level of verbosity"),
        )
        .subcommand(
            SubCommand::with_name("vote")
                .about("Walk a voting session through all six protocol steps")
                .arg(
                    Arg::with_name("IDENTITY")
                        .index(1)
                        .required(true)
                        .help("Voter identity token (e.g. matriculation number)"),
                )
                .arg(
                    Arg::with_name("CHOICE")
                        .index(2)
                        .required(true)
                        .help("Candidate to vote for"),
                ),
        )
        .get_matches();

    let verbosity = match matches.occurrences_of("v") {
        0 => Verbosity::Warn,
        _ => Verbosity::Info,
    };

    let env_var = std::env::var("BLINDBALLOT_URI");
    let uri = match matches.value_of("uri") {
        Some(uri) => uri,
        None => env_var.as_deref().unwrap_or("http://localhost:8000"),
    };
    if verbosity as u8 >= 3 {
        println!("URI: {}", uri);
    }

    if let Some(matches) = matches.subcommand_matches("vote") {
        command_vote::command_vote(matches, uri);
    }
}
