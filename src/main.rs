use clap::Parser as ClapParser;
use siftql::cli::{self, CliError, RunOptions, RunOutcome};
use std::io::{self, Read};

#[derive(ClapParser)]
#[command(name = "siftql")]
#[command(about = "siftql - query JSON record collections with a SQL-like language")]
#[command(version)]
struct Cli {
    /// The query to compile and run
    query: String,

    /// JSON array of records (reads from stdin if not provided)
    #[arg(short, long)]
    input: Option<String>,

    /// Pretty-print the output
    #[arg(short, long)]
    pretty: bool,

    /// Only validate syntax, don't execute
    #[arg(long)]
    check: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let input = match cli.input {
        Some(s) => Some(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(CliError::Io)?;
            Some(buffer)
        }
        None => None,
    };

    let options = RunOptions {
        query: cli.query,
        input,
        check_only: cli.check,
    };

    match cli::run(&options)? {
        RunOutcome::SyntaxValid => println!("Syntax is valid"),
        RunOutcome::Results(results) => {
            let json = if cli.pretty {
                serde_json::to_string_pretty(&results)
            } else {
                serde_json::to_string(&results)
            }
            .map_err(CliError::Json)?;
            println!("{}", json);
        }
    }
    Ok(())
}
