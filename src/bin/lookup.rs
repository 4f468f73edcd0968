use clap::Parser;
use rack_core::config::{IndexOptions, DEFAULT_THRESHOLD};
use rack_core::logging;
use rack_core::persistence::load_from_disk;
use std::io::{self, BufRead, Write};

/// Prints the best matches for each rack typed at the prompt.
#[derive(Parser, Debug)]
#[command(name = "rack_lookup")]
struct Args {
    #[command(flatten)]
    index: IndexOptions,

    /// Matches shown per query
    #[arg(long, default_value_t = DEFAULT_THRESHOLD, env = "RACK_THRESHOLD")]
    threshold: usize,

    /// Only show words using exactly the query's letters
    #[arg(long)]
    exact: bool,
}

fn main() -> rack_core::Result<()> {
    logging::init("rack_lookup");
    let args = Args::parse();
    let index = load_from_disk(&args.index.counts)?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut lines = stdin.lock().lines();
    loop {
        write!(stdout, "Enter anagram: ")?;
        stdout.flush()?;
        let Some(line) = lines.next() else {
            writeln!(stdout)?;
            break;
        };
        let query = line?;
        let mut matches = index.search(query.trim(), args.exact);
        matches.truncate(args.threshold);
        writeln!(stdout, "{:?}", matches)?;
    }
    Ok(())
}
