// Builds or extends a counts file from a whitespace-separated word list.
use clap::Parser;
use rack_core::config::IndexOptions;
use rack_core::{logging, RackEngine};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "build_counts")]
struct Args {
    /// Word list, words separated by single spaces and newlines
    input: PathBuf,

    #[command(flatten)]
    index: IndexOptions,

    /// Start from an empty index instead of extending the existing counts file
    #[arg(long = "override")]
    override_existing: bool,
}

fn main() -> rack_core::Result<()> {
    logging::init("build_counts");
    let args = Args::parse();
    let alphabet = args.index.alphabet()?;

    let mut engine = if args.override_existing {
        RackEngine::new(alphabet)
    } else {
        RackEngine::from_file_or_new(&args.index.counts, alphabet)
    };

    let reader = BufReader::new(File::open(&args.input)?);
    let mut added = 0usize;
    for line in reader.lines() {
        let line = line?;
        for word in line.split(' ').filter(|w| !w.is_empty()) {
            if engine.add_word(word) {
                added += 1;
            }
        }
    }
    info!(input = %args.input.display(), added, total = engine.index.len(), "Word list indexed");

    engine.save(Some(&args.index.counts))?;
    Ok(())
}
