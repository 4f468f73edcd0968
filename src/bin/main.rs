use clap::Parser;
use rack_core::config::{IndexOptions, DEFAULT_THRESHOLD};
use rack_core::editor::Editor;
use rack_core::{logging, RackEngine};
use std::io::{stdin, stdout};
use tracing::info;

/// Add, delete and look up words in a counts file.
#[derive(Parser, Debug)]
#[command(name = "rack_editor")]
struct Args {
    #[command(flatten)]
    index: IndexOptions,

    /// Matches shown per lookup
    #[arg(long, default_value_t = DEFAULT_THRESHOLD, env = "RACK_THRESHOLD")]
    threshold: usize,
}

fn main() -> rack_core::Result<()> {
    logging::init("rack_editor");
    let args = Args::parse();

    let engine = RackEngine::open(&args.index.counts, args.index.alphabet()?)?;
    info!(counts = %args.index.counts.display(), threshold = args.threshold, "Starting editor");
    println!("Modes: + add, - delete, * anagram. Type '!help' for commands.");

    let mut editor = Editor::new(engine, args.threshold, stdin().lock(), stdout());
    editor.run()
}
