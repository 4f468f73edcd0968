// File: src/config.rs
use crate::core::types::{Alphabet, DEFAULT_CHAR_SET};
use crate::error::Result;
use clap::Args;
use std::path::PathBuf;

pub const DEFAULT_COUNTS_PATH: &str = "counts.json";
/// How many ranked matches the editor and lookup loop show.
pub const DEFAULT_THRESHOLD: usize = 10;

/// Where the counts file lives and which alphabet a fresh index uses.
#[derive(Args, Debug, Clone)]
pub struct IndexOptions {
    /// Counts file (`.bin` for a binary snapshot, anything else is JSON)
    #[arg(long, default_value = DEFAULT_COUNTS_PATH, env = "RACK_COUNTS")]
    pub counts: PathBuf,

    /// Characters indexed, in nesting order, when starting a new index
    #[arg(long, default_value = DEFAULT_CHAR_SET, env = "RACK_CHAR_SET")]
    pub char_set: String,
}

impl IndexOptions {
    pub fn alphabet(&self) -> Result<Alphabet> {
        Alphabet::new(&self.char_set)
    }
}
