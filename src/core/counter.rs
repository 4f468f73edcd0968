// File: src/core/counter.rs
use std::collections::HashMap;

/// Occurrences of each character in a case-folded word.
/// Characters that never occur read as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharCounts {
    counts: HashMap<char, u32>,
}

impl CharCounts {
    pub fn get(&self, c: char) -> u32 {
        self.counts.get(&c).copied().unwrap_or(0)
    }
}

/// Counts every character of `word` after lowercasing it.
///
/// Insertion, deletion and search all go through this function, so it is
/// the only place that decides what a letter is.
pub fn count(word: &str) -> CharCounts {
    let mut counts = HashMap::new();
    for c in word.chars().flat_map(char::to_lowercase) {
        *counts.entry(c).or_insert(0) += 1;
    }
    CharCounts { counts }
}
