// src/core/types.rs
use crate::core::counter::CharCounts;
use crate::error::{RackError, Result};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Digits, lowercase letters, hyphen, and `?` for blank tiles.
pub const DEFAULT_CHAR_SET: &str = "0123456789abcdefghijklmnopqrstuvwxyz-?";

/// A word's counts projected onto an alphabet, one entry per nesting level.
pub type CountPath = Vec<u32>;

/// The ordered characters that give the index its dimensions.
/// Position `i` in the alphabet is nesting depth `i` in the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    chars: Vec<char>,
}

impl Alphabet {
    /// Builds an alphabet from a char set string, rejecting repeated characters.
    /// An empty char set is allowed and makes the index a single bucket.
    pub fn new(char_set: &str) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut chars = Vec::with_capacity(char_set.len());
        for c in char_set.chars() {
            if !seen.insert(c) {
                return Err(RackError::InvalidAlphabet(format!(
                    "character {:?} appears more than once in {:?}",
                    c, char_set
                )));
            }
            chars.push(c);
        }
        Ok(Self { chars })
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// The count for each alphabet position, in nesting order.
    /// Characters outside the alphabet are dropped here.
    pub fn project(&self, counts: &CharCounts) -> CountPath {
        self.chars.iter().map(|&c| counts.get(c)).collect()
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self { chars: DEFAULT_CHAR_SET.chars().collect() }
    }
}

impl FromStr for Alphabet {
    type Err = RackError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for c in &self.chars {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}
