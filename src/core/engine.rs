use crate::core::index::WordCountIndex;
use crate::core::types::Alphabet;
use crate::error::{RackError, Result};
use crate::persistence::{load_from_disk, save_to_disk};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// The index a session works on, plus where it came from and whether it
/// has changed since the last save.
pub struct RackEngine {
    pub index: WordCountIndex,
    counts_path: Option<PathBuf>,
    made_changes: bool,
}

impl RackEngine {
    pub fn new(alphabet: Alphabet) -> Self {
        Self {
            index: WordCountIndex::new(alphabet),
            counts_path: None,
            made_changes: false,
        }
    }

    pub fn with_index(index: WordCountIndex) -> Self {
        Self { index, counts_path: None, made_changes: false }
    }

    /// Loads `path`, or starts an empty index over `alphabet` if the file
    /// does not exist yet. A file that exists but cannot be read or decoded
    /// is an error, so a later save never replaces it.
    pub fn open(path: &Path, alphabet: Alphabet) -> Result<Self> {
        let mut engine = match load_from_disk(path) {
            Ok(index) => {
                info!(path = %path.display(), words = index.len(), "Loaded counts file");
                Self::with_index(index)
            }
            Err(RackError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "No counts file yet, starting empty");
                Self::new(alphabet)
            }
            Err(e) => return Err(e),
        };
        engine.counts_path = Some(path.to_path_buf());
        Ok(engine)
    }

    /// Loads `path`, starting from an empty index over `alphabet` when the
    /// file is missing or cannot be decoded. Later saves go back to `path`.
    /// Only for rebuilding a counts file wholesale; editing uses [`open`](Self::open).
    pub fn from_file_or_new(path: &Path, alphabet: Alphabet) -> Self {
        let mut engine = match load_from_disk(path) {
            Ok(index) => {
                info!(path = %path.display(), words = index.len(), "Loaded counts file");
                Self::with_index(index)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Starting from an empty index");
                Self::new(alphabet)
            }
        };
        engine.counts_path = Some(path.to_path_buf());
        engine
    }

    pub fn counts_path(&self) -> Option<&Path> {
        self.counts_path.as_deref()
    }

    pub fn made_changes(&self) -> bool {
        self.made_changes
    }

    pub fn add_word(&mut self, word: &str) -> bool {
        let added = self.index.insert(word);
        if added {
            debug!(word, "Added");
            self.made_changes = true;
        }
        added
    }

    pub fn delete_word(&mut self, word: &str) -> bool {
        let removed = self.index.delete(word);
        if removed {
            debug!(word, "Deleted");
            self.made_changes = true;
        }
        removed
    }

    /// The `limit` best rack matches for `query`.
    pub fn anagrams(&self, query: &str, limit: usize) -> Vec<&str> {
        let mut matches = self.index.search(query, false);
        matches.truncate(limit);
        matches
    }

    /// Saves to `path`, or to the file the engine was loaded from.
    /// Returns the path written, or `None` when there was nowhere to save.
    pub fn save(&mut self, path: Option<&Path>) -> Result<Option<PathBuf>> {
        let Some(target) = path.map(Path::to_path_buf).or_else(|| self.counts_path.clone()) else {
            return Ok(None);
        };
        save_to_disk(&self.index, &target)?;
        info!(path = %target.display(), words = self.index.len(), "Saved counts file");
        self.made_changes = false;
        self.counts_path = Some(target.clone());
        Ok(Some(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changes_are_tracked_only_when_index_changes() {
        let mut engine = RackEngine::new(Alphabet::default());
        assert!(!engine.made_changes());
        assert!(engine.add_word("rack"));
        assert!(engine.made_changes());

        let mut engine = RackEngine::with_index(engine.index);
        assert!(!engine.add_word("rack"));
        assert!(!engine.delete_word("tile"));
        assert!(!engine.made_changes());
        assert!(engine.delete_word("rack"));
        assert!(engine.made_changes());
    }

    #[test]
    fn anagrams_are_truncated_after_ranking() {
        let mut engine = RackEngine::new(Alphabet::default());
        for word in ["a", "at", "tar", "rat", "art", "star"] {
            engine.add_word(word);
        }
        assert_eq!(engine.anagrams("tars", 3), ["star", "art", "rat"]);
        assert_eq!(engine.anagrams("tars", 100).len(), 6);
        assert!(engine.anagrams("tars", 0).is_empty());
    }

    #[test]
    fn save_without_path_is_a_no_op() {
        let mut engine = RackEngine::new(Alphabet::default());
        engine.add_word("tile");
        assert_eq!(engine.save(None).unwrap(), None);
        assert!(engine.made_changes());
    }

    #[test]
    fn open_starts_empty_only_when_file_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counts.json");
        let engine = RackEngine::open(&path, Alphabet::new("abc").unwrap()).unwrap();
        assert!(engine.index.is_empty());
        assert_eq!(engine.counts_path(), Some(path.as_path()));
    }

    #[test]
    fn open_rejects_undecodable_file_and_leaves_it_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counts.json");
        // "b" sits under a=1, b=0
        let original = r#"{"counts": {"1": {"0": ["a", "b"]}, "0": {"1": ["b"]}}, "char_set": "ab"}"#;
        std::fs::write(&path, original).unwrap();

        let err = RackEngine::open(&path, Alphabet::default()).err().unwrap();
        assert!(matches!(err, RackError::Malformed { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn missing_file_falls_back_to_empty_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let engine = RackEngine::from_file_or_new(&path, Alphabet::new("ab").unwrap());
        assert!(engine.index.is_empty());
        assert_eq!(engine.index.alphabet().to_string(), "ab");
        assert_eq!(engine.counts_path(), Some(path.as_path()));
    }
}
