// --- File: src/core/index.rs
use crate::core::counter::count;
use crate::core::types::{Alphabet, CountPath};
use std::collections::BTreeMap;

/// One level of the count tree.
///
/// A `Branch` at depth `i` is keyed by how many times `alphabet[i]` occurs
/// in a word. Depth `alphabet.len()` is always a `Leaf`: the bucket of words
/// sharing one exact count vector, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Branch(BTreeMap<u32, Node>),
    Leaf(Vec<String>),
}

impl Node {
    /// An empty node for the given depth of an index over `alphabet_len` characters.
    pub(crate) fn empty_at(depth: usize, alphabet_len: usize) -> Self {
        if depth == alphabet_len {
            Node::Leaf(Vec::new())
        } else {
            Node::Branch(BTreeMap::new())
        }
    }

    fn descend(&self, path: &[u32]) -> Option<&Node> {
        let mut node = self;
        for key in path {
            node = match node {
                Node::Branch(children) => children.get(key)?,
                Node::Leaf(_) => return None,
            };
        }
        Some(node)
    }

    fn descend_mut(&mut self, path: &[u32]) -> Option<&mut Node> {
        let mut node = self;
        for key in path {
            node = match node {
                Node::Branch(children) => children.get_mut(key)?,
                Node::Leaf(_) => return None,
            };
        }
        Some(node)
    }
}

/// Words indexed by the multiset of letters they contain.
///
/// Not synchronized: callers that share one index across threads must
/// serialize every `insert`, `delete` and `search` themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordCountIndex {
    alphabet: Alphabet,
    root: Node,
    len: usize,
}

impl WordCountIndex {
    /// A fresh, empty index. Every call builds its own tree.
    pub fn new(alphabet: Alphabet) -> Self {
        let root = Node::empty_at(0, alphabet.len());
        Self { alphabet, root, len: 0 }
    }

    pub fn from_words<I, S>(alphabet: Alphabet, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = Self::new(alphabet);
        for word in words {
            index.insert(word.as_ref());
        }
        index
    }

    /// Reassembles an index from a tree that has already been validated.
    pub(crate) fn from_parts(alphabet: Alphabet, root: Node, len: usize) -> Self {
        Self { alphabet, root, len }
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub(crate) fn root(&self) -> &Node {
        &self.root
    }

    /// Number of words across all buckets.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The key sequence leading to `word`'s bucket.
    pub fn path_for(&self, word: &str) -> CountPath {
        self.alphabet.project(&count(word))
    }

    /// Files `word` under its count vector, creating levels as needed.
    /// Returns false if the word was already there.
    /// O(L) complexity where L is the alphabet length, plus the bucket scan.
    pub fn insert(&mut self, word: &str) -> bool {
        let path = self.path_for(word);
        let depth_limit = path.len();

        let mut node = &mut self.root;
        for (depth, &key) in path.iter().enumerate() {
            node = match node {
                Node::Branch(children) => children
                    .entry(key)
                    .or_insert_with(|| Node::empty_at(depth + 1, depth_limit)),
                Node::Leaf(_) => return false,
            };
        }

        match node {
            Node::Leaf(words) if !words.iter().any(|w| w == word) => {
                words.push(word.to_string());
                self.len += 1;
                true
            }
            _ => false,
        }
    }

    /// Removes `word` from its bucket.
    ///
    /// Walks every alphabet position before deciding: only the bucket at the
    /// end of the full count path can say whether the word is present.
    pub fn delete(&mut self, word: &str) -> bool {
        let path = self.path_for(word);
        let Some(Node::Leaf(words)) = self.root.descend_mut(&path) else {
            return false;
        };
        match words.iter().position(|w| w == word) {
            Some(pos) => {
                words.remove(pos);
                self.len -= 1;
                true
            }
            None => false,
        }
    }

    pub fn contains_exact(&self, word: &str) -> bool {
        self.bucket(word)
            .is_some_and(|words| words.iter().any(|w| w == word))
    }

    /// All words sharing `word`'s exact count vector, whether or not
    /// `word` itself is indexed.
    pub fn bucket(&self, word: &str) -> Option<&[String]> {
        match self.root.descend(&self.path_for(word))? {
            Node::Leaf(words) => Some(words),
            Node::Branch(_) => None,
        }
    }

    /// Every bucket with the path that reaches it, in ascending key order.
    pub fn buckets(&self) -> Vec<(CountPath, &[String])> {
        let mut out = Vec::new();
        let mut path = Vec::with_capacity(self.alphabet.len());
        collect_buckets(&self.root, &mut path, &mut out);
        out
    }
}

impl Default for WordCountIndex {
    fn default() -> Self {
        Self::new(Alphabet::default())
    }
}

fn collect_buckets<'a>(
    node: &'a Node,
    path: &mut CountPath,
    out: &mut Vec<(CountPath, &'a [String])>,
) {
    match node {
        Node::Leaf(words) => out.push((path.clone(), words.as_slice())),
        Node::Branch(children) => {
            for (&key, child) in children {
                path.push(key);
                collect_buckets(child, path, out);
                path.pop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc_index() -> WordCountIndex {
        WordCountIndex::from_words(Alphabet::new("abc").unwrap(), ["aab", "ab", "cab"])
    }

    #[test]
    fn insert_is_idempotent() {
        let mut index = abc_index();
        assert!(index.insert("ba"));
        assert_eq!(index.bucket("ab").unwrap(), ["ab", "ba"]);

        assert!(!index.insert("ba"));
        assert!(index.contains_exact("ba"));
        assert_eq!(index.bucket("ab").unwrap().len(), 2);
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn tree_depth_matches_alphabet() {
        let index = abc_index();
        for (path, _) in index.buckets() {
            assert_eq!(path.len(), 3);
        }
        // "aab" -> a=2, b=1, c=0
        assert_eq!(index.path_for("aab"), vec![2, 1, 0]);
        assert!(matches!(index.root().descend(&[2, 1, 0]), Some(Node::Leaf(_))));
        assert!(matches!(index.root().descend(&[2, 1]), Some(Node::Branch(_))));
    }

    #[test]
    fn characters_outside_alphabet_are_ignored() {
        let mut index = WordCountIndex::new(Alphabet::new("ab").unwrap());
        assert!(index.insert("abz"));
        assert!(index.insert("ab"));
        assert_eq!(index.bucket("ab").unwrap(), ["abz", "ab"]);
        assert!(index.contains_exact("abz"));
    }

    #[test]
    fn insert_folds_case_but_keeps_spelling() {
        let mut index = abc_index();
        assert!(index.insert("CAB"));
        assert_eq!(index.bucket("abc").unwrap(), ["cab", "CAB"]);
    }

    #[test]
    fn delete_descends_the_full_path() {
        let mut index = abc_index();
        assert!(index.delete("ab"));
        assert!(!index.contains_exact("ab"));
        assert!(index.contains_exact("aab"));
        assert!(index.contains_exact("cab"));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn delete_of_absent_word_is_false() {
        let mut index = abc_index();
        // shares a=1 with "ab" but has no bucket
        assert!(!index.delete("abb"));
        // shares its bucket with "cab"
        assert!(!index.delete("bca"));
        // no path at all
        assert!(!index.delete("ccc"));
        assert!(!index.delete(""));
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn deleting_twice_only_succeeds_once() {
        let mut index = abc_index();
        assert!(index.delete("cab"));
        assert!(!index.delete("cab"));
        assert!(index.bucket("cab").unwrap().is_empty());
    }

    #[test]
    fn empty_alphabet_uses_root_bucket() {
        let mut index = WordCountIndex::new(Alphabet::new("").unwrap());
        assert!(index.insert("one"));
        assert!(index.insert("two"));
        assert!(!index.insert("one"));
        assert_eq!(index.bucket("anything").unwrap(), ["one", "two"]);
        assert!(index.delete("one"));
        assert!(!index.contains_exact("one"));
        assert_eq!(index.buckets(), vec![(vec![], &["two".to_string()][..])]);
    }

    #[test]
    fn independent_indexes_do_not_share_state() {
        let mut first = WordCountIndex::default();
        first.insert("shared");
        let second = WordCountIndex::default();
        assert!(second.is_empty());
        assert!(!second.contains_exact("shared"));
    }
}
