// File: src/persistence.rs
use crate::core::counter::count;
use crate::core::index::{Node, WordCountIndex};
use crate::core::types::{Alphabet, CountPath};
use crate::error::{RackError, Result};
use serde::de::{self, DeserializeSeed, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::marker::PhantomData;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// On-disk layouts for a counts file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageFormat {
    /// `{"counts": {...}, "char_set": "..."}`
    Json,
    /// Bincode snapshot, one entry per bucket.
    Binary,
}

impl StorageFormat {
    /// `.bin` files hold snapshots; everything else is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("bin") => StorageFormat::Binary,
            _ => StorageFormat::Json,
        }
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Node::Branch(children) => {
                let mut map = serializer.serialize_map(Some(children.len()))?;
                for (key, child) in children {
                    map.serialize_entry(&key.to_string(), child)?;
                }
                map.end()
            }
            Node::Leaf(words) => words.serialize(serializer),
        }
    }
}

#[derive(Serialize)]
struct PersistedForm<'a> {
    counts: &'a Node,
    char_set: String,
}

/// First pass over a counts document: `counts` is skipped without being built.
#[derive(Deserialize)]
struct CharSetOnly {
    char_set: String,
}

/// Compact snapshot: the tree flattened to its buckets.
#[derive(Serialize, Deserialize)]
struct Snapshot {
    char_set: String,
    buckets: Vec<(CountPath, Vec<String>)>,
}

/// Serializes the index to its JSON counts document.
pub fn encode(index: &WordCountIndex) -> Result<Vec<u8>> {
    let form = PersistedForm {
        counts: index.root(),
        char_set: index.alphabet().to_string(),
    };
    Ok(serde_json::to_vec(&form)?)
}

/// Parses a JSON counts document, checking that every level of `counts`
/// agrees with the depth implied by `char_set`.
///
/// The tree nests once per alphabet character, so the document is read
/// without serde_json's recursion limit, on a stack that grows as needed.
/// Nothing deeper than the alphabet is ever built.
pub fn decode(bytes: &[u8]) -> Result<WordCountIndex> {
    let header: CharSetOnly = from_json_slice(bytes, PhantomData)?;
    let alphabet = Alphabet::new(&header.char_set)?;

    let mut state = DecodeState::default();
    let seed = DocumentSeed { alphabet: &alphabet, state: &mut state };
    match from_json_slice(bytes, seed) {
        Ok(root) => Ok(WordCountIndex::from_parts(alphabet, root, state.len)),
        Err(e) => Err(state.failure.take().unwrap_or(RackError::Json(e))),
    }
}

fn from_json_slice<'de, S>(bytes: &'de [u8], seed: S) -> serde_json::Result<S::Value>
where
    S: DeserializeSeed<'de>,
{
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    deserializer.disable_recursion_limit();
    let value = seed.deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
    deserializer.end()?;
    Ok(value)
}

/// Word total and the first structural error met while walking `counts`.
#[derive(Default)]
struct DecodeState {
    len: usize,
    failure: Option<RackError>,
}

impl DecodeState {
    /// Keeps `err` for the caller and hands serde an error to unwind with.
    fn fail<E: de::Error>(&mut self, err: RackError) -> E {
        let message = err.to_string();
        self.failure.get_or_insert(err);
        E::custom(message)
    }
}

struct DocumentSeed<'a> {
    alphabet: &'a Alphabet,
    state: &'a mut DecodeState,
}

impl<'de, 'a> DeserializeSeed<'de> for DocumentSeed<'a> {
    type Value = Node;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> std::result::Result<Node, D::Error> {
        deserializer.deserialize_map(self)
    }
}

impl<'de, 'a> Visitor<'de> for DocumentSeed<'a> {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a counts document")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Node, A::Error> {
        let mut path = Vec::with_capacity(self.alphabet.len());
        let mut root = None;
        while let Some(key) = map.next_key::<String>()? {
            if key != "counts" {
                map.next_value::<IgnoredAny>()?;
                continue;
            }
            if root.is_some() {
                return Err(de::Error::duplicate_field("counts"));
            }
            root = Some(map.next_value_seed(NodeSeed {
                alphabet: self.alphabet,
                path: &mut path,
                state: &mut *self.state,
            })?);
        }
        root.ok_or_else(|| de::Error::missing_field("counts"))
    }
}

/// One level of `counts`: an object of count keys above bucket depth,
/// an array of words at it.
struct NodeSeed<'a> {
    alphabet: &'a Alphabet,
    path: &'a mut CountPath,
    state: &'a mut DecodeState,
}

impl NodeSeed<'_> {
    fn at_bucket(&self) -> bool {
        self.path.len() == self.alphabet.len()
    }
}

impl<'de, 'a> DeserializeSeed<'de> for NodeSeed<'a> {
    type Value = Node;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> std::result::Result<Node, D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de, 'a> Visitor<'de> for NodeSeed<'a> {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object of counts or an array of words")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Node, A::Error> {
        if self.at_bucket() {
            // early counts files stored an empty object for an empty bucket
            if map.next_key::<IgnoredAny>()?.is_some() {
                let err = RackError::malformed(self.path, "expected an array of words");
                return Err(self.state.fail(err));
            }
            return Ok(Node::Leaf(Vec::new()));
        }

        let mut children = BTreeMap::new();
        while let Some(key) = map.next_key::<String>()? {
            let Some(count) = parse_count_key(&key) else {
                let err = RackError::malformed(self.path, format!("{:?} is not a canonical count", key));
                return Err(self.state.fail(err));
            };
            self.path.push(count);
            let child = map.next_value_seed(NodeSeed {
                alphabet: self.alphabet,
                path: &mut *self.path,
                state: &mut *self.state,
            })?;
            self.path.pop();
            children.insert(count, child);
        }
        Ok(Node::Branch(children))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Node, A::Error> {
        if !self.at_bucket() {
            let err = RackError::malformed(
                self.path,
                format!("expected an object at depth {}", self.path.len()),
            );
            return Err(self.state.fail(err));
        }

        let mut words = Vec::new();
        while let Some(word) = seq.next_element_seed(WordSeed {
            path: &*self.path,
            state: &mut *self.state,
        })? {
            words.push(word);
        }
        if let Err(err) = check_bucket(self.alphabet, self.path, &words) {
            return Err(self.state.fail(err));
        }
        self.state.len += words.len();
        Ok(Node::Leaf(words))
    }
}

/// A bucket entry; anything but a string is a structural error.
struct WordSeed<'a> {
    path: &'a CountPath,
    state: &'a mut DecodeState,
}

impl WordSeed<'_> {
    fn not_a_word<E: de::Error>(self) -> E {
        self.state
            .fail(RackError::malformed(self.path, "bucket entries must be strings"))
    }
}

impl<'de, 'a> DeserializeSeed<'de> for WordSeed<'a> {
    type Value = String;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> std::result::Result<String, D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de, 'a> Visitor<'de> for WordSeed<'a> {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a word")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<String, E> {
        Ok(v)
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> std::result::Result<String, E> {
        Err(self.not_a_word())
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> std::result::Result<String, E> {
        Err(self.not_a_word())
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> std::result::Result<String, E> {
        Err(self.not_a_word())
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> std::result::Result<String, E> {
        Err(self.not_a_word())
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<String, E> {
        Err(self.not_a_word())
    }

    fn visit_seq<A: SeqAccess<'de>>(self, _: A) -> std::result::Result<String, A::Error> {
        Err(self.not_a_word())
    }

    fn visit_map<A: MapAccess<'de>>(self, _: A) -> std::result::Result<String, A::Error> {
        Err(self.not_a_word())
    }
}

/// Canonical non-negative decimal: no sign, no leading zeros.
fn parse_count_key(key: &str) -> Option<u32> {
    let count: u32 = key.parse().ok()?;
    (count.to_string() == key).then_some(count)
}

fn check_bucket(alphabet: &Alphabet, path: &CountPath, words: &[String]) -> Result<()> {
    let mut seen = HashSet::with_capacity(words.len());
    for word in words {
        if !seen.insert(word.as_str()) {
            return Err(RackError::malformed(path, format!("{:?} is listed twice", word)));
        }
        if &alphabet.project(&count(word)) != path {
            return Err(RackError::malformed(
                path,
                format!("{:?} does not belong under this count path", word),
            ));
        }
    }
    Ok(())
}

pub fn encode_binary(index: &WordCountIndex) -> Result<Vec<u8>> {
    let snapshot = Snapshot {
        char_set: index.alphabet().to_string(),
        buckets: index
            .buckets()
            .into_iter()
            .map(|(path, words)| (path, words.to_vec()))
            .collect(),
    };
    Ok(bincode::serialize(&snapshot)?)
}

pub fn decode_binary(bytes: &[u8]) -> Result<WordCountIndex> {
    let snapshot: Snapshot = bincode::deserialize(bytes)?;
    let alphabet = Alphabet::new(&snapshot.char_set)?;
    let mut index = WordCountIndex::new(alphabet);
    for (path, words) in snapshot.buckets {
        if path.len() != index.alphabet().len() {
            return Err(RackError::malformed(
                &path,
                format!("bucket path has {} levels, expected {}", path.len(), index.alphabet().len()),
            ));
        }
        check_bucket(index.alphabet(), &path, &words)?;
        for word in &words {
            index.insert(word);
        }
    }
    Ok(index)
}

/// Writes the index next to `path` and renames it into place.
pub fn save_to_disk(index: &WordCountIndex, path: &Path) -> Result<()> {
    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)?;

    let format = StorageFormat::from_path(path);
    let bytes = match format {
        StorageFormat::Json => encode(index)?,
        StorageFormat::Binary => encode_binary(index)?,
    };

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    let mut writer = BufWriter::new(&temp_file);
    writer.write_all(&bytes)?;
    writer.flush()?;
    drop(writer);

    temp_file.persist(path).map_err(|e| e.error)?;
    debug!(path = %path.display(), ?format, words = index.len(), "Index saved");
    Ok(())
}

pub fn load_from_disk(path: &Path) -> Result<WordCountIndex> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    let format = StorageFormat::from_path(path);
    let index = match format {
        StorageFormat::Json => decode(&bytes)?,
        StorageFormat::Binary => decode_binary(&bytes)?,
    };
    debug!(path = %path.display(), ?format, words = index.len(), "Index loaded");
    Ok(index)
}
