use rack_core::editor::Editor;
use rack_core::persistence::{load_from_disk, save_to_disk};
use rack_core::{Alphabet, RackEngine, RackError, WordCountIndex};
use std::fs;
use std::io::Cursor;

const QUERIES: &[&str] = &["", "a", "rat", "tars", "stare", "aerst", "zzz", "rrattss", "?a"];

fn sample_index() -> WordCountIndex {
    WordCountIndex::from_words(
        Alphabet::default(),
        ["a", "at", "tar", "rat", "art", "star", "rats", "tears", "stare", "re-ta", "a?"],
    )
}

fn assert_same_answers(left: &WordCountIndex, right: &WordCountIndex) {
    for query in QUERIES {
        for exact in [false, true] {
            assert_eq!(
                left.search(query, exact),
                right.search(query, exact),
                "query {:?} exact={}",
                query,
                exact
            );
        }
    }
}

#[test]
fn json_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("counts.json");
    let index = sample_index();

    save_to_disk(&index, &path).unwrap();
    let loaded = load_from_disk(&path).unwrap();

    assert_eq!(loaded.len(), index.len());
    assert_same_answers(&index, &loaded);

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains(r#""char_set":"0123456789abcdefghijklmnopqrstuvwxyz-?""#));
}

#[test]
fn binary_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("counts.bin");
    let mut index = sample_index();
    index.delete("rat");

    save_to_disk(&index, &path).unwrap();
    let loaded = load_from_disk(&path).unwrap();

    assert!(!loaded.contains_exact("rat"));
    assert_same_answers(&index, &loaded);
}

#[test]
fn save_replaces_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("counts.json");
    fs::write(&path, "stale").unwrap();

    save_to_disk(&sample_index(), &path).unwrap();
    assert_eq!(load_from_disk(&path).unwrap().len(), sample_index().len());
}

#[test]
fn malformed_file_is_reported_by_loader() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("counts.json");
    fs::write(&path, r#"{"counts": {"1": []}, "char_set": "ab"}"#).unwrap();

    assert!(matches!(load_from_disk(&path), Err(RackError::Malformed { .. })));
}

#[test]
fn engine_falls_back_on_malformed_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("counts.json");
    fs::write(&path, "{ not json").unwrap();

    let mut engine = RackEngine::from_file_or_new(&path, Alphabet::new("abc").unwrap());
    assert!(engine.index.is_empty());
    engine.add_word("cab");
    engine.save(None).unwrap();

    let loaded = load_from_disk(&path).unwrap();
    assert_eq!(loaded.alphabet().to_string(), "abc");
    assert!(loaded.contains_exact("cab"));
}

#[test]
fn editor_session_persists_changes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("counts.json");
    save_to_disk(&sample_index(), &path).unwrap();

    let engine = RackEngine::open(&path, Alphabet::default()).unwrap();
    let script = "!del\nrat\n!add\nrates\n!quit\n\n";
    let mut output = Vec::new();
    let mut editor = Editor::new(engine, 10, Cursor::new(script), &mut output);
    editor.run().unwrap();
    assert!(!editor.engine().made_changes());
    drop(editor);

    let output = String::from_utf8(output).unwrap();
    assert!(output.contains("Unsaved changes"));
    assert!(output.contains(&format!("Saving to '{}'", path.display())));

    let loaded = load_from_disk(&path).unwrap();
    assert!(!loaded.contains_exact("rat"));
    assert!(loaded.contains_exact("rates"));
    assert_eq!(loaded.search("rat", true), ["art", "tar"]);
}

#[test]
fn editor_save_to_new_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fresh.bin");

    let engine = RackEngine::new(Alphabet::default());
    let script = format!("tile\n!save {}\n!quit\n", path.display());
    let mut output = Vec::new();
    let mut editor = Editor::new(engine, 10, Cursor::new(script), &mut output);
    editor.run().unwrap();
    drop(editor);

    let output = String::from_utf8(output).unwrap();
    assert!(!output.contains("Unsaved changes"));
    assert!(load_from_disk(&path).unwrap().contains_exact("tile"));
}

#[test]
fn editor_refuses_file_it_cannot_decode() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("counts.json");
    let original = r#"{"counts": {"1": {"0": ["a", "b"]}, "0": {"1": ["b"]}}, "char_set": "ab"}"#;
    fs::write(&path, original).unwrap();

    assert!(RackEngine::open(&path, Alphabet::default()).is_err());
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn long_alphabet_survives_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("counts.json");
    let char_set: String = (0x3041u32..0x3041 + 150).filter_map(char::from_u32).collect();
    let first: String = char_set.chars().take(3).collect();
    let index = WordCountIndex::from_words(Alphabet::new(&char_set).unwrap(), [first.as_str()]);

    save_to_disk(&index, &path).unwrap();
    let engine = RackEngine::open(&path, Alphabet::default()).unwrap();
    assert_eq!(engine.index, index);
}
