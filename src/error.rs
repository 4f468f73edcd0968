// File: src/error.rs
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RackError>;

#[derive(Error, Debug)]
pub enum RackError {
    /// The persisted counts tree does not have the shape its char set implies.
    #[error("malformed index at {path}: {reason}")]
    Malformed { path: String, reason: String },

    /// A char set that cannot serve as an alphabet (repeated characters).
    #[error("invalid alphabet: {0}")]
    InvalidAlphabet(String),

    /// JSON syntax errors and missing `counts` / `char_set` fields.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Binary snapshot error.
    #[error("snapshot error: {0}")]
    Bincode(#[from] bincode::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RackError {
    pub(crate) fn malformed(path: &[u32], reason: impl Into<String>) -> Self {
        let path = if path.is_empty() {
            "counts".to_string()
        } else {
            let keys: Vec<String> = path.iter().map(|k| k.to_string()).collect();
            format!("counts/{}", keys.join("/"))
        };
        RackError::Malformed { path, reason: reason.into() }
    }
}
