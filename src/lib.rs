// src/lib.rs

pub mod config;
pub mod core;
pub mod editor;
pub mod error;
pub mod logging;
pub mod persistence;

pub use crate::core::engine::RackEngine;
pub use crate::core::index::WordCountIndex;
pub use crate::core::types::Alphabet;
pub use crate::error::{RackError, Result};
