pub mod counter;
pub mod engine;
pub mod index;
pub mod search;
pub mod types;
