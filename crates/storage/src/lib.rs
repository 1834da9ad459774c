#![forbid(unsafe_code)]

pub mod document;
pub mod patch;
pub mod paths;
pub mod sqlite;

pub use document::{DocumentStore, InMemoryStore, StoreError};
pub use patch::Patch;
pub use paths::DocPath;
