//! Versioned collection store (the application's persistence substrate).

pub mod in_memory;
pub mod json_file;
pub mod r#trait;

pub use in_memory::InMemoryStore;
pub use json_file::JsonFileStore;
pub use r#trait::{Collection, CollectionWrite, DataStore, Snapshot, StoreError, Versioned, load_typed};
