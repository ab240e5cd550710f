// Adapters layer: concrete store and storage implementations behind the domain ports.

mod collections;
pub mod json_file;
pub mod local_storage;
pub mod memory;

pub use json_file::JsonFileStore;
pub use local_storage::LocalStorage;
pub use memory::MemoryStore;
