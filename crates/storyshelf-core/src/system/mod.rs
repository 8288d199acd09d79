pub mod file;
pub mod memory;
pub mod persistence;

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use persistence::{validate_key, Persistence};
