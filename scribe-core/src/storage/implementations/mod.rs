mod bytescale;
mod fs;
mod memory;

pub use bytescale::{BytescaleStore, DEFAULT_API_URL, DEFAULT_CDN_URL};
pub use fs::FsObjectStore;
pub use memory::MemoryObjectStore;
