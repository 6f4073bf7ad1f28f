//! Object store abstractions for transcript persistence
//!
//! Three implementations are available:
//!
//! - `BytescaleStore` - remote Bytescale file storage over its REST API
//! - `FsObjectStore` - a local directory, for development runs
//! - `MemoryObjectStore` - in-process map, for tests
//!
//! All implement the same `ObjectStore` trait, making them interchangeable.

mod implementations;
mod traits;

pub use implementations::{
    BytescaleStore, DEFAULT_API_URL, DEFAULT_CDN_URL, FsObjectStore, MemoryObjectStore,
};
pub use traits::{ObjectEntry, ObjectKind, ObjectStore};

/// Split `/a/b/c.md` into (`/a/b`, `c.md`)
pub(crate) fn split_path(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(idx) => (&path[..idx], &path[idx + 1..]),
        None => ("", path),
    }
}

/// Normalize a folder path: leading slash, no trailing slash
pub(crate) fn normalize_folder(folder: &str) -> String {
    let trimmed = folder.trim_matches('/');
    format!("/{}", trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_path() {
        assert_eq!(split_path("/chat-data/a.md"), ("/chat-data", "a.md"));
        assert_eq!(split_path("/a.md"), ("", "a.md"));
        assert_eq!(split_path("a.md"), ("", "a.md"));
    }

    #[test]
    fn test_normalize_folder() {
        assert_eq!(normalize_folder("chat-data/"), "/chat-data");
        assert_eq!(normalize_folder("/chat-data"), "/chat-data");
        assert_eq!(normalize_folder("/"), "/");
    }
}
