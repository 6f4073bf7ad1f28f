//! Chat transcripts persisted as documents in an object store
//!
//! This crate provides:
//! - **Transcript codecs**: `MarkdownCodec` (`### USER` / `### MODEL` sections) and `JsonlCodec`
//! - **Object stores**: the `ObjectStore` trait with Bytescale, filesystem and in-memory backends
//! - **ChatStore**: create / append / read / list / delete of per-chat transcripts
//! - **CompletionGateway**: one completion per turn with a fail-soft `Reply`
//! - **ChatEngine**: the user-turn -> reply -> model-turn flow
//!
//! # Example
//!
//! ```ignore
//! let store = ChatStore::new(Arc::new(MemoryObjectStore::new()), "/chat-data");
//! let engine = ChatEngine::new(store, CompletionGateway::new(model));
//! let id = engine.new_chat().await?;
//! let reply = engine.send(&id, "hi").await?;
//! ```
pub mod engine;
pub mod error;
pub mod gateway;
pub mod ids;
pub mod storage;
pub mod store;
pub mod transcript;

pub use engine::ChatEngine;
pub use error::StoreError;
pub use gateway::{CompletionGateway, DEFAULT_FALLBACK_REPLY, Reply};
pub use ids::ChatId;
pub use storage::{
    BytescaleStore, FsObjectStore, MemoryObjectStore, ObjectEntry, ObjectKind, ObjectStore,
};
pub use store::{ChatStore, ChatSummary, DEFAULT_LIST_LIMIT, DEFAULT_PREVIEW};
pub use transcript::{JsonlCodec, MarkdownCodec, Message, Role, TranscriptCodec};
