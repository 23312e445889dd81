//! Local mirror of the working set.
//!
//! The mirror is a single named slot holding the JSON-serialized user
//! list. Unlike a TTL cache it never goes stale: once written it is what
//! every later session starts from.
//!
//! Implementations:
//! - `CacheManager`: JSON file in the per-user cache directory
//! - `MemoryMirror`: in-process slot, shared between clones
//! - `NoMirror`: the non-persisting variant

pub mod manager;
pub mod memory;

pub use manager::{CacheManager, CachedData, MirrorStore};
pub use memory::{MemoryMirror, NoMirror};
