//! Core library for userdir.
//!
//! A small user directory: the remote collection client, the local mirror,
//! and the controller that keeps an in-memory working set between the two
//! and serves it a page at a time.

pub mod api;
pub mod cache;
pub mod config;
pub mod directory;
pub mod error;
pub mod models;
pub mod paging;

pub use api::{ApiClient, ApiError, UserSource};
pub use cache::{CacheManager, CachedData, MemoryMirror, MirrorStore, NoMirror};
pub use config::Config;
pub use directory::{LoadState, Origin, UserDirectory};
pub use error::DirectoryError;
pub use models::{NewUser, UserId, UserRecord, UserUpdate};
pub use paging::{PageView, DEFAULT_PAGE_SIZE};
