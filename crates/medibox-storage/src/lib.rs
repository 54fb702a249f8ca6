//! Medibox Storage Library
//!
//! This crate provides the object store abstraction used by the handlers and the
//! transcription orchestrator, with an S3 backend and an in-process memory backend.
//!
//! # Key format
//!
//! Keys are flat, `/`-separated strings. Subject objects live under `id_{subject_id}/`
//! (see `medibox_core::keys`); transcription scratch output lives at the bucket root.
//! Keys must not be empty or start with `/`.

pub mod factory;
#[cfg(feature = "storage-memory")]
pub mod memory;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use medibox_core::StorageBackend;
#[cfg(feature = "storage-memory")]
pub use memory::MemoryStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{ObjectHead, Storage, StorageError, StorageResult};
