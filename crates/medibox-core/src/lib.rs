//! Medibox Core Library
//!
//! This crate provides the configuration, error taxonomy, subject key conventions
//! and request/response models shared by all Medibox crates.

pub mod config;
pub mod error;
pub mod keys;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{BaseConfig, Config, ServiceConfig, TranscribeSettings};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use keys::SubjectId;
pub use storage_types::StorageBackend;
