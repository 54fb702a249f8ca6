pub mod delete;
pub mod health;
pub mod presigned_urls;
pub mod transcribe;
pub mod upload;
