//! Storage module for persistent data
//!
//! SQLite-backed chunk storage and the upload directory.

mod database;
mod uploads;

pub use database::{SqliteStore, DB_FILE_NAME};
pub use uploads::{content_hash, is_allowed, sanitize_filename, UploadArea, ALLOWED_EXTENSIONS};
