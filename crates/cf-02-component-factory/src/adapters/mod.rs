//! Adapters for file-based parameter storage.

pub mod file_formats;

pub use file_formats::{FileFormat, FileFormats};
