//! Storage abstraction for persisted model artifacts.
//!
//! Artifact serialization is written against these traits rather than
//! the filesystem, so the same save/load path runs over a directory on
//! disk ([`FileStorage`]) or an in-memory map ([`MemoryStorage`]) in
//! tests.
//!
//! Writers that need durability follow the temp-then-rename protocol:
//! [`Storage::create_temp_output`] for a uniquely named scratch file,
//! [`StorageOutput::close`] to flush it, then [`Storage::rename_file`]
//! over the final name. A crash mid-write leaves at most a stray temp
//! file, never a truncated artifact under the real name.

pub mod file;
pub mod memory;

use std::io::{Read, Write};

use crate::error::Result;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// A pluggable storage backend for named byte streams.
pub trait Storage: Send + Sync + std::fmt::Debug {
    /// Open a file for reading.
    fn open_input(&self, name: &str) -> Result<Box<dyn StorageInput>>;

    /// Create a file for writing, truncating any existing content.
    fn create_output(&self, name: &str) -> Result<Box<dyn StorageOutput>>;

    /// Create a uniquely named temporary file for writing.
    ///
    /// Returns the generated name together with the output, so the
    /// caller can rename it over the final name once the write is
    /// complete.
    fn create_temp_output(&self, prefix: &str) -> Result<(String, Box<dyn StorageOutput>)>;

    /// Check if a file exists.
    fn file_exists(&self, name: &str) -> bool;

    /// Delete a file. Deleting a missing file is not an error.
    fn delete_file(&self, name: &str) -> Result<()>;

    /// List all files in the storage, sorted by name.
    fn list_files(&self) -> Result<Vec<String>>;

    /// Get the size of a file in bytes.
    fn file_size(&self, name: &str) -> Result<u64>;

    /// Rename a file, replacing any existing file at the new name.
    fn rename_file(&self, old_name: &str, new_name: &str) -> Result<()>;
}

/// A readable stream from storage.
pub trait StorageInput: Read + Send + std::fmt::Debug {
    /// Get the total size of the stream in bytes.
    fn size(&self) -> Result<u64>;
}

/// A writable stream into storage.
pub trait StorageOutput: Write + Send + std::fmt::Debug {
    /// Flush buffered writes and make the content durable.
    ///
    /// For [`MemoryStorage`] this is the commit point: content written
    /// before `close` is invisible to readers.
    fn close(&mut self) -> Result<()>;
}
