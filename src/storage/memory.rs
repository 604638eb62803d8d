//! In-memory storage implementation.
//!
//! Backed by a shared map of name to bytes. Clones share the same map,
//! which lets a test hold a handle to storage it handed to an engine.

use std::io::{Cursor, Read, Write};
use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::Mutex;

use crate::error::{BiblosError, Result};
use crate::storage::{Storage, StorageInput, StorageOutput};

type FileMap = Arc<Mutex<AHashMap<String, Box<[u8]>>>>;

/// Memory-backed storage, primarily for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    files: FileMap,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn open_input(&self, name: &str) -> Result<Box<dyn StorageInput>> {
        let files = self.files.lock();
        let data = files
            .get(name)
            .ok_or_else(|| BiblosError::storage(format!("file not found: {name}")))?;

        Ok(Box::new(MemoryInput {
            cursor: Cursor::new(data.clone()),
        }))
    }

    fn create_output(&self, name: &str) -> Result<Box<dyn StorageOutput>> {
        Ok(Box::new(MemoryOutput {
            name: name.to_string(),
            buffer: Vec::new(),
            files: Arc::clone(&self.files),
            closed: false,
        }))
    }

    fn create_temp_output(&self, prefix: &str) -> Result<(String, Box<dyn StorageOutput>)> {
        let temp_name = format!("{prefix}_{}.tmp", uuid::Uuid::new_v4());
        let output = self.create_output(&temp_name)?;
        Ok((temp_name, output))
    }

    fn file_exists(&self, name: &str) -> bool {
        self.files.lock().contains_key(name)
    }

    fn delete_file(&self, name: &str) -> Result<()> {
        self.files.lock().remove(name);
        Ok(())
    }

    fn list_files(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.files.lock().keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn file_size(&self, name: &str) -> Result<u64> {
        let files = self.files.lock();
        let data = files
            .get(name)
            .ok_or_else(|| BiblosError::storage(format!("file not found: {name}")))?;
        Ok(data.len() as u64)
    }

    fn rename_file(&self, old_name: &str, new_name: &str) -> Result<()> {
        let mut files = self.files.lock();
        let data = files
            .remove(old_name)
            .ok_or_else(|| BiblosError::storage(format!("file not found: {old_name}")))?;
        files.insert(new_name.to_string(), data);
        Ok(())
    }
}

/// A readable view of an in-memory file.
#[derive(Debug)]
pub struct MemoryInput {
    cursor: Cursor<Box<[u8]>>,
}

impl Read for MemoryInput {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl StorageInput for MemoryInput {
    fn size(&self) -> Result<u64> {
        Ok(self.cursor.get_ref().len() as u64)
    }
}

/// A buffered writer that commits to the file map on close.
#[derive(Debug)]
pub struct MemoryOutput {
    name: String,
    buffer: Vec<u8>,
    files: FileMap,
    closed: bool,
}

impl Write for MemoryOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if self.closed {
            return Err(std::io::Error::other("output is closed"));
        }
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl StorageOutput for MemoryOutput {
    fn close(&mut self) -> Result<()> {
        if !self.closed {
            let mut files = self.files.lock();
            files.insert(self.name.clone(), std::mem::take(&mut self.buffer).into_boxed_slice());
            self.closed = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_invisible_until_close() {
        let storage = MemoryStorage::new();

        let mut output = storage.create_output("model.bin").unwrap();
        output.write_all(b"partial").unwrap();
        assert!(!storage.file_exists("model.bin"));

        output.close().unwrap();
        assert!(storage.file_exists("model.bin"));
        assert_eq!(storage.file_size("model.bin").unwrap(), 7);
    }

    #[test]
    fn test_round_trip() {
        let storage = MemoryStorage::new();

        let mut output = storage.create_output("data").unwrap();
        output.write_all(b"in memory").unwrap();
        output.close().unwrap();

        let mut input = storage.open_input("data").unwrap();
        assert_eq!(input.size().unwrap(), 9);
        let mut content = Vec::new();
        input.read_to_end(&mut content).unwrap();
        assert_eq!(content, b"in memory");
    }

    #[test]
    fn test_clones_share_files() {
        let storage = MemoryStorage::new();
        let clone = storage.clone();

        let mut output = storage.create_output("shared").unwrap();
        output.write_all(b"x").unwrap();
        output.close().unwrap();

        assert!(clone.file_exists("shared"));
    }

    #[test]
    fn test_rename_and_list() {
        let storage = MemoryStorage::new();
        storage.create_output("b").unwrap().close().unwrap();
        storage.create_output("a").unwrap().close().unwrap();

        assert_eq!(storage.list_files().unwrap(), vec!["a", "b"]);

        storage.rename_file("a", "c").unwrap();
        assert_eq!(storage.list_files().unwrap(), vec!["b", "c"]);

        assert!(storage.rename_file("missing", "d").is_err());
    }

    #[test]
    fn test_write_after_close_fails() {
        let storage = MemoryStorage::new();
        let mut output = storage.create_output("f").unwrap();
        output.close().unwrap();
        assert!(output.write_all(b"late").is_err());
    }
}
