//! Save/load tests covering both storage backends and failure paths.

use std::io::{self, Write};

use biblos::catalog::{Interaction, Item};
use biblos::engine::{Engine, Query};
use biblos::error::{BiblosError, Result as BiblosResult};
use biblos::hybrid::Method;
use biblos::storage::{FileStorage, MemoryStorage, Storage, StorageInput, StorageOutput};

fn sample_items() -> Vec<Item> {
    vec![
        Item::new("B1", "Dune")
            .with_genre("science fiction")
            .with_description("space politics desert spice empire"),
        Item::new("B2", "Foundation")
            .with_genre("science fiction")
            .with_description("space empire politics psychohistory"),
        Item::new("B3", "Cooking 101").with_description("recipes kitchen butter technique"),
        Item::new("B4", "Hyperion")
            .with_genre("science fiction")
            .with_description("pilgrims space time empire"),
    ]
}

fn sample_interactions() -> Vec<Interaction> {
    vec![
        Interaction::new("u1", "B1", 5.0),
        Interaction::new("u1", "B2", 4.5),
        Interaction::new("u2", "B1", 4.0),
        Interaction::new("u2", "B4", 4.0),
        Interaction::new("u3", "B2", 5.0),
        Interaction::new("u3", "B4", 3.5),
        Interaction::new("u4", "B3", 4.0),
    ]
}

fn trained_engine() -> Engine {
    let mut engine = Engine::new();
    engine.train(sample_items(), sample_interactions()).unwrap();
    engine
}

#[test]
fn test_memory_round_trip_preserves_recommendations()
-> Result<(), Box<dyn std::error::Error>> {
    let engine = trained_engine();
    let storage = MemoryStorage::new();

    engine.save(&storage, "books.model")?;

    let mut loaded = Engine::new();
    loaded.load(&storage, "books.model")?;

    // Every query the trained engine answers, the loaded one answers
    // identically.
    for method in [Method::Content, Method::Collaborative, Method::Hybrid] {
        let before = engine.recommend(&Query::id("B1"), method, 5)?;
        let after = loaded.recommend(&Query::id("B1"), method, 5)?;
        assert_eq!(before, after);
    }
    let before = engine.recommend(&Query::user("u2"), Method::Hybrid, 5)?;
    let after = loaded.recommend(&Query::user("u2"), Method::Hybrid, 5)?;
    assert_eq!(before, after);

    let metadata = &loaded.artifact()?.metadata;
    assert_eq!(metadata.item_count, 4);
    assert_eq!(metadata.user_count, 4);
    assert_eq!(metadata.interaction_count, 7);
    Ok(())
}

#[test]
fn test_file_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let engine = trained_engine();
    let dir = tempfile::TempDir::new()?;

    let storage = FileStorage::new(dir.path())?;
    engine.save(&storage, "books.model")?;

    // Exactly the final artifact on disk, no leftover temp files.
    assert_eq!(storage.list_files()?, vec!["books.model".to_string()]);
    assert!(storage.file_size("books.model")? > 0);

    // A fresh handle on the same directory sees the artifact.
    let reopened = FileStorage::new(dir.path())?;
    let mut loaded = Engine::new();
    loaded.load(&reopened, "books.model")?;

    let before = engine.recommend(&Query::title("Dune"), Method::Hybrid, 3)?;
    let after = loaded.recommend(&Query::title("Dune"), Method::Hybrid, 3)?;
    assert_eq!(before, after);
    Ok(())
}

#[test]
fn test_save_requires_training() {
    let engine = Engine::new();
    let storage = MemoryStorage::new();

    let result = engine.save(&storage, "books.model");
    assert!(matches!(result, Err(BiblosError::NotTrained)));
    assert_eq!(storage.list_files().unwrap().len(), 0);
}

#[test]
fn test_load_missing_artifact() {
    let storage = MemoryStorage::new();
    let mut engine = Engine::new();

    let result = engine.load(&storage, "nope.model");
    assert!(matches!(result, Err(BiblosError::Storage(_))));
    assert!(!engine.is_trained());
}

#[test]
fn test_overwrite_replaces_previous_artifact() -> Result<(), Box<dyn std::error::Error>> {
    let storage = MemoryStorage::new();

    let mut first = Engine::new();
    first.train(sample_items(), sample_interactions())?;
    first.save(&storage, "catalog.model")?;

    let mut second = Engine::new();
    second.train(
        vec![
            Item::new("X1", "Walden").with_description("pond woods solitude nature"),
            Item::new("X2", "Desert Solitaire").with_description("canyon woods nature seasons"),
        ],
        vec![
            Interaction::new("u1", "X1", 5.0),
            Interaction::new("u1", "X2", 4.0),
            Interaction::new("u2", "X1", 4.0),
            Interaction::new("u2", "X2", 5.0),
        ],
    )?;
    second.save(&storage, "catalog.model")?;

    let mut loaded = Engine::new();
    loaded.load(&storage, "catalog.model")?;

    // The loaded engine answers for the second catalog only.
    let results = loaded.recommend(&Query::id("X1"), Method::Hybrid, 3)?;
    assert_eq!(results[0].item_id, "X2");
    let stale = loaded.recommend(&Query::id("B1"), Method::Hybrid, 3);
    assert!(matches!(stale, Err(BiblosError::UnknownItem(_))));

    assert_eq!(storage.list_files()?, vec!["catalog.model".to_string()]);
    Ok(())
}

#[test]
fn test_corrupted_file_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let engine = trained_engine();
    let dir = tempfile::TempDir::new()?;
    let storage = FileStorage::new(dir.path())?;
    engine.save(&storage, "books.model")?;

    // Flip one byte in the middle of the artifact body.
    let path = dir.path().join("books.model");
    let mut bytes = std::fs::read(&path)?;
    let mid = bytes.len() / 2;
    bytes[mid] ^= 0xFF;
    std::fs::write(&path, &bytes)?;

    let mut fresh = Engine::new();
    let result = fresh.load(&storage, "books.model");
    assert!(matches!(result, Err(BiblosError::CorruptArtifact(_))));
    assert!(!fresh.is_trained());
    Ok(())
}

/// Storage whose writes succeed but whose commit always fails, standing
/// in for a full disk or a device error at sync time.
#[derive(Debug)]
struct FailingStorage {
    inner: MemoryStorage,
}

#[derive(Debug)]
struct FailingOutput {
    inner: Box<dyn StorageOutput>,
}

impl Write for FailingOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl StorageOutput for FailingOutput {
    fn close(&mut self) -> BiblosResult<()> {
        Err(BiblosError::storage("simulated device failure at sync"))
    }
}

impl Storage for FailingStorage {
    fn open_input(&self, name: &str) -> BiblosResult<Box<dyn StorageInput>> {
        self.inner.open_input(name)
    }

    fn create_output(&self, name: &str) -> BiblosResult<Box<dyn StorageOutput>> {
        let inner = self.inner.create_output(name)?;
        Ok(Box::new(FailingOutput { inner }))
    }

    fn create_temp_output(&self, prefix: &str) -> BiblosResult<(String, Box<dyn StorageOutput>)> {
        let (name, inner) = self.inner.create_temp_output(prefix)?;
        Ok((name, Box::new(FailingOutput { inner })))
    }

    fn file_exists(&self, name: &str) -> bool {
        self.inner.file_exists(name)
    }

    fn delete_file(&self, name: &str) -> BiblosResult<()> {
        self.inner.delete_file(name)
    }

    fn list_files(&self) -> BiblosResult<Vec<String>> {
        self.inner.list_files()
    }

    fn file_size(&self, name: &str) -> BiblosResult<u64> {
        self.inner.file_size(name)
    }

    fn rename_file(&self, old_name: &str, new_name: &str) -> BiblosResult<()> {
        self.inner.rename_file(old_name, new_name)
    }
}

#[test]
fn test_failed_save_leaves_no_partial_artifact() -> Result<(), Box<dyn std::error::Error>> {
    let engine = trained_engine();
    let storage = FailingStorage {
        inner: MemoryStorage::new(),
    };

    let result = engine.save(&storage, "books.model");
    assert!(matches!(result, Err(BiblosError::Storage(_))));

    // Neither the final name nor any temp file survives the failure.
    assert!(!storage.file_exists("books.model"));
    assert_eq!(storage.list_files()?.len(), 0);

    // The engine itself is unaffected and can save elsewhere.
    let good = MemoryStorage::new();
    engine.save(&good, "books.model")?;
    assert!(good.file_exists("books.model"));
    Ok(())
}
