use std::sync::Arc;

use pdf_share::registry::models::{FileId, FileRecord, PDF_MIME};
use pdf_share::registry::{Registry, RegistryError};

fn sample_record(name: &str) -> FileRecord {
    FileRecord::new(FileId::generate(), name, 1024)
}

#[test]
fn test_insert_and_get() {
    let registry = Registry::new();
    let record = sample_record("report.pdf");
    let id = record.id.clone();

    registry.insert(record).unwrap();

    let retrieved = registry.get(&id).expect("record should exist");
    assert_eq!(retrieved.id, id);
    assert_eq!(retrieved.original_name, "report.pdf");
    assert_eq!(retrieved.stored_filename, id.stored_filename());
    assert_eq!(retrieved.size, 1024);
    assert_eq!(retrieved.mimetype, PDF_MIME);
    assert_eq!(retrieved.download_count, 0);
    assert!(registry.get(&id).is_some());
}

#[test]
fn test_get_unknown() {
    let registry = Registry::new();
    assert!(registry.get(&FileId::generate()).is_none());
    assert!(registry.is_empty());
}

#[test]
fn test_insert_duplicate_id() {
    let registry = Registry::new();
    let record = sample_record("a.pdf");
    let id = record.id.clone();
    let mut clash = sample_record("b.pdf");
    clash.id = id.clone();

    registry.insert(record).unwrap();
    assert!(matches!(
        registry.insert(clash),
        Err(RegistryError::DuplicateId(_))
    ));

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get(&id).unwrap().original_name, "a.pdf");
}

#[test]
fn test_record_download() {
    let registry = Registry::new();
    let record = sample_record("a.pdf");
    let id = record.id.clone();
    registry.insert(record).unwrap();

    assert_eq!(registry.record_download(&id), Some(1));
    assert_eq!(registry.record_download(&id), Some(2));
    assert_eq!(registry.get(&id).unwrap().download_count, 2);
}

#[test]
fn test_record_download_unknown() {
    let registry = Registry::new();
    assert_eq!(registry.record_download(&FileId::generate()), None);
}

#[test]
fn test_clones_share_state() {
    let registry = Registry::new();
    let handle = registry.clone();

    let record = sample_record("shared.pdf");
    let id = record.id.clone();
    handle.insert(record).unwrap();

    assert!(registry.get(&id).is_some());
}

#[test]
fn test_concurrent_downloads_are_not_lost() {
    let registry = Arc::new(Registry::new());
    let record = sample_record("hot.pdf");
    let id = record.id.clone();
    registry.insert(record).unwrap();

    let threads: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let id = id.clone();
            std::thread::spawn(move || {
                for _ in 0..250 {
                    registry.record_download(&id).unwrap();
                }
            })
        })
        .collect();
    for t in threads {
        t.join().unwrap();
    }

    assert_eq!(registry.get(&id).unwrap().download_count, 2000);
}

#[tokio::test]
async fn test_concurrent_inserts() {
    let registry = Registry::new();

    let tasks: Vec<_> = (0..32)
        .map(|i| {
            let registry = registry.clone();
            tokio::spawn(async move {
                registry
                    .insert(sample_record(&format!("{i}.pdf")))
                    .unwrap();
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(registry.len(), 32);
}
