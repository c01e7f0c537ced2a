use domain::errors::RagError;
use infrastructure::document_ingestor::DocumentIngestor;
use tests::{FakeStorage, GOOGLE_DOC, PDF, TEXT};

const LONG_TEXT: &str = "Quarterly goals: reduce costs and ship the new portal.";

#[tokio::test]
async fn test_only_supported_types_are_ingested() {
    let storage = FakeStorage::new()
        .with_text("1", "notes.txt", LONG_TEXT)
        .with_file("2", "photo.png", "image/png", "image/png", b"\x89PNG not really text at all")
        .with_file(
            "3",
            "Roadmap",
            GOOGLE_DOC,
            TEXT,
            b"Roadmap: migrate the billing service next spring.",
        );

    let documents = DocumentIngestor::new(&storage).ingest().await.unwrap();

    let names: Vec<&str> = documents.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["notes.txt", "Roadmap"]);
    assert_eq!(documents[0].text, LONG_TEXT);
    // The unsupported file is never downloaded.
    assert_eq!(storage.downloads(), 2);
}

#[tokio::test]
async fn test_text_must_exceed_minimum_length() {
    let storage = FakeStorage::new()
        .with_text("exact", "exact.txt", &"x".repeat(20))
        .with_text("longer", "longer.txt", &"y".repeat(21))
        .with_text("padded", "padded.txt", &format!("   {}   ", "z".repeat(20)));

    let documents = DocumentIngestor::new(&storage).ingest().await.unwrap();

    let ids: Vec<&str> = documents.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["longer"]);
}

#[tokio::test]
async fn test_minimum_length_is_configurable() {
    let storage = FakeStorage::new().with_text("short", "short.txt", "tiny note");

    let documents = DocumentIngestor::new(&storage)
        .with_min_text_chars(3)
        .ingest()
        .await
        .unwrap();
    assert_eq!(documents.len(), 1);
}

#[tokio::test]
async fn test_failing_files_are_skipped() {
    let storage = FakeStorage::new()
        .with_broken("1", "gone.txt", TEXT)
        .with_file("2", "scan.pdf", PDF, PDF, b"%PDF-1.4 this is not a real pdf")
        .with_text("3", "kept.txt", LONG_TEXT);

    let documents = DocumentIngestor::new(&storage).ingest().await.unwrap();

    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].id, "3");
    assert_eq!(storage.downloads(), 3);
}

#[tokio::test]
async fn test_listing_failure_is_an_error() {
    let storage = FakeStorage::new()
        .with_text("1", "notes.txt", LONG_TEXT)
        .failing_listing();

    let err = DocumentIngestor::new(&storage).ingest().await.unwrap_err();
    assert!(matches!(err, RagError::Storage(_)));
    assert_eq!(storage.downloads(), 0);
}
