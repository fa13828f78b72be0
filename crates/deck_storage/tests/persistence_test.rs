//! Integration tests: store state survives reopening over the same files.

use deck_core::Slide;
use deck_storage::{FileBackend, LocalStore, NewPresentation, SettingsPatch};
use tempfile::tempdir;

fn sample(title: &str) -> NewPresentation {
    NewPresentation {
        title: title.to_string(),
        prompt: "a prompt".to_string(),
        slides: vec![Slide::new("One", "* bullet")],
    }
}

#[tokio::test]
async fn reopened_store_sees_saved_state() {
    let dir = tempdir().unwrap();

    let id = {
        let store = LocalStore::open(FileBackend::new(dir.path())).await.unwrap();
        store.save_credential("AIza0123456789").await;
        store
            .save_settings(SettingsPatch {
                theme: Some("dark".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        store.save_presentation(sample("Persistent")).await.unwrap()
    };

    let store = LocalStore::open(FileBackend::new(dir.path())).await.unwrap();
    let loaded = store.load_presentation(&id).await.unwrap();
    assert_eq!(loaded.title, "Persistent");
    assert_eq!(store.load_credential().await, "AIza0123456789");
    assert_eq!(store.settings().await.theme, "dark");
}

#[tokio::test]
async fn export_import_round_trip_between_stores() {
    let source_dir = tempdir().unwrap();
    let target_dir = tempdir().unwrap();

    let source = LocalStore::open(FileBackend::new(source_dir.path()))
        .await
        .unwrap();
    source.save_presentation(sample("Travels")).await.unwrap();
    let payload = serde_json::to_string(&source.export_all().await).unwrap();

    let target = LocalStore::open(FileBackend::new(target_dir.path()))
        .await
        .unwrap();
    assert!(target.import_all(&payload).await);

    let list = target.presentations().await;
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].title, "Travels");
}

#[tokio::test]
async fn corrupt_presentation_file_fails_open() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("presentations.json"), "{{{ not json").unwrap();

    let store = LocalStore::open(FileBackend::new(dir.path())).await.unwrap();
    assert!(store.presentations().await.is_empty());

    // The store stays usable after the bad read.
    store.save_presentation(sample("Fresh")).await.unwrap();
    assert_eq!(store.presentations().await.len(), 1);
}
