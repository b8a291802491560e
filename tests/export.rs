use std::fs;

use bhajan_browser::source::{export_json, load_catalog, read_document, sample_collection, SourceSpec};
use bhajan_browser::Origin;
use rusqlite::Connection;

#[test]
fn exported_document_loads_back_identically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("collection.json");
    let collection = sample_collection().unwrap();

    export_json(&collection, &path).unwrap();
    assert_eq!(read_document(&path).unwrap(), collection);

    let spec = SourceSpec::resolve(Some(path.as_path()), "bhajans");
    assert_eq!(spec, SourceSpec::Document { path: path.clone() });
    let catalog = load_catalog(&spec).unwrap();
    assert_eq!(catalog.origin(), &Origin::Document { path });
}

#[test]
fn export_nests_verses_under_songs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("collection.json");
    export_json(&sample_collection().unwrap(), &path).unwrap();

    let document: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let songs = document.as_array().unwrap();
    assert_eq!(songs.len(), 5);
    assert!(songs[0]["verses"].as_array().is_some_and(|verses| !verses.is_empty()));
    assert!(songs[0]["verses"][0]["number"].is_u64());
}

#[test]
fn sqlite_table_loads_and_exports() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("Bhajans.sqlite");
    let conn = Connection::open(&db).unwrap();
    conn.execute_batch(
        "CREATE TABLE bhajans (
            Category TEXT, Bhajan_Title TEXT, Author TEXT, Verse_Number REAL,
            Original TEXT, English TEXT
        );
        INSERT INTO bhajans VALUES ('Śrī Kṛṣṇa', 'Test Song', 'A', 2.0, 'Second', '');
        INSERT INTO bhajans VALUES ('Śrī Kṛṣṇa', 'Test Song', 'A', 1.0, 'First', 'One');",
    )
    .unwrap();
    drop(conn);

    let catalog = load_catalog(&SourceSpec::resolve(Some(db.as_path()), "bhajans")).unwrap();
    let song = catalog.song_by_title("Test Song").unwrap();
    assert_eq!(song.verses.len(), 2);
    assert_eq!(song.verses[0].original, "First");

    let out = dir.path().join("out.json");
    export_json(catalog.collection(), &out).unwrap();
    assert_eq!(read_document(&out).unwrap(), *catalog.collection());
}
