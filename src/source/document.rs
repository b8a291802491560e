use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::loader::{build_collection, rows_from_songs};
use crate::models::{Collection, Song};

const SAMPLE_COLLECTION: &str = include_str!("../../data/sample_collection.json");

/// Write the collection as pretty-printed JSON, one object per song with its
/// verses nested.
pub fn export_json(collection: &Collection, path: &Path) -> Result<()> {
    let mut document = serde_json::to_string_pretty(collection)?;
    document.push('\n');
    fs::write(path, document)?;
    Ok(())
}

/// Parse a collection document. The songs are flattened back into rows and
/// re-ingested so hand-edited documents obey the same rules as a table.
pub fn parse_document(document: &str) -> Result<Collection> {
    let songs: Vec<Song> = serde_json::from_str(document)?;
    Ok(build_collection(rows_from_songs(&songs)))
}

pub fn read_document(path: &Path) -> Result<Collection> {
    let document = fs::read_to_string(path)?;
    parse_document(&document)
}

/// The built-in sample collection.
pub fn sample_collection() -> Result<Collection> {
    parse_document(SAMPLE_COLLECTION)
}
