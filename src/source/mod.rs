//! Reading the collection from wherever it lives: an SQLite source table, an
//! exported JSON document, or the built-in sample.

mod document;
mod table;

use std::path::{Path, PathBuf};

use tracing::{info, warn};

pub use document::{export_json, parse_document, read_document, sample_collection};
pub use table::{fetch_rows, open_source, table_columns, DEFAULT_TABLE};

use crate::error::{LoadError, Result};
use crate::index::{Catalog, Origin};
use crate::loader::ingest;
use crate::models::Collection;

/// Where to load the collection from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    Sample,
    Table { path: PathBuf, table: String },
    Document { path: PathBuf },
}

impl SourceSpec {
    /// Pick the source kind for a configured path. No path, or a path that
    /// does not exist, selects the built-in sample; `.json` files are
    /// exported documents and anything else is an SQLite database.
    pub fn resolve(path: Option<&Path>, table: &str) -> Self {
        let Some(path) = path else {
            return SourceSpec::Sample;
        };
        if !path.exists() {
            info!(path = %path.display(), "source not found, using built-in sample");
            return SourceSpec::Sample;
        }

        let is_document = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_document {
            SourceSpec::Document {
                path: path.to_path_buf(),
            }
        } else {
            SourceSpec::Table {
                path: path.to_path_buf(),
                table: table.to_string(),
            }
        }
    }

    fn read(&self) -> Result<(Collection, Origin)> {
        match self {
            SourceSpec::Sample => Ok((sample_collection()?, Origin::Sample)),
            SourceSpec::Table { path, table } => {
                let conn = open_source(path)?;
                let rows = fetch_rows(&conn, table)?;
                let ingestion = ingest(rows);
                Ok((
                    ingestion.collection,
                    Origin::Table {
                        path: path.clone(),
                        table: table.clone(),
                    },
                ))
            }
            SourceSpec::Document { path } => Ok((
                read_document(path)?,
                Origin::Document { path: path.clone() },
            )),
        }
    }

    fn path(&self) -> Option<&Path> {
        match self {
            SourceSpec::Sample => None,
            SourceSpec::Table { path, .. } | SourceSpec::Document { path } => Some(path),
        }
    }
}

/// Load the collection and build its catalog.
///
/// An unreadable source falls back to the built-in sample. The only error
/// returned to the caller is [`LoadError::EmptyCollection`], or a broken
/// built-in sample.
pub fn load_catalog(spec: &SourceSpec) -> Result<Catalog> {
    let (collection, origin) = match spec.read() {
        Ok(loaded) => loaded,
        Err(err) if err.is_unreadable_source() => {
            warn!(error = %err, "source unreadable, using built-in sample");
            let path = spec.path().map(Path::to_path_buf).unwrap_or_default();
            (sample_collection()?, Origin::SampleFallback { path })
        }
        Err(err) => return Err(err),
    };

    if collection.is_empty() {
        return Err(LoadError::EmptyCollection {
            origin: origin.to_string(),
        });
    }

    info!(songs = collection.len(), %origin, "collection loaded");
    Ok(Catalog::build(collection, origin))
}
