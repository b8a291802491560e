//! Error types for loading the collection and the configuration file.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why a single source row was skipped. Rejections are logged and never
/// shown to the reader.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowRejected {
    #[error("missing required field {0}")]
    MissingField(&'static str),

    #[error("field {0} holds the placeholder value 'nan'")]
    PlaceholderValue(&'static str),

    #[error("verse number {0:?} is not a positive integer")]
    BadVerseNumber(String),
}

#[derive(Debug, Error)]
pub enum LoadError {
    /// Ingestion finished but no usable song survived. This is the only load
    /// error the reader ever sees.
    #[error("No bhajan data found in {origin}. Please check the source table format.")]
    EmptyCollection { origin: String },

    #[error("failed to read source database: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to read source file: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse collection document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("source table {0:?} does not exist")]
    MissingTable(String),

    #[error("source table {table:?} is missing required column {column}")]
    MissingColumn { table: String, column: &'static str },
}

impl LoadError {
    /// Whether this error means the source could not be read at all, in
    /// which case the built-in sample collection is used instead.
    pub fn is_unreadable_source(&self) -> bool {
        !matches!(self, LoadError::EmptyCollection { .. })
    }
}

pub type Result<T> = std::result::Result<T, LoadError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("could not locate home directory")]
    NoHomeDirectory,
}
