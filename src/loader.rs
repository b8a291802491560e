//! Turns the flat, one-row-per-verse source table into a [`Collection`].
//!
//! Malformed rows are skipped one at a time; the caller decides what an empty
//! result means.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info, warn};

use crate::error::RowRejected;
use crate::models::{Collection, Song, Verse};

/// Column names of the source table.
pub const COL_CATEGORY: &str = "Category";
pub const COL_TITLE: &str = "Bhajan_Title";
pub const COL_AUTHOR: &str = "Author";
pub const COL_VERSE_NUMBER: &str = "Verse_Number";
pub const COL_ORIGINAL: &str = "Original";
pub const COL_ENGLISH: &str = "English";
pub const COL_RUSSIAN: &str = "Russian";
pub const COL_LATVIAN: &str = "Latvian";

/// One raw row as read from the source. Every cell is optional text; all
/// validation happens in [`parse_row`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRow {
    pub category: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub verse_number: Option<String>,
    pub original: Option<String>,
    pub english: Option<String>,
    pub russian: Option<String>,
    pub latvian: Option<String>,
}

/// A row that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    pub title: String,
    pub author: String,
    pub category: String,
    pub verse: Verse,
}

/// Counters describing one ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub accepted: usize,
    pub rejected: usize,
    pub songs: usize,
    pub dropped_empty: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingestion {
    pub collection: Collection,
    pub report: BuildReport,
}

fn clean(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn required(value: Option<&str>, column: &'static str) -> Result<String, RowRejected> {
    clean(value).ok_or(RowRejected::MissingField(column))
}

fn reject_nan(value: String, column: &'static str) -> Result<String, RowRejected> {
    if value.eq_ignore_ascii_case("nan") {
        Err(RowRejected::PlaceholderValue(column))
    } else {
        Ok(value)
    }
}

/// Parse a verse number cell. Integral decimals such as `"3.0"` are accepted.
pub fn parse_verse_number(raw: &str) -> Result<u32, RowRejected> {
    let text = raw.trim();
    let bad = || RowRejected::BadVerseNumber(raw.to_string());

    let number = match text.parse::<i64>() {
        Ok(number) => number,
        Err(_) => {
            let real = text.parse::<f64>().map_err(|_| bad())?;
            if !real.is_finite() || real.fract() != 0.0 {
                return Err(bad());
            }
            real as i64
        }
    };

    if number <= 0 {
        return Err(bad());
    }
    u32::try_from(number).map_err(|_| bad())
}

pub fn parse_row(row: &SourceRow) -> Result<ParsedRow, RowRejected> {
    let title = required(row.title.as_deref(), COL_TITLE)?;
    let author = required(row.author.as_deref(), COL_AUTHOR)?;
    let category = required(row.category.as_deref(), COL_CATEGORY)?;
    let title = reject_nan(title, COL_TITLE)?;
    let author = reject_nan(author, COL_AUTHOR)?;

    let raw_number = row
        .verse_number
        .as_deref()
        .ok_or(RowRejected::MissingField(COL_VERSE_NUMBER))?;
    let number = parse_verse_number(raw_number)?;

    Ok(ParsedRow {
        title,
        author,
        category,
        verse: Verse {
            number,
            original: clean(row.original.as_deref()).unwrap_or_default(),
            english: clean(row.english.as_deref()).unwrap_or_default(),
            russian: clean(row.russian.as_deref()),
            latvian: clean(row.latvian.as_deref()),
        },
    })
}

struct SongDraft {
    title: String,
    author: String,
    category: String,
    verses: BTreeMap<u32, Verse>,
}

/// Run the full ingestion pipeline and report what happened.
pub fn ingest<I>(rows: I) -> Ingestion
where
    I: IntoIterator<Item = SourceRow>,
{
    let mut report = BuildReport::default();
    let mut drafts: Vec<SongDraft> = Vec::new();
    let mut by_title: HashMap<String, usize> = HashMap::new();

    for (row_index, row) in rows.into_iter().enumerate() {
        let parsed = match parse_row(&row) {
            Ok(parsed) => parsed,
            Err(reason) => {
                report.rejected += 1;
                debug!(row = row_index, %reason, "skipping source row");
                continue;
            }
        };
        report.accepted += 1;

        let existing = by_title.get(&parsed.title).copied();
        let slot = match existing {
            Some(slot) => {
                let draft = &drafts[slot];
                if draft.author != parsed.author || draft.category != parsed.category {
                    warn!(
                        title = %parsed.title,
                        kept_author = %draft.author,
                        kept_category = %draft.category,
                        row_author = %parsed.author,
                        row_category = %parsed.category,
                        "conflicting song metadata, keeping first-seen values"
                    );
                }
                slot
            }
            None => {
                drafts.push(SongDraft {
                    title: parsed.title.clone(),
                    author: parsed.author,
                    category: parsed.category,
                    verses: BTreeMap::new(),
                });
                by_title.insert(parsed.title, drafts.len() - 1);
                drafts.len() - 1
            }
        };

        drafts[slot].verses.insert(parsed.verse.number, parsed.verse);
    }

    let mut songs = Vec::with_capacity(drafts.len());
    for draft in drafts {
        if draft.verses.is_empty() {
            report.dropped_empty += 1;
            continue;
        }
        songs.push(Song {
            title: draft.title,
            author: draft.author,
            category: draft.category,
            verses: draft.verses.into_values().collect(),
        });
    }
    report.songs = songs.len();

    info!(
        accepted = report.accepted,
        rejected = report.rejected,
        songs = report.songs,
        "ingested source rows"
    );

    Ingestion {
        collection: Collection::from_songs(songs),
        report,
    }
}

pub fn build_collection<I>(rows: I) -> Collection
where
    I: IntoIterator<Item = SourceRow>,
{
    ingest(rows).collection
}

/// Flatten songs back into source rows, one per verse. Used to re-ingest an
/// exported collection through the same validation.
pub fn rows_from_songs(songs: &[Song]) -> Vec<SourceRow> {
    songs
        .iter()
        .flat_map(|song| {
            song.verses.iter().map(move |verse| SourceRow {
                category: Some(song.category.clone()),
                title: Some(song.title.clone()),
                author: Some(song.author.clone()),
                verse_number: Some(verse.number.to_string()),
                original: Some(verse.original.clone()),
                english: Some(verse.english.clone()),
                russian: verse.russian.clone(),
                latvian: verse.latvian.clone(),
            })
        })
        .collect()
}
