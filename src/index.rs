//! Navigable groupings over a [`Collection`].
//!
//! A [`Catalog`] owns one collection and the four groupings derived from it.
//! Entries refer to songs by their position in the collection, so a catalog
//! is only ever built whole and never patched.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::keys::{first_line, first_line_key, title_key, IndexKey};
use crate::models::{Collection, Song};

pub const ALPHABET: [char; 26] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S',
    'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

/// One clickable entry of a letter index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetterEntry {
    /// Text shown for the entry: the title, or the extracted first line.
    pub label: String,
    /// Position of the song inside the catalog's collection.
    pub song: usize,
}

/// Songs filed under letters, each section sorted by label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LetterIndex {
    sections: BTreeMap<IndexKey, Vec<LetterEntry>>,
}

impl LetterIndex {
    fn from_entries(entries: impl IntoIterator<Item = (IndexKey, LetterEntry)>) -> Self {
        let mut sections: BTreeMap<IndexKey, Vec<LetterEntry>> = BTreeMap::new();
        for (key, entry) in entries {
            sections.entry(key).or_default().push(entry);
        }
        for entries in sections.values_mut() {
            entries.sort_by(|a, b| a.label.cmp(&b.label));
        }
        Self { sections }
    }

    /// The full A-Z strip, flagging which letters have a section.
    pub fn alphabet(&self) -> impl Iterator<Item = (char, bool)> + '_ {
        ALPHABET
            .iter()
            .map(|&letter| (letter, self.sections.contains_key(&IndexKey::Letter(letter))))
    }

    /// Non-empty sections in display order, `OTHER` last.
    pub fn sections(&self) -> impl Iterator<Item = (IndexKey, &[LetterEntry])> + '_ {
        self.sections
            .iter()
            .map(|(key, entries)| (*key, entries.as_slice()))
    }

    pub fn section(&self, key: IndexKey) -> &[LetterEntry] {
        self.sections
            .get(&key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.sections.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Songs sharing one exact category or author string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    /// Song positions, ordered by title.
    pub songs: Vec<usize>,
}

impl Group {
    pub fn count(&self) -> usize {
        self.songs.len()
    }
}

/// Partition of the collection by a string field, groups ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grouping {
    groups: Vec<Group>,
}

impl Grouping {
    fn build(collection: &Collection, field: impl Fn(&Song) -> &str) -> Self {
        let mut by_name: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (position, song) in collection.songs().iter().enumerate() {
            by_name.entry(field(song)).or_default().push(position);
        }

        let songs = collection.songs();
        let groups = by_name
            .into_iter()
            .map(|(name, mut members)| {
                members.sort_by(|&a, &b| songs[a].title.cmp(&songs[b].title));
                Group {
                    name: name.to_string(),
                    songs: members,
                }
            })
            .collect();
        Self { groups }
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn get(&self, name: &str) -> Option<&Group> {
        self.groups
            .binary_search_by(|group| group.name.as_str().cmp(name))
            .ok()
            .map(|at| &self.groups[at])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Where a catalog's songs came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// The built-in sample, used when no source file exists.
    Sample,
    /// The built-in sample, used because the configured source was unreadable.
    SampleFallback { path: PathBuf },
    /// An SQLite source table.
    Table { path: PathBuf, table: String },
    /// A previously exported collection document.
    Document { path: PathBuf },
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Sample => write!(f, "built-in sample"),
            Origin::SampleFallback { path } => {
                write!(f, "built-in sample ({} unreadable)", path.display())
            }
            Origin::Table { path, table } => write!(f, "{} [{table}]", path.display()),
            Origin::Document { path } => write!(f, "{}", path.display()),
        }
    }
}

/// Headline numbers shown on the home screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub songs: usize,
    pub verses: usize,
    pub categories: usize,
    pub authors: usize,
}

/// A loaded collection together with every index derived from it.
#[derive(Debug, Clone)]
pub struct Catalog {
    collection: Collection,
    origin: Origin,
    by_title: LetterIndex,
    by_first_line: LetterIndex,
    by_category: Grouping,
    by_author: Grouping,
}

impl Catalog {
    pub fn build(collection: Collection, origin: Origin) -> Self {
        let by_title = LetterIndex::from_entries(
            collection
                .songs()
                .iter()
                .enumerate()
                .filter_map(|(position, song)| {
                    let letter = title_key(&song.title)?;
                    Some((
                        IndexKey::Letter(letter),
                        LetterEntry {
                            label: song.title.clone(),
                            song: position,
                        },
                    ))
                }),
        );

        let by_first_line = LetterIndex::from_entries(
            collection
                .songs()
                .iter()
                .enumerate()
                .filter_map(|(position, song)| {
                    let line = first_line(song)?;
                    Some((
                        first_line_key(&line),
                        LetterEntry {
                            label: line,
                            song: position,
                        },
                    ))
                }),
        );

        let by_category = Grouping::build(&collection, |song| song.category.as_str());
        let by_author = Grouping::build(&collection, |song| song.author.as_str());

        Self {
            collection,
            origin,
            by_title,
            by_first_line,
            by_category,
            by_author,
        }
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn song(&self, position: usize) -> Option<&Song> {
        self.collection.songs().get(position)
    }

    pub fn song_by_title(&self, title: &str) -> Option<&Song> {
        self.collection.find(title)
    }

    pub fn by_title(&self) -> &LetterIndex {
        &self.by_title
    }

    pub fn by_first_line(&self) -> &LetterIndex {
        &self.by_first_line
    }

    pub fn by_category(&self) -> &Grouping {
        &self.by_category
    }

    pub fn by_author(&self) -> &Grouping {
        &self.by_author
    }

    pub fn has_song(&self, title: &str) -> bool {
        self.collection.find(title).is_some()
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.by_category.contains(category)
    }

    pub fn has_author(&self, author: &str) -> bool {
        self.by_author.contains(author)
    }

    pub fn stats(&self) -> Stats {
        Stats {
            songs: self.collection.len(),
            verses: self.collection.total_verses(),
            categories: self.by_category.len(),
            authors: self.by_author.len(),
        }
    }
}
