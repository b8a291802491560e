//! Domain models for the song collection. These are plain data holders that
//! the loader builds once and every other layer only reads.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One numbered stanza of a song together with its translations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    /// Position of the verse inside its song. Unique per song and always
    /// positive; the loader sorts verses by it.
    pub number: u32,
    /// Original-language text. May be empty but is never substituted.
    pub original: String,
    #[serde(default)]
    pub english: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub russian: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latvian: Option<String>,
}

/// Text chosen for a verse in a given language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerseText<'a> {
    /// The verse carries text for the requested language.
    Present(&'a str),
    /// The translation is missing and the language's fixed placeholder is
    /// shown instead.
    Placeholder(&'static str),
}

impl<'a> VerseText<'a> {
    pub fn as_str(&self) -> &'a str {
        match *self {
            VerseText::Present(text) => text,
            VerseText::Placeholder(text) => text,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, VerseText::Placeholder(_))
    }
}

impl Verse {
    /// Pick the text to display for `language`. The original text is
    /// returned verbatim even when empty; translations fall back to the
    /// language's placeholder when blank.
    pub fn text(&self, language: Language) -> VerseText<'_> {
        let translation = match language {
            Language::Original => return VerseText::Present(&self.original),
            Language::English => Some(self.english.as_str()),
            Language::Russian => self.russian.as_deref(),
            Language::Latvian => self.latvian.as_deref(),
        };

        match translation {
            Some(text) if !text.trim().is_empty() => VerseText::Present(text),
            _ => VerseText::Placeholder(language.unavailable_placeholder().unwrap_or_default()),
        }
    }
}

/// A titled song with its metadata and ordered verses. The title is the
/// natural key inside a [`Collection`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub title: String,
    pub author: String,
    pub category: String,
    pub verses: Vec<Verse>,
}

impl Song {
    pub fn first_verse(&self) -> Option<&Verse> {
        self.verses.first()
    }

    pub fn verse_count(&self) -> usize {
        self.verses.len()
    }
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Languages a verse can be read in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    Original,
    English,
    Russian,
    Latvian,
}

impl Language {
    pub const ALL: [Language; 4] = [
        Language::Original,
        Language::English,
        Language::Russian,
        Language::Latvian,
    ];

    /// Label shown on the language switcher.
    pub fn label(&self) -> &'static str {
        match self {
            Language::Original => "Original",
            Language::English => "English",
            Language::Russian => "Русский",
            Language::Latvian => "Latviešu",
        }
    }

    /// Identifier used in addresses.
    pub fn slug(&self) -> &'static str {
        match self {
            Language::Original => "original",
            Language::English => "english",
            Language::Russian => "russian",
            Language::Latvian => "latvian",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Language::ALL
            .into_iter()
            .find(|language| language.slug().eq_ignore_ascii_case(slug.trim()))
    }

    /// Fixed text shown when a verse lacks this translation, written in the
    /// language itself. The original text is never substituted.
    pub fn unavailable_placeholder(&self) -> Option<&'static str> {
        match self {
            Language::Original => None,
            Language::English => Some("Translation not available"),
            Language::Russian => Some("Перевод недоступен"),
            Language::Latvian => Some("Tulkojums nav pieejams"),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The full set of songs loaded for a session. Built once by the loader and
/// never mutated afterwards; a reload produces a new value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection {
    songs: Vec<Song>,
}

impl Collection {
    pub(crate) fn from_songs(songs: Vec<Song>) -> Self {
        Self { songs }
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn find(&self, title: &str) -> Option<&Song> {
        self.songs.iter().find(|song| song.title == title)
    }

    pub fn position(&self, title: &str) -> Option<usize> {
        self.songs.iter().position(|song| song.title == title)
    }

    /// Distinct categories, recomputed on every call.
    pub fn categories(&self) -> BTreeSet<&str> {
        self.songs.iter().map(|song| song.category.as_str()).collect()
    }

    /// Distinct authors, recomputed on every call.
    pub fn authors(&self) -> BTreeSet<&str> {
        self.songs.iter().map(|song| song.author.as_str()).collect()
    }

    pub fn total_verses(&self) -> usize {
        self.songs.iter().map(Song::verse_count).sum()
    }
}
