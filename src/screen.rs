//! What each view shows, as plain data for a front-end to paint.

use crate::index::{Catalog, Group, Grouping, LetterIndex, Stats};
use crate::keys::IndexKey;
use crate::models::{Language, Song};
use crate::nav::{Action, NavState, View};

/// A clickable entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub label: String,
    pub action: Action,
    /// Secondary entries, such as the author link below a song title.
    pub secondary: bool,
}

impl Item {
    fn new(label: impl Into<String>, action: Action) -> Self {
        Self {
            label: label.into(),
            action,
            secondary: false,
        }
    }

    fn secondary(label: impl Into<String>, action: Action) -> Self {
        Self {
            label: label.into(),
            action,
            secondary: true,
        }
    }
}

/// A lettered block of a letter index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub key: IndexKey,
    pub items: Vec<Item>,
}

/// One verse ready to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseLine {
    pub number: u32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Home {
        items: Vec<Item>,
        stats: Stats,
    },
    LetterIndex {
        title: String,
        /// Every letter A-Z, `true` when it has a section.
        alphabet: Vec<(char, bool)>,
        sections: Vec<Section>,
    },
    List {
        title: String,
        items: Vec<Item>,
    },
    Song {
        title: String,
        author: String,
        category: String,
        language: Language,
        verses: Vec<VerseLine>,
    },
}

impl Screen {
    /// Every clickable item in display order.
    pub fn items(&self) -> Vec<&Item> {
        match self {
            Screen::Home { items, .. } | Screen::List { items, .. } => items.iter().collect(),
            Screen::LetterIndex { sections, .. } => sections
                .iter()
                .flat_map(|section| section.items.iter())
                .collect(),
            Screen::Song { .. } => Vec::new(),
        }
    }
}

pub(crate) fn bhajan_count(count: usize) -> String {
    if count == 1 {
        "1 bhajan".to_string()
    } else {
        format!("{count} bhajans")
    }
}

/// Append `(n)` after the text unless it is a placeholder, is empty, or
/// already contains that marker.
pub fn with_verse_number(text: &str, number: u32, placeholder: bool) -> String {
    let marker = format!("({number})");
    if placeholder || text.is_empty() || text.contains(&marker) {
        text.to_string()
    } else {
        format!("{text}\n\n{marker}")
    }
}

/// Verses of `song` in `language`, ordered by number.
pub fn verse_lines(song: &Song, language: Language) -> Vec<VerseLine> {
    let mut verses: Vec<_> = song.verses.iter().collect();
    verses.sort_by_key(|verse| verse.number);
    verses
        .into_iter()
        .map(|verse| {
            let text = verse.text(language);
            VerseLine {
                number: verse.number,
                text: with_verse_number(text.as_str(), verse.number, text.is_placeholder()),
            }
        })
        .collect()
}

fn letter_index(title: &str, index: &LetterIndex, catalog: &Catalog) -> Screen {
    let sections = index
        .sections()
        .map(|(key, entries)| Section {
            key,
            items: entries
                .iter()
                .filter_map(|entry| {
                    let song = catalog.song(entry.song)?;
                    Some(Item::new(
                        entry.label.clone(),
                        Action::SelectSong(song.title.clone()),
                    ))
                })
                .collect(),
        })
        .collect();

    Screen::LetterIndex {
        title: title.to_string(),
        alphabet: index.alphabet().collect(),
        sections,
    }
}

fn group_list(title: &str, grouping: &Grouping, select: fn(String) -> Action) -> Screen {
    let items = grouping
        .groups()
        .iter()
        .map(|group| {
            Item::new(
                format!("{} ({})", group.name, bhajan_count(group.count())),
                select(group.name.clone()),
            )
        })
        .collect();
    Screen::List {
        title: title.to_string(),
        items,
    }
}

fn group_songs<'a>(catalog: &'a Catalog, group: Option<&'a Group>) -> impl Iterator<Item = &'a Song> {
    group
        .into_iter()
        .flat_map(|group| group.songs.iter())
        .filter_map(|&position| catalog.song(position))
}

/// Build the screen for `state`. Views naming something missing from the
/// catalog render as empty lists.
pub fn screen(state: &NavState, catalog: &Catalog) -> Screen {
    match &state.view {
        View::Home => Screen::Home {
            items: vec![
                Item::new("Song Index", Action::OpenTitleIndex),
                Item::new("By First Line", Action::OpenFirstLineIndex),
                Item::new("By Category", Action::OpenCategories),
                Item::new("By Author", Action::OpenAuthors),
            ],
            stats: catalog.stats(),
        },
        View::TitleIndex => letter_index("Song Index", catalog.by_title(), catalog),
        View::FirstLineIndex => {
            letter_index("Song Index by First Line", catalog.by_first_line(), catalog)
        }
        View::Categories => group_list("Categories", catalog.by_category(), Action::SelectCategory),
        View::Authors => group_list("Authors", catalog.by_author(), Action::SelectAuthor),
        View::CategoryDetail { category } => {
            let mut items = Vec::new();
            for song in group_songs(catalog, catalog.by_category().get(category)) {
                items.push(Item::new(
                    song.title.clone(),
                    Action::SelectSong(song.title.clone()),
                ));
                items.push(Item::secondary(
                    format!("by {}", song.author),
                    Action::SelectAuthor(song.author.clone()),
                ));
            }
            Screen::List {
                title: category.clone(),
                items,
            }
        }
        View::AuthorDetail { author } => Screen::List {
            title: author.clone(),
            items: group_songs(catalog, catalog.by_author().get(author))
                .map(|song| Item::new(song.title.clone(), Action::SelectSong(song.title.clone())))
                .collect(),
        },
        View::SongDetail { title, .. } => match catalog.song_by_title(title) {
            Some(song) => Screen::Song {
                title: song.title.clone(),
                author: song.author.clone(),
                category: song.category.clone(),
                language: state.language,
                verses: verse_lines(song, state.language),
            },
            None => Screen::List {
                title: title.clone(),
                items: Vec::new(),
            },
        },
    }
}
