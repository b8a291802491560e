//! Index key extraction. Titles are filed under the first significant letter
//! of the title; first lines go through an ordered pipeline of small steps
//! so each rule can be checked on its own:
//!
//! 1. [`first_physical_line`] keeps the text before the first line break.
//! 2. [`strip_verse_marker`] drops a trailing `(12)` verse marker.
//! 3. [`expand_leading_parenthetical`] unwraps an opening `(cue)`.
//! 4. [`first_line_key`] folds the first alphabetic character.

use std::borrow::Cow;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::folding::index_letter;
use crate::models::Song;

static VERSE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\(\d+\)\s*$").expect("verse marker pattern is valid"));
static LEADING_PARENTHETICAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\(([^)]+)\)").expect("parenthetical pattern is valid"));

/// Bucket a song is filed under in a letter index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndexKey {
    /// One of the 26 uppercase ASCII letters.
    Letter(char),
    /// First lines without any foldable letter. Sorts after `Z`.
    Other,
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKey::Letter(letter) => write!(f, "{letter}"),
            IndexKey::Other => write!(f, "OTHER"),
        }
    }
}

fn is_title_noise(ch: char) -> bool {
    ch == '(' || ch == ')' || ch == '-' || ch.is_whitespace()
}

/// Letter a title is filed under, or `None` when its first significant
/// character does not fold to an ASCII letter.
pub fn title_key(title: &str) -> Option<char> {
    title
        .trim_start_matches(is_title_noise)
        .chars()
        .next()
        .and_then(index_letter)
}

pub fn first_physical_line(text: &str) -> &str {
    text.split('\n').next().unwrap_or_default().trim()
}

pub fn strip_verse_marker(line: &str) -> &str {
    match VERSE_MARKER.find(line) {
        Some(marker) => &line[..marker.start()],
        None => line,
    }
}

/// Replace an opening `(cue)` by its interior, keeping the rest of the line
/// after a single space. Lines with an empty or unclosed cue are returned
/// untouched.
pub fn expand_leading_parenthetical(line: &str) -> Cow<'_, str> {
    let Some(captures) = LEADING_PARENTHETICAL.captures(line) else {
        return Cow::Borrowed(line);
    };
    let (Some(whole), Some(inner)) = (captures.get(0), captures.get(1)) else {
        return Cow::Borrowed(line);
    };

    let inner = inner.as_str().trim();
    if inner.is_empty() {
        return Cow::Borrowed(line);
    }

    let rest = line[whole.end()..].trim();
    if rest.is_empty() {
        Cow::Owned(inner.to_string())
    } else {
        Cow::Owned(format!("{inner} {rest}"))
    }
}

/// Label used for a song in the first-line index. `None` when the first
/// verse has no text on its first line.
pub fn first_line(song: &Song) -> Option<String> {
    let verse = song.first_verse()?;
    let line = first_physical_line(&verse.original);
    let line = strip_verse_marker(line);
    let line = expand_leading_parenthetical(line);
    let line = line.trim();
    (!line.is_empty()).then(|| line.to_string())
}

/// Key of an extracted first line: the first character when it folds to a
/// letter, else the first later character that does, else [`IndexKey::Other`].
pub fn first_line_key(line: &str) -> IndexKey {
    if let Some(letter) = line.chars().next().and_then(index_letter) {
        return IndexKey::Letter(letter);
    }
    line.chars()
        .find_map(index_letter)
        .map(IndexKey::Letter)
        .unwrap_or(IndexKey::Other)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::models::Verse;

    fn song_with_first_line(original: &str) -> Song {
        Song {
            title: "Test".to_string(),
            author: "A".to_string(),
            category: "C".to_string(),
            verses: vec![Verse {
                number: 1,
                original: original.to_string(),
                english: String::new(),
                russian: None,
                latvian: None,
            }],
        }
    }

    #[rstest]
    #[case("Śrī Guru", Some('S'))]
    #[case("(Hare) Kṛṣṇa", Some('H'))]
    #[case("-- ārati", Some('A'))]
    #[case("vrajera gopāla", Some('V'))]
    #[case("108 Names", None)]
    #[case("Жизнь", None)]
    #[case("", None)]
    fn title_keys(#[case] title: &str, #[case] expected: Option<char>) {
        assert_eq!(title_key(title), expected);
    }

    #[test]
    fn physical_line_stops_at_first_break() {
        assert_eq!(first_physical_line("  one \r\ntwo\nthree"), "one");
        assert_eq!(first_physical_line(""), "");
    }

    #[rstest]
    #[case("pūrṇaprajña padmanābha-gati (1)", "pūrṇaprajña padmanābha-gati")]
    #[case("tā̃hāra 'dayita-dāsa' nāma (9)  ", "tā̃hāra 'dayita-dāsa' nāma")]
    #[case("gaura (prema) hari", "gaura (prema) hari")]
    #[case("(12)", "")]
    fn verse_markers(#[case] line: &str, #[case] expected: &str) {
        assert_eq!(strip_verse_marker(line), expected);
    }

    #[rstest]
    #[case("(Hare) Kṛṣṇa Kṛṣṇa", "Hare Kṛṣṇa Kṛṣṇa")]
    #[case("(jaya)", "jaya")]
    #[case("( ) gaura", "( ) gaura")]
    #[case("(unclosed gaura", "(unclosed gaura")]
    #[case("gaura (hari)", "gaura (hari)")]
    fn leading_parentheticals(#[case] line: &str, #[case] expected: &str) {
        assert_eq!(expand_leading_parenthetical(line), expected);
    }

    #[test]
    fn parenthetical_cue_gives_first_line_key_h() {
        let song = song_with_first_line("(Hare) Kṛṣṇa Kṛṣṇa\nKṛṣṇa Kṛṣṇa Hare Hare");
        let line = first_line(&song).unwrap();
        assert_eq!(line, "Hare Kṛṣṇa Kṛṣṇa");
        assert_eq!(first_line_key(&line), IndexKey::Letter('H'));
    }

    #[test]
    fn first_line_drops_marker_before_unwrapping() {
        let song = song_with_first_line("śrī vārṣabhānavī-varā (9)\nnext");
        assert_eq!(first_line(&song).unwrap(), "śrī vārṣabhānavī-varā");
    }

    #[test]
    fn empty_first_line_has_no_label() {
        assert_eq!(first_line(&song_with_first_line("\nsecond line")), None);
        assert_eq!(first_line(&song_with_first_line("(3)")), None);
    }

    #[rstest]
    #[case("kṛṣṇera janama", IndexKey::Letter('K'))]
    #[case("'jaya' rādhe", IndexKey::Letter('J'))]
    #[case("1. ārati", IndexKey::Letter('A'))]
    #[case("123 ...", IndexKey::Other)]
    #[case("Жизнь", IndexKey::Other)]
    fn first_line_keys(#[case] line: &str, #[case] expected: IndexKey) {
        assert_eq!(first_line_key(line), expected);
    }

    #[test]
    fn other_bucket_sorts_after_letters() {
        assert!(IndexKey::Letter('Z') < IndexKey::Other);
        assert_eq!(IndexKey::Other.to_string(), "OTHER");
    }
}
