//! Shareable addresses for browsing state.
//!
//! An address is a short query string such as
//! `page=bhajan&category=%C5%9Ar%C4%AB+Guru&bhajan=...&from=category_bhajans`.
//! Encoding never fails; decoding falls back to the home screen for unknown
//! pages and for names the catalog does not contain.

use std::fmt;

use tracing::debug;
use url::form_urlencoded;

use crate::index::Catalog;
use crate::models::Language;
use crate::nav::{NavState, View};

pub const PARAM_PAGE: &str = "page";
pub const PARAM_CATEGORY: &str = "category";
pub const PARAM_AUTHOR: &str = "author";
pub const PARAM_SONG: &str = "bhajan";
pub const PARAM_LANGUAGE: &str = "lang";
pub const PARAM_FROM: &str = "from";

const PAGE_HOME: &str = "home";
const PAGE_TITLES: &str = "titles";
const PAGE_FIRST_LINE: &str = "first_line";
const PAGE_CATEGORIES: &str = "categories";
const PAGE_AUTHORS: &str = "authors";
const PAGE_CATEGORY: &str = "category_bhajans";
const PAGE_AUTHOR: &str = "author_bhajans";
const PAGE_SONG: &str = "bhajan";

/// Ordered key/value parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    params: Vec<(String, String)>,
}

impl Address {
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            params: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// Parse a query string, with or without a leading `?`.
    pub fn parse(query: &str) -> Self {
        let query = query.trim().trim_start_matches('?');
        Self {
            params: form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        }
    }

    pub fn to_query(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params.iter())
            .finish()
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.params
    }

    fn push(&mut self, key: &str, value: &str) {
        self.params.push((key.to_string(), value.to_string()));
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.to_query())
    }
}

fn page_name(view: &View) -> &'static str {
    match view {
        View::Home => PAGE_HOME,
        View::TitleIndex => PAGE_TITLES,
        View::FirstLineIndex => PAGE_FIRST_LINE,
        View::Categories => PAGE_CATEGORIES,
        View::Authors => PAGE_AUTHORS,
        View::CategoryDetail { .. } => PAGE_CATEGORY,
        View::AuthorDetail { .. } => PAGE_AUTHOR,
        View::SongDetail { .. } => PAGE_SONG,
    }
}

/// Encode `state`. A song's previous view contributes its page as `from`
/// and its selection as `category` or `author`.
pub fn encode(state: &NavState) -> Address {
    let mut address = Address::default();
    address.push(PARAM_PAGE, page_name(&state.view));

    let (listing, song) = match &state.view {
        View::SongDetail { title, previous } => (previous.as_deref(), Some(title.as_str())),
        other => (Some(other), None),
    };

    if let Some(category) = listing.and_then(View::selected_category) {
        address.push(PARAM_CATEGORY, category);
    }
    if let Some(author) = listing.and_then(View::selected_author) {
        address.push(PARAM_AUTHOR, author);
    }
    if let Some(title) = song {
        address.push(PARAM_SONG, title);
        if let Some(previous) = listing {
            address.push(PARAM_FROM, page_name(previous));
        }
    }
    if state.language != Language::Original {
        address.push(PARAM_LANGUAGE, state.language.slug());
    }

    address
}

/// Why an address could not be honoured.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Unresolved {
    UnknownPage(String),
    Stale(&'static str, String),
    Missing(&'static str),
}

impl fmt::Display for Unresolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unresolved::UnknownPage(page) => write!(f, "unknown page {page:?}"),
            Unresolved::Stale(param, value) => write!(f, "{param} {value:?} no longer exists"),
            Unresolved::Missing(param) => write!(f, "missing {param} parameter"),
        }
    }
}

fn listing_view(page: &str, address: &Address, catalog: &Catalog) -> Result<View, Unresolved> {
    let view = match page {
        PAGE_HOME => View::Home,
        PAGE_TITLES => View::TitleIndex,
        PAGE_FIRST_LINE => View::FirstLineIndex,
        PAGE_CATEGORIES => View::Categories,
        PAGE_AUTHORS => View::Authors,
        PAGE_CATEGORY => {
            let category = address
                .get(PARAM_CATEGORY)
                .ok_or(Unresolved::Missing(PARAM_CATEGORY))?;
            if !catalog.has_category(category) {
                return Err(Unresolved::Stale(PARAM_CATEGORY, category.to_string()));
            }
            View::CategoryDetail {
                category: category.to_string(),
            }
        }
        PAGE_AUTHOR => {
            let author = address
                .get(PARAM_AUTHOR)
                .ok_or(Unresolved::Missing(PARAM_AUTHOR))?;
            if !catalog.has_author(author) {
                return Err(Unresolved::Stale(PARAM_AUTHOR, author.to_string()));
            }
            View::AuthorDetail {
                author: author.to_string(),
            }
        }
        other => return Err(Unresolved::UnknownPage(other.to_string())),
    };
    Ok(view)
}

fn resolve(address: &Address, catalog: &Catalog) -> Result<View, Unresolved> {
    let page = address.get(PARAM_PAGE).unwrap_or(PAGE_HOME);
    if page != PAGE_SONG {
        return listing_view(page, address, catalog);
    }

    let title = address
        .get(PARAM_SONG)
        .ok_or(Unresolved::Missing(PARAM_SONG))?;
    if !catalog.has_song(title) {
        return Err(Unresolved::Stale(PARAM_SONG, title.to_string()));
    }

    let previous = match address.get(PARAM_FROM) {
        Some(PAGE_HOME) | Some(PAGE_SONG) => None,
        Some(from) => Some(Box::new(listing_view(from, address, catalog)?)),
        None => None,
    };

    Ok(View::SongDetail {
        title: title.to_string(),
        previous,
    })
}

/// Rebuild the browsing state an address describes.
pub fn decode(address: &Address, catalog: &Catalog) -> NavState {
    let language = address
        .get(PARAM_LANGUAGE)
        .and_then(Language::from_slug)
        .unwrap_or_default();

    match resolve(address, catalog) {
        Ok(view) => NavState::with_view(view, language),
        Err(reason) => {
            debug!(%reason, address = %address, "address not resolvable, showing home");
            NavState::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Origin;
    use crate::nav::Action;
    use crate::source::sample_collection;

    fn catalog() -> Catalog {
        Catalog::build(sample_collection().unwrap(), Origin::Sample)
    }

    #[test]
    fn query_string_is_percent_encoded() {
        let address = Address::from_pairs([("page", "category_bhajans"), ("category", "Śrī Guru")]);
        let query = address.to_query();
        assert_eq!(query, "page=category_bhajans&category=%C5%9Ar%C4%AB+Guru");
        assert_eq!(Address::parse(&format!("?{query}")), address);
    }

    #[test]
    fn song_from_category_encodes_origin() {
        let catalog = catalog();
        let state = NavState::new()
            .apply(&Action::OpenCategories, &catalog)
            .apply(&Action::SelectCategory("Śrī Guru".to_string()), &catalog)
            .apply(&Action::SelectSong("Śrī Guru-paramparā".to_string()), &catalog);

        let address = encode(&state);
        assert_eq!(address.get(PARAM_PAGE), Some("bhajan"));
        assert_eq!(address.get(PARAM_CATEGORY), Some("Śrī Guru"));
        assert_eq!(address.get(PARAM_SONG), Some("Śrī Guru-paramparā"));
        assert_eq!(address.get(PARAM_FROM), Some("category_bhajans"));
        assert_eq!(decode(&address, &catalog), state);
    }

    #[test]
    fn language_is_only_encoded_when_not_original() {
        assert_eq!(encode(&NavState::new()).to_query(), "page=home");
        let state = NavState::with_view(View::Authors, Language::Latvian);
        assert_eq!(encode(&state).to_query(), "page=authors&lang=latvian");
    }

    #[test]
    fn unknown_page_defaults_home() {
        let catalog = catalog();
        let address = Address::parse("page=settings");
        assert_eq!(decode(&address, &catalog), NavState::new());
        assert_eq!(decode(&Address::parse(""), &catalog), NavState::new());
    }

    #[test]
    fn stale_names_default_home() {
        let catalog = catalog();
        for query in [
            "page=category_bhajans&category=Gone",
            "page=author_bhajans",
            "page=bhajan&bhajan=Deleted+Song",
            "page=bhajan&bhajan=Dayāla+Nitāi&from=author_bhajans&author=Gone",
            "page=bhajan&bhajan=Dayāla+Nitāi&from=nowhere",
        ] {
            assert_eq!(
                decode(&Address::parse(query), &catalog),
                NavState::new(),
                "{query}"
            );
        }
    }

    #[test]
    fn song_without_origin_decodes_without_previous_view() {
        let catalog = catalog();
        let state = decode(&Address::parse("page=bhajan&bhajan=Dayāla+Nitāi"), &catalog);
        assert_eq!(
            state.view,
            View::SongDetail {
                title: "Dayāla Nitāi".to_string(),
                previous: None,
            }
        );
        assert_eq!(state.apply(&Action::GoBack, &catalog).view, View::Home);
    }

    #[test]
    fn unknown_language_falls_back_to_original() {
        let catalog = catalog();
        let state = decode(&Address::parse("page=titles&lang=klingon"), &catalog);
        assert_eq!(state, NavState::with_view(View::TitleIndex, Language::Original));
    }
}
