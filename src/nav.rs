//! Browsing state machine.
//!
//! [`NavState::apply`] is a pure function of the current state, one
//! [`Action`] and the catalog. Every action is accepted from every state:
//! actions that do not belong to the current view, or that name something
//! the catalog does not contain, return the state unchanged.

use tracing::debug;

use crate::index::Catalog;
use crate::models::Language;

/// The screen being shown, with exactly the selection that screen needs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Home,
    TitleIndex,
    FirstLineIndex,
    Categories,
    Authors,
    CategoryDetail {
        category: String,
    },
    AuthorDetail {
        author: String,
    },
    SongDetail {
        title: String,
        /// View the song was opened from. Never itself a `SongDetail`.
        previous: Option<Box<View>>,
    },
}

impl View {
    /// Views whose items open a song.
    pub fn is_listing(&self) -> bool {
        !matches!(self, View::Home | View::SongDetail { .. })
    }

    pub fn selected_category(&self) -> Option<&str> {
        match self {
            View::CategoryDetail { category } => Some(category),
            _ => None,
        }
    }

    pub fn selected_author(&self) -> Option<&str> {
        match self {
            View::AuthorDetail { author } => Some(author),
            _ => None,
        }
    }

    pub fn selected_song(&self) -> Option<&str> {
        match self {
            View::SongDetail { title, .. } => Some(title),
            _ => None,
        }
    }

    pub fn title(&self) -> String {
        match self {
            View::Home => "Home".to_string(),
            View::TitleIndex => "Song Index".to_string(),
            View::FirstLineIndex => "Song Index by First Line".to_string(),
            View::Categories => "Categories".to_string(),
            View::Authors => "Authors".to_string(),
            View::CategoryDetail { category } => category.clone(),
            View::AuthorDetail { author } => author.clone(),
            View::SongDetail { title, .. } => title.clone(),
        }
    }

    /// Whether every name this view refers to exists in `catalog`.
    fn references_exist(&self, catalog: &Catalog) -> bool {
        match self {
            View::CategoryDetail { category } => catalog.has_category(category),
            View::AuthorDetail { author } => catalog.has_author(author),
            View::SongDetail { title, previous } => {
                catalog.has_song(title)
                    && previous
                        .as_deref()
                        .map_or(true, |view| view.references_exist(catalog))
            }
            _ => true,
        }
    }
}

/// Something the reader did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    GoHome,
    OpenTitleIndex,
    OpenFirstLineIndex,
    OpenCategories,
    OpenAuthors,
    SelectCategory(String),
    SelectAuthor(String),
    SelectSong(String),
    GoBack,
    SelectLanguage(Language),
    BackToCategories,
    BackToAuthors,
}

/// Complete browsing state of one session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NavState {
    pub view: View,
    /// Language verses are shown in. Kept across songs until `GoHome`.
    pub language: Language,
}

impl NavState {
    /// State of a fresh session: home screen, original language.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_view(view: View, language: Language) -> Self {
        Self { view, language }
    }

    /// Compute the state that follows `action`.
    pub fn apply(&self, action: &Action, catalog: &Catalog) -> NavState {
        match self.transition(action, catalog) {
            Some(next) => next,
            None => {
                debug!(view = ?self.view, ?action, "action ignored in current view");
                self.clone()
            }
        }
    }

    fn transition(&self, action: &Action, catalog: &Catalog) -> Option<NavState> {
        let view = match (&self.view, action) {
            (_, Action::GoHome) => return Some(NavState::new()),

            (View::Home, Action::OpenTitleIndex) => View::TitleIndex,
            (View::Home, Action::OpenFirstLineIndex) => View::FirstLineIndex,
            (View::Home, Action::OpenCategories) => View::Categories,
            (View::Home, Action::OpenAuthors) => View::Authors,

            (View::Categories, Action::SelectCategory(category)) => {
                if !catalog.has_category(category) {
                    return None;
                }
                View::CategoryDetail {
                    category: category.clone(),
                }
            }

            (View::Authors | View::CategoryDetail { .. }, Action::SelectAuthor(author)) => {
                if !catalog.has_author(author) {
                    return None;
                }
                View::AuthorDetail {
                    author: author.clone(),
                }
            }

            (current, Action::SelectSong(title)) if current.is_listing() => {
                if !catalog.has_song(title) {
                    return None;
                }
                View::SongDetail {
                    title: title.clone(),
                    previous: Some(Box::new(current.clone())),
                }
            }

            (View::SongDetail { previous, .. }, Action::GoBack) => previous
                .as_deref()
                .cloned()
                .unwrap_or(View::Home),

            (View::SongDetail { .. }, Action::SelectLanguage(language)) => {
                return Some(NavState::with_view(self.view.clone(), *language));
            }

            (View::CategoryDetail { .. }, Action::BackToCategories) => View::Categories,
            (View::AuthorDetail { .. }, Action::BackToAuthors) => View::Authors,

            _ => return None,
        };

        Some(NavState::with_view(view, self.language))
    }

    /// The "back" action that fits the current view, if there is one.
    pub fn back_action(&self) -> Option<Action> {
        match self.view {
            View::Home => None,
            View::SongDetail { .. } => Some(Action::GoBack),
            View::CategoryDetail { .. } => Some(Action::BackToCategories),
            View::AuthorDetail { .. } => Some(Action::BackToAuthors),
            _ => Some(Action::GoHome),
        }
    }

    /// Check the state against a freshly loaded catalog. A state pointing at
    /// a category, author or song that no longer exists becomes a fresh
    /// session.
    pub fn revalidate(self, catalog: &Catalog) -> NavState {
        if self.view.references_exist(catalog) {
            self
        } else {
            debug!(view = ?self.view, "stale selection, returning home");
            NavState::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Origin;
    use crate::source::sample_collection;

    const GURU: &str = "Śrī Guru";
    const PARAMPARA: &str = "Śrī Guru-paramparā";
    const BHAKTIVINODA: &str = "Śrīla Bhaktivinoda Ṭhākura";

    fn catalog() -> Catalog {
        Catalog::build(sample_collection().unwrap(), Origin::Sample)
    }

    fn run(catalog: &Catalog, actions: &[Action]) -> NavState {
        actions
            .iter()
            .fold(NavState::new(), |state, action| state.apply(action, catalog))
    }

    #[test]
    fn starts_home_in_original_language() {
        let state = NavState::new();
        assert_eq!(state.view, View::Home);
        assert_eq!(state.language, Language::Original);
    }

    #[test]
    fn home_opens_each_index() {
        let catalog = catalog();
        for (action, view) in [
            (Action::OpenTitleIndex, View::TitleIndex),
            (Action::OpenFirstLineIndex, View::FirstLineIndex),
            (Action::OpenCategories, View::Categories),
            (Action::OpenAuthors, View::Authors),
        ] {
            assert_eq!(run(&catalog, &[action]).view, view);
        }
    }

    #[test]
    fn back_from_song_returns_to_category_listing() {
        let catalog = catalog();
        let state = run(
            &catalog,
            &[
                Action::OpenCategories,
                Action::SelectCategory(GURU.to_string()),
                Action::SelectSong(PARAMPARA.to_string()),
            ],
        );
        assert_eq!(state.view.selected_song(), Some(PARAMPARA));

        let back = state.apply(&Action::GoBack, &catalog);
        assert_eq!(
            back.view,
            View::CategoryDetail {
                category: GURU.to_string()
            }
        );
    }

    #[test]
    fn back_from_song_opened_on_categories_returns_there() {
        let catalog = catalog();
        let state = run(
            &catalog,
            &[
                Action::OpenCategories,
                Action::SelectSong(PARAMPARA.to_string()),
                Action::GoBack,
            ],
        );
        assert_eq!(state.view, View::Categories);
    }

    #[test]
    fn back_without_previous_view_goes_home() {
        let catalog = catalog();
        let state = NavState::with_view(
            View::SongDetail {
                title: PARAMPARA.to_string(),
                previous: None,
            },
            Language::English,
        );
        let back = state.apply(&Action::GoBack, &catalog);
        assert_eq!(back.view, View::Home);
        assert_eq!(back.language, Language::English);
    }

    #[test]
    fn language_persists_until_home() {
        let catalog = catalog();
        let state = run(
            &catalog,
            &[
                Action::OpenTitleIndex,
                Action::SelectSong(PARAMPARA.to_string()),
                Action::SelectLanguage(Language::Russian),
                Action::GoBack,
            ],
        );
        assert_eq!(state.view, View::TitleIndex);
        assert_eq!(state.language, Language::Russian);

        let home = state.apply(&Action::GoHome, &catalog);
        assert_eq!(home, NavState::new());
    }

    #[test]
    fn category_listing_links_to_author() {
        let catalog = catalog();
        let state = run(
            &catalog,
            &[
                Action::OpenCategories,
                Action::SelectCategory("Rādhā-Kṛṣṇa".to_string()),
                Action::SelectAuthor(BHAKTIVINODA.to_string()),
                Action::BackToAuthors,
            ],
        );
        assert_eq!(state.view, View::Authors);
    }

    #[test]
    fn unknown_entities_are_ignored() {
        let catalog = catalog();
        let categories = run(&catalog, &[Action::OpenCategories]);
        assert_eq!(
            categories.apply(&Action::SelectCategory("Missing".to_string()), &catalog),
            categories
        );
        assert_eq!(
            categories.apply(&Action::SelectSong("Missing".to_string()), &catalog),
            categories
        );
    }

    #[test]
    fn actions_outside_their_view_are_ignored() {
        let catalog = catalog();
        let home = NavState::new();
        assert_eq!(home.apply(&Action::GoBack, &catalog), home);
        assert_eq!(
            home.apply(&Action::SelectSong(PARAMPARA.to_string()), &catalog),
            home
        );
        assert_eq!(
            home.apply(&Action::SelectLanguage(Language::Latvian), &catalog),
            home
        );

        let titles = run(&catalog, &[Action::OpenTitleIndex]);
        assert_eq!(titles.apply(&Action::OpenAuthors, &catalog), titles);
        assert_eq!(titles.apply(&Action::BackToCategories, &catalog), titles);
    }

    #[test]
    fn song_detail_cannot_open_another_song_directly() {
        let catalog = catalog();
        let song = run(
            &catalog,
            &[
                Action::OpenTitleIndex,
                Action::SelectSong(PARAMPARA.to_string()),
            ],
        );
        assert_eq!(
            song.apply(&Action::SelectSong("Dayāla Nitāi".to_string()), &catalog),
            song
        );
    }

    #[test]
    fn back_actions_match_views() {
        let catalog = catalog();
        assert_eq!(NavState::new().back_action(), None);
        let categories = run(&catalog, &[Action::OpenCategories]);
        assert_eq!(categories.back_action(), Some(Action::GoHome));
        let detail = categories.apply(&Action::SelectCategory(GURU.to_string()), &catalog);
        assert_eq!(detail.back_action(), Some(Action::BackToCategories));
    }

    #[test]
    fn stale_state_revalidates_to_home() {
        let catalog = catalog();
        let stale = NavState::with_view(
            View::AuthorDetail {
                author: "Nobody".to_string(),
            },
            Language::English,
        );
        assert_eq!(stale.revalidate(&catalog), NavState::new());

        let stale_previous = NavState::with_view(
            View::SongDetail {
                title: PARAMPARA.to_string(),
                previous: Some(Box::new(View::CategoryDetail {
                    category: "Gone".to_string(),
                })),
            },
            Language::Original,
        );
        assert_eq!(stale_previous.revalidate(&catalog), NavState::new());

        let fine = run(&catalog, &[Action::OpenAuthors]);
        assert_eq!(fine.clone().revalidate(&catalog), fine);
    }
}
