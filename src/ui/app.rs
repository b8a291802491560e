use std::cell::Cell;
use std::sync::Arc;

use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use tracing::{error, info};

use crate::address::{encode, Address};
use crate::index::{Catalog, Stats};
use crate::models::Language;
use crate::nav::{Action, NavState, View};
use crate::screen::{bhajan_count, screen, Item, Screen, Section, VerseLine};
use crate::source::{load_catalog, SourceSpec};

use super::helpers::{alphabet_strip, centered_rect, clamp_selection, language_bar};

/// Footer space reserved for status, instructions and the address.
const FOOTER_HEIGHT: u16 = 4;
const HEADER_HEIGHT: u16 = 3;
/// Rows moved by PageUp/PageDown.
const PAGE_STEP: isize = 10;

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    spec: SourceSpec,
    catalog: Arc<Catalog>,
    state: NavState,
    screen: Screen,
    /// Cursor into `screen.items()`.
    selected: usize,
    /// First visible verse row on the song screen.
    scroll: u16,
    /// Inner width and height of the verse body at the last draw.
    verse_viewport: Cell<(u16, u16)>,
    status: Option<StatusMessage>,
    /// Set when a reload produced nothing to show; no view is rendered.
    blocked: Option<String>,
}

impl App {
    pub fn new(spec: SourceSpec, catalog: Arc<Catalog>, state: NavState) -> Self {
        let state = state.revalidate(&catalog);
        let screen = screen(&state, &catalog);
        Self {
            spec,
            catalog,
            state,
            screen,
            selected: 0,
            scroll: 0,
            verse_viewport: Cell::new((0, 0)),
            status: None,
            blocked: None,
        }
    }

    pub fn state(&self) -> &NavState {
        &self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked.is_some()
    }

    /// Address of the current view.
    pub fn address(&self) -> Address {
        encode(&self.state)
    }

    fn selected_item(&self) -> Option<&Item> {
        self.screen.items().get(self.selected).copied()
    }

    /// Handle one key press. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.blocked.is_some() {
            match code {
                KeyCode::Char('q') | KeyCode::Esc => return true,
                KeyCode::Char('R') | KeyCode::Enter => self.reload(),
                _ => {}
            }
            return false;
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Up => self.move_cursor(-1),
            KeyCode::Down => self.move_cursor(1),
            KeyCode::PageUp => self.move_cursor(-PAGE_STEP),
            KeyCode::PageDown => self.move_cursor(PAGE_STEP),
            KeyCode::Enter => {
                if let Some(action) = self.selected_item().map(|item| item.action.clone()) {
                    self.dispatch(action);
                }
            }
            KeyCode::Esc | KeyCode::Backspace => {
                if let Some(action) = self.state.back_action() {
                    self.dispatch(action);
                }
            }
            KeyCode::Char('h') => self.dispatch(Action::GoHome),
            KeyCode::Char('1') => self.dispatch(Action::OpenTitleIndex),
            KeyCode::Char('2') => self.dispatch(Action::OpenFirstLineIndex),
            KeyCode::Char('3') => self.dispatch(Action::OpenCategories),
            KeyCode::Char('4') => self.dispatch(Action::OpenAuthors),
            KeyCode::Char('o') => self.dispatch(Action::SelectLanguage(Language::Original)),
            KeyCode::Char('e') => self.dispatch(Action::SelectLanguage(Language::English)),
            KeyCode::Char('r') => self.dispatch(Action::SelectLanguage(Language::Russian)),
            KeyCode::Char('l') => self.dispatch(Action::SelectLanguage(Language::Latvian)),
            KeyCode::Char('R') => self.reload(),
            _ => {}
        }
        false
    }

    /// Apply `action` to the browsing state and rebuild the screen. When the
    /// new screen lists the view just left, the cursor lands on it.
    pub fn dispatch(&mut self, action: Action) {
        let next = self.state.apply(&action, &self.catalog);
        if next == self.state {
            return;
        }

        let left = entry_action(&self.state.view);
        let keep_scroll = matches!(action, Action::SelectLanguage(_));
        self.state = next;
        self.refresh();
        self.clear_status();

        if !keep_scroll {
            self.scroll = 0;
        }
        self.selected = left
            .and_then(|left| {
                self.screen
                    .items()
                    .iter()
                    .position(|item| item.action == left)
            })
            .unwrap_or(0);
    }

    /// Load the source again and swap the new catalog in. The current view
    /// survives when everything it names still exists.
    pub fn reload(&mut self) {
        match load_catalog(&self.spec) {
            Ok(catalog) => {
                let before = self.state.clone();
                self.catalog = Arc::new(catalog);
                self.blocked = None;
                self.state = before.clone().revalidate(&self.catalog);
                self.refresh();
                self.selected = clamp_selection(self.selected, self.screen.items().len());

                let stats = self.catalog.stats();
                info!(songs = stats.songs, "collection reloaded");
                if self.state != before {
                    self.selected = 0;
                    self.scroll = 0;
                    self.set_status(
                        "The open selection no longer exists. Returned home.",
                        StatusKind::Error,
                    );
                } else {
                    self.set_status(
                        format!("Reloaded {} from {}.", bhajan_count(stats.songs), self.catalog.origin()),
                        StatusKind::Info,
                    );
                }
            }
            Err(err) => {
                error!(error = %err, "reload failed");
                self.blocked = Some(err.to_string());
            }
        }
    }

    fn refresh(&mut self) {
        self.screen = screen(&self.state, &self.catalog);
    }

    fn move_cursor(&mut self, delta: isize) {
        if let Screen::Song { verses, .. } = &self.screen {
            let max_scroll = self.max_verse_scroll(verses);
            let scroll = (self.scroll as isize + delta).clamp(0, max_scroll as isize);
            self.scroll = scroll as u16;
            return;
        }

        let len = self.screen.items().len();
        if len == 0 {
            return;
        }
        let selected = (self.selected as isize + delta).clamp(0, len as isize - 1);
        self.selected = selected as usize;
    }

    /// Largest scroll offset that still fills the verse body. Before the first
    /// draw the unwrapped row count is used.
    fn max_verse_scroll(&self, verses: &[VerseLine]) -> usize {
        let (width, height) = self.verse_viewport.get();
        if width == 0 {
            return verse_rows(verses).saturating_sub(1);
        }
        verse_paragraph(verses)
            .line_count(width)
            .saturating_sub(height as usize)
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();

        if let Some(message) = &self.blocked {
            self.draw_blocked(frame, area, message);
            return;
        }

        let footer_height = FOOTER_HEIGHT.min(area.height);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(footer_height),
            ])
            .split(area);

        self.draw_header(frame, chunks[0]);
        match &self.screen {
            Screen::Home { items, stats } => self.draw_home(frame, chunks[1], items, stats),
            Screen::LetterIndex {
                title,
                alphabet,
                sections,
            } => self.draw_letter_index(frame, chunks[1], title, alphabet, sections),
            Screen::List { title, items } => self.draw_list(frame, chunks[1], title, items),
            Screen::Song {
                title,
                author,
                category,
                language,
                verses,
            } => self.draw_song(frame, chunks[1], title, author, category, *language, verses),
        }
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let header = Paragraph::new(Line::from(vec![
            Span::styled(
                "Bhajan Collection",
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("  •  {}", self.catalog.origin())),
        ]))
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(self.state.view.title()),
        );
        frame.render_widget(header, area);
    }

    fn draw_home(&self, frame: &mut Frame, area: Rect, items: &[Item], stats: &Stats) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(items.len() as u16 + 2),
                Constraint::Min(0),
            ])
            .split(area);

        let rows = items
            .iter()
            .enumerate()
            .map(|(idx, item)| ListItem::new(format!("[{}] {}", idx + 1, item.label)))
            .collect::<Vec<_>>();
        self.render_list(frame, chunks[0], rows, Some(self.selected), "Browse");

        let summary = Paragraph::new(vec![
            Line::from(format!("{} in the collection", bhajan_count(stats.songs))),
            Line::from(format!(
                "{} verses  •  {} categories  •  {} authors",
                stats.verses, stats.categories, stats.authors
            )),
        ])
        .style(Style::default().fg(Color::Gray))
        .wrap(Wrap { trim: true });
        frame.render_widget(summary, chunks[1]);
    }

    fn draw_letter_index(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        alphabet: &[(char, bool)],
        sections: &[Section],
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(area);
        frame.render_widget(Paragraph::new(alphabet_strip(alphabet)), chunks[0]);

        if sections.is_empty() {
            self.draw_empty(frame, chunks[1], title);
            return;
        }

        let heading = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD);
        let mut rows = Vec::new();
        let mut selected_row = None;
        let mut item_idx = 0;
        for section in sections {
            rows.push(ListItem::new(Line::from(Span::styled(
                section.key.to_string(),
                heading,
            ))));
            for item in &section.items {
                if item_idx == self.selected {
                    selected_row = Some(rows.len());
                }
                rows.push(ListItem::new(format!("  {}", item.label)));
                item_idx += 1;
            }
        }
        self.render_list(frame, chunks[1], rows, selected_row, title);
    }

    fn draw_list(&self, frame: &mut Frame, area: Rect, title: &str, items: &[Item]) {
        if items.is_empty() {
            self.draw_empty(frame, area, title);
            return;
        }

        let rows = items
            .iter()
            .map(|item| {
                if item.secondary {
                    ListItem::new(Line::from(Span::styled(
                        format!("    {}", item.label),
                        Style::default().fg(Color::Gray),
                    )))
                } else {
                    ListItem::new(item.label.clone())
                }
            })
            .collect::<Vec<_>>();
        self.render_list(frame, area, rows, Some(self.selected), title);
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_song(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        author: &str,
        category: &str,
        language: Language,
        verses: &[VerseLine],
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0)])
            .split(area);

        let details = Paragraph::new(vec![
            Line::from(Span::styled(
                title.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(format!("by {author}  •  {category}")),
            Line::from(""),
            language_bar(language),
        ]);
        frame.render_widget(details, chunks[0]);

        let block = Block::default().borders(Borders::ALL).title("Verses");
        let inner = block.inner(chunks[1]);
        self.verse_viewport.set((inner.width, inner.height));

        let body = verse_paragraph(verses)
            .block(block)
            .scroll((self.scroll, 0));
        frame.render_widget(body, chunks[1]);
    }

    fn draw_empty(&self, frame: &mut Frame, area: Rect, title: &str) {
        let message = Paragraph::new("Nothing to show here.")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(title.to_string()));
        frame.render_widget(message, area);
    }

    fn render_list(
        &self,
        frame: &mut Frame,
        area: Rect,
        rows: Vec<ListItem<'_>>,
        selected_row: Option<usize>,
        title: &str,
    ) {
        let list = List::new(rows)
            .block(Block::default().borders(Borders::ALL).title(title.to_string()))
            .highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        let mut state = ListState::default();
        state.select(selected_row);
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };
        let address_line = Line::from(Span::styled(
            format!("Address: {}", self.address()),
            Style::default().fg(Color::DarkGray),
        ));

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions(), address_line]);
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let keys: &[(&str, &str)] = match &self.state.view {
            View::Home => &[
                ("[↑↓]", " Navigate   "),
                ("[Enter]", " Open   "),
                ("[1-4]", " Index   "),
                ("[R]", " Reload   "),
                ("[q]", " Quit"),
            ],
            View::SongDetail { .. } => &[
                ("[↑↓/PgUp/PgDn]", " Scroll   "),
                ("[o/e/r/l]", " Language   "),
                ("[Esc]", " Back   "),
                ("[h]", " Home   "),
                ("[q]", " Quit"),
            ],
            _ => &[
                ("[↑↓/PgUp/PgDn]", " Navigate   "),
                ("[Enter]", " Open   "),
                ("[Esc]", " Back   "),
                ("[h]", " Home   "),
                ("[q]", " Quit"),
            ],
        };
        let spans = keys
            .iter()
            .flat_map(|(key, label)| [Span::styled(*key, key_style), Span::raw(*label)])
            .collect::<Vec<_>>();
        Line::from(spans)
    }

    fn draw_blocked(&self, frame: &mut Frame, area: Rect, message: &str) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Nothing to Show")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(Span::styled(
                message.to_string(),
                Style::default().fg(Color::Red),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press R to retry or q to quit.",
                Style::default().fg(Color::Gray),
            )),
        ];
        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }
}

/// The action that leads into `view` from the screen before it.
fn entry_action(view: &View) -> Option<Action> {
    match view {
        View::Home => None,
        View::TitleIndex => Some(Action::OpenTitleIndex),
        View::FirstLineIndex => Some(Action::OpenFirstLineIndex),
        View::Categories => Some(Action::OpenCategories),
        View::Authors => Some(Action::OpenAuthors),
        View::CategoryDetail { category } => Some(Action::SelectCategory(category.clone())),
        View::AuthorDetail { author } => Some(Action::SelectAuthor(author.clone())),
        View::SongDetail { title, .. } => Some(Action::SelectSong(title.clone())),
    }
}

/// Verse body, one blank row between verses, wrapped to the body width.
fn verse_paragraph(verses: &[VerseLine]) -> Paragraph<'static> {
    let mut lines = Vec::new();
    for (idx, verse) in verses.iter().enumerate() {
        if idx > 0 {
            lines.push(Line::from(""));
        }
        lines.extend(verse.text.lines().map(|line| Line::from(line.to_string())));
    }
    Paragraph::new(lines).wrap(Wrap { trim: false })
}

/// Rows the verse body needs before wrapping.
fn verse_rows(verses: &[VerseLine]) -> usize {
    let text_rows: usize = verses.iter().map(|verse| verse.text.lines().count()).sum();
    text_rows + verses.len().saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Origin;
    use crate::source::{export_json, sample_collection};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::fs;

    fn sample_app() -> App {
        let catalog = Catalog::build(sample_collection().unwrap(), Origin::Sample);
        App::new(SourceSpec::Sample, Arc::new(catalog), NavState::new())
    }

    fn press(app: &mut App, keys: &[KeyCode]) {
        for key in keys {
            assert!(!app.handle_key(*key), "{key:?} should not quit");
        }
    }

    fn rendered(app: &App) -> String {
        rendered_at(app, 100, 40)
    }

    fn rendered_at(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn home_renders_menu_and_address() {
        let app = sample_app();
        let screen = rendered(&app);
        assert!(screen.contains("Song Index"));
        assert!(screen.contains("By First Line"));
        assert!(screen.contains("5 bhajans in the collection"));
        assert!(screen.contains("Address: ?page=home"));
    }

    #[test]
    fn enter_opens_selected_menu_entry() {
        let mut app = sample_app();
        press(&mut app, &[KeyCode::Down, KeyCode::Down, KeyCode::Enter]);
        assert_eq!(app.state().view, View::Categories);
        assert!(rendered(&app).contains("Śrī Kṛṣṇa (2 bhajans)"));
    }

    #[test]
    fn back_from_song_reselects_it() {
        let mut app = sample_app();
        press(&mut app, &[KeyCode::Char('1')]);
        press(&mut app, &[KeyCode::Down, KeyCode::Down, KeyCode::Enter]);
        let opened = app.state().view.selected_song().unwrap().to_string();

        press(&mut app, &[KeyCode::Esc]);
        assert_eq!(app.state().view, View::TitleIndex);
        assert_eq!(
            app.selected_item().map(|item| item.action.clone()),
            Some(Action::SelectSong(opened))
        );
    }

    #[test]
    fn escape_from_index_returns_home_on_same_entry() {
        let mut app = sample_app();
        press(&mut app, &[KeyCode::Char('4'), KeyCode::Esc]);
        assert_eq!(app.state().view, View::Home);
        assert_eq!(app.selected, 3);
    }

    #[test]
    fn language_keys_only_apply_on_song() {
        let mut app = sample_app();
        press(&mut app, &[KeyCode::Char('r')]);
        assert_eq!(app.state().language, Language::Original);

        press(&mut app, &[KeyCode::Char('1'), KeyCode::Enter, KeyCode::Char('r')]);
        assert_eq!(app.state().language, Language::Russian);
        assert!(app.address().to_query().ends_with("lang=russian"));
        assert!(rendered(&app).contains("Русский"));
    }

    #[test]
    fn quit_key_stops_the_loop() {
        let mut app = sample_app();
        assert!(app.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn stale_initial_state_starts_home() {
        let catalog = Catalog::build(sample_collection().unwrap(), Origin::Sample);
        let stale = NavState::with_view(
            View::CategoryDetail {
                category: "Missing".to_string(),
            },
            Language::English,
        );
        let app = App::new(SourceSpec::Sample, Arc::new(catalog), stale);
        assert_eq!(app.state(), &NavState::new());
    }

    #[test]
    fn reload_of_empty_source_blocks_until_retry_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("songs.json");
        fs::write(&path, "[]").unwrap();

        let catalog = Catalog::build(sample_collection().unwrap(), Origin::Sample);
        let mut app = App::new(
            SourceSpec::Document { path: path.clone() },
            Arc::new(catalog),
            NavState::new(),
        );
        press(&mut app, &[KeyCode::Char('R')]);
        assert!(app.is_blocked());
        let screen = rendered(&app);
        assert!(screen.contains("No bhajan data found"));
        assert!(!screen.contains("Address:"));

        // Navigation keys do nothing while blocked.
        press(&mut app, &[KeyCode::Char('1')]);
        assert_eq!(app.state().view, View::Home);

        export_json(&sample_collection().unwrap(), &path).unwrap();
        press(&mut app, &[KeyCode::Char('R')]);
        assert!(!app.is_blocked());
        assert_eq!(app.catalog().stats().songs, 5);
    }

    #[test]
    fn song_scroll_stays_within_verses() {
        let mut app = sample_app();
        press(&mut app, &[KeyCode::Char('1'), KeyCode::Enter]);
        for _ in 0..50 {
            press(&mut app, &[KeyCode::PageDown]);
        }
        let Screen::Song { verses, .. } = &app.screen else {
            panic!("song screen expected");
        };
        assert!((app.scroll as usize) < verse_rows(verses).max(1));
        press(&mut app, &[KeyCode::PageUp, KeyCode::PageUp, KeyCode::PageUp]);
        press(&mut app, &[KeyCode::PageUp, KeyCode::PageUp, KeyCode::PageUp]);
        assert_eq!(app.scroll, 0);
    }

    #[test]
    fn wrapped_verses_scroll_to_the_final_verse() {
        let catalog = Catalog::build(sample_collection().unwrap(), Origin::Sample);
        let state = crate::address::decode(
            &Address::parse("page=bhajan&bhajan=%C5%9Ar%C4%AB+Guru-parampar%C4%81&lang=english"),
            &catalog,
        );
        let mut app = App::new(SourceSpec::Sample, Arc::new(catalog), state);
        let Screen::Song { verses, .. } = &app.screen else {
            panic!("song screen expected");
        };
        let last = format!("({})", verses.last().unwrap().number);

        let first = rendered_at(&app, 80, 24);
        assert!(!first.contains(&last));
        for _ in 0..100 {
            press(&mut app, &[KeyCode::PageDown]);
        }
        let bottom = rendered_at(&app, 80, 24);
        assert!(bottom.contains(&last), "{bottom}");
        assert!(app.scroll > 0);
    }
}
