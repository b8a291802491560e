//! Terminal front-end: one [`App`] holding the catalog and browsing state,
//! painted with ratatui and driven by crossterm key events.

mod app;
mod helpers;
mod terminal;

pub use app::App;
pub use terminal::run_app;
