//! Browser for a devotional song collection.
//!
//! The loading pipeline runs bottom-up: [`source`] reads raw rows, [`loader`]
//! validates and groups them into a [`Collection`], and [`index`] derives the
//! letter indices and groupings kept in a [`Catalog`]. Browsing is the pure
//! state machine in [`nav`]; [`screen`] turns a state into displayable data,
//! [`address`] turns it into a shareable query string, and [`ui`] paints it
//! in the terminal.
pub mod address;
pub mod config;
pub mod error;
pub mod folding;
pub mod index;
pub mod keys;
pub mod loader;
pub mod logging;
pub mod models;
pub mod nav;
pub mod screen;
pub mod source;
pub mod ui;

pub use address::{decode, encode, Address};
pub use config::Config;
pub use error::{ConfigError, LoadError, RowRejected};
pub use index::{Catalog, Origin};
pub use models::{Collection, Language, Song, Verse};
pub use nav::{Action, NavState, View};
pub use source::{load_catalog, SourceSpec};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
