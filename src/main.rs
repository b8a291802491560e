//! Binary entry point: read configuration, load the collection, and drive the
//! Ratatui event loop until the reader exits. The final address is printed so
//! the same view can be reopened with `--address`.
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use bhajan_browser::config::{app_dir, home_dir, APP_DIR_NAME};
use bhajan_browser::source::export_json;
use bhajan_browser::{decode, load_catalog, logging, run_app, Address, App, Config, SourceSpec};

#[derive(Parser, Debug)]
#[command(name = "bhajan-browser")]
#[command(about = "Browse a devotional song collection in the terminal", long_about = None)]
struct Cli {
    /// Source table (SQLite) or exported collection (.json)
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Table to read inside an SQLite source
    #[arg(short, long)]
    table: Option<String>,

    /// Configuration file
    #[arg(short, long, env = "BHAJAN_BROWSER_CONFIG")]
    config: Option<PathBuf>,

    /// Open the view described by an address, e.g. "page=authors"
    #[arg(short, long)]
    address: Option<String>,

    /// Write the loaded collection as JSON and exit
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,

    /// Log filter, overrides the configured level
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let data_dir = app_dir().unwrap_or_else(|_| env::temp_dir().join(APP_DIR_NAME));
    let level = cli.log_level.as_deref().unwrap_or(&config.logging.level);
    if let Err(err) = logging::init(level, &config.log_path(&data_dir)) {
        eprintln!("warning: logging disabled: {err:#}");
    }

    let source = cli
        .source
        .unwrap_or_else(|| config.source_path(home_dir().as_deref()));
    let table = cli.table.unwrap_or_else(|| config.table.clone());
    let spec = SourceSpec::resolve(Some(source.as_path()), &table);
    let catalog = load_catalog(&spec)?;

    if let Some(path) = cli.export {
        export_json(catalog.collection(), &path)
            .with_context(|| format!("Failed to export collection to {}", path.display()))?;
        println!(
            "Exported {} bhajans to {}",
            catalog.collection().len(),
            path.display()
        );
        return Ok(());
    }

    let state = cli
        .address
        .map(|query| decode(&Address::parse(&query), &catalog))
        .unwrap_or_default();

    info!(origin = %catalog.origin(), "starting browser");
    let mut app = App::new(spec, Arc::new(catalog), state);
    run_app(&mut app)?;
    println!("{}", app.address());
    Ok(())
}
