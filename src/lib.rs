pub mod app;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod env_manager;
pub mod extract;
pub mod llm;
pub mod notify;
pub mod reader;

use anyhow::Result;
use log::*;

pub async fn run(cli: cli::Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.apply_env_overrides()?;
    debug!("Effective config: {:?}", config);

    let app = app::Application::new(config, cli.config.clone());
    info!("Initializing todocal");
    app.execute(cli).await
}

/// Debug-level logger for tests and embedding. Safe to call more than once.
pub fn init_logger() {
    let _ = env_logger::Builder::new()
        .filter_level(log::LevelFilter::Debug)
        .format_timestamp(None)
        .format_target(false)
        .is_test(true)
        .try_init();
}

// Re-export commonly used types
pub use calendar::{CalendarEvent, CalendarService};
pub use config::Config;
pub use extract::{ActionItem, ActionItemExtractor, RawActionItem};
pub use llm::LanguageModel;
