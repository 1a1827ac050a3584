use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::error;
use todocal::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with custom format
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level))
        .format(|buf, record| {
            use chrono::Local;
            use std::io::Write;
            writeln!(
                buf,
                "{} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();

    todocal::env_manager::load_env_files();

    if let Err(err) = todocal::run(cli).await {
        error!("Failed to process command: {:?}", err);
        std::process::exit(1);
    }
    Ok(())
}
