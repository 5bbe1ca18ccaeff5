mod cli;
mod config;
mod download;
mod installed;
mod prompt;
mod prune;
mod release;
mod types;
mod updater;


use anyhow::Result;
use clap::Parser;
use cli::Cli;
use config::{get_config_file_path, load_settings};
use prompt::Confirm;
use std::io;
use updater::Updater;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(&cli)?;

    // Load configuration
    let config_path = get_config_file_path(cli.config.as_deref());
    let settings = load_settings(&config_path)?;

    let client = release::build_client()?;
    let updater = Updater::new(&settings, client, Confirm::from_flags(cli.yes, cli.no));

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    let outcome = if cli.check {
        updater.check(&mut output).await?
    } else {
        updater.run(&mut input, &mut output).await?
    };
    tracing::debug!("Finished: {:?}", outcome);

    Ok(())
}

fn setup_logging(cli: &Cli) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if cli.quiet {
        "error"
    } else if cli.verbose == 0 {
        "warn"
    } else if cli.verbose == 1 {
        "info"
    } else {
        "debug"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();

    Ok(())
}
