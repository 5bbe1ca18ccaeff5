use clap::Parser;
use std::path::PathBuf;

fn get_version() -> &'static str {
    const BASE_VERSION: &str = env!("CARGO_PKG_VERSION");

    // Release builds report just the tag at HEAD
    if let Some(tag) = option_env!("GE_UPDATER_GIT_TAG") {
        return tag;
    }

    let commit = option_env!("GE_UPDATER_GIT_COMMIT").unwrap_or("unknown");
    let branch = option_env!("GE_UPDATER_GIT_BRANCH").unwrap_or("unknown");

    // Leaked once at startup; clap needs a 'static str
    let version = format!("v{}-{} ({})", BASE_VERSION, commit, branch);
    Box::leak(version.into_boxed_str())
}

#[derive(Parser, Debug)]
#[command(name = "ge-updater")]
#[command(about = "Keeps a GE-Proton installation up to date from GitHub Releases")]
#[command(version = get_version())]
#[command(after_help = "Examples:\n  ge-updater\n  ge-updater --check\n  ge-updater --config ~/.config/ge-updater/config.conf --yes")]
pub struct Cli {
    /// Increase verbosity (use multiple times for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Reduce output to errors only
    #[arg(short, long)]
    pub quiet: bool,

    /// Settings file to read (defaults to ./config.conf)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Answer yes to every question
    #[arg(short = 'y', long, conflicts_with = "no")]
    pub yes: bool,

    /// Answer no to every question
    #[arg(short = 'n', long)]
    pub no: bool,

    /// Only report whether a new version is available
    #[arg(long)]
    pub check: bool,
}
