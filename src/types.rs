use reqwest::StatusCode;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// The GitHub repository whose releases are installed.
pub const REPOSITORY: &str = "GloriousEggroll/proton-ge-custom";
pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_ASSET_SUFFIX: &str = ".tar.gz";

/// Values read once at startup and handed to every step of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub install_dir: PathBuf,
    pub keep_old: bool,
    pub api_base: String,
    pub asset_suffixes: Vec<String>,
    pub download_dir: PathBuf,
}

impl Settings {
    pub fn new(install_dir: PathBuf) -> Self {
        Self {
            install_dir,
            keep_old: true,
            api_base: DEFAULT_API_BASE.to_string(),
            asset_suffixes: vec![DEFAULT_ASSET_SUFFIX.to_string()],
            download_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GitHubRelease {
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<GitHubAsset>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GitHubAsset {
    pub name: String,
    pub browser_download_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    UpToDate { tag: String },
    Declined { tag: String },
    Available { tag: String },
    Installed { tag: String, pruned: Vec<String> },
}

#[derive(Debug, Error)]
pub enum UpdaterError {
    #[error("Config file {path} has no [{section}] {key} entry")]
    MissingConfig {
        path: PathBuf,
        section: String,
        key: String,
    },

    #[error("Config file {path}, line {line}: cannot parse '{content}'")]
    InvalidConfigLine {
        path: PathBuf,
        line: usize,
        content: String,
    },

    #[error("No releases found for {repository}")]
    ReleaseNotFound { repository: String },

    #[error("Failed to get release info for {repository}: {status}")]
    RequestFailed {
        repository: String,
        status: StatusCode,
    },

    #[error("Release {tag} has no asset ending in {}", suffixes.join(", "))]
    NoMatchingAsset { tag: String, suffixes: Vec<String> },

    #[error("Download of {url} failed: {status}")]
    DownloadFailed { url: String, status: StatusCode },

    #[error("Unsupported archive format: {}", path.display())]
    UnsupportedArchive { path: PathBuf },

    #[error("Input closed before a 'y' or 'n' answer was given")]
    PromptClosed,

    #[error("No valid answer after {attempts} attempts")]
    TooManyInvalidAnswers { attempts: usize },

    #[error("Could not remove {} old version(s): {}", failed.len(), failed.join(", "))]
    PruneFailed { failed: Vec<String> },
}
