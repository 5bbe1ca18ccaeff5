//! GitHub release feed
//!
//! Builds the "latest release" endpoint, fetches it, and picks the archive
//! asset to install.

use crate::config::APP_NAME;
use crate::types::{GitHubAsset, GitHubRelease, Settings, UpdaterError, REPOSITORY};
use anyhow::{Context, Result};
use reqwest::StatusCode;

/// Build the GitHub API URL for the latest release of `repository`
///
/// # Arguments
/// * `api_base` - API root, normally `https://api.github.com`
/// * `repository` - Repository in format "owner/repo"
pub fn latest_release_url(api_base: &str, repository: &str) -> String {
    format!(
        "{}/repos/{}/releases/latest",
        api_base.trim_end_matches('/'),
        repository
    )
}

pub fn build_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(format!("{}/{}", APP_NAME, env!("CARGO_PKG_VERSION")))
        .build()
        .context("Could not build HTTP client")
}

/// Fetch the latest GE-Proton release record
pub async fn fetch_latest_release(
    client: &reqwest::Client,
    settings: &Settings,
) -> Result<GitHubRelease> {
    let url = latest_release_url(&settings.api_base, REPOSITORY);
    tracing::debug!("Fetching GitHub release info from: {}", url);

    let response = client
        .get(&url)
        .header("Accept", "application/vnd.github.v3+json")
        .send()
        .await
        .with_context(|| format!("Could not reach {}", url))?;

    let status = response.status();
    if !status.is_success() {
        if status == StatusCode::NOT_FOUND {
            return Err(UpdaterError::ReleaseNotFound {
                repository: REPOSITORY.to_string(),
            }
            .into());
        }
        return Err(UpdaterError::RequestFailed {
            repository: REPOSITORY.to_string(),
            status,
        }
        .into());
    }

    let release: GitHubRelease = response
        .json()
        .await
        .with_context(|| format!("Could not decode release info from {}", url))?;
    tracing::info!(
        "Latest release of {} is {} ({} assets)",
        REPOSITORY,
        release.tag_name,
        release.assets.len()
    );
    Ok(release)
}

/// Pick the first asset whose name ends with one of `suffixes`.
///
/// Returns the asset together with the suffix it matched, so the download can
/// keep the archive's real extension.
pub fn select_archive_asset<'a>(
    release: &'a GitHubRelease,
    suffixes: &[String],
) -> Result<(&'a GitHubAsset, String)> {
    for asset in &release.assets {
        let name = asset.name.to_lowercase();
        if let Some(suffix) = suffixes.iter().find(|s| name.ends_with(&s.to_lowercase())) {
            tracing::debug!("Selected asset {} (matched {})", asset.name, suffix);
            let matched = asset
                .name
                .len()
                .checked_sub(suffix.len())
                .and_then(|start| asset.name.get(start..))
                .unwrap_or(suffix.as_str());
            return Ok((asset, matched.to_string()));
        }
    }

    Err(UpdaterError::NoMatchingAsset {
        tag: release.tag_name.clone(),
        suffixes: suffixes.to_vec(),
    }
    .into())
}
