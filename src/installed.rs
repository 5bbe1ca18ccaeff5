use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Case-insensitive fragment that marks a directory as an installed version.
pub const VERSION_MARKER: &str = "proton";

/// Lists installed versions directly under `install_dir`, sorted ascending.
///
/// Only directories whose lower-cased name contains [`VERSION_MARKER`] are
/// returned. The scan does not recurse.
pub fn scan_installed(install_dir: &Path) -> Result<Vec<String>> {
    tracing::debug!("Scanning {} for installed versions", install_dir.display());

    let entries = fs::read_dir(install_dir).with_context(|| {
        format!(
            "Could not read install directory {}",
            install_dir.display()
        )
    })?;

    let mut versions = Vec::new();
    for entry in entries {
        let entry = entry?;
        // metadata() follows symlinks, so a link to a version directory counts
        let is_dir = entry.path().metadata().map(|m| m.is_dir()).unwrap_or(false);
        if !is_dir {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        if name.to_lowercase().contains(VERSION_MARKER) {
            versions.push(name);
        }
    }

    versions.sort();
    tracing::debug!("Installed versions: {:?}", versions);
    Ok(versions)
}

/// The newest installed version is the lexicographically greatest name.
pub fn newest_installed(installed: &[String]) -> Option<&str> {
    installed.last().map(String::as_str)
}
