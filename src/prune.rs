use std::fs;
use std::path::Path;

#[derive(Debug, Default)]
pub struct PruneReport {
    pub removed: Vec<String>,
    pub failed: Vec<(String, std::io::Error)>,
}

impl PruneReport {
    pub fn failed_names(&self) -> Vec<String> {
        self.failed.iter().map(|(name, _)| name.clone()).collect()
    }
}

/// Every installed version except the newest (last) one.
pub fn prune_candidates(installed: &[String]) -> &[String] {
    match installed.split_last() {
        Some((_, older)) => older,
        None => &[],
    }
}

/// Remove the older versions in `installed` from `install_dir`.
///
/// Entries named in `keep` are skipped. One failed removal does not stop the
/// others; whatever was removed stays removed.
pub fn prune_old_versions(
    install_dir: &Path,
    installed: &[String],
    keep: &[String],
) -> PruneReport {
    let mut report = PruneReport::default();

    for name in prune_candidates(installed) {
        if keep.contains(name) {
            tracing::debug!("Keeping {}", name);
            continue;
        }

        let path = install_dir.join(name);
        tracing::info!("Removing {}", path.display());
        match fs::remove_dir_all(&path) {
            Ok(()) => report.removed.push(name.clone()),
            Err(e) => {
                tracing::warn!("Failed to remove {}: {}", path.display(), e);
                report.failed.push((name.clone(), e));
            }
        }
    }

    report
}
