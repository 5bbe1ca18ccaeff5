//! The update workflow
//!
//! Fetch the latest release, compare it with the newest installed version,
//! and on confirmation download, extract and optionally prune.

use crate::download::{download_archive, extract_archive};
use crate::installed::{newest_installed, scan_installed};
use crate::prompt::Confirm;
use crate::prune::{prune_candidates, prune_old_versions};
use crate::release::{fetch_latest_release, select_archive_asset};
use crate::types::*;
use anyhow::Result;
use std::io::{BufRead, Write};

pub struct Updater<'a> {
    pub settings: &'a Settings,
    pub client: reqwest::Client,
    pub confirm: Confirm,
}

impl<'a> Updater<'a> {
    pub fn new(settings: &'a Settings, client: reqwest::Client, confirm: Confirm) -> Self {
        Self {
            settings,
            client,
            confirm,
        }
    }

    /// Report whether the latest release differs from what is installed.
    pub async fn check<W: Write>(&self, output: &mut W) -> Result<UpdateOutcome> {
        let release = fetch_latest_release(&self.client, self.settings).await?;
        let installed = scan_installed(&self.settings.install_dir)?;

        if is_up_to_date(&release.tag_name, &installed) {
            report_up_to_date(output, &release.tag_name)?;
            return Ok(UpdateOutcome::UpToDate {
                tag: release.tag_name,
            });
        }

        writeln!(
            output,
            "New version {} is available (installed: {}).",
            release.tag_name,
            newest_installed(&installed).unwrap_or("none")
        )?;
        Ok(UpdateOutcome::Available {
            tag: release.tag_name,
        })
    }

    pub async fn run<R: BufRead, W: Write>(
        &self,
        input: &mut R,
        output: &mut W,
    ) -> Result<UpdateOutcome> {
        let release = fetch_latest_release(&self.client, self.settings).await?;
        let installed = scan_installed(&self.settings.install_dir)?;
        let tag = release.tag_name.clone();

        if is_up_to_date(&tag, &installed) {
            report_up_to_date(output, &tag)?;
            return Ok(UpdateOutcome::UpToDate { tag });
        }
        if installed.is_empty() {
            tracing::info!(
                "No installed versions found in {}",
                self.settings.install_dir.display()
            );
        }

        let question = format!(
            "New version of Proton was found. Do you want to install {}?",
            tag
        );
        if !self.confirm.ask(&question, input, output)? {
            tracing::info!("Installation of {} declined", tag);
            return Ok(UpdateOutcome::Declined { tag });
        }

        let (asset, suffix) = select_archive_asset(&release, &self.settings.asset_suffixes)?;
        writeln!(output, "Downloading {}, this might take a while...", tag)?;
        let archive = download_archive(
            &self.client,
            &asset.browser_download_url,
            &tag,
            &suffix,
            &self.settings.download_dir,
        )
        .await?;

        writeln!(output, "Extracting {}", archive.display())?;
        let unpacked = extract_archive(&archive, &self.settings.install_dir)?;
        writeln!(
            output,
            "Installed {} into {}",
            tag,
            self.settings.install_dir.display()
        )?;
        if !unpacked.contains(&tag) {
            tracing::warn!(
                "{} unpacked into {:?}, not a directory named after it",
                tag,
                unpacked
            );
            writeln!(
                output,
                "{}",
                console::style(format!(
                    "Warning: {} was unpacked into {}; later runs will not see it as installed.",
                    tag,
                    unpacked.join(", ")
                ))
                .yellow()
            )?;
        }

        // Neither the new tag nor whatever the archive unpacked into may be pruned
        let mut keep = unpacked;
        keep.push(tag.clone());

        let pruned = if self.settings.keep_old {
            Vec::new()
        } else {
            self.prune(&installed, &keep, input, output)?
        };

        Ok(UpdateOutcome::Installed { tag, pruned })
    }

    fn prune<R: BufRead, W: Write>(
        &self,
        installed: &[String],
        keep: &[String],
        input: &mut R,
        output: &mut W,
    ) -> Result<Vec<String>> {
        let candidates: Vec<&String> = prune_candidates(installed)
            .iter()
            .filter(|name| !keep.contains(name))
            .collect();
        if candidates.is_empty() {
            tracing::debug!("No old versions to remove");
            return Ok(Vec::new());
        }

        let listing: Vec<&str> = candidates.iter().map(|s| s.as_str()).collect();
        let question = format!(
            "Remove {} old version(s): {}? This deletes them from disk.",
            candidates.len(),
            listing.join(", ")
        );
        if !self.confirm.ask(&question, input, output)? {
            tracing::info!("Keeping old versions");
            return Ok(Vec::new());
        }

        let report = prune_old_versions(&self.settings.install_dir, installed, keep);
        for name in &report.removed {
            writeln!(output, "Removed {}", name)?;
        }
        if !report.failed.is_empty() {
            return Err(UpdaterError::PruneFailed {
                failed: report.failed_names(),
            }
            .into());
        }
        Ok(report.removed)
    }
}

/// Exact string match against the newest installed version. Nothing
/// installed is never up to date.
pub fn is_up_to_date(tag: &str, installed: &[String]) -> bool {
    newest_installed(installed) == Some(tag)
}

fn report_up_to_date<W: Write>(output: &mut W, tag: &str) -> Result<()> {
    writeln!(
        output,
        "No new version of GE-Proton was found. Newest installed version is {}, latest available version is {}.",
        tag, tag
    )?;
    Ok(())
}
