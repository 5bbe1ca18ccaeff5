use crate::types::UpdaterError;
use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use futures_util::{Stream, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{Read, Write};
use std::path::{Component, Path, PathBuf};
use tar::Archive;

/// What a streamed copy moved, and the most it ever held at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CopyStats {
    pub bytes: u64,
    pub largest_chunk: usize,
}

/// Write every chunk of `stream` to `writer` as it arrives.
pub async fn copy_stream<S, B, E, W>(
    stream: S,
    writer: &mut W,
    pb: &ProgressBar,
) -> Result<CopyStats>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::error::Error + Send + Sync + 'static,
    W: Write,
{
    futures_util::pin_mut!(stream);
    let mut stats = CopyStats::default();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        let chunk = chunk.as_ref();
        writer.write_all(chunk)?;
        stats.bytes += chunk.len() as u64;
        stats.largest_chunk = stats.largest_chunk.max(chunk.len());
        pb.set_position(stats.bytes);
    }
    writer.flush()?;
    Ok(stats)
}

/// Local file name for a release archive; tags may contain slashes.
pub fn archive_file_name(tag: &str, suffix: &str) -> String {
    format!("{}{}", tag.replace('/', "__"), suffix)
}

/// Stream `url` into `<download_dir>/<tag><suffix>` and return that path.
pub async fn download_archive(
    client: &reqwest::Client,
    url: &str,
    tag: &str,
    suffix: &str,
    download_dir: &Path,
) -> Result<PathBuf> {
    let local_path = download_dir.join(archive_file_name(tag, suffix));
    tracing::info!("Downloading {} to {}", url, local_path.display());

    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Could not reach {}", url))?;
    let status = response.status();
    if !status.is_success() {
        return Err(UpdaterError::DownloadFailed {
            url: url.to_string(),
            status,
        }
        .into());
    }

    let total_size = response.content_length().unwrap_or(0);
    let pb = ProgressBar::new(total_size);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} {spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")?
            .progress_chars("#>-"),
    );
    pb.set_message(format!("Downloading {}", tag));

    let mut file = fs::File::create(&local_path)
        .with_context(|| format!("Could not create {}", local_path.display()))?;
    let stats = copy_stream(response.bytes_stream(), &mut file, &pb)
        .await
        .with_context(|| format!("Download of {} was interrupted", url))?;

    pb.finish_with_message("Download complete");
    tracing::debug!(
        "Wrote {} bytes, largest chunk {} bytes",
        stats.bytes,
        stats.largest_chunk
    );
    Ok(local_path)
}

/// Unpack `archive_path` into `install_dir`, then delete the archive.
///
/// The archive's own top-level directory is kept, so `install_dir` ends up as
/// the parent of the new version. Returns the top-level names the archive
/// unpacked into, in archive order. A failure part way leaves whatever was
/// already unpacked, and the archive, in place.
pub fn extract_archive(archive_path: &Path, install_dir: &Path) -> Result<Vec<String>> {
    tracing::info!(
        "Extracting {} into {}",
        archive_path.display(),
        install_dir.display()
    );

    let name = archive_path.to_string_lossy().to_lowercase();
    let file = fs::File::open(archive_path)
        .with_context(|| format!("Could not open {}", archive_path.display()))?;

    let top_level = if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        unpack_tar(GzDecoder::new(file), install_dir)?
    } else if name.ends_with(".tar.xz") {
        unpack_tar(xz2::read::XzDecoder::new(file), install_dir)?
    } else {
        return Err(UpdaterError::UnsupportedArchive {
            path: archive_path.to_path_buf(),
        }
        .into());
    };

    fs::remove_file(archive_path)
        .with_context(|| format!("Could not delete {}", archive_path.display()))?;
    tracing::debug!("Removed {}", archive_path.display());
    Ok(top_level)
}

fn unpack_tar<R: Read>(reader: R, install_dir: &Path) -> Result<Vec<String>> {
    let context = || format!("Could not extract into {}", install_dir.display());
    let mut archive = Archive::new(reader);
    let mut top_level: Vec<String> = Vec::new();

    for entry in archive.entries().with_context(context)? {
        let mut entry = entry.with_context(context)?;
        if let Some(first) = top_level_name(&entry.path().with_context(context)?) {
            if !top_level.contains(&first) {
                top_level.push(first);
            }
        }
        // unpack_in refuses entries that would land outside install_dir
        entry.unpack_in(install_dir).with_context(context)?;
    }

    tracing::debug!("Archive top-level entries: {:?}", top_level);
    Ok(top_level)
}

fn top_level_name(path: &Path) -> Option<String> {
    path.components().find_map(|c| match c {
        Component::Normal(name) => Some(name.to_string_lossy().to_string()),
        _ => None,
    })
}
