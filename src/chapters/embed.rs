//! Stamping chapters onto files and reading them back out.
//!
//! All writes go through a staged temp file and are only swapped into place
//! after ffmpeg reports success; on failure the original file is untouched.

use super::{codec, Chapter};
use crate::error::Result;
use crate::files::StagedWrite;
use crate::{probe, tool};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

/// Parse a timestamp block and stamp the resulting chapters onto `audio`.
///
/// The final chapter is closed at the file's probed total duration, which
/// makes a failed duration probe fatal here. Returns the applied sequence.
pub async fn apply_timestamps(audio: &Path, timestamps: &str) -> Result<Vec<Chapter>> {
    let pairs = codec::parse_timestamps(timestamps)?;
    let total_ms = probe::duration_ms(audio).await?;
    let chapters = codec::synthesize_boundaries(&pairs, total_ms);

    let document = codec::to_ffmetadata(&chapters);
    let meta_file = tempfile::Builder::new()
        .prefix("skive-chapters")
        .suffix(".txt")
        .tempfile()?;
    std::fs::write(meta_file.path(), &document)?;

    let staged = StagedWrite::new(audio);
    debug!("Applying {} chapters to {}", chapters.len(), audio.display());

    let mut cmd = Command::new("ffmpeg");
    cmd.arg("-i").arg(audio)
        .arg("-i").arg(meta_file.path())
        .arg("-map_metadata").arg("0")
        .arg("-map_chapters").arg("1")
        .arg("-c").arg("copy")
        .arg("-y")
        .arg(staged.staged_path());

    let output = tool::run("ffmpeg", &mut cmd).await?;
    tool::check("ffmpeg", "chapter remap", &output)?;
    staged.commit()?;

    info!("Applied {} chapters to {}", chapters.len(), audio.display());
    Ok(chapters)
}

/// Strip all chapters from a file, preserving every other metadata field.
///
/// Removing chapters from a file that has none is a no-op that still
/// succeeds.
pub async fn remove_chapters(audio: &Path) -> Result<()> {
    let staged = StagedWrite::new(audio);

    let mut cmd = Command::new("ffmpeg");
    cmd.arg("-i").arg(audio)
        .arg("-map_metadata").arg("0")
        .arg("-map_chapters").arg("-1")
        .arg("-c").arg("copy")
        .arg("-y")
        .arg(staged.staged_path());

    let output = tool::run("ffmpeg", &mut cmd).await?;
    tool::check("ffmpeg", "chapter removal", &output)?;
    staged.commit()?;

    info!("Removed chapters from {}", audio.display());
    Ok(())
}

/// Extract embedded chapters to a sidecar text file next to the audio.
///
/// Returns the sidecar path, or `None` when the file has no chapters.
/// Chapterless files are a valid terminal state, not an error.
pub async fn export_chapters(audio: &Path) -> Result<Option<PathBuf>> {
    let probed = probe::chapters(audio).await?;
    if probed.is_empty() {
        info!("No chapters found in {}", audio.display());
        return Ok(None);
    }

    let sidecar = audio.with_extension("txt");
    std::fs::write(&sidecar, codec::format_sidecar(&probed))?;

    info!("Chapters saved to {}", sidecar.display());
    Ok(Some(sidecar))
}
