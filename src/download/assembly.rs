//! Multi-track album assembly.
//!
//! Downloads every track of a playlist into an isolated working directory,
//! synthesizes cumulative chapter offsets from the probed track durations,
//! concatenates the tracks with stream copy, and stamps the combined file
//! with aggregate metadata. The working directory is removed on every exit
//! path.

use super::ytdlp;
use crate::chapters::{codec, Chapter};
use crate::config::Settings;
use crate::error::{Result, SkiveError};
use crate::files::{sanitize_concat_name, StagedWrite};
use crate::{artwork, probe, tool};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// One downloaded track awaiting assembly.
///
/// Owned by the pipeline for the lifetime of one assembly run; the backing
/// file lives in the working directory and is removed with it.
#[derive(Debug, Clone)]
pub struct TrackDescriptor {
    /// Position in the collection (the numeric filename prefix established
    /// at download time; unique by construction).
    pub position: u32,
    pub path: PathBuf,
    /// Probed duration; `None` when the probe failed. Degrades to a
    /// zero-length chapter rather than aborting the assembly.
    pub duration_ms: Option<u64>,
    pub title: String,
}

/// Aggregate metadata stamped onto the combined file at the end.
#[derive(Debug, Clone)]
pub struct AlbumMetadata {
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub genre: Option<String>,
}

/// Working directory that is removed when the pipeline exits, whether it
/// succeeded or failed.
struct WorkDir(PathBuf);

impl WorkDir {
    fn create(path: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&path)?;
        Ok(Self(path))
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

/// Download a playlist and assemble it into one chaptered album file.
///
/// Returns the final file path in the music directory.
pub async fn assemble_album(
    settings: &Settings,
    url: &str,
    metadata: &AlbumMetadata,
) -> Result<PathBuf> {
    let extension = settings.download.file_extension.trim_start_matches('.');
    let workdir = WorkDir::create(
        settings
            .temp_dir()
            .join(format!("album-{}", sanitize_concat_name(&metadata.title).unwrap_or_else(|| metadata.title.clone()))),
    )?;

    // Fetching: one file per track, ordinal prefix, no chapters yet
    let template = workdir.path().join("%(playlist_index)s_%(title)s.%(ext)s");
    let meta_args = ytdlp::build_meta_args(&metadata.artist, None, metadata.genre.as_deref(), metadata.album.as_deref());
    ytdlp::download_tracks(url, &template, &settings.download.audio_format, &meta_args, false).await?;

    // Sanitizing: quote characters corrupt the concat manifest
    let mut files = collect_tracks(workdir.path(), extension)?;
    if files.is_empty() {
        return Err(SkiveError::Download("Playlist produced no tracks".into()));
    }
    for file in &mut files {
        *file = sanitize_track_path(file)?;
    }

    // ChapterSynthesis: strictly in collection order, cumulative offsets
    let mut tracks = Vec::new();
    for path in files {
        let position = track_position(&path).ok_or_else(|| {
            SkiveError::Download(format!(
                "Track {} has no ordinal prefix",
                path.display()
            ))
        })?;
        let duration_ms = match probe::duration_ms(&path).await {
            Ok(ms) => Some(ms),
            Err(e) => {
                warn!("Duration probe failed for {}: {e}; chapter will be zero-length", path.display());
                None
            }
        };
        let title = match probe::format_tags(&path).await {
            Ok(tags) => tags
                .get("title")
                .cloned()
                .unwrap_or_else(|| title_from_filename(&path)),
            Err(_) => title_from_filename(&path),
        };
        tracks.push(TrackDescriptor {
            position,
            path,
            duration_ms,
            title,
        });
    }
    tracks.sort_by_key(|t| t.position);
    let chapters = synthesize_track_chapters(&tracks);

    let metadata_file = workdir.path().join("chapters.txt");
    std::fs::write(&metadata_file, codec::to_ffmetadata(&chapters))?;

    // Concatenating: manifest of absolute paths in sorted order
    let concat_file = workdir.path().join("concat.list");
    std::fs::write(&concat_file, concat_manifest(&tracks)?)?;

    let combined = workdir.path().join(format!("combined.{extension}"));
    let mut cmd = Command::new("ffmpeg");
    cmd.arg("-f").arg("concat")
        .arg("-safe").arg("0")
        .arg("-i").arg(&concat_file)
        .arg("-i").arg(&metadata_file)
        .arg("-map").arg("0:a")
        .arg("-map_chapters").arg("1")
        .arg("-c").arg("copy")
        .arg("-y")
        .arg(&combined);

    debug!("ffmpeg concat: {:?}", cmd);
    let output = tool::run("ffmpeg", &mut cmd).await?;
    tool::check("ffmpeg", "concatenation", &output)?;

    // Carry the first track's embedded thumbnail over to the album file.
    // Best effort; a missing thumbnail is not a failure.
    if let Some(first) = tracks.first() {
        if let Err(e) = carry_over_thumbnail(&first.path, workdir.path(), &combined).await {
            warn!("Could not carry over track thumbnail: {e}");
        }
    }

    // Stamping: the collection title is written only now, so per-track
    // titles were never overwritten prematurely
    let final_path = settings
        .music_dir()
        .join(format!("{}{}", metadata.title, settings.download.file_extension));
    stamp_album_metadata(&combined, &final_path, metadata).await?;

    info!("Album assembled at {}", final_path.display());
    Ok(final_path)
}

/// Compute chapters from track durations with cumulative offsets.
///
/// A track with an unknown duration becomes a zero-length chapter; the
/// assembly still produces a file.
pub fn synthesize_track_chapters(tracks: &[TrackDescriptor]) -> Vec<Chapter> {
    let mut chapters = Vec::with_capacity(tracks.len());
    let mut offset: u64 = 0;
    for track in tracks {
        let duration = track.duration_ms.unwrap_or(0);
        chapters.push(Chapter::new(offset, offset + duration, track.title.clone()));
        offset += duration;
    }
    chapters
}

/// Build the concat demuxer manifest: absolute paths, single-quoted.
fn concat_manifest(tracks: &[TrackDescriptor]) -> Result<String> {
    let mut manifest = String::new();
    for track in tracks {
        let absolute = track.path.canonicalize()?;
        manifest.push_str(&format!("file '{}'\n", absolute.display()));
    }
    Ok(manifest)
}

/// List downloaded track files with the expected extension.
fn collect_tracks(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().map(|e| e.to_string_lossy().to_string()) == Some(extension.to_string())
        {
            files.push(path);
        }
    }
    Ok(files)
}

/// Rename a track file if its name would corrupt the concat manifest.
fn sanitize_track_path(path: &Path) -> Result<PathBuf> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    match sanitize_concat_name(&name) {
        Some(safe) => {
            let renamed = path.with_file_name(safe);
            std::fs::rename(path, &renamed)?;
            debug!("Renamed {} -> {}", path.display(), renamed.display());
            Ok(renamed)
        }
        None => Ok(path.to_path_buf()),
    }
}

/// Parse the numeric collection ordinal from a track filename prefix.
pub fn track_position(path: &Path) -> Option<u32> {
    path.file_name()?
        .to_string_lossy()
        .split('_')
        .next()?
        .parse()
        .ok()
}

/// Derive a chapter title from a track filename: everything after the
/// ordinal prefix, without the extension.
pub fn title_from_filename(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    match stem.split_once('_') {
        Some((_, rest)) => rest.to_string(),
        None => stem,
    }
}

/// Stamp aggregate metadata onto the combined file, writing the final path
/// through a staged swap.
async fn stamp_album_metadata(
    combined: &Path,
    final_path: &Path,
    metadata: &AlbumMetadata,
) -> Result<()> {
    if let Some(parent) = final_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let staged = StagedWrite::new(final_path);

    let mut cmd = Command::new("ffmpeg");
    cmd.arg("-i").arg(combined)
        .arg("-map").arg("0")
        .arg("-map_metadata").arg("0")
        .arg("-c").arg("copy")
        .arg("-metadata").arg(format!("title={}", metadata.title))
        .arg("-metadata").arg(format!("artist={}", metadata.artist));
    if let Some(album) = &metadata.album {
        cmd.arg("-metadata").arg(format!("album={album}"));
    }
    if let Some(genre) = &metadata.genre {
        cmd.arg("-metadata").arg(format!("genre={genre}"));
    }
    cmd.arg("-y").arg(staged.staged_path());

    let output = tool::run("ffmpeg", &mut cmd).await?;
    tool::check("ffmpeg", "metadata stamping", &output)?;
    staged.commit()
}

/// Extract the attached picture from `source` and apply it to `target`.
async fn carry_over_thumbnail(source: &Path, workdir: &Path, target: &Path) -> Result<()> {
    let cover = workdir.join("cover.jpg");
    let mut cmd = Command::new("ffmpeg");
    cmd.arg("-i").arg(source)
        .arg("-map").arg("0:v")
        .arg("-c").arg("copy")
        .arg("-y")
        .arg(&cover);

    let output = tool::run("ffmpeg", &mut cmd).await?;
    tool::check("ffmpeg", "thumbnail extraction", &output)?;

    let image = std::fs::read(&cover)?;
    artwork::embed::apply_image(target, &image).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(position: u32, duration_ms: Option<u64>, title: &str) -> TrackDescriptor {
        TrackDescriptor {
            position,
            path: PathBuf::from(format!("{position}_{title}.opus")),
            duration_ms,
            title: title.to_string(),
        }
    }

    #[test]
    fn test_cumulative_offsets_with_unprobeable_track() {
        let tracks = vec![
            track(1, Some(200_000), "One"),
            track(2, Some(150_000), "Two"),
            track(3, None, "Three"),
        ];
        let chapters = synthesize_track_chapters(&tracks);

        let starts: Vec<u64> = chapters.iter().map(|c| c.start_ms).collect();
        assert_eq!(starts, vec![0, 200_000, 350_000]);
        // Zero-length but present
        assert_eq!(chapters[2].end_ms, Some(350_000));
        assert_eq!(chapters[2].title, "Three");
    }

    #[test]
    fn test_track_position_parsing() {
        assert_eq!(track_position(Path::new("3_Song.opus")), Some(3));
        assert_eq!(track_position(Path::new("12_A_B.opus")), Some(12));
        assert_eq!(track_position(Path::new("NoPrefix.opus")), None);
    }

    #[test]
    fn test_title_from_filename() {
        assert_eq!(title_from_filename(Path::new("3_My Song.opus")), "My Song");
        assert_eq!(title_from_filename(Path::new("7_A_B.opus")), "A_B");
        assert_eq!(title_from_filename(Path::new("Plain.opus")), "Plain");
    }

    #[test]
    fn test_concat_manifest_quotes_paths() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("1_Track.opus");
        std::fs::write(&file, b"x").unwrap();
        let tracks = vec![TrackDescriptor {
            position: 1,
            path: file.clone(),
            duration_ms: Some(1000),
            title: "Track".into(),
        }];
        let manifest = concat_manifest(&tracks).unwrap();
        assert!(manifest.starts_with("file '"));
        assert!(manifest.trim_end().ends_with("1_Track.opus'"));
    }
}
