//! Audio download orchestration.
//!
//! Drives yt-dlp for single songs and playlists, reconciles artist/tag
//! input against the canonical lists, and hands multi-track album requests
//! to the assembly pipeline.

pub mod assembly;
pub mod ytdlp;

use crate::config::Settings;
use crate::error::{Result, SkiveError};
use crate::reconcile::{self, ConfirmationGate};
use std::path::PathBuf;
use tracing::info;

/// What to do with the source reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DownloadKind {
    /// One video, one tagged audio file.
    Song,
    /// A playlist combined into one album file with chapters.
    Album,
    /// A playlist split into individual files in a subdirectory.
    Playlist,
}

/// A download request as it arrives from the command surface.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: String,
    pub kind: DownloadKind,
    /// Output name; defaults to the video title.
    pub output_name: Option<String>,
    /// Artist; defaults to the video uploader.
    pub artist: Option<String>,
    /// Free-text tag string, comma/semicolon separated.
    pub tags: Option<String>,
    pub album: Option<String>,
    /// `Some(false)` suppresses chapter embedding even when the source has
    /// chapters; `None` keeps the source's chapters.
    pub embed_chapters: Option<bool>,
}

/// Result of a completed download.
#[derive(Debug)]
pub enum DownloadOutcome {
    /// Path of the single finished audio file.
    Song(PathBuf),
    /// Directory holding the split playlist tracks.
    Playlist(PathBuf),
    /// Path of the assembled album file.
    Album(PathBuf),
}

/// Run a download request end to end.
///
/// Defaults missing name/artist from the video info, reconciles artist and
/// tags against the canonical lists (which may abort via the gate), asks
/// for confirmation before touching an existing output file, then
/// dispatches per kind.
pub async fn run(
    settings: &Settings,
    gate: &dyn ConfirmationGate,
    request: &DownloadRequest,
) -> Result<DownloadOutcome> {
    // Fill defaults from the video before reconciling
    let info = if request.output_name.is_none() || request.artist.is_none() {
        Some(ytdlp::video_info(&request.url).await?)
    } else {
        None
    };

    let output_name = request
        .output_name
        .clone()
        .or_else(|| info.as_ref().map(|i| i.title.clone()))
        .unwrap_or_else(|| "Untitled".to_string());
    let artist = request
        .artist
        .clone()
        .or_else(|| info.as_ref().map(|i| i.uploader.clone()))
        .unwrap_or_else(|| "Unknown".to_string());

    let artist = reconcile::reconcile_artist(&settings.artists_file(), &artist, gate).await?;

    let tags_str = match &request.tags {
        Some(raw) => {
            let tags = reconcile::split_tags(raw);
            let resolved = reconcile::reconcile_tags(&settings.tags_file(), &tags, gate).await?;
            // Semicolon-joined, the separator the target containers expect
            Some(resolved.join("; "))
        }
        None => None,
    };

    let title_meta = match request.kind {
        DownloadKind::Playlist => None,
        _ => Some(output_name.as_str()),
    };
    let album_meta = match request.kind {
        // A split playlist always groups its tracks under an album name
        DownloadKind::Playlist => Some(request.album.clone().unwrap_or_else(|| output_name.clone())),
        _ => request.album.clone(),
    };
    let meta_args = ytdlp::build_meta_args(
        &artist,
        title_meta,
        tags_str.as_deref(),
        album_meta.as_deref(),
    );

    let final_file = settings
        .music_dir()
        .join(format!("{}{}", output_name, settings.download.file_extension));
    let prompt = if final_file.exists() {
        format!(
            "\"{}\" already exists, continue anyways?\nArguments: {}",
            final_file.display(),
            meta_args
        )
    } else {
        format!("Arguments: {}", meta_args)
    };
    if !gate.confirm(&prompt).await? {
        return Err(SkiveError::ConfirmationDeclined(
            "download not confirmed".to_string(),
        ));
    }

    std::fs::create_dir_all(settings.music_dir())?;

    match request.kind {
        DownloadKind::Song => {
            let template = settings.music_dir().join(format!("{}.%(ext)s", output_name));
            let embed = request.embed_chapters.unwrap_or(true);
            ytdlp::download_song(
                &request.url,
                &template,
                &settings.download.audio_format,
                &meta_args,
                embed,
            )
            .await?;
            info!("Saved {}", final_file.display());
            Ok(DownloadOutcome::Song(final_file))
        }
        DownloadKind::Playlist => {
            let dir = settings.music_dir().join(&output_name);
            std::fs::create_dir_all(&dir)?;
            let template = dir.join("%(title)s.%(ext)s");
            ytdlp::download_tracks(
                &request.url,
                &template,
                &settings.download.audio_format,
                &meta_args,
                true,
            )
            .await?;
            info!("Saved playlist to {}", dir.display());
            Ok(DownloadOutcome::Playlist(dir))
        }
        DownloadKind::Album => {
            let metadata = assembly::AlbumMetadata {
                title: output_name.clone(),
                artist,
                album: album_meta,
                genre: tags_str,
            };
            let path = assembly::assemble_album(settings, &request.url, &metadata).await?;
            Ok(DownloadOutcome::Album(path))
        }
    }
}
