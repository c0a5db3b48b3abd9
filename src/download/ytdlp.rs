//! yt-dlp invocation: info fetch, single-song download, and per-track
//! playlist download.

use crate::error::{Result, SkiveError};
use crate::tool;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, info};

/// Basic video info used to default the output name and artist.
#[derive(Debug, Clone)]
pub struct VideoInfo {
    pub title: String,
    pub uploader: String,
}

/// Fetch a video's title and uploader.
pub async fn video_info(url: &str) -> Result<VideoInfo> {
    let mut cmd = Command::new("yt-dlp");
    cmd.arg("--print").arg("title")
        .arg("--print").arg("uploader")
        .arg("--no-warnings")
        .arg(url);

    let output = tool::run("yt-dlp", &mut cmd).await?;
    tool::check("yt-dlp", "info fetch", &output)?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut lines = stdout.lines();
    match (lines.next(), lines.next()) {
        (Some(title), Some(uploader)) => Ok(VideoInfo {
            title: title.trim().to_string(),
            uploader: uploader.trim().to_string(),
        }),
        _ => Err(SkiveError::Download(format!(
            "Unexpected yt-dlp info output: {}",
            stdout.trim()
        ))),
    }
}

/// Quote a metadata value for a `-metadata key='value'` postprocessor
/// argument. yt-dlp splits the argument string shell-style, so embedded
/// single quotes use the `'\''` form.
pub fn quote_meta_value(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Build the ffmpeg postprocessor metadata argument string.
pub fn build_meta_args(
    artist: &str,
    title: Option<&str>,
    genre: Option<&str>,
    album: Option<&str>,
) -> String {
    let mut args = format!("-metadata artist={}", quote_meta_value(artist));
    if let Some(title) = title {
        args.push_str(&format!(" -metadata title={}", quote_meta_value(title)));
    }
    if let Some(genre) = genre {
        args.push_str(&format!(" -metadata genre={}", quote_meta_value(genre)));
    }
    if let Some(album) = album {
        args.push_str(&format!(" -metadata album={}", quote_meta_value(album)));
    }
    args
}

/// Download one video as a single tagged audio file.
///
/// `output_template` must end in `.%(ext)s`; yt-dlp resolves the extension.
pub async fn download_song(
    url: &str,
    output_template: &Path,
    audio_format: &str,
    meta_args: &str,
    embed_chapters: bool,
) -> Result<()> {
    let chapter_flag = if embed_chapters {
        "--embed-chapters"
    } else {
        "--no-embed-chapters"
    };

    let mut cmd = Command::new("yt-dlp");
    cmd.arg("-x")
        .arg("--audio-format").arg(audio_format)
        .arg("--embed-thumbnail")
        .arg("--add-metadata")
        .arg(chapter_flag)
        .arg("--postprocessor-args").arg(meta_args)
        .arg("-o").arg(output_template)
        .arg("--no-playlist")
        .arg(url);

    debug!("yt-dlp song download: {:?}", cmd);
    let output = tool::run("yt-dlp", &mut cmd).await?;
    tool::check("yt-dlp", "download", &output)?;

    info!("Download complete");
    Ok(())
}

/// Download every track of a playlist as its own pre-tagged file.
///
/// Chapters and the collection title are deliberately left out here; they
/// are reconciled later (chapter synthesis for album assembly, per-track
/// titles for split playlists). When `track_numbers` is set the playlist
/// index is parsed into the track_number tag.
pub async fn download_tracks(
    url: &str,
    output_template: &Path,
    audio_format: &str,
    meta_args: &str,
    track_numbers: bool,
) -> Result<()> {
    let mut cmd = Command::new("yt-dlp");
    cmd.arg("-x")
        .arg("--audio-format").arg(audio_format)
        .arg("--embed-thumbnail")
        .arg("--add-metadata")
        .arg("--no-embed-chapters")
        .arg("--postprocessor-args").arg(meta_args);

    if track_numbers {
        cmd.arg("--parse-metadata").arg("playlist_index:%(track_number)s");
    }

    cmd.arg("-o").arg(output_template).arg(url);

    debug!("yt-dlp playlist download: {:?}", cmd);
    let output = tool::run("yt-dlp", &mut cmd).await?;
    tool::check("yt-dlp", "playlist download", &output)?;

    info!("Playlist download complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_meta_args_full() {
        let args = build_meta_args(
            "Artist",
            Some("My Song"),
            Some("Rock; Jazz"),
            Some("The Album"),
        );
        assert_eq!(
            args,
            "-metadata artist='Artist' -metadata title='My Song' \
             -metadata genre='Rock; Jazz' -metadata album='The Album'"
        );
    }

    #[test]
    fn test_build_meta_args_minimal() {
        assert_eq!(build_meta_args("X", None, None, None), "-metadata artist='X'");
    }

    #[test]
    fn test_quote_meta_value_escapes_single_quotes() {
        assert_eq!(quote_meta_value("Don't"), r"'Don'\''t'");
    }
}
