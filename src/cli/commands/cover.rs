//! Cover command implementation.

use super::resolve_library_file;
use crate::artwork::{ArtworkResolver, ArtworkSource, CoverRequest, ImageInput};
use crate::cli::{CoverAction, Output};
use crate::config::Settings;
use anyhow::Result;

pub async fn run_cover(action: &CoverAction, settings: Settings) -> Result<()> {
    let resolver = ArtworkResolver::new(&settings)?;

    match action {
        CoverAction::File {
            title,
            image,
            artist,
            release_type,
            fuzzy,
        } => {
            let audio = resolve_library_file(&settings, title)?;
            let request = file_request(image.as_deref(), artist.clone(), release_type.clone(), *fuzzy);

            let spinner = Output::spinner("Resolving cover art...");
            let source = resolver.apply_to_file(&audio, &request).await;
            spinner.finish_and_clear();

            let source = source?;
            Output::success(&format!(
                "Cover applied to {} ({})",
                audio.display(),
                describe_source(source)
            ));
        }

        CoverAction::Album {
            name,
            image,
            artist,
            release_type,
            fuzzy,
        } => {
            let album_dir = settings.music_dir().join(name);
            let request = album_request(
                name,
                image.as_deref(),
                artist.clone(),
                release_type.clone(),
                *fuzzy,
            );

            let spinner = Output::spinner("Resolving album artwork...");
            let report = resolver.apply_to_album(&album_dir, name, &request).await;
            spinner.finish_and_clear();

            let report = report?;
            for name in &report.updated {
                Output::list_item(&format!("updated {}", name));
            }
            if let Some(summary) = report.error_summary() {
                Output::warning(&format!("Some tracks failed:\n{summary}"));
            }
            Output::success(&format!(
                "{} updated, {} failed",
                report.updated.len(),
                report.failures.len()
            ));
        }
    }

    Ok(())
}

/// Build the single-file request. The positional title only locates the
/// file; the lookup is driven by the embedded metadata title, with the
/// filename-derived title as the retry.
fn file_request(
    image: Option<&str>,
    artist: Option<String>,
    release_type: Option<String>,
    fuzzy: bool,
) -> CoverRequest {
    CoverRequest {
        title: None,
        album: None,
        artist,
        release_type,
        strict: !fuzzy,
        image: image.map(ImageInput::parse),
    }
}

/// Build the set-mode request for an album directory.
fn album_request(
    name: &str,
    image: Option<&str>,
    artist: Option<String>,
    release_type: Option<String>,
    fuzzy: bool,
) -> CoverRequest {
    CoverRequest {
        title: None,
        album: Some(name.to_string()),
        artist,
        release_type,
        strict: !fuzzy,
        image: image.map(ImageInput::parse),
    }
}

fn describe_source(source: ArtworkSource) -> &'static str {
    match source {
        ArtworkSource::Explicit => "explicit image",
        ArtworkSource::ReleaseGroup => "release group cover",
        ArtworkSource::Release => "release cover",
        ArtworkSource::AlbumFallback => "album fallback",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_request_leaves_title_to_embedded_metadata() {
        let request = file_request(None, Some("Artist".to_string()), None, false);
        assert!(request.title.is_none());
        assert!(request.strict);
        assert!(request.image.is_none());
    }

    #[test]
    fn test_album_request_carries_name_and_fuzzy_flag() {
        let request = album_request("My Album", Some("/tmp/cover.jpg"), None, None, true);
        assert_eq!(request.album.as_deref(), Some("My Album"));
        assert!(!request.strict);
        assert!(matches!(request.image, Some(ImageInput::File(_))));
    }
}
