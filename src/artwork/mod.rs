//! Cover art resolution.
//!
//! Resolves an image for a single file or for every track in an album
//! directory, through an ordered chain of strategies: explicit caller
//! input, database lookup by metadata title, database lookup by filename
//! title, then (in set mode) a shared album-level fallback. Per-item
//! failures are collected, never raised; only structurally invalid
//! requests error out.

pub mod embed;
pub mod musicbrainz;

use crate::config::Settings;
use crate::error::{Result, SkiveError};
use crate::probe;
use musicbrainz::MbClient;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use url::Url;

/// Where a resolved image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtworkSource {
    /// Caller-supplied bytes, URL, or local file.
    Explicit,
    /// Cover Art Archive, release-group scope.
    ReleaseGroup,
    /// Cover Art Archive, release scope.
    Release,
    /// The album-level fallback image shared across a set.
    AlbumFallback,
}

/// A resolved image, produced transiently during resolution.
#[derive(Debug, Clone)]
pub struct ArtworkCandidate {
    pub data: Vec<u8>,
    pub source: ArtworkSource,
}

/// Aggregate outcome of a set-mode resolution.
#[derive(Debug, Default)]
pub struct ArtworkReport {
    /// File names that received artwork.
    pub updated: Vec<String>,
    /// File names that failed, with reasons.
    pub failures: Vec<(String, String)>,
}

impl ArtworkReport {
    /// Per-item failures joined into one displayable string, if any.
    pub fn error_summary(&self) -> Option<String> {
        if self.failures.is_empty() {
            return None;
        }
        Some(
            self.failures
                .iter()
                .map(|(name, reason)| format!("{name}: {reason}"))
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }
}

/// Caller-supplied image input: raw bytes, a reachable URL, or a local
/// file path.
#[derive(Debug, Clone)]
pub enum ImageInput {
    Bytes(Vec<u8>),
    Url(String),
    File(PathBuf),
}

impl ImageInput {
    /// Classify a textual input as URL or local path.
    pub fn parse(input: &str) -> Self {
        match Url::parse(input) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
                ImageInput::Url(input.to_string())
            }
            _ => ImageInput::File(PathBuf::from(input)),
        }
    }

    /// Materialize the image bytes.
    pub async fn fetch(&self, http: &reqwest::Client) -> Result<Vec<u8>> {
        match self {
            ImageInput::Bytes(bytes) => Ok(bytes.clone()),
            ImageInput::File(path) => Ok(std::fs::read(path)?),
            ImageInput::Url(url) => {
                let response = http.get(url).send().await?;
                if !response.status().is_success() {
                    return Err(SkiveError::Lookup(format!(
                        "image fetch returned status {}",
                        response.status()
                    )));
                }
                Ok(response.bytes().await?.to_vec())
            }
        }
    }
}

/// A cover resolution request.
#[derive(Debug, Clone, Default)]
pub struct CoverRequest {
    /// Title override; defaults to the file's metadata title.
    pub title: Option<String>,
    /// Album name (required identifier for set mode when no title given).
    pub album: Option<String>,
    /// Artist override; defaults to the file's metadata artist.
    pub artist: Option<String>,
    /// Optional release-type filter (album, single, ep, ...).
    pub release_type: Option<String>,
    /// Exact-phrase search when true, bare terms otherwise.
    pub strict: bool,
    /// Explicit image, bypassing the database entirely.
    pub image: Option<ImageInput>,
}

/// The artwork resolution engine.
pub struct ArtworkResolver {
    mb: MbClient,
    http: reqwest::Client,
    cover_size: u32,
    file_extension: String,
}

impl ArtworkResolver {
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(Self {
            mb: MbClient::new(&settings.user_agent())?,
            http: reqwest::Client::new(),
            cover_size: settings.download.default_cover_size,
            file_extension: settings.download.file_extension.clone(),
        })
    }

    /// Resolve and embed a cover for a single file.
    ///
    /// Chain: explicit input → database by metadata title → database by
    /// filename-derived title. Returns the winning source.
    pub async fn apply_to_file(&self, file: &Path, request: &CoverRequest) -> Result<ArtworkSource> {
        if !file.exists() {
            return Err(SkiveError::FileNotFound(file.display().to_string()));
        }

        let candidate = self.resolve_for_file(file, request, None).await?;
        embed::validate_image(&candidate.data)?;
        embed::apply_image(file, &candidate.data).await?;
        Ok(candidate.source)
    }

    /// Resolve and embed covers for every track in an album directory.
    ///
    /// Each track runs the full strategy chain, explicit input included.
    /// The album fallback image is a database lookup by album name and a
    /// detected or supplied artist, resolved once before iterating.
    /// Per-item failures are recorded and the batch continues.
    pub async fn apply_to_album(
        &self,
        album_dir: &Path,
        album_name: &str,
        request: &CoverRequest,
    ) -> Result<ArtworkReport> {
        if album_name.is_empty() && request.title.is_none() {
            return Err(SkiveError::InvalidInput(
                "neither a title nor an album identifier supplied".to_string(),
            ));
        }
        if !album_dir.is_dir() {
            return Err(SkiveError::FileNotFound(album_dir.display().to_string()));
        }

        let extension = self.file_extension.trim_start_matches('.');
        let mut tracks: Vec<PathBuf> = std::fs::read_dir(album_dir)?
            .flatten()
            .map(|e| e.path())
            .filter(|p| {
                p.extension().map(|e| e.to_string_lossy().to_lowercase())
                    == Some(extension.to_lowercase())
            })
            .collect();
        tracks.sort();

        if tracks.is_empty() {
            return Err(SkiveError::InvalidInput(format!(
                "no {extension} files in {}",
                album_dir.display()
            )));
        }

        // An explicit image terminates every per-item chain at strategy 1,
        // so the database fallback is only resolved without one
        let fallback = if request.image.is_some() {
            None
        } else {
            self.resolve_album_fallback(&tracks, album_name, request).await
        };
        if fallback.is_none() {
            debug!("No album-level fallback image available");
        }

        let mut report = ArtworkReport::default();
        for track in &tracks {
            let name = track
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| track.display().to_string());

            // Per-track titles come from the track itself, not from a
            // request-level override
            let mut item_request = request.clone();
            item_request.title = None;

            match self
                .resolve_for_file(track, &item_request, fallback.as_ref())
                .await
            {
                Ok(candidate) => match embed::apply_image(track, &candidate.data).await {
                    Ok(()) => report.updated.push(name),
                    Err(e) => report.failures.push((name, e.to_string())),
                },
                Err(e) => report.failures.push((name, e.to_string())),
            }
        }

        info!(
            "Album artwork: {} updated, {} failed",
            report.updated.len(),
            report.failures.len()
        );
        Ok(report)
    }

    /// Run the per-item strategy chain, first success wins.
    async fn resolve_for_file(
        &self,
        file: &Path,
        request: &CoverRequest,
        fallback: Option<&ArtworkCandidate>,
    ) -> Result<ArtworkCandidate> {
        // 1. Explicit caller-supplied image bypasses the database
        if let Some(image) = &request.image {
            let data = image.fetch(&self.http).await?;
            return Ok(ArtworkCandidate {
                data,
                source: ArtworkSource::Explicit,
            });
        }

        let tags = probe::format_tags(file).await.unwrap_or_default();
        let artist = request
            .artist
            .clone()
            .or_else(|| tags.get("artist").cloned());
        let tag_title = request.title.clone().or_else(|| tags.get("title").cloned());
        let file_title = file
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let mut reasons = Vec::new();

        // 2+3. Database lookups in strategy order: metadata title first,
        // then the filename-derived title when it differs
        match artist.as_deref() {
            Some(artist) => {
                let titles = lookup_titles(tag_title.as_deref(), &file_title);
                if titles.is_empty() {
                    reasons.push("missing title metadata".to_string());
                }
                for title in titles {
                    match self.lookup_cover(artist, &title, request).await {
                        Ok(Some(candidate)) => return Ok(candidate),
                        Ok(None) => reasons.push(format!("no match for '{title}'")),
                        Err(e) => reasons.push(e.to_string()),
                    }
                }
            }
            None => reasons.push("missing artist metadata".to_string()),
        }

        // 4. Album-level fallback (set mode only)
        if let Some(candidate) = fallback {
            return Ok(ArtworkCandidate {
                data: candidate.data.clone(),
                source: ArtworkSource::AlbumFallback,
            });
        }

        Err(SkiveError::Lookup(reasons.join("; ")))
    }

    /// Resolve the shared album fallback image, once per set: a database
    /// lookup by album name. Explicit input is not consumed here; it is
    /// strategy 1 of every per-item chain.
    async fn resolve_album_fallback(
        &self,
        tracks: &[PathBuf],
        album_name: &str,
        request: &CoverRequest,
    ) -> Option<ArtworkCandidate> {
        // Detect the artist from the first track when not supplied
        let artist = match &request.artist {
            Some(artist) => Some(artist.clone()),
            None => match tracks.first() {
                Some(first) => probe::format_tags(first)
                    .await
                    .ok()
                    .and_then(|tags| tags.get("artist").cloned()),
                None => None,
            },
        }?;

        match self.lookup_cover(&artist, album_name, request).await {
            Ok(Some(candidate)) => Some(ArtworkCandidate {
                data: candidate.data,
                source: ArtworkSource::AlbumFallback,
            }),
            Ok(None) => None,
            Err(e) => {
                warn!("Album fallback lookup failed: {e}");
                None
            }
        }
    }

    /// Search the database and fetch the cover image for a match.
    async fn lookup_cover(
        &self,
        artist: &str,
        title: &str,
        request: &CoverRequest,
    ) -> Result<Option<ArtworkCandidate>> {
        let release = self
            .mb
            .search_release(artist, title, request.release_type.as_deref(), request.strict)
            .await?;

        let Some(release) = release else {
            return Ok(None);
        };

        Ok(self
            .mb
            .fetch_front_cover(&release, self.cover_size)
            .await
            .map(|(data, source)| ArtworkCandidate { data, source }))
    }
}

/// Candidate lookup titles in strategy order: the metadata title first,
/// then the filename-derived title when it differs.
fn lookup_titles(tag_title: Option<&str>, file_title: &str) -> Vec<String> {
    let mut titles = Vec::new();
    if let Some(title) = tag_title {
        if !title.is_empty() {
            titles.push(title.to_string());
        }
    }
    if !file_title.is_empty() && tag_title != Some(file_title) {
        titles.push(file_title.to_string());
    }
    titles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_input_classification() {
        assert!(matches!(
            ImageInput::parse("https://example.com/cover.jpg"),
            ImageInput::Url(_)
        ));
        assert!(matches!(
            ImageInput::parse("http://example.com/a.png"),
            ImageInput::Url(_)
        ));
        assert!(matches!(
            ImageInput::parse("/home/me/cover.jpg"),
            ImageInput::File(_)
        ));
        assert!(matches!(
            ImageInput::parse("cover.jpg"),
            ImageInput::File(_)
        ));
    }

    #[test]
    fn test_report_error_summary() {
        let mut report = ArtworkReport::default();
        assert!(report.error_summary().is_none());

        report
            .failures
            .push(("a.opus".to_string(), "no match".to_string()));
        report
            .failures
            .push(("b.opus".to_string(), "timeout".to_string()));
        let summary = report.error_summary().unwrap();
        assert!(summary.contains("a.opus: no match"));
        assert!(summary.contains("b.opus: timeout"));
    }

    #[tokio::test]
    async fn test_image_input_fetch_local_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("cover.jpg");
        std::fs::write(&path, b"jpegbytes").unwrap();

        let input = ImageInput::File(path);
        let data = input.fetch(&reqwest::Client::new()).await.unwrap();
        assert_eq!(data, b"jpegbytes");
    }

    #[tokio::test]
    async fn test_image_input_fetch_bytes() {
        let input = ImageInput::Bytes(vec![1, 2, 3]);
        let data = input.fetch(&reqwest::Client::new()).await.unwrap();
        assert_eq!(data, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_explicit_image_wins_before_any_lookup() {
        let resolver = ArtworkResolver::new(&Settings::default()).unwrap();
        let request = CoverRequest {
            image: Some(ImageInput::Bytes(vec![0xff, 0xd8, 0xff])),
            ..Default::default()
        };

        // The file does not exist; an explicit image must short-circuit
        // before any probe or database access.
        let candidate = resolver
            .resolve_for_file(Path::new("does-not-exist.opus"), &request, None)
            .await
            .unwrap();
        assert_eq!(candidate.source, ArtworkSource::Explicit);
        assert_eq!(candidate.data, vec![0xff, 0xd8, 0xff]);
    }

    #[tokio::test]
    async fn test_fallback_used_when_no_identifiers_resolve() {
        let resolver = ArtworkResolver::new(&Settings::default()).unwrap();
        let request = CoverRequest::default();
        let fallback = ArtworkCandidate {
            data: vec![9, 9, 9],
            source: ArtworkSource::AlbumFallback,
        };

        // No explicit image, no artist/title metadata: the chain must land
        // on the supplied album fallback.
        let candidate = resolver
            .resolve_for_file(Path::new("does-not-exist.opus"), &request, Some(&fallback))
            .await
            .unwrap();
        assert_eq!(candidate.source, ArtworkSource::AlbumFallback);
        assert_eq!(candidate.data, vec![9, 9, 9]);
    }

    #[test]
    fn test_lookup_titles_metadata_first_then_filename() {
        assert_eq!(
            lookup_titles(Some("My Song"), "01_My Song (Official)"),
            vec!["My Song", "01_My Song (Official)"]
        );
    }

    #[test]
    fn test_lookup_titles_skips_duplicate_filename() {
        assert_eq!(lookup_titles(Some("Same"), "Same"), vec!["Same"]);
    }

    #[test]
    fn test_lookup_titles_filename_only_without_metadata() {
        assert_eq!(lookup_titles(None, "Stem"), vec!["Stem"]);
        assert!(lookup_titles(None, "").is_empty());
    }

    #[tokio::test]
    async fn test_album_mode_consults_explicit_image_per_item() {
        let dir = tempfile::TempDir::new().unwrap();
        let album_dir = dir.path().join("My Album");
        std::fs::create_dir(&album_dir).unwrap();
        std::fs::write(album_dir.join("1_Track.opus"), b"not really audio").unwrap();

        let resolver = ArtworkResolver::new(&Settings::default()).unwrap();
        let request = CoverRequest {
            image: Some(ImageInput::File(PathBuf::from("/no/such/cover.jpg"))),
            ..Default::default()
        };

        let report = resolver
            .apply_to_album(&album_dir, "My Album", &request)
            .await
            .unwrap();

        // The unreadable explicit image fails the item itself; the
        // database chain must not run in its place.
        assert!(report.updated.is_empty());
        assert_eq!(report.failures.len(), 1);
        let (name, reason) = &report.failures[0];
        assert_eq!(name, "1_Track.opus");
        assert!(
            reason.contains("No such file"),
            "expected the explicit image error, got: {reason}"
        );
    }
}
