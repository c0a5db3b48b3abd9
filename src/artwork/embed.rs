//! Applying a cover image to an audio file.
//!
//! The embedding path depends on the target container: Vorbis-comment
//! containers take a base64 `METADATA_BLOCK_PICTURE` tag directly, while
//! everything else is re-muxed with an attached-picture stream. The
//! capability is resolved once per file extension.

use crate::error::{Result, SkiveError};
use crate::files::StagedWrite;
use crate::tool;
use base64::Engine;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, info};

/// How a container accepts embedded cover art.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverCapability {
    /// Vorbis-comment picture block (opus, ogg, flac).
    NativePictureTag,
    /// Needs an attached-picture video stream muxed in (m4a, mp3, ...).
    RequiresExternalMux,
}

impl CoverCapability {
    pub fn for_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "opus" | "ogg" | "oga" | "flac" | "spx" => CoverCapability::NativePictureTag,
            _ => CoverCapability::RequiresExternalMux,
        }
    }

    pub fn for_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();
        Self::for_extension(&ext)
    }
}

/// Embed a cover image into an audio file, branching on the container's
/// capability. The write is staged and swapped in on success.
pub async fn apply_image(audio: &Path, image: &[u8]) -> Result<()> {
    match CoverCapability::for_path(audio) {
        CoverCapability::NativePictureTag => apply_native_picture(audio, image).await,
        CoverCapability::RequiresExternalMux => apply_attached_picture(audio, image).await,
    }
}

async fn apply_native_picture(audio: &Path, image: &[u8]) -> Result<()> {
    let block = picture_block(image);
    let encoded = base64::engine::general_purpose::STANDARD.encode(block);
    let staged = StagedWrite::new(audio);

    let mut cmd = Command::new("ffmpeg");
    cmd.arg("-i").arg(audio)
        .arg("-map").arg("0:a")
        .arg("-c").arg("copy")
        .arg("-map_metadata").arg("0")
        .arg("-metadata").arg(format!("METADATA_BLOCK_PICTURE={encoded}"))
        .arg("-y")
        .arg(staged.staged_path());

    debug!("Embedding native picture tag into {}", audio.display());
    let output = tool::run("ffmpeg", &mut cmd).await?;
    tool::check("ffmpeg", "picture tag embedding", &output)?;
    staged.commit()?;

    info!("Cover applied to {}", audio.display());
    Ok(())
}

async fn apply_attached_picture(audio: &Path, image: &[u8]) -> Result<()> {
    let suffix = match detect_mime(image) {
        "image/png" => ".png",
        _ => ".jpg",
    };
    let cover_file = tempfile::Builder::new()
        .prefix("skive-cover")
        .suffix(suffix)
        .tempfile()?;
    std::fs::write(cover_file.path(), image)?;

    let staged = StagedWrite::new(audio);

    let mut cmd = Command::new("ffmpeg");
    cmd.arg("-y")
        .arg("-i").arg(audio)
        .arg("-i").arg(cover_file.path())
        .arg("-map").arg("0:0")
        .arg("-map").arg("1")
        .arg("-c").arg("copy")
        .arg("-disposition:v").arg("attached_pic")
        .arg(staged.staged_path());

    debug!("Muxing attached picture into {}", audio.display());
    let output = tool::run("ffmpeg", &mut cmd).await?;
    tool::check("ffmpeg", "attached picture muxing", &output)?;
    staged.commit()?;

    info!("Cover applied to {}", audio.display());
    Ok(())
}

/// Sniff the image MIME type from magic bytes.
pub fn detect_mime(image: &[u8]) -> &'static str {
    if image.starts_with(&[0x89, b'P', b'N', b'G']) {
        "image/png"
    } else {
        "image/jpeg"
    }
}

/// Build a FLAC METADATA_BLOCK_PICTURE structure for a front cover.
///
/// Big-endian fields: picture type 3 (front cover), MIME string, empty
/// description, zeroed dimensions, then the image payload.
fn picture_block(image: &[u8]) -> Vec<u8> {
    let mime = detect_mime(image).as_bytes();
    let mut block = Vec::with_capacity(image.len() + mime.len() + 32);
    block.extend_from_slice(&3u32.to_be_bytes());
    block.extend_from_slice(&(mime.len() as u32).to_be_bytes());
    block.extend_from_slice(mime);
    block.extend_from_slice(&0u32.to_be_bytes()); // description length
    block.extend_from_slice(&0u32.to_be_bytes()); // width
    block.extend_from_slice(&0u32.to_be_bytes()); // height
    block.extend_from_slice(&0u32.to_be_bytes()); // color depth
    block.extend_from_slice(&0u32.to_be_bytes()); // indexed colors
    block.extend_from_slice(&(image.len() as u32).to_be_bytes());
    block.extend_from_slice(image);
    block
}

/// Validate that an image payload looks usable before embedding.
pub fn validate_image(image: &[u8]) -> Result<()> {
    if image.is_empty() {
        return Err(SkiveError::InvalidInput("empty image data".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_mapping() {
        assert_eq!(
            CoverCapability::for_extension("opus"),
            CoverCapability::NativePictureTag
        );
        assert_eq!(
            CoverCapability::for_extension("FLAC"),
            CoverCapability::NativePictureTag
        );
        assert_eq!(
            CoverCapability::for_extension("m4a"),
            CoverCapability::RequiresExternalMux
        );
        assert_eq!(
            CoverCapability::for_extension("mp3"),
            CoverCapability::RequiresExternalMux
        );
        assert_eq!(
            CoverCapability::for_path(Path::new("/music/song.opus")),
            CoverCapability::NativePictureTag
        );
    }

    #[test]
    fn test_detect_mime() {
        assert_eq!(detect_mime(&[0x89, b'P', b'N', b'G', 0x0d]), "image/png");
        assert_eq!(detect_mime(&[0xff, 0xd8, 0xff]), "image/jpeg");
    }

    #[test]
    fn test_picture_block_layout() {
        let image = vec![0xff, 0xd8, 0xff, 0x00];
        let block = picture_block(&image);

        // Picture type 3 (front cover)
        assert_eq!(&block[0..4], &3u32.to_be_bytes());
        // MIME length and value
        let mime = b"image/jpeg";
        assert_eq!(&block[4..8], &(mime.len() as u32).to_be_bytes());
        assert_eq!(&block[8..8 + mime.len()], mime);
        // Payload is the image itself, length-prefixed
        assert!(block.ends_with(&image));
        let len_offset = block.len() - image.len() - 4;
        assert_eq!(
            &block[len_offset..len_offset + 4],
            &(image.len() as u32).to_be_bytes()
        );
    }

    #[test]
    fn test_validate_image() {
        assert!(validate_image(&[1, 2, 3]).is_ok());
        assert!(validate_image(&[]).is_err());
    }
}
