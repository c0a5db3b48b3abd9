//! Chapter model and codec for Skive.
//!
//! A chapter is a named time interval in a media file's playback timeline.
//! This module owns the pure data representation; `codec` converts between
//! the textual timestamp notation, the ffmetadata chapter format, and the
//! sidecar display format; `embed` drives ffmpeg/ffprobe to stamp chapters
//! onto files and read them back.

pub mod codec;
pub mod embed;

/// A single chapter boundary.
///
/// `end_ms` is `None` while the final boundary is still open; it is closed
/// from the next chapter's start or from the probed total duration. Chapter
/// sequences are rebuilt whole rather than mutated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    /// Start of the chapter in milliseconds.
    pub start_ms: u64,
    /// End of the chapter in milliseconds, if resolved.
    pub end_ms: Option<u64>,
    /// Chapter title.
    pub title: String,
}

impl Chapter {
    pub fn new(start_ms: u64, end_ms: u64, title: impl Into<String>) -> Self {
        Self {
            start_ms,
            end_ms: Some(end_ms),
            title: title.into(),
        }
    }
}

/// A chapter as reported by the probe tool: float seconds plus a title.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbedChapter {
    pub start_seconds: f64,
    pub title: String,
}
