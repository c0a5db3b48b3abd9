//! Skive - Music Downloader and Tagger
//!
//! A CLI tool for downloading music with chapter markers, cover art, and
//! normalized metadata.
//!
//! The name "Skive" comes from the Norwegian word for "disc" or "record."
//!
//! # Overview
//!
//! Skive allows you to:
//! - Download a video's audio as a tagged music file
//! - Download a playlist as one album file with synthesized chapters
//! - Apply, remove, and export chapter markers from timestamp text
//! - Resolve cover art from the MusicBrainz / Cover Art Archive databases
//! - Keep artist and tag names consistent across your library
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `chapters` - Chapter model, timestamp codec, and embedding
//! - `probe` - Media file probing (duration, chapters, tags)
//! - `download` - Audio download and multi-track album assembly
//! - `artwork` - Cover art resolution and embedding
//! - `reconcile` - Canonical artist/tag reconciliation
//! - `files` - Temp-file swapping and library file helpers
//!
//! # Example
//!
//! ```rust,no_run
//! use skive::chapters::codec;
//!
//! let parsed = codec::parse_timestamps("0:00 Intro\n1:30 Verse")?;
//! assert_eq!(parsed.len(), 2);
//! # Ok::<(), skive::SkiveError>(())
//! ```

pub mod artwork;
pub mod chapters;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod files;
pub mod probe;
pub mod reconcile;
mod tool;

pub use error::{Result, SkiveError};
