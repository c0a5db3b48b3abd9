//! CLI module for Skive.

pub mod commands;
mod gate;
mod output;

pub use gate::{AssumeYes, StdinGate};
pub use output::Output;

use crate::download::DownloadKind;
use clap::{Parser, Subcommand};

/// Skive - Music Downloader and Tagger
///
/// A CLI tool for downloading music with chapter markers, cover art, and
/// normalized metadata. The name "Skive" comes from the Norwegian word
/// for "disc."
#[derive(Parser, Debug)]
#[command(name = "skive")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Answer yes to all confirmation prompts
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default configuration file
    Init,

    /// Check that the required external tools are available
    Doctor,

    /// Download audio from a video or playlist
    Download {
        /// Source URL
        url: String,

        /// Output name (defaults to the video title)
        #[arg(short, long)]
        title: Option<String>,

        /// Artist for metadata (defaults to the uploader); checked against
        /// the known-artist list
        #[arg(short, long)]
        artist: Option<String>,

        /// Tags, comma or semicolon separated; checked against the
        /// known-tag list
        #[arg(long)]
        tags: Option<String>,

        /// Album name
        #[arg(long)]
        album: Option<String>,

        /// What to make of the source: one song, a playlist combined into
        /// one chaptered album file, or a playlist split into files
        #[arg(short, long, value_enum, default_value = "song")]
        kind: DownloadKind,

        /// Apply chapter timestamps from a text file after downloading
        /// (lines of `minutes:seconds[.millis] Title`)
        #[arg(long)]
        timestamps: Option<String>,

        /// Do not embed chapters, even when the source has them
        #[arg(long)]
        no_chapters: bool,
    },

    /// Work with chapter markers on existing files
    Chapters {
        #[command(subcommand)]
        action: ChaptersAction,
    },

    /// Resolve and embed cover art
    Cover {
        #[command(subcommand)]
        action: CoverAction,
    },

    /// List library files and known metadata entries
    List {
        #[command(subcommand)]
        target: ListTarget,
    },
}

#[derive(Subcommand, Debug)]
pub enum ChaptersAction {
    /// Apply chapter timestamps to a file (reads stdin unless --from)
    Apply {
        /// Title of the file in the music directory (case insensitive)
        title: String,

        /// Read the timestamp block from this file instead of stdin
        #[arg(long)]
        from: Option<String>,
    },

    /// Remove all chapters from a file
    Remove {
        /// Title of the file in the music directory (case insensitive)
        title: String,
    },

    /// Export embedded chapters to a sidecar text file
    Export {
        /// Title of the file in the music directory (case insensitive)
        title: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum CoverAction {
    /// Resolve a cover for a single file
    File {
        /// Title of the file in the music directory (case insensitive)
        title: String,

        /// Explicit image: a URL or a local file path (bypasses the
        /// database)
        #[arg(short, long)]
        image: Option<String>,

        /// Artist override for the database lookup
        #[arg(short, long)]
        artist: Option<String>,

        /// Release-type filter (album, single, ep, ...)
        #[arg(long)]
        release_type: Option<String>,

        /// Use bare-term matching instead of exact phrases
        #[arg(long)]
        fuzzy: bool,
    },

    /// Resolve covers for every track of an album directory
    Album {
        /// Album directory name under the music directory
        name: String,

        /// Album-level fallback image: a URL or a local file path
        #[arg(short, long)]
        image: Option<String>,

        /// Artist override (defaults to the first track's artist tag)
        #[arg(short, long)]
        artist: Option<String>,

        /// Release-type filter (album, single, ep, ...)
        #[arg(long)]
        release_type: Option<String>,

        /// Use bare-term matching instead of exact phrases
        #[arg(long)]
        fuzzy: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ListTarget {
    /// List music files
    Music,
    /// List known artists
    Artists,
    /// List known tags
    Tags,
}
