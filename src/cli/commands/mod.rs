//! CLI command implementations.

mod chapters;
mod cover;
mod download;
mod doctor;
mod init;
mod list;

pub use chapters::run_chapters;
pub use cover::run_cover;
pub use doctor::run_doctor;
pub use download::run_download;
pub use init::run_init;
pub use list::run_list;

use crate::config::Settings;
use crate::error::{Result, SkiveError};
use crate::files::find_file_case_insensitive;
use std::path::PathBuf;

/// Resolve a library file by title, ignoring case, using the configured
/// extension.
pub(crate) fn resolve_library_file(settings: &Settings, title: &str) -> Result<PathBuf> {
    let filename = format!("{}{}", title, settings.download.file_extension);
    find_file_case_insensitive(&settings.music_dir(), &filename)
        .ok_or_else(|| SkiveError::FileNotFound(filename))
}
