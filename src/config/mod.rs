//! Configuration module for Skive.
//!
//! Handles loading and managing application settings.

mod settings;

pub use settings::{DownloadSettings, GeneralSettings, MusicBrainzSettings, Settings};
