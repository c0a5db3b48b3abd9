//! Chapters command implementation.

use super::resolve_library_file;
use crate::chapters::embed;
use crate::cli::{ChaptersAction, Output};
use crate::config::Settings;
use anyhow::Result;
use std::io::Read;

pub async fn run_chapters(action: &ChaptersAction, settings: Settings) -> Result<()> {
    match action {
        ChaptersAction::Apply { title, from } => {
            let audio = resolve_library_file(&settings, title)?;

            let block = match from {
                Some(path) => std::fs::read_to_string(path)?,
                None => {
                    Output::info("Paste timestamps (minutes:seconds Title), end with Ctrl-D:");
                    let mut input = String::new();
                    std::io::stdin().read_to_string(&mut input)?;
                    input
                }
            };

            let chapters = embed::apply_timestamps(&audio, &block).await?;
            Output::success(&format!(
                "Applied {} chapters to {}",
                chapters.len(),
                audio.display()
            ));

            if let Some(sidecar) = embed::export_chapters(&audio).await? {
                Output::success(&format!("Chapters saved to {}", sidecar.display()));
            }
        }

        ChaptersAction::Remove { title } => {
            let audio = resolve_library_file(&settings, title)?;
            embed::remove_chapters(&audio).await?;
            Output::success(&format!("Removed chapters from {}", audio.display()));
        }

        ChaptersAction::Export { title } => {
            let audio = resolve_library_file(&settings, title)?;
            match embed::export_chapters(&audio).await? {
                Some(sidecar) => {
                    Output::success(&format!("Chapters saved to {}", sidecar.display()));
                }
                None => {
                    Output::info("No chapters found.");
                }
            }
        }
    }

    Ok(())
}
