//! Download command implementation.

use crate::chapters::embed;
use crate::cli::Output;
use crate::config::Settings;
use crate::download::{self, DownloadKind, DownloadOutcome, DownloadRequest};
use crate::reconcile::ConfirmationGate;
use anyhow::Result;

#[allow(clippy::too_many_arguments)]
pub async fn run_download(
    url: &str,
    title: Option<String>,
    artist: Option<String>,
    tags: Option<String>,
    album: Option<String>,
    kind: DownloadKind,
    timestamps: Option<String>,
    no_chapters: bool,
    settings: Settings,
    gate: &dyn ConfirmationGate,
) -> Result<()> {
    let request = DownloadRequest {
        url: url.to_string(),
        kind,
        output_name: title,
        artist,
        tags,
        album,
        embed_chapters: if no_chapters { Some(false) } else { None },
    };

    let spinner = Output::spinner("Downloading...");
    let outcome = download::run(&settings, gate, &request).await;
    spinner.finish_and_clear();
    let outcome = outcome?;

    match &outcome {
        DownloadOutcome::Song(path) => {
            Output::success(&format!("Downloaded {}", path.display()));

            // User-supplied timestamps take precedence over whatever the
            // source embedded
            if let Some(timestamps_file) = &timestamps {
                let block = std::fs::read_to_string(timestamps_file)?;
                let chapters = embed::apply_timestamps(path, &block).await?;
                Output::success(&format!("Applied {} chapters", chapters.len()));
            }

            match embed::export_chapters(path).await? {
                Some(sidecar) => {
                    Output::success(&format!("Chapters saved to {}", sidecar.display()));
                }
                None if !no_chapters => {
                    Output::info(
                        "No chapters found. Use 'skive chapters apply' to add them later.",
                    );
                }
                None => {}
            }
        }
        DownloadOutcome::Playlist(dir) => {
            Output::success(&format!("Playlist saved to {}", dir.display()));
        }
        DownloadOutcome::Album(path) => {
            Output::success(&format!("Album assembled at {}", path.display()));
            if let Some(sidecar) = embed::export_chapters(path).await? {
                Output::success(&format!("Chapters saved to {}", sidecar.display()));
            }
        }
    }

    Ok(())
}
