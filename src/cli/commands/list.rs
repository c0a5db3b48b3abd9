//! List command implementation.

use crate::cli::{ListTarget, Output};
use crate::config::Settings;
use crate::files::load_known_list;
use anyhow::Result;

pub fn run_list(target: &ListTarget, settings: Settings) -> Result<()> {
    match target {
        ListTarget::Music => {
            let music_dir = settings.music_dir();
            if !music_dir.is_dir() {
                Output::info("Music directory does not exist yet.");
                return Ok(());
            }

            let mut names: Vec<String> = std::fs::read_dir(&music_dir)?
                .flatten()
                .map(|e| e.file_name().to_string_lossy().to_string())
                .filter(|n| !n.ends_with(".txt"))
                .collect();
            names.sort();

            if names.is_empty() {
                Output::info("No music files found.");
            } else {
                Output::header(&format!("Music ({})", names.len()));
                for name in &names {
                    Output::list_item(name);
                }
            }
        }

        ListTarget::Artists => {
            print_known_list("Artists", &load_known_list(&settings.artists_file())?);
        }

        ListTarget::Tags => {
            print_known_list("Tags", &load_known_list(&settings.tags_file())?);
        }
    }

    Ok(())
}

fn print_known_list(label: &str, entries: &[String]) {
    if entries.is_empty() {
        Output::info(&format!("No known {} yet.", label.to_lowercase()));
        return;
    }
    Output::header(&format!("{} ({})", label, entries.len()));
    for entry in entries {
        Output::list_item(entry);
    }
}
