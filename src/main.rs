//! Skive CLI entry point.

use anyhow::Result;
use clap::Parser;
use skive::cli::{commands, AssumeYes, Cli, Commands, StdinGate};
use skive::config::Settings;
use skive::reconcile::ConfirmationGate;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("skive={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Ensure data directories exist
    std::fs::create_dir_all(settings.music_dir())?;
    std::fs::create_dir_all(settings.data_dir())?;
    std::fs::create_dir_all(settings.temp_dir())?;

    let gate: Box<dyn ConfirmationGate> = if cli.yes {
        Box::new(AssumeYes)
    } else {
        Box::new(StdinGate)
    };

    // Execute command
    match &cli.command {
        Commands::Init => {
            commands::run_init(&settings)?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Download {
            url,
            title,
            artist,
            tags,
            album,
            kind,
            timestamps,
            no_chapters,
        } => {
            commands::run_download(
                url,
                title.clone(),
                artist.clone(),
                tags.clone(),
                album.clone(),
                *kind,
                timestamps.clone(),
                *no_chapters,
                settings,
                gate.as_ref(),
            )
            .await?;
        }

        Commands::Chapters { action } => {
            commands::run_chapters(action, settings).await?;
        }

        Commands::Cover { action } => {
            commands::run_cover(action, settings).await?;
        }

        Commands::List { target } => {
            commands::run_list(target, settings)?;
        }
    }

    Ok(())
}
