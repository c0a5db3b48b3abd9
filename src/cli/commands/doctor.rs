//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::Settings;
use console::style;
use std::process::Command;

/// Check result for a single item.
#[derive(Debug)]
struct CheckResult {
    name: String,
    ok: bool,
    message: String,
    hint: Option<String>,
}

impl CheckResult {
    fn print(&self) {
        let icon = if self.ok {
            style("✓").green()
        } else {
            style("✗").red()
        };
        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);
        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Skive Doctor");
    println!();

    println!("{}", style("External Tools").bold());
    let checks = vec![
        check_tool("yt-dlp", &["--version"], "Install from https://github.com/yt-dlp/yt-dlp"),
        check_tool("ffmpeg", &["-version"], "Install ffmpeg from your package manager"),
        check_tool("ffprobe", &["-version"], "ffprobe ships with ffmpeg"),
    ];
    for check in &checks {
        check.print();
    }

    println!();
    println!("{}", style("Directories").bold());
    for (name, path) in [
        ("music", settings.music_dir()),
        ("data", settings.data_dir()),
        ("temp", settings.temp_dir()),
    ] {
        let exists = path.is_dir();
        CheckResult {
            name: format!("{name} directory"),
            ok: exists,
            message: path.display().to_string(),
            hint: (!exists).then(|| "Will be created on first use".to_string()),
        }
        .print();
    }

    println!();
    println!("{}", style("Configuration").bold());
    let config_path = Settings::default_config_path();
    CheckResult {
        name: "config file".to_string(),
        ok: config_path.exists(),
        message: config_path.display().to_string(),
        hint: (!config_path.exists()).then(|| "Run 'skive init' to create it".to_string()),
    }
    .print();

    println!();
    let missing = checks.iter().filter(|c| !c.ok).count();
    if missing > 0 {
        Output::error(&format!("{missing} tool(s) missing."));
    } else {
        Output::success("All required tools are installed.");
    }

    Ok(())
}

fn check_tool(name: &str, args: &[&str], hint: &str) -> CheckResult {
    let found = Command::new(name)
        .args(args)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false);

    CheckResult {
        name: name.to_string(),
        ok: found,
        message: if found { "found".to_string() } else { "not found".to_string() },
        hint: (!found).then(|| hint.to_string()),
    }
}
