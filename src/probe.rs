//! Media probing via ffprobe: duration, embedded chapters, and format tags.

use crate::chapters::ProbedChapter;
use crate::error::{Result, SkiveError};
use crate::tool;
use std::collections::HashMap;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

/// Query a file's total duration in integer milliseconds.
///
/// Fails with `DurationUnavailable` if ffprobe errors or its output is
/// empty/unparsable. Callers that need a closed final chapter boundary
/// treat this as fatal.
pub async fn duration_ms(path: &Path) -> Result<u64> {
    let mut cmd = Command::new("ffprobe");
    cmd.arg("-i").arg(path)
        .arg("-show_entries").arg("format=duration")
        .arg("-v").arg("quiet")
        .arg("-of").arg("csv=p=0");

    let output = tool::run("ffprobe", &mut cmd).await?;

    if !output.status.success() {
        return Err(SkiveError::DurationUnavailable(path.display().to_string()));
    }

    let text = String::from_utf8_lossy(&output.stdout);
    let seconds: f64 = text
        .trim()
        .parse()
        .map_err(|_| SkiveError::DurationUnavailable(path.display().to_string()))?;

    Ok((seconds * 1000.0) as u64)
}

/// List the chapters embedded in a file as `(start_seconds, title)` pairs.
///
/// An empty list is a valid terminal state, not an error.
pub async fn chapters(path: &Path) -> Result<Vec<ProbedChapter>> {
    let mut cmd = Command::new("ffprobe");
    cmd.arg("-i").arg(path)
        .arg("-print_format").arg("json")
        .arg("-show_chapters")
        .arg("-loglevel").arg("error");

    let output = tool::run("ffprobe", &mut cmd).await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SkiveError::ToolFailed(format!(
            "ffprobe chapter listing failed: {}",
            stderr.trim()
        )));
    }

    let json: serde_json::Value = serde_json::from_str(&String::from_utf8_lossy(&output.stdout))
        .map_err(|_| SkiveError::ToolFailed("Invalid ffprobe output".into()))?;

    let mut probed = Vec::new();
    if let Some(list) = json["chapters"].as_array() {
        for chapter in list {
            let start_seconds = chapter["start_time"]
                .as_str()
                .and_then(|s| s.parse::<f64>().ok())
                .or_else(|| chapter["start_time"].as_f64())
                .unwrap_or(0.0);
            let title = chapter["tags"]["title"]
                .as_str()
                .unwrap_or("Unknown")
                .to_string();
            probed.push(ProbedChapter {
                start_seconds,
                title,
            });
        }
    }

    debug!("Probed {} chapters from {}", probed.len(), path.display());
    Ok(probed)
}

/// Read the container-level tag map (title, artist, album, ...).
///
/// Tag keys are lowercased; a file with no tags yields an empty map.
pub async fn format_tags(path: &Path) -> Result<HashMap<String, String>> {
    let mut cmd = Command::new("ffprobe");
    cmd.arg("-i").arg(path)
        .arg("-print_format").arg("json")
        .arg("-show_format")
        .arg("-v").arg("quiet");

    let output = tool::run("ffprobe", &mut cmd).await?;

    if !output.status.success() {
        return Err(SkiveError::ToolFailed(format!(
            "ffprobe could not read {}",
            path.display()
        )));
    }

    let json: serde_json::Value = serde_json::from_str(&String::from_utf8_lossy(&output.stdout))
        .map_err(|_| SkiveError::ToolFailed("Invalid ffprobe output".into()))?;

    let mut tags = HashMap::new();
    if let Some(map) = json["format"]["tags"].as_object() {
        for (key, value) in map {
            if let Some(v) = value.as_str() {
                tags.insert(key.to_lowercase(), v.to_string());
            }
        }
    }

    Ok(tags)
}
