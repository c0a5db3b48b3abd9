//! File handling helpers: staged writes, filename sanitizing, and library
//! file lookup.

use crate::error::{Result, SkiveError};
use std::path::{Path, PathBuf};

/// Maximum length of a tool diagnostic before truncation.
const MAX_DIAGNOSTIC_LEN: usize = 1500;

/// A staged write target for external-tool output.
///
/// External tools write to a temporary sibling path; `commit` swaps the
/// result into the final location. If the write is never committed (tool
/// failure, early return), the temporary file is removed on drop and the
/// original file is left untouched.
pub struct StagedWrite {
    tmp: PathBuf,
    target: PathBuf,
    committed: bool,
}

impl StagedWrite {
    pub fn new(target: &Path) -> Self {
        let stem = target
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "output".to_string());
        // Keep the target's extension visible so ffmpeg can infer the container
        let tmp_name = match target.extension() {
            Some(ext) => format!(
                "{}.tmp{}.{}",
                stem,
                std::process::id(),
                ext.to_string_lossy()
            ),
            None => format!("{}.tmp{}", stem, std::process::id()),
        };
        Self {
            tmp: target.with_file_name(tmp_name),
            target: target.to_path_buf(),
            committed: false,
        }
    }

    /// Temporary path the tool should write to.
    pub fn staged_path(&self) -> &Path {
        &self.tmp
    }

    /// Swap the staged file into the final location.
    pub fn commit(mut self) -> Result<()> {
        if !self.tmp.exists() {
            return Err(SkiveError::ToolFailed(format!(
                "expected output {} was not produced",
                self.tmp.display()
            )));
        }
        std::fs::rename(&self.tmp, &self.target)?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedWrite {
    fn drop(&mut self) {
        if !self.committed {
            let _ = std::fs::remove_file(&self.tmp);
        }
    }
}

/// Bound a tool diagnostic to a displayable length.
pub fn truncate_diagnostic(text: &str) -> String {
    if text.len() > MAX_DIAGNOSTIC_LEN {
        let cut = text
            .char_indices()
            .take_while(|(i, _)| *i < MAX_DIAGNOSTIC_LEN)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}...", &text[..cut])
    } else {
        text.to_string()
    }
}

/// Strip characters that corrupt a concat manifest from a filename.
///
/// The manifest quotes paths with single quotes, so quote characters inside
/// a filename break the list. Returns the sanitized name if anything
/// changed, `None` if the name was already safe.
pub fn sanitize_concat_name(name: &str) -> Option<String> {
    if name.contains('\'') || name.contains('"') {
        Some(name.replace(['\'', '"'], "_"))
    } else {
        None
    }
}

/// Find a file in `dir` by name, ignoring case.
///
/// Checks the exact casing first, then scans the directory for a
/// case-insensitive match.
pub fn find_file_case_insensitive(dir: &Path, filename: &str) -> Option<PathBuf> {
    let exact = dir.join(filename);
    if exact.exists() {
        return Some(exact);
    }

    let wanted = filename.to_lowercase();
    let entries = std::fs::read_dir(dir).ok()?;
    for entry in entries.flatten() {
        if entry.file_name().to_string_lossy().to_lowercase() == wanted {
            return Some(entry.path());
        }
    }
    None
}

/// Load a persisted list of strings from a JSON array file.
///
/// A missing file is an empty list, not an error.
pub fn load_known_list(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Save a list of strings as a JSON array, whole-file write.
pub fn save_known_list(path: &Path, list: &[String]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(list)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_staged_write_commit() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("song.opus");
        std::fs::write(&target, b"old").unwrap();

        let staged = StagedWrite::new(&target);
        std::fs::write(staged.staged_path(), b"new").unwrap();
        staged.commit().unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"new");
    }

    #[test]
    fn test_staged_write_cleanup_on_drop() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("song.opus");
        std::fs::write(&target, b"old").unwrap();

        let staged_path;
        {
            let staged = StagedWrite::new(&target);
            staged_path = staged.staged_path().to_path_buf();
            std::fs::write(&staged_path, b"partial").unwrap();
            // dropped without commit
        }

        assert!(!staged_path.exists());
        assert_eq!(std::fs::read(&target).unwrap(), b"old");
    }

    #[test]
    fn test_staged_write_commit_without_output_fails() {
        let dir = TempDir::new().unwrap();
        let staged = StagedWrite::new(&dir.path().join("song.opus"));
        assert!(staged.commit().is_err());
    }

    #[test]
    fn test_sanitize_concat_name() {
        assert_eq!(sanitize_concat_name("plain.opus"), None);
        assert_eq!(
            sanitize_concat_name("Don't Stop.opus"),
            Some("Don_t Stop.opus".to_string())
        );
        assert_eq!(
            sanitize_concat_name("say \"hi\".opus"),
            Some("say _hi_.opus".to_string())
        );
    }

    #[test]
    fn test_find_file_case_insensitive() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("My Song.opus"), b"").unwrap();

        assert!(find_file_case_insensitive(dir.path(), "my song.opus").is_some());
        assert!(find_file_case_insensitive(dir.path(), "My Song.opus").is_some());
        assert!(find_file_case_insensitive(dir.path(), "other.opus").is_none());
    }

    #[test]
    fn test_known_list_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("artists.json");

        assert!(load_known_list(&path).unwrap().is_empty());

        let list = vec!["Beyoncé".to_string(), "The Beatles".to_string()];
        save_known_list(&path, &list).unwrap();
        assert_eq!(load_known_list(&path).unwrap(), list);
    }

    #[test]
    fn test_truncate_diagnostic() {
        let short = "all fine";
        assert_eq!(truncate_diagnostic(short), short);

        let long = "x".repeat(2000);
        let truncated = truncate_diagnostic(&long);
        assert!(truncated.len() <= 1503);
        assert!(truncated.ends_with("..."));
    }
}
