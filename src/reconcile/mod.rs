//! Canonical artist/tag reconciliation.
//!
//! Free-text artist and tag input is checked against a persisted canonical
//! list: a case-insensitive exact match wins, a close fuzzy match is
//! substituted automatically, and a genuinely new entry must be confirmed
//! before it is added. Declining the confirmation aborts the calling
//! operation before any download work starts.

use crate::error::{Result, SkiveError};
use crate::files::{load_known_list, save_known_list};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

/// Minimum similarity ratio for a fuzzy match to be substituted.
const FUZZY_CUTOFF: f64 = 0.8;

/// An injected yes/no confirmation step.
///
/// The CLI binds this to a stdin prompt; tests use deterministic stubs.
#[async_trait]
pub trait ConfirmationGate: Send + Sync {
    async fn confirm(&self, prompt: &str) -> Result<bool>;
}

/// A persisted canonical list of names (artists or tags).
///
/// Stored as a flat JSON array; in memory it acts as a mapping from
/// lowercase key to canonical display form. Whole-file read-modify-write
/// on every accepted addition.
pub struct KnownList {
    path: PathBuf,
    entries: Vec<String>,
}

impl KnownList {
    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            entries: load_known_list(path)?,
        })
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Exact match on the lowercase key, returning the stored display form.
    pub fn canonical_for(&self, candidate: &str) -> Option<&str> {
        let key = candidate.to_lowercase();
        self.entries
            .iter()
            .find(|e| e.to_lowercase() == key)
            .map(|e| e.as_str())
    }

    /// Best fuzzy match with similarity at or above the cutoff.
    pub fn fuzzy_match(&self, candidate: &str) -> Option<&str> {
        let key = candidate.to_lowercase();
        self.entries
            .iter()
            .map(|e| (e, strsim::normalized_levenshtein(&key, &e.to_lowercase())))
            .filter(|(_, score)| *score >= FUZZY_CUTOFF)
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(e, _)| e.as_str())
    }

    /// Add an entry and persist the whole list.
    pub fn add(&mut self, entry: String) -> Result<()> {
        self.entries.push(entry);
        save_known_list(&self.path, &self.entries)
    }
}

/// Reconcile an artist name against the known-artist list.
///
/// Returns the canonical form to use. A new artist is added only after the
/// gate confirms; declining aborts with `ConfirmationDeclined`.
pub async fn reconcile_artist(
    list_path: &Path,
    artist: &str,
    gate: &dyn ConfirmationGate,
) -> Result<String> {
    let mut known = KnownList::load(list_path)?;
    let artist = artist.trim();

    if let Some(canonical) = known.canonical_for(artist) {
        return Ok(canonical.to_string());
    }

    if let Some(suggestion) = known.fuzzy_match(artist) {
        info!("Artist '{}' not found, using close match '{}'", artist, suggestion);
        return Ok(suggestion.to_string());
    }

    let prompt = format!("Artist '{}' is new. Add it to the known list?", artist);
    if !gate.confirm(&prompt).await? {
        return Err(SkiveError::ConfirmationDeclined(format!(
            "new artist '{}' was not added",
            artist
        )));
    }

    known.add(artist.to_string())?;
    Ok(artist.to_string())
}

/// Reconcile a batch of tags against the known-tag list.
///
/// Tags are title-cased before comparison. All genuinely new tags in the
/// batch are confirmed with a single prompt; declining aborts the whole
/// operation and nothing is persisted.
pub async fn reconcile_tags(
    list_path: &Path,
    tags: &[String],
    gate: &dyn ConfirmationGate,
) -> Result<Vec<String>> {
    let mut known = KnownList::load(list_path)?;
    let mut resolved = Vec::new();
    let mut new_tags: Vec<String> = Vec::new();

    for tag in tags {
        let normalized = title_case(tag.trim());
        if let Some(canonical) = known.canonical_for(&normalized) {
            resolved.push(canonical.to_string());
        } else if let Some(suggestion) = known.fuzzy_match(&normalized) {
            info!("Tag '{}' not found, using close match '{}'", normalized, suggestion);
            resolved.push(suggestion.to_string());
        } else {
            resolved.push(normalized.clone());
            new_tags.push(normalized);
        }
    }

    if !new_tags.is_empty() {
        let prompt = format!(
            "New tags: {}. Add them to the known list?",
            new_tags.join(", ")
        );
        if !gate.confirm(&prompt).await? {
            return Err(SkiveError::ConfirmationDeclined(
                "new tags were not added".to_string(),
            ));
        }
        for tag in new_tags {
            known.add(tag)?;
        }
    }

    Ok(resolved)
}

/// Split a free-text tag string on commas and semicolons.
pub fn split_tags(input: &str) -> Vec<String> {
    input
        .split([',', ';'])
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Title-case a tag: first letter of each word uppercased, rest lowered.
pub fn title_case(input: &str) -> String {
    input
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Approve;
    struct Decline;

    #[async_trait]
    impl ConfirmationGate for Approve {
        async fn confirm(&self, _prompt: &str) -> Result<bool> {
            Ok(true)
        }
    }

    #[async_trait]
    impl ConfirmationGate for Decline {
        async fn confirm(&self, _prompt: &str) -> Result<bool> {
            Ok(false)
        }
    }

    fn seeded_list(dir: &TempDir, entries: &[&str]) -> PathBuf {
        let path = dir.path().join("known.json");
        save_known_list(&path, &entries.iter().map(|s| s.to_string()).collect::<Vec<_>>())
            .unwrap();
        path
    }

    #[tokio::test]
    async fn test_exact_match_ignores_case_and_whitespace() {
        let dir = TempDir::new().unwrap();
        let path = seeded_list(&dir, &["The Beatles"]);

        let result = reconcile_artist(&path, "the beatles ", &Decline).await.unwrap();
        assert_eq!(result, "The Beatles");
    }

    #[tokio::test]
    async fn test_fuzzy_match_substitutes_without_confirmation() {
        let dir = TempDir::new().unwrap();
        let path = seeded_list(&dir, &["Beyoncé"]);

        // "beyonce" vs "beyoncé" is one substitution in seven chars, ~0.857
        let result = reconcile_artist(&path, "Beyonce", &Decline).await.unwrap();
        assert_eq!(result, "Beyoncé");
    }

    #[tokio::test]
    async fn test_below_cutoff_is_not_a_match() {
        let dir = TempDir::new().unwrap();
        let path = seeded_list(&dir, &["Beyoncé"]);

        // Far below the 0.8 cutoff; treated as new and declined
        let result = reconcile_artist(&path, "Bey", &Decline).await;
        assert!(matches!(result, Err(SkiveError::ConfirmationDeclined(_))));
    }

    #[tokio::test]
    async fn test_new_artist_added_after_confirmation() {
        let dir = TempDir::new().unwrap();
        let path = seeded_list(&dir, &[]);

        let result = reconcile_artist(&path, "Radiohead", &Approve).await.unwrap();
        assert_eq!(result, "Radiohead");
        assert_eq!(load_known_list(&path).unwrap(), vec!["Radiohead"]);
    }

    #[tokio::test]
    async fn test_declined_artist_is_not_persisted() {
        let dir = TempDir::new().unwrap();
        let path = seeded_list(&dir, &[]);

        let result = reconcile_artist(&path, "Radiohead", &Decline).await;
        assert!(matches!(result, Err(SkiveError::ConfirmationDeclined(_))));
        assert!(load_known_list(&path).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tags_title_cased_and_matched() {
        let dir = TempDir::new().unwrap();
        let path = seeded_list(&dir, &["Lo-fi", "Rock"]);

        let tags = vec!["rock".to_string(), "jazz".to_string()];
        let resolved = reconcile_tags(&path, &tags, &Approve).await.unwrap();
        assert_eq!(resolved, vec!["Rock", "Jazz"]);
        assert!(load_known_list(&path).unwrap().contains(&"Jazz".to_string()));
    }

    #[tokio::test]
    async fn test_declined_tags_abort_and_persist_nothing() {
        let dir = TempDir::new().unwrap();
        let path = seeded_list(&dir, &["Rock"]);

        let tags = vec!["rock".to_string(), "vaporwave".to_string()];
        let result = reconcile_tags(&path, &tags, &Decline).await;
        assert!(matches!(result, Err(SkiveError::ConfirmationDeclined(_))));
        assert_eq!(load_known_list(&path).unwrap(), vec!["Rock"]);
    }

    #[test]
    fn test_split_tags() {
        assert_eq!(
            split_tags("rock, jazz ;lo-fi,,"),
            vec!["rock", "jazz", "lo-fi"]
        );
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("indie rock"), "Indie Rock");
        assert_eq!(title_case("LOFI"), "Lofi");
    }
}
