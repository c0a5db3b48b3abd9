//! MusicBrainz release search and Cover Art Archive image fetch.

use super::ArtworkSource;
use crate::error::{Result, SkiveError};
use tracing::{debug, info, warn};

const MUSICBRAINZ_SEARCH_URL: &str = "https://musicbrainz.org/ws/2/release";
const COVER_ART_URL: &str = "https://coverartarchive.org";

/// Identifiers of a matched release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRef {
    pub release_id: String,
    pub release_group_id: Option<String>,
}

/// MusicBrainz web service client.
pub struct MbClient {
    http: reqwest::Client,
}

impl MbClient {
    /// Build a client with the polite User-Agent MusicBrainz asks for.
    pub fn new(user_agent: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent.to_string())
            .build()
            .map_err(|e| SkiveError::Lookup(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { http })
    }

    /// Search for the best release matching `(artist, title)`.
    ///
    /// `strict` quotes the field values for exact-phrase matching; the
    /// fuzzy variant leaves terms bare. Returns `None` when nothing
    /// matches; service errors are `Lookup` errors.
    pub async fn search_release(
        &self,
        artist: &str,
        title: &str,
        release_type: Option<&str>,
        strict: bool,
    ) -> Result<Option<ReleaseRef>> {
        let query = build_query(artist, title, release_type, strict);
        debug!("MusicBrainz search: {}", query);

        let response = self
            .http
            .get(MUSICBRAINZ_SEARCH_URL)
            .query(&[("query", query.as_str()), ("limit", "5"), ("fmt", "json")])
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| SkiveError::Lookup(format!("MusicBrainz request failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!("MusicBrainz error response ({}): {}", status, text);
            return Err(SkiveError::Lookup(format!(
                "MusicBrainz returned status {status}"
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SkiveError::Lookup(format!("Invalid MusicBrainz response: {e}")))?;

        let release = json
            .get("releases")
            .and_then(|r| r.as_array())
            .and_then(|list| list.first());

        Ok(release.and_then(|r| {
            let release_id = r.get("id").and_then(|v| v.as_str())?.to_string();
            let release_group_id = r
                .get("release-group")
                .and_then(|rg| rg.get("id"))
                .and_then(|v| v.as_str())
                .map(|s| s.to_string());
            info!("MusicBrainz match: release {}", release_id);
            Some(ReleaseRef {
                release_id,
                release_group_id,
            })
        }))
    }

    /// Fetch the front cover for a release.
    ///
    /// Tries the release-group scope first, then the release scope; within
    /// each scope the requested size, then the unsized default, then the
    /// 1200px default. First HTTP 200 wins; everything else falls through.
    pub async fn fetch_front_cover(
        &self,
        release: &ReleaseRef,
        size: u32,
    ) -> Option<(Vec<u8>, ArtworkSource)> {
        let mut scopes = Vec::new();
        if let Some(group) = &release.release_group_id {
            scopes.push(("release-group", group.clone(), ArtworkSource::ReleaseGroup));
        }
        scopes.push(("release", release.release_id.clone(), ArtworkSource::Release));

        for (scope, mbid, source) in scopes {
            let urls = [
                format!("{COVER_ART_URL}/{scope}/{mbid}/front-{size}"),
                format!("{COVER_ART_URL}/{scope}/{mbid}/front"),
                format!("{COVER_ART_URL}/{scope}/{mbid}/front-1200"),
            ];
            for url in urls {
                match self.http.get(&url).send().await {
                    Ok(response) if response.status().is_success() => {
                        match response.bytes().await {
                            Ok(bytes) => {
                                info!("Cover art fetched from {}", url);
                                return Some((bytes.to_vec(), source));
                            }
                            Err(e) => warn!("Cover art body read failed: {e}"),
                        }
                    }
                    Ok(response) => {
                        debug!("Cover art miss {} ({})", url, response.status());
                    }
                    Err(e) => {
                        debug!("Cover art request failed {}: {e}", url);
                    }
                }
            }
        }
        None
    }
}

/// Build a Lucene query for the release search.
fn build_query(artist: &str, title: &str, release_type: Option<&str>, strict: bool) -> String {
    let escape = |v: &str| v.replace('"', "");
    let mut query = if strict {
        format!(
            "artist:\"{}\" AND release:\"{}\"",
            escape(artist),
            escape(title)
        )
    } else {
        format!("artist:{} AND release:{}", escape(artist), escape(title))
    };
    if let Some(kind) = release_type {
        query.push_str(&format!(" AND primarytype:{kind}"));
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_query_strict() {
        assert_eq!(
            build_query("Hendrix", "Electric Ladyland", None, true),
            "artist:\"Hendrix\" AND release:\"Electric Ladyland\""
        );
    }

    #[test]
    fn test_build_query_fuzzy_with_type() {
        assert_eq!(
            build_query("ACDC", "Back In Black", Some("album"), false),
            "artist:ACDC AND release:Back In Black AND primarytype:album"
        );
    }

    #[test]
    fn test_build_query_strips_quotes() {
        assert_eq!(
            build_query("The \"Artist\"", "X", None, true),
            "artist:\"The Artist\" AND release:\"X\""
        );
    }
}
