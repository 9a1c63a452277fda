// * Broken-Link Replacement Advisor
// * Given a broken URL and a sitemap inventory, ranks same-host candidates
// * by path similarity, verifies the best ones with live probes, and falls
// * back to a Wayback Machine snapshot when nothing on the site fits.

use crate::config::constants::{
    ARCHIVE_FALLBACK_CONFIDENCE, ARCHIVE_SNAPSHOT_PREFIX, DEFAULT_TIMEOUT_MS, DEFAULT_USER_AGENT,
    REPLACEMENT_PROBE_LIMIT, REPLACEMENT_SIMILARITY_THRESHOLD,
};
use crate::network::{ProbeClient, ProbeError};
use crate::sitemap::stats::normalize_segment;
use crate::sitemap::SitemapEntry;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionSource {
    // * A live URL from the site's own sitemap inventory
    SitemapMatch,
    // * A Wayback Machine snapshot of the dead URL itself
    ArchiveSnapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplacementSuggestion {
    pub broken_url: String,
    pub suggested_url: String,
    pub confidence: f64,
    pub source: SuggestionSource,
}

#[derive(Debug, Clone)]
pub struct AdvisorOptions {
    pub similarity_threshold: f64,
    // * How many top candidates get a live probe
    pub probe_limit: usize,
    pub verify_candidates: bool,
    pub archive_fallback: bool,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for AdvisorOptions {
    fn default() -> Self {
        Self {
            similarity_threshold: REPLACEMENT_SIMILARITY_THRESHOLD,
            probe_limit: REPLACEMENT_PROBE_LIMIT,
            verify_candidates: true,
            archive_fallback: true,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

pub struct ReplacementAdvisor {
    client: ProbeClient,
    options: AdvisorOptions,
}

impl ReplacementAdvisor {
    pub fn new(options: AdvisorOptions) -> Result<Self, ProbeError> {
        let client = ProbeClient::new(options.timeout, &options.user_agent)?;
        Ok(Self { client, options })
    }

    pub fn with_defaults() -> Result<Self, ProbeError> {
        Self::new(AdvisorOptions::default())
    }

    // * Suggests replacements for one broken URL, best first. An empty
    // * result means neither the inventory nor the archive had anything.
    pub async fn suggest(
        &self,
        broken_url: &str,
        inventory: &[SitemapEntry],
    ) -> Result<Vec<ReplacementSuggestion>, ProbeError> {
        let broken = Url::parse(broken_url)
            .map_err(|e| ProbeError::InvalidUrl(format!("{broken_url}: {e}")))?;
        let broken_host = broken
            .host_str()
            .ok_or_else(|| ProbeError::InvalidUrl(format!("{broken_url}: missing host")))?
            .to_lowercase();

        // * Same-host candidates ranked by path similarity; the dead URL
        // * itself is never a candidate.
        let mut ranked: Vec<(f64, &SitemapEntry)> = inventory
            .iter()
            .filter_map(|entry| {
                let candidate = Url::parse(&entry.location).ok()?;
                if candidate.host_str()?.to_lowercase() != broken_host {
                    return None;
                }
                if candidate.path() == broken.path() {
                    return None;
                }
                let score = path_similarity(broken.path(), candidate.path());
                (score >= self.options.similarity_threshold).then_some((score, entry))
            })
            .collect();
        ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut suggestions = Vec::new();
        for (score, entry) in ranked.into_iter().take(self.options.probe_limit) {
            if self.options.verify_candidates {
                match self.client.head(&entry.location).await {
                    Ok(outcome) if outcome.status < 400 => {}
                    Ok(outcome) => {
                        debug!(
                            "Replacement candidate {} rejected with HTTP {}",
                            entry.location, outcome.status
                        );
                        continue;
                    }
                    Err(err) => {
                        debug!(
                            "Replacement candidate {} unreachable: {err}",
                            entry.location
                        );
                        continue;
                    }
                }
            }

            suggestions.push(ReplacementSuggestion {
                broken_url: broken_url.to_string(),
                suggested_url: entry.location.clone(),
                confidence: (score * 100.0).round() / 100.0,
                source: SuggestionSource::SitemapMatch,
            });
        }

        if suggestions.is_empty() && self.options.archive_fallback {
            suggestions.push(ReplacementSuggestion {
                broken_url: broken_url.to_string(),
                suggested_url: format!("{ARCHIVE_SNAPSHOT_PREFIX}{broken_url}"),
                confidence: ARCHIVE_FALLBACK_CONFIDENCE,
                source: SuggestionSource::ArchiveSnapshot,
            });
        }

        Ok(suggestions)
    }

    // * Batch variant: unparseable URLs are skipped rather than failing the
    // * whole batch, matching the checker's per-item error posture.
    pub async fn suggest_all(
        &self,
        broken_urls: &[String],
        inventory: &[SitemapEntry],
    ) -> Vec<ReplacementSuggestion> {
        let mut all = Vec::new();
        for url in broken_urls {
            match self.suggest(url, inventory).await {
                Ok(suggestions) => all.extend(suggestions),
                Err(e) => debug!("No suggestions for {url}: {e}"),
            }
        }
        all
    }
}

// * Similarity of two URL paths in [0, 1]. Positional matches over
// * normalized segments carry most of the weight; token overlap between the
// * final slugs covers renames like /guide-to-rust -> /rust-guide.
pub fn path_similarity(a: &str, b: &str) -> f64 {
    let seg_a: Vec<String> = segments(a);
    let seg_b: Vec<String> = segments(b);

    if seg_a.is_empty() && seg_b.is_empty() {
        return 1.0;
    }

    let longest = seg_a.len().max(seg_b.len());
    let positional = seg_a
        .iter()
        .zip(seg_b.iter())
        .filter(|(x, y)| x == y)
        .count() as f64
        / longest as f64;

    let slug_a = slug_tokens(seg_a.last().map(String::as_str).unwrap_or(""));
    let slug_b = slug_tokens(seg_b.last().map(String::as_str).unwrap_or(""));
    let slug = if slug_a.is_empty() || slug_b.is_empty() {
        0.0
    } else {
        let shared = slug_a.intersection(&slug_b).count();
        let union = slug_a.union(&slug_b).count();
        shared as f64 / union as f64
    };

    positional * 0.6 + slug * 0.4
}

fn segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(normalize_segment)
        .collect()
}

fn slug_tokens(segment: &str) -> HashSet<String> {
    segment
        .split(['-', '_', '.'])
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sibling_id_paths_score_high() {
        // * /products/123 vs /products/124 both normalize to /products/{id}
        let score = path_similarity("/products/123", "/products/124");
        assert!(score > 0.9, "score was {score}");
    }

    #[test]
    fn test_unrelated_paths_score_low() {
        let score = path_similarity("/products/123", "/about");
        assert!(score < 0.5, "score was {score}");
    }

    #[test]
    fn test_slug_rename_scores_moderately() {
        let score = path_similarity("/guide-to-rust", "/rust-guide");
        // * No positional match, but "rust" and "guide" overlap in the slug
        assert!(score > 0.2 && score < 0.6, "score was {score}");
    }

    #[test]
    fn test_root_paths_identical() {
        assert!((path_similarity("/", "/") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_depth_mismatch_dilutes_score() {
        let shallow = path_similarity("/blog/17", "/blog/42");
        let deep = path_similarity("/blog/17", "/blog/2024/archive/42");
        assert!(shallow > deep);
    }

    #[tokio::test]
    async fn test_cross_host_candidates_ignored() {
        let advisor = ReplacementAdvisor::new(AdvisorOptions {
            verify_candidates: false,
            archive_fallback: false,
            ..AdvisorOptions::default()
        })
        .unwrap();

        let inventory = vec![SitemapEntry {
            location: "https://other.example.org/products/124".to_string(),
            last_modified: None,
            change_frequency: None,
            priority: None,
            images: vec![],
            videos: vec![],
        }];

        let suggestions = advisor
            .suggest("https://example.com/products/123", &inventory)
            .await
            .unwrap();
        assert!(suggestions.is_empty());
    }

    #[tokio::test]
    async fn test_archive_fallback_when_inventory_empty() {
        let advisor = ReplacementAdvisor::new(AdvisorOptions {
            verify_candidates: false,
            ..AdvisorOptions::default()
        })
        .unwrap();

        let suggestions = advisor
            .suggest("https://example.com/gone", &[])
            .await
            .unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].source, SuggestionSource::ArchiveSnapshot);
        assert!((suggestions[0].confidence - ARCHIVE_FALLBACK_CONFIDENCE).abs() < f64::EPSILON);
        assert!(suggestions[0]
            .suggested_url
            .starts_with("https://web.archive.org/web/"));
    }

    #[tokio::test]
    async fn test_invalid_broken_url_rejected() {
        let advisor = ReplacementAdvisor::with_defaults().unwrap();
        let err = advisor.suggest("not a url", &[]).await.unwrap_err();
        assert!(matches!(err, ProbeError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_batch_skips_unparseable_urls() {
        let advisor = ReplacementAdvisor::new(AdvisorOptions {
            verify_candidates: false,
            ..AdvisorOptions::default()
        })
        .unwrap();

        let urls = vec![
            "definitely not a url".to_string(),
            "https://example.com/gone".to_string(),
        ];
        let suggestions = advisor.suggest_all(&urls, &[]).await;

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].broken_url, "https://example.com/gone");
    }

    #[tokio::test]
    async fn test_unverified_suggestions_ranked_by_similarity() {
        let advisor = ReplacementAdvisor::new(AdvisorOptions {
            verify_candidates: false,
            archive_fallback: false,
            ..AdvisorOptions::default()
        })
        .unwrap();

        let entry = |loc: &str| SitemapEntry {
            location: loc.to_string(),
            last_modified: None,
            change_frequency: None,
            priority: None,
            images: vec![],
            videos: vec![],
        };
        let inventory = vec![
            entry("https://example.com/products/categories"),
            entry("https://example.com/products/124"),
        ];

        let suggestions = advisor
            .suggest("https://example.com/products/123", &inventory)
            .await
            .unwrap();
        assert!(!suggestions.is_empty());
        assert_eq!(
            suggestions[0].suggested_url,
            "https://example.com/products/124"
        );
        assert!(suggestions[0].confidence > 0.5);
    }
}
