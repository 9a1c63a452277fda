// * Link Health Checker
// * Probes URL sets with timed HEAD requests in bounded-concurrency batches,
// * classifies every URL into exactly one status, and aggregates scores.
// * Per-URL failures become records, never batch aborts.

use crate::config::constants::{
    BATCH_PAUSE_MS, DEFAULT_MAX_CONCURRENT, DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_DELAY_MS,
    DEFAULT_SLOW_LINK_THRESHOLD_MS, DEFAULT_TIMEOUT_MS, DEFAULT_USER_AGENT, REDIRECT_HOP_LIMIT,
    SLOWEST_LINKS_REPORTED,
};
use crate::network::{normalize_url, ProbeClient, ProbeError, ProbeOutcome, RetryPolicy};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    Working,
    Broken,
    Redirect,
    Warning,
    Unknown,
}

// * One check-cycle observation for one URL. Superseded by the next cycle,
// * never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkHealthRecord {
    pub url: String,
    pub status: LinkStatus,
    pub status_code: Option<u16>,
    pub redirect_target: Option<String>,
    pub response_time_ms: Option<u64>,
    pub last_checked_at: DateTime<Utc>,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlowLink {
    pub url: String,
    pub response_time_ms: u64,
}

#[derive(Debug, Clone)]
pub struct CheckOptions {
    pub timeout: Duration,
    pub max_concurrent: usize,
    pub retry_attempts: u32,
    pub retry_delay: Duration,
    pub follow_redirects: bool,
    pub slow_link_threshold_ms: u64,
    pub user_agent: String,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            follow_redirects: true,
            slow_link_threshold_ms: DEFAULT_SLOW_LINK_THRESHOLD_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkAnalysisResult {
    pub total_links: usize,
    pub working_links: usize,
    pub broken_links: usize,
    pub redirect_links: usize,
    pub warning_links: usize,
    pub unknown_links: usize,
    // * working / total * 100, one decimal
    pub health_score: f64,
    pub average_response_time_ms: Option<f64>,
    pub slowest_links: Vec<SlowLink>,
    pub error_frequency: BTreeMap<String, usize>,
    pub records: Vec<LinkHealthRecord>,
}

pub struct LinkHealthChecker {
    client: ProbeClient,
    retry: RetryPolicy,
    options: CheckOptions,
}

impl LinkHealthChecker {
    pub fn new(options: CheckOptions) -> Result<Self, ProbeError> {
        let client = ProbeClient::new(options.timeout, &options.user_agent)?;
        let retry = RetryPolicy::linear(options.retry_attempts.max(1), options.retry_delay);

        Ok(Self {
            client,
            retry,
            options,
        })
    }

    pub fn with_defaults() -> Result<Self, ProbeError> {
        Self::new(CheckOptions::default())
    }

    // * Checks a URL list. Duplicates collapse to one probe; non-http(s)
    // * inputs become `unknown` records rather than being dropped.
    pub async fn check(&self, urls: &[String]) -> LinkAnalysisResult {
        let mut seen: HashSet<String> = HashSet::new();
        let mut probe_targets: Vec<String> = Vec::new();
        let mut records: Vec<LinkHealthRecord> = Vec::new();

        for url in urls {
            let key = normalize_url(url).unwrap_or_else(|| url.clone());
            if !seen.insert(key) {
                continue;
            }
            if is_probeable(url) {
                probe_targets.push(url.clone());
            } else {
                records.push(LinkHealthRecord {
                    url: url.clone(),
                    status: LinkStatus::Unknown,
                    status_code: None,
                    redirect_target: None,
                    response_time_ms: None,
                    last_checked_at: Utc::now(),
                    suggestions: vec!["Only http and https URLs can be checked".to_string()],
                });
            }
        }

        info!(
            "Checking {} links ({} probeable) in batches of {}",
            urls.len(),
            probe_targets.len(),
            self.options.max_concurrent
        );

        let batches: Vec<&[String]> = probe_targets
            .chunks(self.options.max_concurrent.max(1))
            .collect();
        let batch_count = batches.len();

        for (i, batch) in batches.into_iter().enumerate() {
            let batch_records =
                futures::future::join_all(batch.iter().map(|url| self.probe_url(url))).await;
            records.extend(batch_records);

            // * Politeness pause between batches
            if i + 1 < batch_count {
                tokio::time::sleep(Duration::from_millis(BATCH_PAUSE_MS)).await;
            }
        }

        Self::aggregate(records)
    }

    // * One probe cycle for one URL, with retries for transient failures.
    // * Servers that reject HEAD (405/501) get one GET fallback probe.
    async fn probe_url(&self, url: &str) -> LinkHealthRecord {
        let outcome = self.retry.run(|| self.client.head(url)).await;

        let outcome = match outcome {
            Ok(o) if o.status == 405 || o.status == 501 => {
                debug!("HEAD rejected for {}, falling back to GET", url);
                self.client.get(url).await
            }
            other => other,
        };

        match outcome {
            Ok(o) => self.classify(url, o).await,
            Err(e) => {
                let hint = match &e {
                    ProbeError::Timeout(_) => "Increase the timeout or check server load",
                    ProbeError::Unreachable(_) => "Verify the domain still resolves",
                    _ => "Re-check later; the failure may be transient",
                };
                LinkHealthRecord {
                    url: url.to_string(),
                    status: LinkStatus::Broken,
                    status_code: None,
                    redirect_target: None,
                    response_time_ms: None,
                    last_checked_at: Utc::now(),
                    suggestions: vec![e.to_string(), hint.to_string()],
                }
            }
        }
    }

    async fn classify(&self, url: &str, outcome: ProbeOutcome) -> LinkHealthRecord {
        let mut record = LinkHealthRecord {
            url: url.to_string(),
            status: LinkStatus::Working,
            status_code: Some(outcome.status),
            redirect_target: None,
            response_time_ms: Some(outcome.response_time_ms),
            last_checked_at: Utc::now(),
            suggestions: Vec::new(),
        };

        if outcome.status >= 400 {
            record.status = LinkStatus::Broken;
            record.suggestions = suggestions_for_status(outcome.status);
        } else if outcome.status >= 300 {
            record.status = LinkStatus::Redirect;
            record.redirect_target = outcome
                .location
                .as_deref()
                .and_then(|loc| resolve_location(url, loc));

            if let Some(target) = record.redirect_target.clone() {
                record
                    .suggestions
                    .push(format!("Update the link to point directly at {target}"));
                if self.options.follow_redirects {
                    if let Some(note) = self.walk_redirect_chain(&target).await {
                        record.suggestions.push(note);
                    }
                }
            } else {
                record
                    .suggestions
                    .push("Redirect without a Location header".to_string());
            }
        } else if outcome.response_time_ms > self.options.slow_link_threshold_ms {
            record.status = LinkStatus::Warning;
            record.suggestions.push(format!(
                "Slow response ({}ms > {}ms threshold)",
                outcome.response_time_ms, self.options.slow_link_threshold_ms
            ));
        }

        record
    }

    // * Follows a redirect chain (bounded hops) purely to enrich suggestions;
    // * the record stays classified as `redirect`.
    async fn walk_redirect_chain(&self, first_target: &str) -> Option<String> {
        let mut current = first_target.to_string();

        for _ in 0..REDIRECT_HOP_LIMIT {
            match self.client.head(&current).await {
                Ok(o) if o.status >= 300 && o.status < 400 => {
                    current = resolve_location(&current, o.location.as_deref()?)?;
                }
                Ok(o) if o.status >= 400 => {
                    return Some(format!("Redirect chain ends in HTTP {}", o.status));
                }
                Ok(_) => {
                    return if current != first_target {
                        Some(format!("Redirect chain resolves to {current}"))
                    } else {
                        None
                    };
                }
                Err(e) => return Some(format!("Redirect target unreachable: {e}")),
            }
        }

        Some(format!(
            "Redirect chain longer than {REDIRECT_HOP_LIMIT} hops"
        ))
    }

    fn aggregate(records: Vec<LinkHealthRecord>) -> LinkAnalysisResult {
        let total_links = records.len();
        let count = |s: LinkStatus| records.iter().filter(|r| r.status == s).count();

        let working_links = count(LinkStatus::Working);
        let broken_links = count(LinkStatus::Broken);
        let redirect_links = count(LinkStatus::Redirect);
        let warning_links = count(LinkStatus::Warning);
        let unknown_links = count(LinkStatus::Unknown);

        let health_score = if total_links > 0 {
            (working_links as f64 / total_links as f64 * 1000.0).round() / 10.0
        } else {
            0.0
        };

        let times: Vec<u64> = records.iter().filter_map(|r| r.response_time_ms).collect();
        let average_response_time_ms = if times.is_empty() {
            None
        } else {
            Some(times.iter().sum::<u64>() as f64 / times.len() as f64)
        };

        let mut timed: Vec<SlowLink> = records
            .iter()
            .filter_map(|r| {
                r.response_time_ms.map(|t| SlowLink {
                    url: r.url.clone(),
                    response_time_ms: t,
                })
            })
            .collect();
        timed.sort_by(|a, b| b.response_time_ms.cmp(&a.response_time_ms));
        timed.truncate(SLOWEST_LINKS_REPORTED);

        let mut error_frequency: BTreeMap<String, usize> = BTreeMap::new();
        for record in records.iter().filter(|r| r.status == LinkStatus::Broken) {
            let label = match record.status_code {
                Some(code) => format!("HTTP {code}"),
                None => record
                    .suggestions
                    .first()
                    .cloned()
                    .unwrap_or_else(|| "connection failed".to_string()),
            };
            *error_frequency.entry(label).or_insert(0) += 1;
        }

        LinkAnalysisResult {
            total_links,
            working_links,
            broken_links,
            redirect_links,
            warning_links,
            unknown_links,
            health_score,
            average_response_time_ms,
            slowest_links: timed,
            error_frequency,
            records,
        }
    }
}

fn is_probeable(url: &str) -> bool {
    match Url::parse(url) {
        Ok(u) => matches!(u.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

// * Location headers may be relative; resolve against the probed URL.
fn resolve_location(base: &str, location: &str) -> Option<String> {
    let base = Url::parse(base).ok()?;
    Some(base.join(location).ok()?.to_string())
}

// * Error-code-specific guidance surfaced with broken records.
fn suggestions_for_status(status: u16) -> Vec<String> {
    match status {
        404 => vec![
            "Check if the URL changed and update the link".to_string(),
            "Look for a replacement in the site's URL inventory".to_string(),
        ],
        410 => vec!["The resource is gone; remove or replace the link".to_string()],
        401 => vec!["Authentication required; the page is not publicly linkable".to_string()],
        403 => vec!["Access forbidden; verify the page is meant to be public".to_string()],
        429 => vec!["Rate limited during the check; re-check later".to_string()],
        500..=599 => vec![format!(
            "Server error (HTTP {status}); re-check before removing the link"
        )],
        _ => vec![format!("HTTP {status} returned")],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: LinkStatus, code: Option<u16>, time: Option<u64>) -> LinkHealthRecord {
        LinkHealthRecord {
            url: "https://example.com/x".to_string(),
            status,
            status_code: code,
            redirect_target: None,
            response_time_ms: time,
            last_checked_at: Utc::now(),
            suggestions: vec![],
        }
    }

    #[test]
    fn test_health_score_half_working() {
        let result = LinkHealthChecker::aggregate(vec![
            record(LinkStatus::Working, Some(200), Some(50)),
            record(LinkStatus::Broken, Some(404), Some(30)),
        ]);
        assert_eq!(result.working_links, 1);
        assert_eq!(result.broken_links, 1);
        assert_eq!(result.health_score, 50.0);
    }

    #[test]
    fn test_every_record_counted_once() {
        let result = LinkHealthChecker::aggregate(vec![
            record(LinkStatus::Working, Some(200), Some(10)),
            record(LinkStatus::Redirect, Some(301), Some(20)),
            record(LinkStatus::Warning, Some(200), Some(5000)),
            record(LinkStatus::Unknown, None, None),
        ]);
        let classified = result.working_links
            + result.broken_links
            + result.redirect_links
            + result.warning_links
            + result.unknown_links;
        assert_eq!(classified, result.total_links);
    }

    #[test]
    fn test_empty_input_scores_zero() {
        let result = LinkHealthChecker::aggregate(vec![]);
        assert_eq!(result.total_links, 0);
        assert_eq!(result.health_score, 0.0);
        assert!(result.average_response_time_ms.is_none());
    }

    #[test]
    fn test_error_frequency_groups_by_status() {
        let result = LinkHealthChecker::aggregate(vec![
            record(LinkStatus::Broken, Some(404), None),
            record(LinkStatus::Broken, Some(404), None),
            record(LinkStatus::Broken, Some(500), None),
        ]);
        assert_eq!(result.error_frequency.get("HTTP 404"), Some(&2));
        assert_eq!(result.error_frequency.get("HTTP 500"), Some(&1));
    }

    #[test]
    fn test_404_suggestions_mention_url_change() {
        let suggestions = suggestions_for_status(404);
        assert!(suggestions[0].contains("URL changed"));
    }

    #[test]
    fn test_relative_location_resolved() {
        assert_eq!(
            resolve_location("https://example.com/old", "/new").unwrap(),
            "https://example.com/new"
        );
    }
}
