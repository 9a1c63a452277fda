// * Sitemap Graph Reader
// * Expands a root sitemap (or sitemap index) into a flat URL inventory.
// * Index recursion runs level-by-level with sibling fetches bounded by
// * max_concurrent and a politeness pause between levels. Per-document
// * failures are collected, never fatal; only an invalid root URL errors.

use crate::config::constants::{
    BATCH_PAUSE_MS, DEFAULT_MAX_CONCURRENT, DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_DELAY_MS,
    DEFAULT_SITEMAP_MAX_DEPTH, DEFAULT_SITEMAP_MAX_URLS, DEFAULT_TIMEOUT_MS, DEFAULT_USER_AGENT,
};
use crate::network::{normalize_url, ProbeClient, ProbeError, RetryPolicy};
use crate::sitemap::parser::{parse_document, SitemapDocument, SitemapEntry};
use crate::sitemap::robots::RobotsAdvisor;
use crate::sitemap::stats::SitemapStats;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

#[derive(Debug, Clone)]
pub struct SitemapOptions {
    pub max_urls: usize,
    pub timeout: Duration,
    pub follow_index: bool,
    pub max_depth: usize,
    pub user_agent: String,
    pub max_concurrent: usize,
    pub check_robots: bool,
}

impl Default for SitemapOptions {
    fn default() -> Self {
        Self {
            max_urls: DEFAULT_SITEMAP_MAX_URLS,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            follow_index: true,
            max_depth: DEFAULT_SITEMAP_MAX_DEPTH,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            check_robots: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SitemapErrorKind {
    Network,
    Http,
    Parse,
    Robots,
}

// * Structured per-document failure, collected alongside partial results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitemapError {
    pub kind: SitemapErrorKind,
    pub message: String,
    pub url: String,
    pub severity: Severity,
}

#[derive(Debug, Serialize)]
pub struct SitemapReport {
    pub entries: Vec<SitemapEntry>,
    pub errors: Vec<SitemapError>,
    pub stats: SitemapStats,
}

pub struct SitemapGraphReader {
    client: ProbeClient,
    retry: RetryPolicy,
    robots: RobotsAdvisor,
    options: SitemapOptions,
}

impl SitemapGraphReader {
    pub fn new(options: SitemapOptions) -> Result<Self, ProbeError> {
        let client = ProbeClient::new(options.timeout, &options.user_agent)?;
        let retry = RetryPolicy::linear(
            DEFAULT_RETRY_ATTEMPTS,
            Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        );
        let robots = RobotsAdvisor::new(&options.user_agent);

        Ok(Self {
            client,
            retry,
            robots,
            options,
        })
    }

    pub fn with_defaults() -> Result<Self, ProbeError> {
        Self::new(SitemapOptions::default())
    }

    // * Reads the full sitemap graph rooted at `root_url`.
    pub async fn read(&self, root_url: &str) -> Result<SitemapReport, ProbeError> {
        let root = Url::parse(root_url)
            .map_err(|e| ProbeError::InvalidUrl(format!("{root_url}: {e}")))?;
        if !matches!(root.scheme(), "http" | "https") {
            return Err(ProbeError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                root.scheme()
            )));
        }

        info!("Reading sitemap graph from {}", root_url);

        let mut entries: Vec<SitemapEntry> = Vec::new();
        let mut errors: Vec<SitemapError> = Vec::new();
        let mut seen_locs: HashSet<String> = HashSet::new();
        let mut visited_sitemaps: HashSet<String> = HashSet::new();

        // * Politeness pause between index levels; robots Crawl-Delay can
        // * raise it but never lower it below the floor.
        let mut level_pause = Duration::from_millis(BATCH_PAUSE_MS);
        if self.options.check_robots {
            level_pause = self.advisory_robots_check(&root, root_url, &mut errors, level_pause).await;
        }

        visited_sitemaps.insert(root.as_str().to_string());
        let mut current_level: Vec<String> = vec![root.into()];
        let mut depth = 0usize;
        let mut capped = false;

        while !current_level.is_empty() && !capped {
            debug!(
                "Fetching sitemap level {} ({} documents)",
                depth,
                current_level.len()
            );

            let fetched: Vec<(String, Result<(u16, String), ProbeError>)> =
                stream::iter(current_level.iter().map(|url| async {
                    let outcome = self.retry.run(|| self.client.fetch_text(url)).await;
                    (url.clone(), outcome)
                }))
                .buffer_unordered(self.options.max_concurrent)
                .collect()
                .await;

            let mut next_level: Vec<String> = Vec::new();

            for (url, outcome) in fetched {
                let body = match outcome {
                    Err(e) => {
                        errors.push(SitemapError {
                            kind: SitemapErrorKind::Network,
                            message: e.to_string(),
                            url,
                            severity: Severity::Error,
                        });
                        continue;
                    }
                    Ok((status, _)) if status >= 400 => {
                        errors.push(SitemapError {
                            kind: SitemapErrorKind::Http,
                            message: format!("HTTP {status}"),
                            url,
                            severity: Severity::Error,
                        });
                        continue;
                    }
                    Ok((_, body)) => body,
                };

                match parse_document(&body) {
                    Err(e) => {
                        errors.push(SitemapError {
                            kind: SitemapErrorKind::Parse,
                            message: e.to_string(),
                            url,
                            severity: Severity::Error,
                        });
                    }
                    Ok(SitemapDocument::UrlSet(batch)) => {
                        for entry in batch {
                            let key = normalize_url(&entry.location)
                                .unwrap_or_else(|| entry.location.clone());
                            if !seen_locs.insert(key) {
                                continue;
                            }
                            if entries.len() >= self.options.max_urls {
                                // * Cap, not error
                                info!(
                                    "URL cap of {} reached, stopping crawl",
                                    self.options.max_urls
                                );
                                capped = true;
                                break;
                            }
                            entries.push(entry);
                        }
                    }
                    Ok(SitemapDocument::Index(children)) => {
                        if !self.options.follow_index {
                            errors.push(SitemapError {
                                kind: SitemapErrorKind::Parse,
                                message: format!(
                                    "sitemap index with {} children not followed (follow_index = false)",
                                    children.len()
                                ),
                                url,
                                severity: Severity::Warning,
                            });
                        } else if depth >= self.options.max_depth {
                            warn!("Max depth {} reached at {}", self.options.max_depth, url);
                            errors.push(SitemapError {
                                kind: SitemapErrorKind::Parse,
                                message: format!(
                                    "max depth {} reached, {} child sitemaps skipped",
                                    self.options.max_depth,
                                    children.len()
                                ),
                                url,
                                severity: Severity::Warning,
                            });
                        } else {
                            for child in children {
                                if visited_sitemaps.insert(child.clone()) {
                                    next_level.push(child);
                                }
                            }
                        }
                    }
                }
            }

            if next_level.is_empty() || capped {
                break;
            }

            depth += 1;
            tokio::time::sleep(level_pause).await;
            current_level = next_level;
        }

        let stats = SitemapStats::compute(&entries);
        info!(
            "Sitemap crawl done: {} URLs, {} errors",
            entries.len(),
            errors.len()
        );

        Ok(SitemapReport {
            entries,
            errors,
            stats,
        })
    }

    // * Fetches robots.txt and records an advisory warning when the sitemap
    // * is disallowed for our user-agent. Failures here are non-events.
    async fn advisory_robots_check(
        &self,
        root: &Url,
        sitemap_url: &str,
        errors: &mut Vec<SitemapError>,
        floor: Duration,
    ) -> Duration {
        let robots_url = match root.join("/robots.txt") {
            Ok(u) => u,
            Err(_) => return floor,
        };

        match self.client.fetch_text(robots_url.as_str()).await {
            Ok((200, body)) => {
                if !self.robots.is_allowed(&body, sitemap_url) {
                    warn!("robots.txt disallows {} for our user-agent", sitemap_url);
                    errors.push(SitemapError {
                        kind: SitemapErrorKind::Robots,
                        message: "robots.txt disallows this sitemap for the probing user-agent"
                            .to_string(),
                        url: sitemap_url.to_string(),
                        severity: Severity::Warning,
                    });
                }
                floor.max(Duration::from_millis(self.robots.crawl_delay_ms(&body)))
            }
            _ => floor,
        }
    }
}
