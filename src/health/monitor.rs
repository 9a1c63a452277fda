// * Health Monitoring
// * Re-check variant that diffs the current run against the last cached
// * record per URL, reporting status transitions and an overall trend.

use crate::health::cache::HealthCache;
use crate::health::checker::{LinkAnalysisResult, LinkHealthChecker, LinkStatus};
use crate::network::normalize_url;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct StatusTransition {
    pub url: String,
    pub previous: LinkStatus,
    pub current: LinkStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthTrend {
    Improving,
    Degrading,
    Stable,
}

#[derive(Debug, Serialize)]
pub struct MonitorReport {
    pub result: LinkAnalysisResult,
    pub transitions: Vec<StatusTransition>,
    pub new_urls: Vec<String>,
    pub trend: HealthTrend,
}

// * Lower is healthier; transitions moving down the scale are improvements.
fn severity_rank(status: LinkStatus) -> u8 {
    match status {
        LinkStatus::Working => 0,
        LinkStatus::Redirect => 1,
        LinkStatus::Warning => 2,
        LinkStatus::Unknown => 3,
        LinkStatus::Broken => 4,
    }
}

impl LinkHealthChecker {
    // * Runs a check cycle, diffs against the cache, and writes every fresh
    // * record back (last-writer-wins per key).
    pub async fn monitor(&self, urls: &[String], cache: &dyn HealthCache) -> MonitorReport {
        let result = self.check(urls).await;

        let mut transitions = Vec::new();
        let mut new_urls = Vec::new();
        let mut improving = 0usize;
        let mut degrading = 0usize;

        for record in &result.records {
            let key = normalize_url(&record.url).unwrap_or_else(|| record.url.clone());

            match cache.get(&key) {
                None => new_urls.push(record.url.clone()),
                Some(previous) if previous.status != record.status => {
                    if severity_rank(record.status) < severity_rank(previous.status) {
                        improving += 1;
                    } else {
                        degrading += 1;
                    }
                    transitions.push(StatusTransition {
                        url: record.url.clone(),
                        previous: previous.status,
                        current: record.status,
                    });
                }
                Some(_) => {}
            }

            cache.put(&key, record.clone());
        }

        let trend = if improving > degrading {
            HealthTrend::Improving
        } else if degrading > improving {
            HealthTrend::Degrading
        } else {
            HealthTrend::Stable
        };

        info!(
            "Monitor cycle: {} transitions ({} improving, {} degrading), {} new URLs",
            transitions.len(),
            improving,
            degrading,
            new_urls.len()
        );

        MonitorReport {
            result,
            transitions,
            new_urls,
            trend,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(severity_rank(LinkStatus::Working) < severity_rank(LinkStatus::Redirect));
        assert!(severity_rank(LinkStatus::Warning) < severity_rank(LinkStatus::Broken));
    }
}
