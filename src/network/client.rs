use crate::network::errors::ProbeError;
use reqwest::redirect::Policy;
use reqwest::{Client, Method};
use std::time::{Duration, Instant};
use tracing::debug;

// * Result of a single timed probe. Status is surfaced raw (including 3xx
// * and 4xx/5xx) so the caller owns classification.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub status: u16,
    pub location: Option<String>,
    pub response_time_ms: u64,
}

// * The shared HTTP engine for sitemap fetches and health probes.
// * Redirects are never followed automatically: a 3xx must be visible to the
// * classifier, and redirect chains are walked explicitly when needed.
pub struct ProbeClient {
    inner: Client,
    timeout_ms: u64,
}

impl ProbeClient {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|e| ProbeError::Transport(e.to_string()))?;

        Ok(Self {
            inner: client,
            timeout_ms: timeout.as_millis() as u64,
        })
    }

    // * Issues a timed HEAD request and captures status + Location header.
    pub async fn head(&self, url: &str) -> Result<ProbeOutcome, ProbeError> {
        self.probe(Method::HEAD, url).await
    }

    // * Some servers reject HEAD outright; GET is the fallback probe.
    pub async fn get(&self, url: &str) -> Result<ProbeOutcome, ProbeError> {
        self.probe(Method::GET, url).await
    }

    async fn probe(&self, method: Method, url: &str) -> Result<ProbeOutcome, ProbeError> {
        let start = Instant::now();
        let resp = self
            .inner
            .request(method, url)
            .send()
            .await
            .map_err(|e| ProbeError::from_reqwest(e, self.timeout_ms))?;
        let response_time_ms = start.elapsed().as_millis() as u64;

        let status = resp.status().as_u16();
        let location = resp
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        debug!("Probe {} -> {} in {}ms", url, status, response_time_ms);

        Ok(ProbeOutcome {
            status,
            location,
            response_time_ms,
        })
    }

    // * Fetches a document body (sitemap XML, robots.txt). Returns the status
    // * alongside the text so a 404 robots.txt stays a non-event.
    pub async fn fetch_text(&self, url: &str) -> Result<(u16, String), ProbeError> {
        let resp = self
            .inner
            .get(url)
            .send()
            .await
            .map_err(|e| ProbeError::from_reqwest(e, self.timeout_ms))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| ProbeError::from_reqwest(e, self.timeout_ms))?;

        Ok((status, body))
    }
}
