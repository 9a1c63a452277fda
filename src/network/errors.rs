use thiserror::Error;

// * Unified error type for the network layer.
// * HTTP status codes are NOT errors here: probes surface the status to the
// * caller, which classifies it. Only transport-level failures land in this
// * enum, split by whether a retry could plausibly succeed.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("request timed out after {0}ms")]
    Timeout(u64),

    // * DNS failure / connection refused - the host is not coming back
    // * within one check cycle, so retries are short-circuited.
    #[error("host unreachable: {0}")]
    Unreachable(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl ProbeError {
    // * Retry predicate shared by every call site through RetryPolicy.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProbeError::Timeout(_) | ProbeError::Transport(_))
    }

    // * Maps a reqwest failure into the taxonomy. Connect-level failures
    // * (refused, DNS) are terminal; timeouts and mid-stream errors retry.
    pub fn from_reqwest(err: reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            ProbeError::Timeout(timeout_ms)
        } else if err.is_connect() {
            ProbeError::Unreachable(err.to_string())
        } else {
            ProbeError::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_retryable() {
        assert!(ProbeError::Timeout(5000).is_retryable());
    }

    #[test]
    fn test_unreachable_is_terminal() {
        assert!(!ProbeError::Unreachable("connection refused".into()).is_retryable());
    }

    #[test]
    fn test_invalid_url_is_terminal() {
        assert!(!ProbeError::InvalidUrl("ftp://example.com".into()).is_retryable());
    }
}
