// * Network Layer
// * Shared probe client, error taxonomy, retry policy, and URL normalization
// * used by the sitemap reader and the link health checker.

pub mod client;
pub mod errors;
pub mod normalize;
pub mod retry;

pub use client::{ProbeClient, ProbeOutcome};
pub use errors::ProbeError;
pub use normalize::normalize_url;
pub use retry::{Backoff, RetryPolicy};
