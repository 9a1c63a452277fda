// * Link Health Layer
// * Concurrent probing, status classification, aggregation, and the cached
// * monitoring diff.

pub mod cache;
pub mod checker;
pub mod monitor;

pub use cache::{HealthCache, InMemoryHealthCache};
pub use checker::{
    CheckOptions, LinkAnalysisResult, LinkHealthChecker, LinkHealthRecord, LinkStatus, SlowLink,
};
pub use monitor::{HealthTrend, MonitorReport, StatusTransition};
