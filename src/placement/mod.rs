// * Link Placement Layer
// * Constraint-driven planning of where candidate links go, plus
// * distribution metrics and scoring over the result.

pub mod distribution;
pub mod planner;

pub use distribution::{DistributionMetrics, DistributionResult};
pub use planner::{
    AnchorTextClass, CandidateLink, ExistingLink, LinkPlacementPlanner, PlacementDecision,
    PlacementOptions, SkippedLink,
};
