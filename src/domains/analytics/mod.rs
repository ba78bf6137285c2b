pub mod service;
pub mod types;

pub use service::{AnalyticsService, AnalyticsServiceImpl};
pub use types::{AggregatedSubmission, AggregationOutcome, AnalyticsSummary, MemberContribution};
