use crate::domains::submission::types::{DonationDetail, Submission};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A submission as it appears in cross-member views: the stored record
/// plus the collector tag stamped on during aggregation.
///
/// `collected_by` is `None` for a member's own list and the collector's
/// display name in the master's combined view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedSubmission {
    pub id: Uuid,
    pub name: String,
    pub city: String,
    pub gothra: String,
    pub phone_number: String,
    pub recorded_at: Option<DateTime<Utc>>,
    pub member_email: String,
    pub member_name: String,
    pub collected_by: Option<String>,
    #[serde(flatten)]
    pub detail: DonationDetail,
}

impl AggregatedSubmission {
    pub fn from_submission(submission: Submission, collected_by: Option<String>) -> Self {
        Self {
            id: submission.id,
            name: submission.name,
            city: submission.city,
            gothra: submission.gothra,
            phone_number: submission.phone_number,
            recorded_at: submission.recorded_at,
            member_email: submission.member_email,
            member_name: submission.member_name,
            collected_by,
            detail: submission.detail,
        }
    }

    /// Cash amount, `None` for in-kind records.
    pub fn amount(&self) -> Option<Decimal> {
        self.detail.amount()
    }

    /// First non-empty of collector tag, recording member's name, and
    /// recording member's email. Every record has at least the email.
    pub fn collector_label(&self) -> &str {
        if let Some(label) = self.collected_by.as_deref() {
            if !label.is_empty() {
                return label;
            }
        }
        if !self.member_name.is_empty() {
            return &self.member_name;
        }
        &self.member_email
    }
}

/// Result of an aggregation pass. `failed_members` lists members whose
/// records could not be read; their rows are simply absent, and the host
/// shows a partial-data warning instead of failing the page.
#[derive(Debug, Clone, Serialize)]
pub struct AggregationOutcome {
    pub submissions: Vec<AggregatedSubmission>,
    pub failed_members: Vec<String>,
}

/// One member's row in the dashboard leaderboard.
#[derive(Debug, Clone, Serialize)]
pub struct MemberContribution {
    pub email: String,
    pub name: String,
    pub submission_count: usize,
    pub total_amount: Decimal,
}

/// The master dashboard in one pass over the combined records.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSummary {
    pub total_amount: Decimal,
    pub total_submissions: usize,
    pub active_members: usize,
    pub average_donation: Decimal,
    pub member_stats: Vec<MemberContribution>,
    pub recent_submissions: Vec<AggregatedSubmission>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(member_name: &str, collected_by: Option<&str>) -> AggregatedSubmission {
        AggregatedSubmission {
            id: Uuid::new_v4(),
            name: "Asha".to_string(),
            city: "Guntur".to_string(),
            gothra: "Kashyapa".to_string(),
            phone_number: "9876543210".to_string(),
            recorded_at: None,
            member_email: "puja@example.com".to_string(),
            member_name: member_name.to_string(),
            collected_by: collected_by.map(|s| s.to_string()),
            detail: DonationDetail::Cash { amount: dec!(100) },
        }
    }

    #[test]
    fn test_collector_label_fallback_chain() {
        assert_eq!(record("Puja", Some("Durga")).collector_label(), "Durga");
        assert_eq!(record("Puja", Some("")).collector_label(), "Puja");
        assert_eq!(record("Puja", None).collector_label(), "Puja");
        assert_eq!(record("", None).collector_label(), "puja@example.com");
    }
}
