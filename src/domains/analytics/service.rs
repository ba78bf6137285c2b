use crate::auth::Session;
use crate::domains::analytics::types::{
    AggregatedSubmission, AggregationOutcome, AnalyticsSummary, MemberContribution,
};
use crate::domains::member::repository::MemberRepository;
use crate::domains::member::types::Member;
use crate::domains::permission::{MemberRole, Permission};
use crate::domains::submission::repository::SubmissionRepository;
use crate::domains::submission::types::Submission;
use crate::errors::{DomainResult, ServiceError, ServiceResult};
use crate::types::DonationKind;
use async_trait::async_trait;
use futures::future::join_all;
use rust_decimal::Decimal;
use std::cmp::Reverse;
use std::sync::Arc;

/// Trait defining the combined-submissions views
#[async_trait]
pub trait AnalyticsService: Send + Sync {
    /// A member gets their own records; a master gets every member's,
    /// tagged with the collector's name. Unreadable members are reported
    /// in `failed_members` rather than failing the whole call.
    async fn fetch_submissions(&self, session: &Session) -> ServiceResult<AggregationOutcome>;

    /// Committee-wide dashboard. Master only.
    async fn dashboard(&self, session: &Session) -> ServiceResult<AnalyticsSummary>;
}

/// Implementation of the analytics service
#[derive(Clone)]
pub struct AnalyticsServiceImpl {
    member_repo: Arc<dyn MemberRepository>,
    submission_repo: Arc<dyn SubmissionRepository>,
}

impl AnalyticsServiceImpl {
    pub fn new(
        member_repo: Arc<dyn MemberRepository>,
        submission_repo: Arc<dyn SubmissionRepository>,
    ) -> Self {
        Self {
            member_repo,
            submission_repo,
        }
    }

    /// One member's cash and in-kind tables, read concurrently.
    async fn member_pair(&self, member_email: &str) -> DomainResult<Vec<Submission>> {
        let (cash, in_kind) = futures::try_join!(
            self.submission_repo
                .list_for_member(member_email, DonationKind::Cash),
            self.submission_repo
                .list_for_member(member_email, DonationKind::InKind),
        )?;
        let mut submissions = cash;
        submissions.extend(in_kind);
        Ok(submissions)
    }

    /// Fan out across the roster, one concurrent pair per member. A member
    /// whose reads fail contributes no records and is listed as failed.
    async fn aggregate_across(&self, members: &[Member]) -> AggregationOutcome {
        let fetches = members.iter().map(|member| async move {
            let pair = self.member_pair(&member.email).await;
            (member, pair)
        });

        let mut outcome = AggregationOutcome {
            submissions: Vec::new(),
            failed_members: Vec::new(),
        };
        for (member, pair) in join_all(fetches).await {
            match pair {
                Ok(records) => {
                    let label = member.collector_label();
                    outcome.submissions.extend(records.into_iter().map(|submission| {
                        AggregatedSubmission::from_submission(submission, Some(label.clone()))
                    }));
                }
                Err(err) => {
                    log::warn!("Failed to read submissions for {}: {}", member.email, err);
                    outcome.failed_members.push(member.email.clone());
                }
            }
        }
        outcome
    }
}

#[async_trait]
impl AnalyticsService for AnalyticsServiceImpl {
    async fn fetch_submissions(&self, session: &Session) -> ServiceResult<AggregationOutcome> {
        session.authorize(Permission::ViewSubmissions)?;

        match session.role {
            MemberRole::Master => {
                // Without the roster there is nothing to aggregate, so a
                // failure here fails the call rather than degrading.
                let members = self
                    .member_repo
                    .list_all()
                    .await
                    .map_err(ServiceError::Domain)?;
                Ok(self.aggregate_across(&members).await)
            }
            MemberRole::Member => {
                let records = self
                    .member_pair(&session.member_email)
                    .await
                    .map_err(ServiceError::Domain)?;
                Ok(AggregationOutcome {
                    submissions: records
                        .into_iter()
                        .map(|submission| AggregatedSubmission::from_submission(submission, None))
                        .collect(),
                    failed_members: Vec::new(),
                })
            }
        }
    }

    async fn dashboard(&self, session: &Session) -> ServiceResult<AnalyticsSummary> {
        session.authorize(Permission::ViewAnalytics)?;

        let members = self
            .member_repo
            .list_all()
            .await
            .map_err(ServiceError::Domain)?;
        let outcome = self.aggregate_across(&members).await;
        let submissions = outcome.submissions;

        let total_amount: Decimal = submissions
            .iter()
            .filter_map(AggregatedSubmission::amount)
            .sum();
        let total_submissions = submissions.len();
        // The divisor counts in-kind records too; the committee reads the
        // figure as "per submission", not "per cash donation".
        let average_donation = if total_submissions == 0 {
            Decimal::ZERO
        } else {
            total_amount / Decimal::from(total_submissions as u64)
        };

        let mut member_stats: Vec<MemberContribution> = members
            .iter()
            .map(|member| {
                let label = member.collector_label();
                let matched = submissions
                    .iter()
                    .filter(|s| s.collected_by.as_deref() == Some(label.as_str()));
                let (submission_count, member_total) =
                    matched.fold((0usize, Decimal::ZERO), |(count, total), s| {
                        (count + 1, total + s.amount().unwrap_or(Decimal::ZERO))
                    });
                MemberContribution {
                    email: member.email.clone(),
                    name: member.name.clone(),
                    submission_count,
                    total_amount: member_total,
                }
            })
            .collect();
        member_stats.sort_by(|a, b| b.total_amount.cmp(&a.total_amount));

        let mut recent_submissions = submissions;
        recent_submissions.sort_by_key(|s| {
            Reverse(s.recorded_at.map(|ts| ts.timestamp_millis()).unwrap_or(0))
        });
        recent_submissions.truncate(10);

        Ok(AnalyticsSummary {
            total_amount,
            total_submissions,
            active_members: members.len(),
            average_donation,
            member_stats,
            recent_submissions,
        })
    }
}
