use crate::auth::Session;
use crate::domains::permission::Permission;
use crate::domains::submission::receipt::build_receipt_link;
use crate::domains::submission::repository::SubmissionRepository;
use crate::domains::submission::types::{RecordedDonation, SubmissionResponse, UpdateSubmission};
use crate::domains::submission::workflow::DraftForm;
use crate::errors::{ServiceError, ServiceResult};
use crate::types::DonationKind;
use crate::validation::Validate;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Trait defining donation submission operations
#[async_trait]
pub trait SubmissionService: Send + Sync {
    /// Persists a reviewed draft and returns the saved record with its
    /// WhatsApp receipt link. A validation failure here leaves nothing
    /// written; the host keeps the entry on the review screen for retry.
    async fn record_donation(
        &self,
        draft: &DraftForm,
        session: &Session,
    ) -> ServiceResult<RecordedDonation>;

    async fn get_submission(
        &self,
        id: Uuid,
        kind: DonationKind,
        session: &Session,
    ) -> ServiceResult<SubmissionResponse>;

    /// Rewrites the donor-facing fields of a submission. The donation kind
    /// never changes. Owner or master only.
    async fn update_submission(
        &self,
        id: Uuid,
        kind: DonationKind,
        update: UpdateSubmission,
        session: &Session,
    ) -> ServiceResult<SubmissionResponse>;

    /// Hard-deletes the underlying row. Owner or master only; ownership is
    /// checked against the stored record, not the caller's claim.
    async fn delete_submission(
        &self,
        id: Uuid,
        kind: DonationKind,
        session: &Session,
    ) -> ServiceResult<()>;
}

/// Implementation of the submission service
#[derive(Clone)]
pub struct SubmissionServiceImpl {
    repo: Arc<dyn SubmissionRepository>,
}

impl SubmissionServiceImpl {
    pub fn new(repo: Arc<dyn SubmissionRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl SubmissionService for SubmissionServiceImpl {
    async fn record_donation(
        &self,
        draft: &DraftForm,
        session: &Session,
    ) -> ServiceResult<RecordedDonation> {
        session.authorize(Permission::RecordDonations)?;

        let new_submission = draft.to_new_submission()?;
        new_submission.validate()?;

        let submission = self
            .repo
            .create(&new_submission, session)
            .await
            .map_err(ServiceError::Domain)?;

        let receipt_link = build_receipt_link(&submission, session.mobile.as_deref());
        log::info!(
            "Recorded {} donation {} by {}",
            submission.kind().as_str(),
            submission.id,
            session.member_email
        );

        Ok(RecordedDonation {
            submission: SubmissionResponse::from(submission),
            receipt_link,
        })
    }

    async fn get_submission(
        &self,
        id: Uuid,
        kind: DonationKind,
        session: &Session,
    ) -> ServiceResult<SubmissionResponse> {
        session.authorize(Permission::ViewSubmissions)?;

        let submission = self
            .repo
            .find_by_id(id, kind)
            .await
            .map_err(ServiceError::Domain)?;
        session.authorize_member_access(&submission.member_email)?;

        Ok(SubmissionResponse::from(submission))
    }

    async fn update_submission(
        &self,
        id: Uuid,
        kind: DonationKind,
        update: UpdateSubmission,
        session: &Session,
    ) -> ServiceResult<SubmissionResponse> {
        session.authorize(Permission::EditSubmissions)?;
        update.validate()?;

        let current = self
            .repo
            .find_by_id(id, kind)
            .await
            .map_err(ServiceError::Domain)?;
        session.authorize_member_access(&current.member_email)?;

        let updated = self
            .repo
            .update(id, kind, &update)
            .await
            .map_err(ServiceError::Domain)?;

        log::info!(
            "Updated {} donation {} ({})",
            kind.as_str(),
            id,
            session.member_email
        );
        Ok(SubmissionResponse::from(updated))
    }

    async fn delete_submission(
        &self,
        id: Uuid,
        kind: DonationKind,
        session: &Session,
    ) -> ServiceResult<()> {
        session.authorize(Permission::DeleteSubmissions)?;

        let current = self
            .repo
            .find_by_id(id, kind)
            .await
            .map_err(ServiceError::Domain)?;
        session.authorize_member_access(&current.member_email)?;

        self.repo
            .delete(id, kind)
            .await
            .map_err(ServiceError::Domain)?;

        log::info!(
            "Deleted {} donation {} ({})",
            kind.as_str(),
            id,
            session.member_email
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::permission::MemberRole;
    use crate::domains::submission::repository::SqliteSubmissionRepository;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db_migration::run_migrations(&pool).await.unwrap();
        for (email, name) in [
            ("puja@example.com", "Puja Committee"),
            ("anil@example.com", "Anil"),
        ] {
            let now = Utc::now().to_rfc3339();
            sqlx::query(
                "INSERT INTO members (email, name, mobile, is_master, created_at, updated_at)
                 VALUES (?, ?, NULL, 0, ?, ?)",
            )
            .bind(email)
            .bind(name)
            .bind(&now)
            .bind(&now)
            .execute(&pool)
            .await
            .unwrap();
        }
        pool
    }

    fn service(pool: SqlitePool) -> SubmissionServiceImpl {
        SubmissionServiceImpl::new(Arc::new(SqliteSubmissionRepository::new(pool)))
    }

    fn member_session(email: &str, name: &str) -> Session {
        Session::new(email, name, Some("9949844807".to_string()), MemberRole::Member)
    }

    fn master_session() -> Session {
        Session::new("durga@example.com", "Durga Prasad", None, MemberRole::Master)
    }

    fn cash_draft() -> DraftForm {
        DraftForm {
            name: "Asha".to_string(),
            city: "Guntur".to_string(),
            gothra: "Kashyapa".to_string(),
            phone_number: "9876543210".to_string(),
            donation_type: DonationKind::Cash,
            amount: "500.00".to_string(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_record_returns_saved_record_and_receipt_link() {
        let service = service(test_pool().await);
        let session = member_session("puja@example.com", "Puja Committee");

        let recorded = service.record_donation(&cash_draft(), &session).await.unwrap();
        assert_eq!(recorded.submission.member_email, "puja@example.com");
        assert!(recorded.receipt_link.starts_with("https://wa.me/919876543210?text="));
        assert!(recorded.receipt_link.contains("500.00"));
    }

    #[tokio::test]
    async fn test_record_rejects_invalid_amount_text() {
        let service = service(test_pool().await);
        let session = member_session("puja@example.com", "Puja Committee");

        let draft = DraftForm {
            amount: "abc".to_string(),
            ..cash_draft()
        };
        let err = service.record_donation(&draft, &session).await.unwrap_err();
        assert!(err.to_string().contains("Please enter a valid amount"));
    }

    #[tokio::test]
    async fn test_members_cannot_touch_each_others_records() {
        let service = service(test_pool().await);
        let owner = member_session("puja@example.com", "Puja Committee");
        let other = member_session("anil@example.com", "Anil");

        let recorded = service.record_donation(&cash_draft(), &owner).await.unwrap();
        let id = recorded.submission.id;

        let get = service.get_submission(id, DonationKind::Cash, &other).await;
        assert!(matches!(get, Err(ServiceError::PermissionDenied(_))));

        let delete = service.delete_submission(id, DonationKind::Cash, &other).await;
        assert!(matches!(delete, Err(ServiceError::PermissionDenied(_))));

        // The owner still can.
        service.delete_submission(id, DonationKind::Cash, &owner).await.unwrap();
    }

    #[tokio::test]
    async fn test_master_can_edit_and_delete_any_record() {
        let service = service(test_pool().await);
        let owner = member_session("puja@example.com", "Puja Committee");
        let master = master_session();

        let recorded = service.record_donation(&cash_draft(), &owner).await.unwrap();
        let id = recorded.submission.id;

        let update = UpdateSubmission {
            name: "Asha Rani".to_string(),
            city: "Guntur".to_string(),
            gothra: "Kashyapa".to_string(),
            phone_number: "9876543210".to_string(),
            amount: Some(dec!(750)),
            description: None,
        };
        let updated = service
            .update_submission(id, DonationKind::Cash, update, &master)
            .await
            .unwrap();
        assert_eq!(updated.name, "Asha Rani");
        // Attribution stays with the recording member.
        assert_eq!(updated.member_email, "puja@example.com");

        service.delete_submission(id, DonationKind::Cash, &master).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_cannot_switch_donation_kind() {
        let service = service(test_pool().await);
        let owner = member_session("puja@example.com", "Puja Committee");

        let recorded = service.record_donation(&cash_draft(), &owner).await.unwrap();
        let update = UpdateSubmission {
            name: "Asha".to_string(),
            city: "Guntur".to_string(),
            gothra: "Kashyapa".to_string(),
            phone_number: "9876543210".to_string(),
            amount: None,
            description: Some("Rice bags".to_string()),
        };
        let err = service
            .update_submission(recorded.submission.id, DonationKind::Cash, update, &owner)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(_)));
    }
}
