use crate::auth::Session;
use crate::domains::submission::types::{
    CashSubmissionRow, DonationDetail, InKindDonationRow, NewSubmission, Submission,
    UpdateSubmission,
};
use crate::errors::{DbError, DomainError, DomainResult};
use crate::types::DonationKind;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{query, query_as, SqlitePool};
use uuid::Uuid;

/// Persistence for cash and in-kind donation rows.
///
/// The two donation kinds live in separate tables with separate shapes;
/// callers address a row by `(id, kind)` and the repository routes to the
/// right table.
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    async fn create(&self, new: &NewSubmission, recorded_by: &Session) -> DomainResult<Submission>;
    async fn find_by_id(&self, id: Uuid, kind: DonationKind) -> DomainResult<Submission>;
    async fn list_for_member(
        &self,
        member_email: &str,
        kind: DonationKind,
    ) -> DomainResult<Vec<Submission>>;
    async fn update(
        &self,
        id: Uuid,
        kind: DonationKind,
        update: &UpdateSubmission,
    ) -> DomainResult<Submission>;
    async fn delete(&self, id: Uuid, kind: DonationKind) -> DomainResult<()>;
}

#[derive(Clone)]
pub struct SqliteSubmissionRepository {
    pool: SqlitePool,
}

impl SqliteSubmissionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn table(kind: DonationKind) -> &'static str {
        match kind {
            DonationKind::Cash => "cash_submissions",
            DonationKind::InKind => "in_kind_donations",
        }
    }

    fn map_cash_row(row: CashSubmissionRow) -> DomainResult<Submission> {
        row.into_entity()
    }

    fn map_in_kind_row(row: InKindDonationRow) -> DomainResult<Submission> {
        row.into_entity()
    }
}

#[async_trait]
impl SubmissionRepository for SqliteSubmissionRepository {
    async fn create(&self, new: &NewSubmission, recorded_by: &Session) -> DomainResult<Submission> {
        let id = Uuid::new_v4();
        let recorded_at = Utc::now();
        match &new.detail {
            DonationDetail::Cash { amount } => {
                query(
                    "INSERT INTO cash_submissions (id, member_email, donor_name, city, gothra, phone_number, amount, recorded_at, member_name)
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(id.to_string())
                .bind(&recorded_by.member_email)
                .bind(&new.name)
                .bind(&new.city)
                .bind(&new.gothra)
                .bind(&new.phone_number)
                .bind(amount.to_string())
                .bind(recorded_at.to_rfc3339())
                .bind(&recorded_by.member_name)
                .execute(&self.pool)
                .await
                .map_err(DbError::from)?;
            }
            DonationDetail::InKind { description } => {
                query(
                    "INSERT INTO in_kind_donations (id, member_email, donor_name, city, gothra, phone_number, description, recorded_at, member_name)
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(id.to_string())
                .bind(&recorded_by.member_email)
                .bind(&new.name)
                .bind(&new.city)
                .bind(&new.gothra)
                .bind(&new.phone_number)
                .bind(description)
                .bind(recorded_at.to_rfc3339())
                .bind(&recorded_by.member_name)
                .execute(&self.pool)
                .await
                .map_err(DbError::from)?;
            }
        }
        self.find_by_id(id, new.detail.kind()).await
    }

    async fn find_by_id(&self, id: Uuid, kind: DonationKind) -> DomainResult<Submission> {
        match kind {
            DonationKind::Cash => {
                let row = query_as::<_, CashSubmissionRow>(
                    "SELECT id, member_email, donor_name, city, gothra, phone_number, amount, recorded_at, member_name
                     FROM cash_submissions WHERE id = ?",
                )
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(DbError::from)?
                .ok_or_else(|| DbError::NotFound("cash_submissions".to_string(), id.to_string()))?;
                Self::map_cash_row(row)
            }
            DonationKind::InKind => {
                let row = query_as::<_, InKindDonationRow>(
                    "SELECT id, member_email, donor_name, city, gothra, phone_number, description, recorded_at, member_name
                     FROM in_kind_donations WHERE id = ?",
                )
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(DbError::from)?
                .ok_or_else(|| {
                    DbError::NotFound("in_kind_donations".to_string(), id.to_string())
                })?;
                Self::map_in_kind_row(row)
            }
        }
    }

    async fn list_for_member(
        &self,
        member_email: &str,
        kind: DonationKind,
    ) -> DomainResult<Vec<Submission>> {
        match kind {
            DonationKind::Cash => {
                let rows = query_as::<_, CashSubmissionRow>(
                    "SELECT id, member_email, donor_name, city, gothra, phone_number, amount, recorded_at, member_name
                     FROM cash_submissions WHERE member_email = ?",
                )
                .bind(member_email)
                .fetch_all(&self.pool)
                .await
                .map_err(DbError::from)?;
                rows.into_iter().map(Self::map_cash_row).collect()
            }
            DonationKind::InKind => {
                let rows = query_as::<_, InKindDonationRow>(
                    "SELECT id, member_email, donor_name, city, gothra, phone_number, description, recorded_at, member_name
                     FROM in_kind_donations WHERE member_email = ?",
                )
                .bind(member_email)
                .fetch_all(&self.pool)
                .await
                .map_err(DbError::from)?;
                rows.into_iter().map(Self::map_in_kind_row).collect()
            }
        }
    }

    async fn update(
        &self,
        id: Uuid,
        kind: DonationKind,
        update: &UpdateSubmission,
    ) -> DomainResult<Submission> {
        let detail = update.detail_for(kind)?;
        let result = match &detail {
            DonationDetail::Cash { amount } => {
                query(
                    "UPDATE cash_submissions
                     SET donor_name = ?, city = ?, gothra = ?, phone_number = ?, amount = ?
                     WHERE id = ?",
                )
                .bind(&update.name)
                .bind(&update.city)
                .bind(&update.gothra)
                .bind(&update.phone_number)
                .bind(amount.to_string())
                .bind(id.to_string())
                .execute(&self.pool)
                .await
                .map_err(DbError::from)?
            }
            DonationDetail::InKind { description } => {
                query(
                    "UPDATE in_kind_donations
                     SET donor_name = ?, city = ?, gothra = ?, phone_number = ?, description = ?
                     WHERE id = ?",
                )
                .bind(&update.name)
                .bind(&update.city)
                .bind(&update.gothra)
                .bind(&update.phone_number)
                .bind(description)
                .bind(id.to_string())
                .execute(&self.pool)
                .await
                .map_err(DbError::from)?
            }
        };
        if result.rows_affected() == 0 {
            return Err(DomainError::Database(DbError::NotFound(
                Self::table(kind).to_string(),
                id.to_string(),
            )));
        }
        self.find_by_id(id, kind).await
    }

    async fn delete(&self, id: Uuid, kind: DonationKind) -> DomainResult<()> {
        let result = query(&format!("DELETE FROM {} WHERE id = ?", Self::table(kind)))
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;
        if result.rows_affected() == 0 {
            return Err(DomainError::Database(DbError::NotFound(
                Self::table(kind).to_string(),
                id.to_string(),
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::permission::MemberRole;
    use rust_decimal_macros::dec;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db_migration::run_migrations(&pool).await.unwrap();
        seed_member(&pool, "puja@example.com", "Puja Committee").await;
        pool
    }

    async fn seed_member(pool: &SqlitePool, email: &str, name: &str) {
        let now = Utc::now().to_rfc3339();
        query(
            "INSERT INTO members (email, name, mobile, is_master, created_at, updated_at)
             VALUES (?, ?, NULL, 0, ?, ?)",
        )
        .bind(email)
        .bind(name)
        .bind(&now)
        .bind(&now)
        .execute(pool)
        .await
        .unwrap();
    }

    fn test_session() -> Session {
        Session::new(
            "puja@example.com",
            "Puja Committee",
            Some("9949844807".to_string()),
            MemberRole::Member,
        )
    }

    fn cash_submission(amount: rust_decimal::Decimal) -> NewSubmission {
        NewSubmission {
            name: "Lakshmi".to_string(),
            city: "Tenali".to_string(),
            gothra: "Bharadwaja".to_string(),
            phone_number: "9876543210".to_string(),
            detail: DonationDetail::Cash { amount },
        }
    }

    #[tokio::test]
    async fn test_create_and_find_cash_submission() {
        let pool = test_pool().await;
        let repo = SqliteSubmissionRepository::new(pool);
        let session = test_session();

        let created = repo.create(&cash_submission(dec!(500.00)), &session).await.unwrap();
        assert_eq!(created.member_email, "puja@example.com");
        assert_eq!(created.member_name, "Puja Committee");
        assert!(created.recorded_at.is_some());

        let found = repo.find_by_id(created.id, DonationKind::Cash).await.unwrap();
        assert_eq!(found.name, "Lakshmi");
        assert_eq!(found.detail, DonationDetail::Cash { amount: dec!(500.00) });
    }

    #[tokio::test]
    async fn test_kinds_live_in_separate_tables() {
        let pool = test_pool().await;
        let repo = SqliteSubmissionRepository::new(pool);
        let session = test_session();

        let created = repo.create(&cash_submission(dec!(100)), &session).await.unwrap();
        let miss = repo.find_by_id(created.id, DonationKind::InKind).await;
        assert!(matches!(
            miss,
            Err(DomainError::Database(DbError::NotFound(_, _)))
        ));
    }

    #[tokio::test]
    async fn test_update_preserves_kind_and_rewrites_fields() {
        let pool = test_pool().await;
        let repo = SqliteSubmissionRepository::new(pool);
        let session = test_session();

        let created = repo
            .create(
                &NewSubmission {
                    name: "Ravi".to_string(),
                    city: "Guntur".to_string(),
                    gothra: "Kashyapa".to_string(),
                    phone_number: "9000000000".to_string(),
                    detail: DonationDetail::InKind {
                        description: "Rice bags".to_string(),
                    },
                },
                &session,
            )
            .await
            .unwrap();

        let update = UpdateSubmission {
            name: "Ravi Kumar".to_string(),
            city: "Guntur".to_string(),
            gothra: "Kashyapa".to_string(),
            phone_number: "9000000000".to_string(),
            amount: None,
            description: Some("Rice bags (25kg)".to_string()),
        };
        let updated = repo.update(created.id, DonationKind::InKind, &update).await.unwrap();
        assert_eq!(updated.name, "Ravi Kumar");
        assert_eq!(updated.detail.description(), Some("Rice bags (25kg)"));
        // Attribution never changes on edit.
        assert_eq!(updated.member_email, "puja@example.com");
    }

    #[tokio::test]
    async fn test_delete_removes_row() {
        let pool = test_pool().await;
        let repo = SqliteSubmissionRepository::new(pool);
        let session = test_session();

        let created = repo.create(&cash_submission(dec!(250)), &session).await.unwrap();
        repo.delete(created.id, DonationKind::Cash).await.unwrap();
        let gone = repo.find_by_id(created.id, DonationKind::Cash).await;
        assert!(matches!(
            gone,
            Err(DomainError::Database(DbError::NotFound(_, _)))
        ));

        let again = repo.delete(created.id, DonationKind::Cash).await;
        assert!(again.is_err());
    }
}
