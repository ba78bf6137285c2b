use crate::domains::member::types::{Member, MemberRow, NewMember, UpdateMemberProfile};
use crate::errors::{DbError, DomainError, DomainResult};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Sqlite, query, query_as};

/// Trait defining member registry operations
#[async_trait]
pub trait MemberRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> DomainResult<Member>;

    /// All registered committee members, ordered by name
    async fn list_all(&self) -> DomainResult<Vec<Member>>;

    async fn create(&self, new_member: &NewMember) -> DomainResult<Member>;

    async fn update_profile(
        &self,
        email: &str,
        update: &UpdateMemberProfile,
    ) -> DomainResult<Member>;
}

/// SQLite implementation for MemberRepository
#[derive(Clone)]
pub struct SqliteMemberRepository {
    pool: Pool<Sqlite>,
}

impl SqliteMemberRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    fn map_row_to_entity(row: MemberRow) -> DomainResult<Member> {
        row.into_entity()
            .map_err(|e| DomainError::Internal(format!("Failed to map member row to entity: {}", e)))
    }
}

#[async_trait]
impl MemberRepository for SqliteMemberRepository {
    async fn find_by_email(&self, email: &str) -> DomainResult<Member> {
        let row = query_as::<_, MemberRow>(
            "SELECT email, name, mobile, is_master, created_at, updated_at \
             FROM members WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?
        .ok_or_else(|| DbError::NotFound("Member".to_string(), email.to_string()))?;

        Self::map_row_to_entity(row)
    }

    async fn list_all(&self) -> DomainResult<Vec<Member>> {
        let rows = query_as::<_, MemberRow>(
            "SELECT email, name, mobile, is_master, created_at, updated_at \
             FROM members ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        rows.into_iter().map(Self::map_row_to_entity).collect()
    }

    async fn create(&self, new_member: &NewMember) -> DomainResult<Member> {
        let now = Utc::now().to_rfc3339();

        query(
            "INSERT INTO members (email, name, mobile, is_master, created_at, updated_at) \
             VALUES (?, ?, ?, 0, ?, ?)",
        )
        .bind(&new_member.email)
        .bind(&new_member.name)
        .bind(&new_member.mobile)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return DbError::Conflict(format!(
                        "Member with email {} already exists",
                        new_member.email
                    ));
                }
            }
            DbError::from(e)
        })?;

        self.find_by_email(&new_member.email).await
    }

    async fn update_profile(
        &self,
        email: &str,
        update: &UpdateMemberProfile,
    ) -> DomainResult<Member> {
        // Overwrite only the fields the caller set
        let current = self.find_by_email(email).await?;
        let name = update.name.clone().unwrap_or(current.name);
        let mobile = update.mobile.clone().or(current.mobile);
        let now = Utc::now().to_rfc3339();

        let result = query(
            "UPDATE members SET name = ?, mobile = ?, updated_at = ? WHERE email = ?",
        )
        .bind(&name)
        .bind(&mobile)
        .bind(&now)
        .bind(email)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::Database(DbError::NotFound(
                "Member".to_string(),
                email.to_string(),
            )));
        }

        self.find_by_email(email).await
    }
}
