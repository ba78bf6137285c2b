use crate::errors::{DbError, DbResult};
use crate::domains::member::types::{Member, MemberRow};
use sqlx::{SqlitePool, query_as};
use async_trait::async_trait;

#[async_trait]
pub(crate) trait AuthRepository: Send + Sync {
    async fn find_member_by_email(&self, email: &str) -> DbResult<Member>;
}

pub(crate) struct SqliteAuthRepository {
    pool: SqlitePool,
}

impl SqliteAuthRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthRepository for SqliteAuthRepository {
    async fn find_member_by_email(&self, email: &str) -> DbResult<Member> {
        let row = query_as::<_, MemberRow>(
            "SELECT * FROM members WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| DbError::NotFound("Member".to_string(), email.to_string()))?;

        row.into_entity().map_err(|e| match e {
            crate::errors::DomainError::Database(db_err) => db_err,
            _ => DbError::Other(e.to_string()),
        })
    }
}
