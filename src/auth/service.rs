use crate::errors::{ServiceError, ServiceResult, DomainError, DbError};
use crate::auth::{Session, AuthRepository, jwt};
use crate::types::MemberRole;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::Arc;

/// An authenticated identity handed over by the external auth provider.
///
/// The provider owns credentials and email verification; by the time a value
/// of this type reaches the core, the email is known to belong to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalIdentity {
    pub email: String,
    pub verified: bool,
}

/// Results from a successful identity resolution, including refresh token
#[derive(Debug)]
pub struct ResolvedSession {
    pub session: Session,
    pub access_token: String,
    pub access_expiry: DateTime<Utc>,
    pub refresh_token: String,
    pub refresh_expiry: DateTime<Utc>,
}

/// Outcome of resolving an external identity against the member registry
#[derive(Debug)]
pub enum ResolvedIdentity {
    /// A registered committee member, with session tokens issued
    Member(ResolvedSession),
    /// Authenticated and verified but without a profile row yet; the host
    /// routes this user through registration
    Unregistered { email: String },
}

/// Auth service mapping external identities to sessions
pub struct AuthService {
    auth_repo: Arc<dyn AuthRepository>,
}

impl AuthService {
    /// Create a new auth service
    pub fn new(pool: SqlitePool) -> Self {
        let auth_repo = Arc::new(super::repository::SqliteAuthRepository::new(pool));

        Self { auth_repo }
    }

    /// Resolve an authenticated external identity into a session.
    ///
    /// The role is read from the member registry at resolution time, so a
    /// token issued here reflects the stored role as of this call.
    pub async fn resolve_identity(&self, identity: &ExternalIdentity) -> ServiceResult<ResolvedIdentity> {
        if !identity.verified {
            return Err(ServiceError::Authentication(
                "Please verify your email first".to_string(),
            ));
        }

        let member = match self.auth_repo.find_member_by_email(&identity.email).await {
            Ok(member) => member,
            Err(DbError::NotFound(_, _)) => {
                log::debug!("No member profile for {}, routing to registration", identity.email);
                return Ok(ResolvedIdentity::Unregistered {
                    email: identity.email.clone(),
                });
            }
            Err(e) => return Err(ServiceError::Domain(DomainError::Database(e))),
        };

        let role = if member.is_master {
            MemberRole::Master
        } else {
            MemberRole::Member
        };
        let session = Session::new(member.email, member.name, member.mobile, role);

        // Generate tokens using the jwt module
        let (access_token, access_expiry) = jwt::generate_token(&session, jwt::TokenType::Access)?;
        let (refresh_token, _, refresh_expiry) = jwt::generate_refresh_token(&session)?;

        log::debug!(
            "Resolved {} as {} member",
            session.member_email,
            session.role.as_str()
        );

        Ok(ResolvedIdentity::Member(ResolvedSession {
            session,
            access_token,
            access_expiry,
            refresh_token,
            refresh_expiry,
        }))
    }

    /// Verify an access token and rebuild the session it carries
    pub async fn verify_token(&self, token: &str) -> ServiceResult<Session> {
        let claims = jwt::verify_token(token)?;

        // Check that the token is an access token (not a refresh token)
        if claims.refresh_exp.is_some() {
            return Err(ServiceError::Authentication(
                "Expected access token, received refresh token".to_string(),
            ));
        }

        jwt::session_from_claims(&claims)
    }

    /// Refresh an access token using a refresh token
    pub async fn refresh_session(&self, refresh_token: &str) -> ServiceResult<(String, DateTime<Utc>)> {
        let (new_access_token, new_access_expiry) = jwt::refresh_access_token(refresh_token)?;

        Ok((new_access_token, new_access_expiry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db_migration::run_migrations(&pool).await.unwrap();
        pool
    }

    async fn seed_member(pool: &SqlitePool, email: &str, name: &str, is_master: bool) {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO members (email, name, mobile, is_master, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(email)
        .bind(name)
        .bind("9876543210")
        .bind(is_master)
        .bind(&now)
        .bind(&now)
        .execute(pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn unverified_identity_is_rejected() {
        let pool = test_pool().await;
        crate::auth::jwt::initialize("test-secret");
        let service = AuthService::new(pool);

        let identity = ExternalIdentity {
            email: "ramu@example.com".to_string(),
            verified: false,
        };
        let err = service.resolve_identity(&identity).await.unwrap_err();
        match err {
            ServiceError::Authentication(msg) => {
                assert_eq!(msg, "Please verify your email first");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn unknown_email_resolves_to_unregistered() {
        let pool = test_pool().await;
        crate::auth::jwt::initialize("test-secret");
        let service = AuthService::new(pool);

        let identity = ExternalIdentity {
            email: "new@example.com".to_string(),
            verified: true,
        };
        match service.resolve_identity(&identity).await.unwrap() {
            ResolvedIdentity::Unregistered { email } => assert_eq!(email, "new@example.com"),
            other => panic!("unexpected resolution: {:?}", other),
        }
    }

    #[tokio::test]
    async fn master_flag_drives_session_role() {
        let pool = test_pool().await;
        crate::auth::jwt::initialize("test-secret");
        seed_member(&pool, "master@example.com", "Head Priest", true).await;
        let service = AuthService::new(pool);

        let identity = ExternalIdentity {
            email: "master@example.com".to_string(),
            verified: true,
        };
        match service.resolve_identity(&identity).await.unwrap() {
            ResolvedIdentity::Member(resolved) => {
                assert!(resolved.session.is_master());
                assert_eq!(resolved.session.member_name, "Head Priest");

                // The issued access token carries the same session
                let restored = service.verify_token(&resolved.access_token).await.unwrap();
                assert_eq!(restored.member_email, "master@example.com");
                assert!(restored.is_master());
            }
            other => panic!("unexpected resolution: {:?}", other),
        }
    }
}
