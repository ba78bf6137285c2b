use crate::auth::Session;
use crate::domains::member::repository::MemberRepository;
use crate::domains::member::types::{MemberResponse, NewMember, UpdateMemberProfile};
use crate::domains::permission::Permission;
use crate::errors::{ServiceResult, ServiceError, DomainError};
use crate::validation::{validate_unique, Validate};
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Trait defining member service operations
#[async_trait]
pub trait MemberService: Send + Sync {
    /// Write the registration profile for a freshly authenticated account.
    ///
    /// Registration runs before a session exists: the external provider has
    /// just created the account and the host immediately records the profile.
    async fn register_member(&self, new_member: NewMember) -> ServiceResult<MemberResponse>;

    async fn get_member(&self, email: &str, session: &Session) -> ServiceResult<MemberResponse>;

    /// The full committee roster. Master only.
    async fn list_members(&self, session: &Session) -> ServiceResult<Vec<MemberResponse>>;

    async fn update_profile(
        &self,
        email: &str,
        update: UpdateMemberProfile,
        session: &Session,
    ) -> ServiceResult<MemberResponse>;
}

/// Implementation of the member service
#[derive(Clone)]
pub struct MemberServiceImpl {
    pool: SqlitePool,
    repo: Arc<dyn MemberRepository>,
}

impl MemberServiceImpl {
    pub fn new(pool: SqlitePool, repo: Arc<dyn MemberRepository>) -> Self {
        Self { pool, repo }
    }
}

#[async_trait]
impl MemberService for MemberServiceImpl {
    async fn register_member(&self, new_member: NewMember) -> ServiceResult<MemberResponse> {
        new_member.validate()?;

        validate_unique(&self.pool, "members", "email", &new_member.email, "email").await?;

        let member = self
            .repo
            .create(&new_member)
            .await
            .map_err(ServiceError::Domain)?;

        log::info!("Registered committee member {}", member.email);
        Ok(MemberResponse::from(member))
    }

    async fn get_member(&self, email: &str, session: &Session) -> ServiceResult<MemberResponse> {
        session.authorize_member_access(email)?;

        let member = self
            .repo
            .find_by_email(email)
            .await
            .map_err(ServiceError::Domain)?;

        Ok(MemberResponse::from(member))
    }

    async fn list_members(&self, session: &Session) -> ServiceResult<Vec<MemberResponse>> {
        session.authorize(Permission::ViewMembers)?;

        let members = self.repo.list_all().await.map_err(ServiceError::Domain)?;

        Ok(members.into_iter().map(MemberResponse::from).collect())
    }

    async fn update_profile(
        &self,
        email: &str,
        update: UpdateMemberProfile,
        session: &Session,
    ) -> ServiceResult<MemberResponse> {
        session.authorize_member_access(email)?;
        update.validate()?;

        let member = self
            .repo
            .update_profile(email, &update)
            .await
            .map_err(ServiceError::Domain)?;

        Ok(MemberResponse::from(member))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::member::repository::SqliteMemberRepository;
    use crate::errors::ValidationError;
    use crate::types::MemberRole;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_service() -> MemberServiceImpl {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db_migration::run_migrations(&pool).await.unwrap();
        let repo = Arc::new(SqliteMemberRepository::new(pool.clone()));
        MemberServiceImpl::new(pool, repo)
    }

    fn member_session(email: &str) -> Session {
        Session::new(email.to_string(), "Some Member".to_string(), None, MemberRole::Member)
    }

    fn master_session() -> Session {
        Session::new(
            "master@example.com".to_string(),
            "Head Priest".to_string(),
            None,
            MemberRole::Master,
        )
    }

    fn registration(email: &str) -> NewMember {
        NewMember {
            email: email.to_string(),
            name: "Ramu".to_string(),
            mobile: "9876543210".to_string(),
        }
    }

    #[tokio::test]
    async fn registering_twice_is_rejected_before_insert() {
        let service = test_service().await;
        service.register_member(registration("ramu@example.com")).await.unwrap();

        let err = service
            .register_member(registration("ramu@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::Validation(ValidationError::Unique { .. }))
        ));
    }

    #[tokio::test]
    async fn roster_is_master_only() {
        let service = test_service().await;
        service.register_member(registration("ramu@example.com")).await.unwrap();

        let err = service
            .list_members(&member_session("ramu@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::PermissionDenied(_)));

        let roster = service.list_members(&master_session()).await.unwrap();
        assert_eq!(roster.len(), 1);
    }

    #[tokio::test]
    async fn members_may_only_touch_their_own_profile() {
        let service = test_service().await;
        service.register_member(registration("ramu@example.com")).await.unwrap();

        let update = UpdateMemberProfile {
            name: Some("Ramu Garu".to_string()),
            mobile: None,
        };

        let err = service
            .update_profile("ramu@example.com", update.clone(), &member_session("other@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::PermissionDenied(_)));

        // The master may update anyone
        let updated = service
            .update_profile("ramu@example.com", update, &master_session())
            .await
            .unwrap();
        assert_eq!(updated.name, "Ramu Garu");
    }
}
