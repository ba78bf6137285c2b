use crate::types::{MemberRole, Permission};
use crate::errors::ServiceError;

/// Represents the resolved session for the current operation.
///
/// A session is an explicit value handed to every service call; there is no
/// ambient "current user". It is produced by the identity resolver (or decoded
/// from a session token at the FFI boundary) and carries everything the
/// services need to authorize and attribute work.
#[derive(Debug, Clone)]
pub struct Session {
    /// Email of the committee member, which is also their stable identity
    pub member_email: String,

    /// Display name of the committee member
    pub member_name: String,

    /// The member's own mobile number, when their profile has one
    pub mobile: Option<String>,

    /// The role of the committee member
    pub role: MemberRole,
}

impl Session {
    /// Create a new session
    pub fn new(
        member_email: impl Into<String>,
        member_name: impl Into<String>,
        mobile: Option<String>,
        role: MemberRole,
    ) -> Self {
        Self {
            member_email: member_email.into(),
            member_name: member_name.into(),
            mobile,
            role,
        }
    }

    /// Check if the member holds a specific permission
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.role.has_permission(permission)
    }

    pub fn is_master(&self) -> bool {
        matches!(self.role, MemberRole::Master)
    }

    /// Authorize a specific permission, returning an error if not allowed
    pub fn authorize(&self, permission: Permission) -> Result<(), ServiceError> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(ServiceError::PermissionDenied(format!(
                "Member does not have permission: {:?}",
                permission
            )))
        }
    }

    /// Authorize multiple permissions, requiring all of them
    pub fn authorize_all(&self, permissions: &[Permission]) -> Result<(), ServiceError> {
        if self.role.has_permissions(permissions) {
            Ok(())
        } else {
            Err(ServiceError::PermissionDenied(
                "Member does not have all required permissions".to_string()
            ))
        }
    }

    /// Verify the session belongs to the master
    pub fn authorize_master(&self) -> Result<(), ServiceError> {
        if self.is_master() {
            Ok(())
        } else {
            Err(ServiceError::PermissionDenied(
                "This action requires the master role".to_string()
            ))
        }
    }

    /// For operations restricted to a member's own records
    pub fn authorize_member_access(&self, owner_email: &str) -> Result<(), ServiceError> {
        if self.member_email == owner_email || self.is_master() {
            Ok(())
        } else {
            Err(ServiceError::PermissionDenied(
                "You do not have permission to access this record".to_string()
            ))
        }
    }
}
