use crate::errors::{DomainError, DomainResult, ValidationError};
use crate::validation::{Validate, is_valid_email, is_valid_indian_mobile};
use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use sqlx::FromRow;

/// Committee member entity - the registry row behind every session.
///
/// Members are keyed by email: the email is what the external auth provider
/// authenticates, so no separate id is needed. Profiles are created once at
/// registration and never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub email: String,
    pub name: String,
    /// The member's own mobile number, shown on donation receipts.
    /// Nullable because master accounts may be seeded without one.
    pub mobile: Option<String>,
    pub is_master: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    /// Display label used when tagging submissions in cross-member views.
    pub fn collector_label(&self) -> String {
        if self.name.trim().is_empty() {
            "Unknown Member".to_string()
        } else {
            self.name.clone()
        }
    }
}

/// NewMember DTO - the registration profile written right after the external
/// provider creates an account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMember {
    pub email: String,
    pub name: String,
    pub mobile: String,
}

impl Validate for NewMember {
    fn validate(&self) -> DomainResult<()> {
        // The registration form surfaces one banner message at a time, in
        // this order. The messages are shown to the user verbatim.
        if self.name.trim().is_empty()
            || self.mobile.trim().is_empty()
            || self.email.trim().is_empty()
        {
            return Err(DomainError::Validation(ValidationError::message(
                "Please fill all fields",
            )));
        }

        if !is_valid_indian_mobile(&self.mobile) {
            return Err(DomainError::Validation(ValidationError::message(
                "Please enter a valid 10-digit Indian mobile number",
            )));
        }

        if !is_valid_email(&self.email) {
            return Err(DomainError::Validation(ValidationError::message(
                "Please enter a valid email address.",
            )));
        }

        Ok(())
    }
}

/// UpdateMemberProfile DTO - used when a member edits their own profile
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateMemberProfile {
    pub name: Option<String>,
    pub mobile: Option<String>,
}

impl Validate for UpdateMemberProfile {
    fn validate(&self) -> DomainResult<()> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(DomainError::Validation(ValidationError::required("name")));
            }
        }

        if let Some(mobile) = &self.mobile {
            if !is_valid_indian_mobile(mobile) {
                return Err(DomainError::Validation(ValidationError::message(
                    "Please enter a valid 10-digit Indian mobile number",
                )));
            }
        }

        Ok(())
    }
}

/// MemberRow - SQLite row representation for mapping from database
#[derive(Debug, Clone, FromRow)]
pub struct MemberRow {
    pub email: String,
    pub name: String,
    pub mobile: Option<String>,
    pub is_master: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl MemberRow {
    /// Convert database row to domain entity
    pub fn into_entity(self) -> DomainResult<Member> {
        let parse_datetime = |s: &str, field_name: &str| {
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| {
                    DomainError::Validation(ValidationError::format(
                        field_name,
                        &format!("Invalid RFC3339 format: {}", s),
                    ))
                })
        };

        Ok(Member {
            email: self.email,
            name: self.name,
            mobile: self.mobile,
            is_master: self.is_master,
            created_at: parse_datetime(&self.created_at, "created_at")?,
            updated_at: parse_datetime(&self.updated_at, "updated_at")?,
        })
    }
}

/// MemberResponse DTO - used for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberResponse {
    pub email: String,
    pub name: String,
    pub mobile: Option<String>,
    pub is_master: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Member> for MemberResponse {
    fn from(member: Member) -> Self {
        Self {
            email: member.email,
            name: member.name,
            mobile: member.mobile,
            is_master: member.is_master,
            created_at: member.created_at.to_rfc3339(),
            updated_at: member.updated_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_registration() -> NewMember {
        NewMember {
            email: "ramu@example.com".to_string(),
            name: "Ramu".to_string(),
            mobile: "9876543210".to_string(),
        }
    }

    #[test]
    fn registration_requires_every_field() {
        let mut reg = valid_registration();
        reg.name = "  ".to_string();
        let err = reg.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: Please fill all fields"
        );
    }

    #[test]
    fn registration_rejects_bad_mobile() {
        let mut reg = valid_registration();
        reg.mobile = "1234567890".to_string();
        let err = reg.validate().unwrap_err();
        assert!(err
            .to_string()
            .contains("Please enter a valid 10-digit Indian mobile number"));
    }

    #[test]
    fn registration_rejects_bad_email() {
        let mut reg = valid_registration();
        reg.email = "not-an-email".to_string();
        assert!(reg.validate().is_err());
        assert!(valid_registration().validate().is_ok());
    }

    #[test]
    fn collector_label_falls_back_for_blank_names() {
        let member = Member {
            email: "m@example.com".to_string(),
            name: "".to_string(),
            mobile: None,
            is_master: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(member.collector_label(), "Unknown Member");
    }
}
