use serde::{Deserialize, Serialize};

// --- Member Role Definition ---

/// MemberRole enum for authorization in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberRole {
    /// Committee member: records donations and works with their own submissions.
    Member,
    /// Master: everything a member can do, plus cross-member views.
    Master,
}

// --- Permission Enum Definition ---

/// Permission enum representing individual permissions in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    // Submission permissions
    ViewSubmissions,
    RecordDonations,
    EditSubmissions,
    DeleteSubmissions,
    ExportSubmissions,

    // Cross-member permissions (master only)
    ViewMembers,
    ViewAnalytics,
}

// --- MemberRole Implementation ---

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Member => "member",
            MemberRole::Master => "master",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "member" => Some(MemberRole::Member),
            "master" => Some(MemberRole::Master),
            _ => None,
        }
    }

    /// Check if the role has a specific permission.
    ///
    /// Own-record scoping (a member may only edit or delete submissions they
    /// collected) is enforced at the service layer on top of this coarse check.
    pub fn has_permission(&self, permission: Permission) -> bool {
        match self {
            MemberRole::Master => true, // Master has all permissions
            MemberRole::Member => {
                match permission {
                    Permission::ViewSubmissions
                    | Permission::RecordDonations
                    | Permission::EditSubmissions
                    | Permission::DeleteSubmissions
                    | Permission::ExportSubmissions => true,

                    // Cross-member views are reserved for the master
                    Permission::ViewMembers
                    | Permission::ViewAnalytics => false,
                }
            }
        }
    }

    /// Check if the role has all of the specified permissions
    pub fn has_permissions(&self, permissions: &[Permission]) -> bool {
        permissions.iter().all(|p| self.has_permission(*p))
    }
}

// --- Permission Implementation (String Conversions & Listing) ---

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            // Submission permissions
            Permission::ViewSubmissions => "view_submissions",
            Permission::RecordDonations => "record_donations",
            Permission::EditSubmissions => "edit_submissions",
            Permission::DeleteSubmissions => "delete_submissions",
            Permission::ExportSubmissions => "export_submissions",
            // Cross-member permissions
            Permission::ViewMembers => "view_members",
            Permission::ViewAnalytics => "view_analytics",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            // Submission permissions
            "view_submissions" => Some(Permission::ViewSubmissions),
            "record_donations" => Some(Permission::RecordDonations),
            "edit_submissions" => Some(Permission::EditSubmissions),
            "delete_submissions" => Some(Permission::DeleteSubmissions),
            "export_submissions" => Some(Permission::ExportSubmissions),
            // Cross-member permissions
            "view_members" => Some(Permission::ViewMembers),
            "view_analytics" => Some(Permission::ViewAnalytics),
            // Default case
            _ => None,
        }
    }

    /// Get all permissions in the system
    pub fn all() -> Vec<Permission> {
        vec![
            Permission::ViewSubmissions,
            Permission::RecordDonations,
            Permission::EditSubmissions,
            Permission::DeleteSubmissions,
            Permission::ExportSubmissions,
            Permission::ViewMembers,
            Permission::ViewAnalytics,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn master_holds_every_permission() {
        for permission in Permission::all() {
            assert!(MemberRole::Master.has_permission(permission));
        }
    }

    #[test]
    fn member_cannot_see_cross_member_views() {
        assert!(!MemberRole::Member.has_permission(Permission::ViewMembers));
        assert!(!MemberRole::Member.has_permission(Permission::ViewAnalytics));
        assert!(MemberRole::Member.has_permission(Permission::RecordDonations));
        assert!(MemberRole::Member.has_permission(Permission::ExportSubmissions));
    }

    #[test]
    fn role_round_trips_through_strings() {
        assert_eq!(MemberRole::from_str("master"), Some(MemberRole::Master));
        assert_eq!(MemberRole::from_str(MemberRole::Member.as_str()), Some(MemberRole::Member));
        assert_eq!(MemberRole::from_str("admin"), None);
    }
}
