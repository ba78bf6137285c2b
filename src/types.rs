use serde::{Deserialize, Serialize};

// Re-export MemberRole and Permission from the permission module
pub use crate::domains::permission::{MemberRole, Permission};

/// The two donation variants, as tagged on the wire and in storage.
///
/// Cash submissions and in-kind donations live in separate tables; this enum
/// names which table a record belongs to when an operation must address one
/// row (edit, delete, fetch-by-id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DonationKind {
    #[serde(rename = "amount")]
    Cash,
    #[serde(rename = "inKind")]
    InKind,
}

impl Default for DonationKind {
    fn default() -> Self {
        DonationKind::Cash
    }
}

impl DonationKind {
    /// The wire tag used by the host app and the export file.
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationKind::Cash => "amount",
            DonationKind::InKind => "inKind",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "amount" => Some(DonationKind::Cash),
            "inKind" => Some(DonationKind::InKind),
            _ => None,
        }
    }
}
