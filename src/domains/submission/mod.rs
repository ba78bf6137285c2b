pub mod receipt;
pub mod repository;
pub mod service;
pub mod types;
pub mod workflow;

pub use receipt::{build_receipt_link, build_receipt_message};
pub use repository::{SqliteSubmissionRepository, SubmissionRepository};
pub use service::{SubmissionService, SubmissionServiceImpl};
pub use types::{
    CashSubmissionRow, DonationDetail, InKindDonationRow, NewSubmission, RecordedDonation,
    Submission, SubmissionResponse, UpdateSubmission,
};
pub use workflow::{DonationEntry, DraftForm};
