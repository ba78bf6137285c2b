pub mod analytics;
pub mod export;
pub mod member;
pub mod permission;
pub mod submission;

pub use member::{Member, MemberService};
pub use permission::{MemberRole, Permission};
