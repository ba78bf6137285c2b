pub mod types;
pub mod repository;
pub mod service;

pub use types::{Member, NewMember, UpdateMemberProfile, MemberResponse, MemberRow};
pub use repository::{MemberRepository, SqliteMemberRepository};
pub use service::{MemberService, MemberServiceImpl};
