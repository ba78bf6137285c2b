pub mod context;
pub mod service;
mod repository;
pub mod jwt;

// Re-export public items
pub use context::Session;
pub use service::{AuthService, ExternalIdentity, ResolvedIdentity, ResolvedSession};

// Export internal items for use within auth module
pub(crate) use repository::AuthRepository;
