use crate::auth::Session;
use crate::ffi::error::{ErrorCode, FFIError};
use lazy_static::lazy_static;
use std::os::raw::c_int;
use tokio::runtime::Runtime;

pub mod analytics;
pub mod auth;
pub mod core;
pub mod error;
pub mod export;
pub mod member;
pub mod submission;

lazy_static! {
    // One shared runtime for every FFI call. The pool is created on this
    // runtime during initialization, so queries must run on it too.
    static ref RUNTIME: Runtime = Runtime::new().expect("Failed to create Tokio runtime");
}

/// Run an async future to completion on the shared FFI runtime.
pub(crate) fn block_on_async<F, T, E>(future: F) -> Result<T, E>
where
    F: std::future::Future<Output = Result<T, E>>,
{
    RUNTIME.block_on(future)
}

/// Verify a session token and rebuild the caller's session from its claims.
pub(crate) fn session_from_token(token: &str) -> FFIResult<Session> {
    let claims = crate::auth::jwt::verify_token(token).map_err(FFIError::from_service_error)?;
    // Refresh tokens only mint new access tokens; they cannot authorize calls.
    if claims.refresh_exp.is_some() {
        return Err(FFIError::new(
            ErrorCode::AuthenticationFailed,
            "Expected access token, received refresh token",
        ));
    }
    crate::auth::jwt::session_from_claims(&claims).map_err(FFIError::from_service_error)
}

/// Error handling helper for FFI boundaries (returns error code)
pub fn handle_status_result<F>(func: F) -> c_int
where
    F: FnOnce() -> FFIResult<()>,
{
    match func() {
        Ok(_) => ErrorCode::Success as c_int,
        Err(e) => {
            log::error!(
                "FFI error: code {:?}, message: {}, details: {}",
                e.code,
                e.message,
                e.details.as_deref().unwrap_or("None")
            );
            error::store_last_error(&e);
            e.code as c_int
        }
    }
}

// Re-export FFIResult for convenience within the ffi module
pub use error::FFIResult;
