use crate::auth::ResolvedIdentity;
use crate::ffi::{block_on_async, error::FFIError, handle_status_result};
use std::ffi::{c_char, CStr, CString};
use std::os::raw::c_int;

/// Resolve an authenticated external identity into a session.
///
/// The external provider has already checked credentials; `verified` is its
/// email-verification flag. Writes a JSON object to `result`: either
/// `{"status":"member", ...tokens and profile...}` or
/// `{"status":"unregistered","email":...}` when no profile row exists yet.
///
/// # Safety
///
/// This function should only be called with:
/// - A valid, null-terminated C string for `email`
/// - A valid pointer to receive the JSON result
#[unsafe(no_mangle)]
pub unsafe extern "C" fn resolve_identity(
    email: *const c_char,
    verified: bool,
    result: *mut *mut c_char,
) -> c_int {
    handle_status_result(|| unsafe {
        if email.is_null() || result.is_null() {
            return Err(FFIError::invalid_argument("Null pointer(s) provided"));
        }

        let email_str = CStr::from_ptr(email)
            .to_str()
            .map_err(|_| FFIError::invalid_argument("Invalid email string"))?;

        let auth_service = crate::globals::get_auth_service()?;

        let identity = crate::auth::ExternalIdentity {
            email: email_str.to_string(),
            verified,
        };
        let resolved = block_on_async(auth_service.resolve_identity(&identity))
            .map_err(FFIError::from_service_error)?;

        let response = match resolved {
            ResolvedIdentity::Member(resolved) => serde_json::json!({
                "status": "member",
                "access_token": resolved.access_token,
                "access_expiry": resolved.access_expiry.to_rfc3339(),
                "refresh_token": resolved.refresh_token,
                "refresh_expiry": resolved.refresh_expiry.to_rfc3339(),
                "member_email": resolved.session.member_email,
                "member_name": resolved.session.member_name,
                "mobile": resolved.session.mobile,
                "role": resolved.session.role.as_str(),
            }),
            ResolvedIdentity::Unregistered { email } => serde_json::json!({
                "status": "unregistered",
                "email": email,
            }),
        };

        let json_string = serde_json::to_string(&response)
            .map_err(|e| FFIError::internal(format!("Resolve JSON serialization error: {}", e)))?;

        let c_json = CString::new(json_string)?;
        *result = c_json.into_raw();
        Ok(())
    })
}

/// Verify an access token is valid and return the session it carries.
///
/// # Safety
///
/// This function should only be called with:
/// - A valid, null-terminated C string for `token`
/// - A valid pointer to receive the result (optional)
#[unsafe(no_mangle)]
pub unsafe extern "C" fn verify_session(
    token: *const c_char,
    result: *mut *mut c_char,
) -> c_int {
    handle_status_result(|| unsafe {
        if token.is_null() {
            return Err(FFIError::invalid_argument("Null token provided"));
        }

        let token_str = CStr::from_ptr(token)
            .to_str()
            .map_err(|_| FFIError::invalid_argument("Invalid token string"))?;

        let auth_service = crate::globals::get_auth_service()?;
        let session = block_on_async(auth_service.verify_token(token_str))
            .map_err(FFIError::from_service_error)?;

        // If result pointer provided, return session information
        if !result.is_null() {
            let session_json = serde_json::json!({
                "member_email": session.member_email,
                "member_name": session.member_name,
                "mobile": session.mobile,
                "role": session.role.as_str(),
            });

            let json_string = serde_json::to_string(&session_json).map_err(|e| {
                FFIError::internal(format!("Verify session JSON serialization error: {}", e))
            })?;

            let c_json = CString::new(json_string)?;
            *result = c_json.into_raw();
        }

        Ok(())
    })
}

/// Refresh an access token using a refresh token.
///
/// # Safety
///
/// This function should only be called with:
/// - A valid, null-terminated C string for the refresh token
/// - A valid pointer to receive the new token
#[unsafe(no_mangle)]
pub unsafe extern "C" fn refresh_token(
    refresh_token: *const c_char,
    result: *mut *mut c_char,
) -> c_int {
    handle_status_result(|| unsafe {
        if refresh_token.is_null() || result.is_null() {
            return Err(FFIError::invalid_argument("Null pointer(s) provided"));
        }

        let token_str = CStr::from_ptr(refresh_token)
            .to_str()
            .map_err(|_| FFIError::invalid_argument("Invalid token string"))?;

        let auth_service = crate::globals::get_auth_service()?;
        let (new_token, expiry) = block_on_async(auth_service.refresh_session(token_str))
            .map_err(FFIError::from_service_error)?;

        let response = serde_json::json!({
            "access_token": new_token,
            "access_expiry": expiry.to_rfc3339(),
        });

        let json_string = serde_json::to_string(&response)
            .map_err(|e| FFIError::internal(format!("Refresh JSON serialization error: {}", e)))?;

        let c_json = CString::new(json_string)?;
        *result = c_json.into_raw();
        Ok(())
    })
}

/// Free a string allocated by the auth FFI functions.
///
/// # Safety
///
/// This function should only be called with:
/// - A pointer returned from one of the functions in this module
#[unsafe(no_mangle)]
pub unsafe extern "C" fn auth_free(ptr: *mut c_char) {
    if !ptr.is_null() {
        let _ = CString::from_raw(ptr);
    }
}
