// ============================================================================
// Core FFI functions for library initialization and management
// ============================================================================

use crate::ffi::{error::FFIError, handle_status_result};
use std::ffi::{c_char, CStr, CString};
use std::os::raw::c_int;

/// Read an optional C string argument, falling back to an environment
/// variable when the pointer is null or the string is empty.
unsafe fn string_or_env(
    ptr: *const c_char,
    env_key: &str,
    what: &str,
) -> Result<String, FFIError> {
    if !ptr.is_null() {
        let value = CStr::from_ptr(ptr)
            .to_str()
            .map_err(|_| FFIError::invalid_argument(&format!("Invalid {} string", what)))?;
        if !value.is_empty() {
            return Ok(value.to_string());
        }
    }
    std::env::var(env_key)
        .map_err(|_| FFIError::invalid_argument(&format!("{} not provided and {} is unset", what, env_key)))
}

/// Initialize the library with a database URL and JWT secret.
///
/// Either argument may be null; `DATABASE_URL` / `JWT_SECRET` environment
/// variables (including a local `.env`) are used as fallbacks. Returns 0 on
/// success, non-zero on error.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn temple_core_initialize(
    db_url: *const c_char,
    jwt_secret: *const c_char,
) -> c_int {
    let result = std::panic::catch_unwind(|| {
        // Load .env before env fallbacks are consulted
        dotenv::dotenv().ok();

        let db_url_str = string_or_env(db_url, "DATABASE_URL", "db_url")?;

        // Require a SQLite URL, not a bare file path
        if !db_url_str.starts_with("sqlite:") {
            return Err(FFIError::invalid_argument(
                "db_url must be a SQLite URL starting with 'sqlite:', not a file path",
            ));
        }

        let jwt_secret_str = string_or_env(jwt_secret, "JWT_SECRET", "jwt_secret")?;

        crate::ffi::block_on_async(async {
            crate::globals::initialize(&db_url_str, &jwt_secret_str).await
        })
    });

    match result {
        Ok(ffi_result) => handle_status_result(|| ffi_result),
        Err(panic_payload) => {
            let panic_msg = if let Some(s) = panic_payload.downcast_ref::<String>() {
                s.clone()
            } else if let Some(s) = panic_payload.downcast_ref::<&str>() {
                s.to_string()
            } else {
                "Panicked during FFI call, but panic message is not a string".to_string()
            };
            log::error!("Panic in temple_core_initialize: {}", panic_msg);
            handle_status_result(|| {
                Err(FFIError::internal(format!(
                    "Panic during initialization: {}",
                    panic_msg
                )))
            })
        }
    }
}

/// Frees a C string that was allocated by Rust and passed over FFI.
///
/// # Safety
///
/// Must only be called once per pointer, and only with pointers returned by
/// this library's functions.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        let _ = CString::from_raw(ptr);
    }
}

/// Get library version.
/// Returns allocated string that must be freed with free_string()
#[unsafe(no_mangle)]
pub unsafe extern "C" fn get_library_version() -> *mut c_char {
    match CString::new(env!("CARGO_PKG_VERSION")) {
        Ok(c_string) => c_string.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Get the last error as a JSON string, or null when no error is stored.
/// Returns allocated string that must be freed with free_string()
#[unsafe(no_mangle)]
pub unsafe extern "C" fn get_last_error() -> *mut c_char {
    crate::ffi::error::get_last_error_message()
}
