// ============================================================================
// FFI bindings for the `MemberService`.
// All heavy-lifting logic lives in the domain/service layer. These wrappers
// simply (1) decode C-strings coming from the host, (2) forward the request
// to the relevant async service method on the shared runtime, (3) encode the
// result into JSON, and (4) return the string back across the FFI boundary.
//
// IMPORTANT - memory ownership rules:
//   *  Any *mut c_char returned from Rust must be freed by the host by
//      calling the `member_free` function exported below. Internally we
//      create the CString with `into_raw()` which transfers ownership.
//   *  Never pass a pointer back into `member_free` more than once.
//   *  All pointers received from the host are assumed to be valid, non-NULL,
//      null-terminated UTF-8 strings. We validate this and return
//      `ErrorCode::InvalidArgument` when the contract is violated.
//
// JSON contracts:
//   Each call expects a single JSON object bundling the request data with a
//   `token` field carrying the caller's access token (except registration,
//   which runs before a session exists). The exact shape of each payload is
//   documented above every function.
// ----------------------------------------------------------------------------

use crate::domains::member::{MemberService, NewMember, UpdateMemberProfile};
use crate::ffi::{block_on_async, error::FFIError, handle_status_result, session_from_token};
use crate::globals;

use serde::Deserialize;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};

// ---------------------------------------------------------------------------
// FFI - Register Member
// ---------------------------------------------------------------------------
// Expected JSON payload:
// {
//   "member": { "email": "...", "name": "...", "mobile": "..." }
// }
// No token: registration is the profile write right after the external
// provider created the account.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn member_register(
    payload_json: *const c_char,
    result: *mut *mut c_char,
) -> c_int {
    handle_status_result(|| unsafe {
        if payload_json.is_null() || result.is_null() {
            return Err(FFIError::invalid_argument("null ptr"));
        }
        let json_str = CStr::from_ptr(payload_json)
            .to_str()
            .map_err(|_| FFIError::invalid_argument("utf8"))?;

        #[derive(Deserialize)]
        struct Payload {
            member: NewMember,
        }

        let payload: Payload = serde_json::from_str(json_str)
            .map_err(|e| FFIError::invalid_argument(&format!("json parse: {e}")))?;

        let svc = globals::get_member_service()?;
        let member = block_on_async(svc.register_member(payload.member))
            .map_err(FFIError::from_service_error)?;

        let json_resp = serde_json::to_string(&member)
            .map_err(|e| FFIError::internal(format!("ser {e}")))?;
        let cstr = CString::new(json_resp)?;
        *result = cstr.into_raw();
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// FFI - Get Member
// ---------------------------------------------------------------------------
// Expected JSON payload:
// {
//   "email": "ramu@example.com",
//   "token": "<access token>"
// }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn member_get(
    payload_json: *const c_char,
    result: *mut *mut c_char,
) -> c_int {
    handle_status_result(|| unsafe {
        if payload_json.is_null() || result.is_null() {
            return Err(FFIError::invalid_argument("null ptr"));
        }
        let json_str = CStr::from_ptr(payload_json)
            .to_str()
            .map_err(|_| FFIError::invalid_argument("utf8"))?;

        #[derive(Deserialize)]
        struct Payload {
            email: String,
            token: String,
        }
        let payload: Payload = serde_json::from_str(json_str)
            .map_err(|e| FFIError::invalid_argument(&format!("json parse: {e}")))?;

        let session = session_from_token(&payload.token)?;
        let svc = globals::get_member_service()?;

        let member = block_on_async(svc.get_member(&payload.email, &session))
            .map_err(FFIError::from_service_error)?;

        let json_resp = serde_json::to_string(&member)
            .map_err(|e| FFIError::internal(format!("ser {e}")))?;
        let cstr = CString::new(json_resp)?;
        *result = cstr.into_raw();
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// FFI - List Members (committee roster, master only)
// ---------------------------------------------------------------------------
// Expected JSON payload:
// {
//   "token": "<access token>"
// }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn member_list(
    payload_json: *const c_char,
    result: *mut *mut c_char,
) -> c_int {
    handle_status_result(|| unsafe {
        if payload_json.is_null() || result.is_null() {
            return Err(FFIError::invalid_argument("null ptr"));
        }
        let json_str = CStr::from_ptr(payload_json)
            .to_str()
            .map_err(|_| FFIError::invalid_argument("utf8"))?;

        #[derive(Deserialize)]
        struct Payload {
            token: String,
        }
        let payload: Payload = serde_json::from_str(json_str)
            .map_err(|e| FFIError::invalid_argument(&format!("json parse: {e}")))?;

        let session = session_from_token(&payload.token)?;
        let svc = globals::get_member_service()?;

        let members =
            block_on_async(svc.list_members(&session)).map_err(FFIError::from_service_error)?;

        let json_resp = serde_json::to_string(&members)
            .map_err(|e| FFIError::internal(format!("ser {e}")))?;
        let cstr = CString::new(json_resp)?;
        *result = cstr.into_raw();
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// FFI - Update Member Profile
// ---------------------------------------------------------------------------
// Expected JSON payload:
// {
//   "email": "ramu@example.com",
//   "update": { "name": "optional", "mobile": "optional" },
//   "token": "<access token>"
// }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn member_update_profile(
    payload_json: *const c_char,
    result: *mut *mut c_char,
) -> c_int {
    handle_status_result(|| unsafe {
        if payload_json.is_null() || result.is_null() {
            return Err(FFIError::invalid_argument("null ptr"));
        }
        let json_str = CStr::from_ptr(payload_json)
            .to_str()
            .map_err(|_| FFIError::invalid_argument("utf8"))?;

        #[derive(Deserialize)]
        struct Payload {
            email: String,
            update: UpdateMemberProfile,
            token: String,
        }
        let payload: Payload = serde_json::from_str(json_str)
            .map_err(|e| FFIError::invalid_argument(&format!("json parse: {e}")))?;

        let session = session_from_token(&payload.token)?;
        let svc = globals::get_member_service()?;

        let member = block_on_async(svc.update_profile(&payload.email, payload.update, &session))
            .map_err(FFIError::from_service_error)?;

        let json_resp = serde_json::to_string(&member)
            .map_err(|e| FFIError::internal(format!("ser {e}")))?;
        let cstr = CString::new(json_resp)?;
        *result = cstr.into_raw();
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// Memory management helper
// ---------------------------------------------------------------------------
#[unsafe(no_mangle)]
pub unsafe extern "C" fn member_free(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            let _ = CString::from_raw(ptr);
        }
    }
}
