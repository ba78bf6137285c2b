// ============================================================================
// FFI bindings for the `AnalyticsService` and the list projection.
// All heavy-lifting logic lives in the domain/service layer. These wrappers
// simply (1) decode C-strings coming from the host, (2) forward the request
// to the relevant async service method on the shared runtime, (3) encode the
// result into JSON, and (4) return the string back across the FFI boundary.
//
// IMPORTANT - memory ownership rules:
//   *  Any *mut c_char returned from Rust must be freed by the host by
//      calling the `analytics_free` function exported below.
//   *  Never pass a pointer back into `analytics_free` more than once.
//
// JSON contracts:
//   `analytics_dashboard` bundles a `token` field carrying the caller's
//   access token. `analytics_project` is a pure transform over rows the
//   caller already holds (fetched via `submission_list`) and needs no token.
// ----------------------------------------------------------------------------

use crate::domains::analytics::{AggregatedSubmission, AnalyticsService};
use crate::domains::export::{project, SortMode, SubmissionFilter};
use crate::ffi::{block_on_async, error::FFIError, handle_status_result, session_from_token};
use crate::globals;

use serde::Deserialize;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};

// ---------------------------------------------------------------------------
// FFI - Project (filter + sort + cash total)
// ---------------------------------------------------------------------------
// Expected JSON payload:
// {
//   "submissions": [ AggregatedSubmission, ... ],
//   "filter": { "text": "...", "date_from": "2025-06-01", "date_to": "2025-06-30" },
//   "sort": "amount_desc" | "amount_asc" | "date_desc"
// }
// Pure transform: the host fetches once and re-projects on every filter or
// sort change. Returns the matching rows in order plus the cash-only total
// over exactly those rows.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn analytics_project(
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
            submissions: Vec<AggregatedSubmission>,
            #[serde(default)]
            filter: SubmissionFilter,
            #[serde(default)]
            sort: SortMode,
        }
        let payload: Payload = serde_json::from_str(json_str)
            .map_err(|e| FFIError::invalid_argument(&format!("json parse: {e}")))?;

        let (rows, total_amount) = project(&payload.submissions, &payload.filter, payload.sort);

        let response = serde_json::json!({
            "submissions": rows,
            "total_amount": total_amount,
        });
        let json_resp = serde_json::to_string(&response)
            .map_err(|e| FFIError::internal(format!("ser {e}")))?;
        let cstr = CString::new(json_resp)?;
        *result = cstr.into_raw();
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// FFI - Dashboard (master only)
// ---------------------------------------------------------------------------
// Expected JSON payload:
// {
//   "token": "<access token>"
// }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn analytics_dashboard(
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
        let svc = globals::get_analytics_service()?;

        let summary =
            block_on_async(svc.dashboard(&session)).map_err(FFIError::from_service_error)?;

        let json_resp = serde_json::to_string(&summary)
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
pub unsafe extern "C" fn analytics_free(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            let _ = CString::from_raw(ptr);
        }
    }
}
