// ============================================================================
// FFI bindings for the `ExportService`.
// All heavy-lifting logic lives in the domain/service layer. These wrappers
// simply (1) decode C-strings coming from the host, (2) forward the request
// to the relevant async service method on the shared runtime, (3) encode the
// result into JSON, and (4) return the string back across the FFI boundary.
//
// IMPORTANT - memory ownership rules:
//   *  Any *mut c_char returned from Rust must be freed by the host by
//      calling the `export_free` function exported below. Internally we
//      create the CString with `into_raw()` which transfers ownership to
//      the caller.
//   *  Never pass a pointer back into `export_free` more than once.
//
// JSON contracts:
//   Payloads bundle a `token` field carrying the caller's access token
//   alongside the operation arguments.
// ----------------------------------------------------------------------------

use crate::domains::analytics::AggregatedSubmission;
use crate::domains::export::ExportService;
use crate::ffi::{block_on_async, error::FFIError, handle_status_result, session_from_token};
use crate::globals;

use serde::Deserialize;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// FFI - Export Submissions to CSV
// ---------------------------------------------------------------------------
// Expected JSON payload:
// {
//   "submissions": [ AggregatedSubmission, ... ],
//   "target_dir": "/path/to/directory",
//   "token": "<access token>"
// }
// Writes `Donations.csv` into `target_dir` from the rows exactly as handed
// over, so whatever filter and sort the caller currently displays is what
// lands in the file. Returns {"file_path": ..., "rows_written": N}.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn export_submissions(
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
            target_dir: String,
            token: String,
        }
        let payload: Payload = serde_json::from_str(json_str)
            .map_err(|e| FFIError::invalid_argument(&format!("json parse: {e}")))?;

        if payload.target_dir.is_empty() {
            return Err(FFIError::invalid_argument("target_dir is required"));
        }

        let session = session_from_token(&payload.token)?;
        let svc = globals::get_export_service()?;

        let summary = block_on_async(svc.export_submissions(
            payload.submissions,
            PathBuf::from(payload.target_dir),
            &session,
        ))
        .map_err(FFIError::from_service_error)?;

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
pub unsafe extern "C" fn export_free(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            let _ = CString::from_raw(ptr);
        }
    }
}
