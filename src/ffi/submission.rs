// ============================================================================
// FFI bindings for the `SubmissionService` and the donation entry flow.
// All heavy-lifting logic lives in the domain/service layer. These wrappers
// simply (1) decode C-strings coming from the host, (2) forward the request
// to the relevant async service method on the shared runtime, (3) encode the
// result into JSON, and (4) return the string back across the FFI boundary.
//
// IMPORTANT - memory ownership rules:
//   *  Any *mut c_char returned from Rust must be freed by the host by
//      calling the `submission_free` function exported below.
//   *  Never pass a pointer back into `submission_free` more than once.
//   *  All pointers received from the host are assumed to be valid, non-NULL,
//      null-terminated UTF-8 strings. We validate this and return
//      `ErrorCode::InvalidArgument` when the contract is violated.
//
// JSON contracts:
//   Each call expects a single JSON object bundling the request data with a
//   `token` field carrying the caller's access token. Donation kind travels
//   as the wire tag: "amount" for cash, "inKind" for items. The exact shape
//   of each payload is documented above every function.
// ----------------------------------------------------------------------------

use crate::domains::analytics::AnalyticsService;
use crate::domains::submission::{DraftForm, SubmissionService, UpdateSubmission};
use crate::ffi::{block_on_async, error::FFIError, handle_status_result, session_from_token};
use crate::globals;
use crate::types::DonationKind;

use serde::Deserialize;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use uuid::Uuid;

fn parse_kind(tag: &str) -> Result<DonationKind, FFIError> {
    DonationKind::from_str(tag)
        .ok_or_else(|| FFIError::invalid_argument("type must be \"amount\" or \"inKind\""))
}

fn parse_id(id: &str) -> Result<Uuid, FFIError> {
    Uuid::parse_str(id).map_err(|_| FFIError::invalid_argument("uuid"))
}

// ---------------------------------------------------------------------------
// FFI - Validate Draft (Review step, nothing is written)
// ---------------------------------------------------------------------------
// Expected JSON payload:
// {
//   "draft": { DraftForm }
// }
// On success returns the parsed submission plus the review-screen amount
// label for cash drafts. On failure the error message is the single banner
// the host shows verbatim.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn submission_validate_draft(
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
            draft: DraftForm,
        }
        let payload: Payload = serde_json::from_str(json_str)
            .map_err(|e| FFIError::invalid_argument(&format!("json parse: {e}")))?;

        let submission = payload.draft.to_new_submission().map_err(FFIError::from)?;
        let amount_label = match payload.draft.donation_type {
            DonationKind::Cash => Some(payload.draft.amount_label().map_err(FFIError::from)?),
            DonationKind::InKind => None,
        };

        let response = serde_json::json!({
            "submission": submission,
            "amount_label": amount_label,
        });
        let json_resp = serde_json::to_string(&response)
            .map_err(|e| FFIError::internal(format!("ser {e}")))?;
        let cstr = CString::new(json_resp)?;
        *result = cstr.into_raw();
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// FFI - Record Donation
// ---------------------------------------------------------------------------
// Expected JSON payload:
// {
//   "draft": { DraftForm },
//   "token": "<access token>"
// }
// Returns the saved record together with its WhatsApp receipt link.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn submission_record(
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
            draft: DraftForm,
            token: String,
        }
        let payload: Payload = serde_json::from_str(json_str)
            .map_err(|e| FFIError::invalid_argument(&format!("json parse: {e}")))?;

        let session = session_from_token(&payload.token)?;
        let svc = globals::get_submission_service()?;

        let recorded = block_on_async(svc.record_donation(&payload.draft, &session))
            .map_err(FFIError::from_service_error)?;

        let json_resp = serde_json::to_string(&recorded)
            .map_err(|e| FFIError::internal(format!("ser {e}")))?;
        let cstr = CString::new(json_resp)?;
        *result = cstr.into_raw();
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// FFI - List Own Submissions
// ---------------------------------------------------------------------------
// Expected JSON payload:
// {
//   "token": "<access token>"
// }
// A member gets their own cash and in-kind records combined; the master gets
// the committee-wide aggregation with per-member attribution.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn submission_list(
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

        let outcome = block_on_async(svc.fetch_submissions(&session))
            .map_err(FFIError::from_service_error)?;

        let json_resp = serde_json::to_string(&outcome)
            .map_err(|e| FFIError::internal(format!("ser {e}")))?;
        let cstr = CString::new(json_resp)?;
        *result = cstr.into_raw();
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// FFI - Get Submission
// ---------------------------------------------------------------------------
// Expected JSON payload:
// {
//   "id": "uuid",
//   "type": "amount" | "inKind",
//   "token": "<access token>"
// }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn submission_get(
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
            id: String,
            #[serde(rename = "type")]
            kind: String,
            token: String,
        }
        let payload: Payload = serde_json::from_str(json_str)
            .map_err(|e| FFIError::invalid_argument(&format!("json parse: {e}")))?;

        let id = parse_id(&payload.id)?;
        let kind = parse_kind(&payload.kind)?;
        let session = session_from_token(&payload.token)?;
        let svc = globals::get_submission_service()?;

        let submission = block_on_async(svc.get_submission(id, kind, &session))
            .map_err(FFIError::from_service_error)?;

        let json_resp = serde_json::to_string(&submission)
            .map_err(|e| FFIError::internal(format!("ser {e}")))?;
        let cstr = CString::new(json_resp)?;
        *result = cstr.into_raw();
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// FFI - Update Submission
// ---------------------------------------------------------------------------
// Expected JSON payload:
// {
//   "id": "uuid",
//   "type": "amount" | "inKind",
//   "update": { UpdateSubmission },
//   "token": "<access token>"
// }
// The donation kind never changes; an `amount` in the update of an in-kind
// record (or vice versa) is rejected.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn submission_update(
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
            id: String,
            #[serde(rename = "type")]
            kind: String,
            update: UpdateSubmission,
            token: String,
        }
        let payload: Payload = serde_json::from_str(json_str)
            .map_err(|e| FFIError::invalid_argument(&format!("json parse: {e}")))?;

        let id = parse_id(&payload.id)?;
        let kind = parse_kind(&payload.kind)?;
        let session = session_from_token(&payload.token)?;
        let svc = globals::get_submission_service()?;

        let submission = block_on_async(svc.update_submission(id, kind, payload.update, &session))
            .map_err(FFIError::from_service_error)?;

        let json_resp = serde_json::to_string(&submission)
            .map_err(|e| FFIError::internal(format!("ser {e}")))?;
        let cstr = CString::new(json_resp)?;
        *result = cstr.into_raw();
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// FFI - Delete Submission
// ---------------------------------------------------------------------------
// Expected JSON payload:
// {
//   "id": "uuid",
//   "type": "amount" | "inKind",
//   "token": "<access token>"
// }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn submission_delete(payload_json: *const c_char) -> c_int {
    handle_status_result(|| unsafe {
        if payload_json.is_null() {
            return Err(FFIError::invalid_argument("null ptr"));
        }
        let json_str = CStr::from_ptr(payload_json)
            .to_str()
            .map_err(|_| FFIError::invalid_argument("utf8"))?;

        #[derive(Deserialize)]
        struct Payload {
            id: String,
            #[serde(rename = "type")]
            kind: String,
            token: String,
        }
        let payload: Payload = serde_json::from_str(json_str)
            .map_err(|e| FFIError::invalid_argument(&format!("json parse: {e}")))?;

        let id = parse_id(&payload.id)?;
        let kind = parse_kind(&payload.kind)?;
        let session = session_from_token(&payload.token)?;
        let svc = globals::get_submission_service()?;

        block_on_async(svc.delete_submission(id, kind, &session))
            .map_err(FFIError::from_service_error)?;
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// Memory management helper
// ---------------------------------------------------------------------------
#[unsafe(no_mangle)]
pub unsafe extern "C" fn submission_free(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            let _ = CString::from_raw(ptr);
        }
    }
}
