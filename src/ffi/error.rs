use crate::errors::{DbError, DomainError, ServiceError, ValidationError};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::ffi::CString;
use std::fmt;
use std::os::raw::c_char;

/// Error codes for FFI boundary
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Success (no error)
    Success = 0,

    // General errors (1-99)
    Unknown = 1,
    InvalidArgument = 2,
    NullPointer = 3,
    InvalidUtf8 = 4,
    InvalidUuid = 5,
    InternalError = 6,

    // Database errors (100-199)
    DatabaseGeneral = 100,
    DatabaseNotFound = 101,
    DatabaseConflict = 102,
    DatabaseConnection = 103,
    DatabaseTransaction = 104,
    DatabaseMigration = 105,

    // Domain errors (200-299)
    DomainGeneral = 200,
    EntityNotFound = 201,
    AuthorizationFailed = 202,
    ValidationFailed = 203,

    // Service errors (300-399)
    ServiceGeneral = 300,
    AuthenticationFailed = 301,
    SessionExpired = 302,
    PermissionDenied = 303,
    ConfigurationError = 304,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, *self as i32)
    }
}

/// Error type for FFI boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FFIError {
    /// Error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details (JSON string)
    pub details: Option<String>,
}

impl fmt::Display for FFIError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(details) = &self.details {
            write!(f, "{}: {} ({})", self.code, self.message, details)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl std::error::Error for FFIError {}

impl FFIError {
    pub fn new(code: ErrorCode, message: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: &str, details: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
            details: Some(details.to_string()),
        }
    }

    pub fn unknown(message: &str) -> Self {
        Self::new(ErrorCode::Unknown, message)
    }

    pub fn invalid_argument(message: &str) -> Self {
        Self::new(ErrorCode::InvalidArgument, message)
    }

    pub fn internal(message: String) -> Self {
        Self::new(ErrorCode::InternalError, &message)
    }

    // Helper for converting ServiceError, commonly needed in the FFI layer
    pub fn from_service_error(err: ServiceError) -> Self {
        err.into()
    }
}

// Implement From traits for converting domain errors to FFI errors

impl From<DbError> for FFIError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Sqlx(sqlx_err) => Self::new(ErrorCode::DatabaseGeneral, &sqlx_err.to_string()),
            DbError::NotFound(entity, id) => Self::with_details(
                ErrorCode::DatabaseNotFound,
                &format!("Record not found: {} with ID {}", entity, id),
                &format!("{{\"entity\":\"{}\",\"id\":\"{}\"}}", entity, id),
            ),
            DbError::Conflict(msg) => Self::new(ErrorCode::DatabaseConflict, &msg),
            DbError::ConnectionPool(msg) => Self::new(ErrorCode::DatabaseConnection, &msg),
            DbError::Transaction(msg) => Self::new(ErrorCode::DatabaseTransaction, &msg),
            DbError::Migration(msg) => Self::new(ErrorCode::DatabaseMigration, &msg),
            DbError::Query(msg) => Self::new(ErrorCode::DatabaseGeneral, &msg),
            DbError::Execution(msg) => Self::new(ErrorCode::DatabaseGeneral, &msg),
            DbError::Other(msg) => Self::new(ErrorCode::DatabaseGeneral, &msg),
        }
    }
}

impl From<DomainError> for FFIError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Database(db_err) => db_err.into(),
            DomainError::EntityNotFound(entity, id) => Self::with_details(
                ErrorCode::EntityNotFound,
                &format!("Entity not found: {} with ID {}", entity, id),
                &format!("{{\"entity\":\"{}\",\"id\":\"{}\"}}", entity, id),
            ),
            DomainError::AuthorizationFailed(msg) => {
                Self::new(ErrorCode::AuthorizationFailed, &msg)
            }
            DomainError::InvalidUuid(uuid_str) => Self::with_details(
                ErrorCode::InvalidUuid,
                &format!("Invalid UUID: {}", uuid_str),
                &format!("{{\"uuid\":\"{}\"}}", uuid_str),
            ),
            DomainError::Validation(val_err) => val_err.into(),
            DomainError::Internal(msg) => Self::new(ErrorCode::InternalError, &msg),
        }
    }
}

impl From<ServiceError> for FFIError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(domain_err) => domain_err.into(),
            ServiceError::Authentication(msg) => Self::new(ErrorCode::AuthenticationFailed, &msg),
            ServiceError::SessionExpired => Self::new(ErrorCode::SessionExpired, "Session expired"),
            ServiceError::PermissionDenied(msg) => Self::new(ErrorCode::PermissionDenied, &msg),
            ServiceError::Configuration(msg) => Self::new(ErrorCode::ConfigurationError, &msg),
        }
    }
}

impl From<ValidationError> for FFIError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::Required { field } => Self::with_details(
                ErrorCode::ValidationFailed,
                &format!("Field '{}' is required", field),
                &format!("{{\"field\":\"{}\",\"type\":\"required\"}}", field),
            ),
            ValidationError::MinLength { field, min } => Self::with_details(
                ErrorCode::ValidationFailed,
                &format!("Field '{}' must be at least {} characters", field, min),
                &format!(
                    "{{\"field\":\"{}\",\"type\":\"min_length\",\"min\":{}}}",
                    field, min
                ),
            ),
            ValidationError::MaxLength { field, max } => Self::with_details(
                ErrorCode::ValidationFailed,
                &format!("Field '{}' cannot exceed {} characters", field, max),
                &format!(
                    "{{\"field\":\"{}\",\"type\":\"max_length\",\"max\":{}}}",
                    field, max
                ),
            ),
            ValidationError::Format { field, reason } => Self::with_details(
                ErrorCode::ValidationFailed,
                &format!("Field '{}' contains invalid format: {}", field, reason),
                &format!(
                    "{{\"field\":\"{}\",\"type\":\"format\",\"reason\":\"{}\"}}",
                    field, reason
                ),
            ),
            ValidationError::Unique { field } => Self::with_details(
                ErrorCode::ValidationFailed,
                &format!("Field '{}' must be unique", field),
                &format!("{{\"field\":\"{}\",\"type\":\"unique\"}}", field),
            ),
            ValidationError::InvalidValue { field, reason } => Self::with_details(
                ErrorCode::ValidationFailed,
                &format!("Field '{}' contains an invalid value: {}", field, reason),
                &format!(
                    "{{\"field\":\"{}\",\"type\":\"invalid_value\",\"reason\":\"{}\"}}",
                    field, reason
                ),
            ),
            ValidationError::Entity(msg) => Self::with_details(
                ErrorCode::ValidationFailed,
                &format!("Entity is invalid: {}", msg),
                &format!("{{\"type\":\"entity\",\"message\":\"{}\"}}", msg),
            ),
            // Banner messages are surfaced verbatim so the host can show them
            // to the user without rewording.
            ValidationError::Message(msg) => Self::with_details(
                ErrorCode::ValidationFailed,
                &msg,
                "{\"type\":\"message\"}",
            ),
        }
    }
}

impl From<std::ffi::NulError> for FFIError {
    fn from(_: std::ffi::NulError) -> Self {
        Self::new(
            ErrorCode::InvalidUtf8,
            "String contains null bytes, cannot create CString",
        )
    }
}

// --- Last-error storage ---
//
// Status-returning FFI functions only hand back an error code; the full
// message is parked here so the caller can fetch it with `get_last_error()`.

thread_local! {
    static LAST_ERROR: RefCell<Option<FFIError>> = RefCell::new(None);
}

/// Record the error for later retrieval via `get_last_error_message`.
pub(crate) fn store_last_error(error: &FFIError) {
    LAST_ERROR.with(|slot| {
        *slot.borrow_mut() = Some(error.clone());
    });
}

/// Take the most recent error as an allocated JSON C string, or null when no
/// error has occurred since the last call. Ownership transfers to the caller.
pub(crate) fn get_last_error_message() -> *mut c_char {
    LAST_ERROR.with(|slot| match slot.borrow_mut().take() {
        Some(error) => {
            let json = serde_json::to_string(&error)
                .unwrap_or_else(|_| format!("{{\"code\":{},\"message\":\"{}\",\"details\":null}}", error.code as i32, error.message));
            CString::new(json).map_or(std::ptr::null_mut(), |cs| cs.into_raw())
        }
        None => std::ptr::null_mut(),
    })
}

// Result type alias for FFI functions
pub type FFIResult<T> = Result<T, FFIError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_message_survives_conversion_verbatim() {
        let err: FFIError = ValidationError::message("Please fill in all fields").into();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.message, "Please fill in all fields");
    }

    #[test]
    fn permission_denied_maps_to_service_code() {
        let err: FFIError = ServiceError::PermissionDenied("no".to_string()).into();
        assert_eq!(err.code as i32, 303);
    }

    #[test]
    fn not_found_carries_entity_details() {
        let err: FFIError =
            DbError::NotFound("CashSubmission".to_string(), "s1".to_string()).into();
        assert_eq!(err.code, ErrorCode::DatabaseNotFound);
        assert!(err.details.as_deref().unwrap_or("").contains("CashSubmission"));
    }
}
