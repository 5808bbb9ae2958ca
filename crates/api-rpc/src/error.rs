//! RPC Error Types
//!
//! Maps application errors to JSON-RPC error codes.

use jsonrpsee::types::ErrorObjectOwned;
use mediafetch_core::error::AppError;

/// RPC Error Codes
pub mod code {
    pub const VALIDATION_ERROR: i32 = 4000;
    pub const NOT_FOUND: i32 = 4001;
    pub const INVALID_STATE: i32 = 4002;
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const SYSTEM_ERROR: i32 = 5002;
}

/// Convert AppError to JSON-RPC ErrorObject
pub fn to_rpc_error(err: AppError) -> ErrorObjectOwned {
    match err {
        AppError::InvalidRequest(msg) => {
            ErrorObjectOwned::owned(code::VALIDATION_ERROR, msg, None::<()>)
        }
        AppError::NotFound(msg) => ErrorObjectOwned::owned(code::NOT_FOUND, msg, None::<()>),
        AppError::Domain(e) => {
            ErrorObjectOwned::owned(code::INVALID_STATE, e.to_string(), None::<()>)
        }
        AppError::Io(e) => ErrorObjectOwned::owned(code::SYSTEM_ERROR, e.to_string(), None::<()>),
        AppError::Execution(e) => {
            ErrorObjectOwned::owned(code::SYSTEM_ERROR, e.to_string(), None::<()>)
        }
        AppError::Serialization(e) => {
            ErrorObjectOwned::owned(code::VALIDATION_ERROR, e.to_string(), None::<()>)
        }
        AppError::Config(msg) => ErrorObjectOwned::owned(code::INTERNAL_ERROR, msg, None::<()>),
        AppError::Internal(msg) => ErrorObjectOwned::owned(code::INTERNAL_ERROR, msg, None::<()>),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediafetch_core::domain::DomainError;

    #[test]
    fn test_codes_by_variant() {
        let cases = vec![
            (AppError::InvalidRequest("No URLs provided".into()), code::VALIDATION_ERROR),
            (AppError::NotFound("Download x not found".into()), code::NOT_FOUND),
            (
                AppError::Domain(DomainError::InvalidStateTransition {
                    from: "completed".into(),
                    to: "failed".into(),
                }),
                code::INVALID_STATE,
            ),
            (
                AppError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full")),
                code::SYSTEM_ERROR,
            ),
            (AppError::Internal("boom".into()), code::INTERNAL_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(to_rpc_error(err).code(), expected);
        }
    }

    #[test]
    fn test_message_is_kept_verbatim() {
        let err = to_rpc_error(AppError::NotFound("Download abc not found".into()));

        assert_eq!(err.message(), "Download abc not found");
    }
}
