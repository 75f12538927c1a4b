//! Unified error handling for the account services.
//!
//! Every business-rule violation is reported as [`AppError::Account`], which
//! carries an [`ErrorCode`] and a message. Callers translate it to whatever
//! transport they serve.

use domain::{DomainError, ErrorCode};
use serde::Serialize;
use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    // Business rules
    #[error("{message}")]
    Account { code: ErrorCode, message: String },

    // Structurally invalid input
    #[error("{0}")]
    InvalidArgument(String),

    // External service errors
    #[cfg(feature = "database")]
    #[error("Database error")]
    Database(#[from] sea_orm::DbErr),

    #[cfg(feature = "cache")]
    #[error("Cache error")]
    Cache(#[from] redis::RedisError),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Serializable error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl AppError {
    /// Business error with the default message for its code
    pub fn account(code: ErrorCode) -> Self {
        AppError::Account {
            code,
            message: code.description().to_string(),
        }
    }

    /// Business error with a custom message
    pub fn account_with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError::Account {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        AppError::InvalidArgument(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// Get error kind
    pub fn error_code(&self) -> ErrorCode {
        match self {
            AppError::Account { code, .. } => *code,
            AppError::InvalidArgument(_) => ErrorCode::InvalidRequest,
            _ => ErrorCode::InternalServerError,
        }
    }

    /// Check if this is the given business error
    pub fn is(&self, code: ErrorCode) -> bool {
        matches!(self, AppError::Account { code: c, .. } if *c == code)
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            AppError::Account { message, .. } => message.clone(),
            AppError::InvalidArgument(msg) => msg.clone(),

            #[cfg(feature = "database")]
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "A database error occurred".to_string()
            }
            #[cfg(feature = "cache")]
            AppError::Cache(e) => {
                tracing::error!("Cache error: {:?}", e);
                "A cache error occurred".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
        }
    }

    /// Body suitable for printing or returning to a client
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            code: self.error_code().as_str().to_string(),
            message: self.user_message(),
        }
    }
}

// =============================================================================
// Domain Error Conversion
// =============================================================================

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        let code = err.code();
        match code {
            ErrorCode::InternalServerError => AppError::Internal(err.to_string()),
            _ => AppError::account_with_message(code, err.to_string()),
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_account(self, code: ErrorCode) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_account(self, code: ErrorCode) -> AppResult<T> {
        self.ok_or_else(|| AppError::account(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_error_carries_code_and_message() {
        let err = AppError::account(ErrorCode::UserNotFound);

        assert!(err.is(ErrorCode::UserNotFound));
        assert_eq!(err.error_code(), ErrorCode::UserNotFound);
        assert_eq!(err.to_string(), "User not found");
        assert_eq!(err.to_body().code, "USER_NOT_FOUND");
    }

    #[test]
    fn test_invalid_argument_message_is_verbatim() {
        let err = AppError::invalid_argument("Minus");

        assert_eq!(err.to_string(), "Minus");
        assert_eq!(err.error_code(), ErrorCode::InvalidRequest);
    }

    #[test]
    fn test_domain_errors_map_to_codes() {
        let err = AppError::from(DomainError::BalanceNotEmpty(100));
        assert!(err.is(ErrorCode::BalanceIsNotEmpty));

        let err = AppError::from(DomainError::AlreadyUnregistered);
        assert!(err.is(ErrorCode::AccountAlreadyUnregistered));

        let err = AppError::from(DomainError::AccountNumberOverflow("9999999999".into()));
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[test]
    fn test_option_ext() {
        let missing: Option<u8> = None;
        let err = missing.ok_or_account(ErrorCode::AccountNotFound).unwrap_err();
        assert!(err.is(ErrorCode::AccountNotFound));
    }
}
