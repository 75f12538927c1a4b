//! Domain-level errors.
//!
//! These errors represent business rule violations and domain logic failures.
//! They are independent of infrastructure concerns (database, cache).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable classification of every account failure reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    UserNotFound,
    AccountNotFound,
    MaxAccountsPerUser,
    UserAccountUnMatch,
    AccountAlreadyUnregistered,
    BalanceIsNotEmpty,
    AccountTransactionLock,
    InvalidRequest,
    InternalServerError,
}

impl ErrorCode {
    /// Machine readable code
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::UserNotFound => "USER_NOT_FOUND",
            ErrorCode::AccountNotFound => "ACCOUNT_NOT_FOUND",
            ErrorCode::MaxAccountsPerUser => "MAX_ACCOUNTS_PER_USER",
            ErrorCode::UserAccountUnMatch => "USER_ACCOUNT_UN_MATCH",
            ErrorCode::AccountAlreadyUnregistered => "ACCOUNT_ALREADY_UNREGISTERED",
            ErrorCode::BalanceIsNotEmpty => "BALANCE_IS_NOT_EMPTY",
            ErrorCode::AccountTransactionLock => "ACCOUNT_TRANSACTION_LOCK",
            ErrorCode::InvalidRequest => "INVALID_REQUEST",
            ErrorCode::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Human readable description
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::AccountNotFound => "Account not found",
            ErrorCode::MaxAccountsPerUser => "A user may own at most 10 accounts",
            ErrorCode::UserAccountUnMatch => "Account does not belong to the user",
            ErrorCode::AccountAlreadyUnregistered => "Account is already unregistered",
            ErrorCode::BalanceIsNotEmpty => "Account balance is not empty",
            ErrorCode::AccountTransactionLock => "Account is in use by another operation",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InternalServerError => "Internal server error",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Domain-specific errors for business rule violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed for a field or input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Closing an account that is already closed
    #[error("Account is already unregistered")]
    AlreadyUnregistered,

    /// Closing an account that still holds money
    #[error("Account balance is not empty: {0}")]
    BalanceNotEmpty(i64),

    /// Stored account number is not a decimal number
    #[error("Invalid account number: {0}")]
    InvalidAccountNumber(String),

    /// Incrementing the account number would exceed its width
    #[error("Account numbers exhausted after {0}")]
    AccountNumberOverflow(String),

    /// Unknown account status value
    #[error("Unknown account status: {0}")]
    UnknownStatus(String),
}

impl DomainError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    /// Classification reported to callers
    pub fn code(&self) -> ErrorCode {
        match self {
            DomainError::Validation(_) => ErrorCode::InvalidRequest,
            DomainError::AlreadyUnregistered => ErrorCode::AccountAlreadyUnregistered,
            DomainError::BalanceNotEmpty(_) => ErrorCode::BalanceIsNotEmpty,
            DomainError::InvalidAccountNumber(_)
            | DomainError::AccountNumberOverflow(_)
            | DomainError::UnknownStatus(_) => ErrorCode::InternalServerError,
        }
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
