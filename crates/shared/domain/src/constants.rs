//! Domain-level constants.
//!
//! These constants define business rules for the account lifecycle.

// =============================================================================
// Account Status
// =============================================================================

/// Stored value of an account that is open for use
pub const STATUS_IN_USE: &str = "IN_USE";

/// Stored value of a closed account
pub const STATUS_UNREGISTERED: &str = "UNREGISTERED";

// =============================================================================
// Account Rules
// =============================================================================

/// Maximum number of live accounts a single user may own
pub const MAX_ACCOUNTS_PER_USER: u64 = 10;

/// Number assigned to the very first account
pub const DEFAULT_ACCOUNT_NUMBER: &str = "1000000000";

// =============================================================================
// Locking
// =============================================================================

/// Prefix of the lock key guarding a single account
pub const ACCOUNT_LOCK_PREFIX: &str = "ACLK:";

/// Lock key guarding account number allocation
pub const ACCOUNT_SEQUENCE_LOCK_KEY: &str = "ACLK:sequence";

/// Build the lock key for an account number
pub fn account_lock_key(account_number: &str) -> String {
    format!("{}{}", ACCOUNT_LOCK_PREFIX, account_number)
}
