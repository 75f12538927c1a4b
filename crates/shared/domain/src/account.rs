//! Account domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{STATUS_IN_USE, STATUS_UNREGISTERED};
use crate::error::{DomainError, DomainResult};

/// Account status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    InUse,
    Unregistered,
}

impl AccountStatus {
    /// Check if the account is still open
    pub fn is_in_use(&self) -> bool {
        matches!(self, AccountStatus::InUse)
    }

    /// Stored representation
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::InUse => STATUS_IN_USE,
            AccountStatus::Unregistered => STATUS_UNREGISTERED,
        }
    }
}

impl std::str::FromStr for AccountStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STATUS_IN_USE => Ok(AccountStatus::InUse),
            STATUS_UNREGISTERED => Ok(AccountStatus::Unregistered),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Owner of accounts. Managed by the identity store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUser {
    pub id: i64,
    pub name: String,
}

impl AccountUser {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Account domain entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Internal id, `None` until persisted
    pub id: Option<i64>,
    pub account_number: String,
    pub account_user: AccountUser,
    pub account_status: AccountStatus,
    /// Balance in minor currency units
    pub balance: i64,
    pub registered_at: DateTime<Utc>,
    /// Closure timestamp (None = open)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unregistered_at: Option<DateTime<Utc>>,
}

impl Account {
    /// Open a new, not yet persisted account
    pub fn open(
        account_user: AccountUser,
        account_number: impl Into<String>,
        balance: i64,
        registered_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if balance < 0 {
            return Err(DomainError::validation("Initial balance must not be negative"));
        }

        Ok(Self {
            id: None,
            account_number: account_number.into(),
            account_user,
            account_status: AccountStatus::InUse,
            balance,
            registered_at,
            unregistered_at: None,
        })
    }

    /// Check if the account is owned by the given user
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.account_user.id == user_id
    }

    /// Check if the account is closed
    pub fn is_unregistered(&self) -> bool {
        self.account_status == AccountStatus::Unregistered
    }

    /// Close the account.
    ///
    /// Only `IN_USE -> UNREGISTERED` is allowed, and only with a zero
    /// balance. The status check runs first.
    pub fn unregister(&mut self, at: DateTime<Utc>) -> DomainResult<()> {
        if self.is_unregistered() {
            return Err(DomainError::AlreadyUnregistered);
        }
        if self.balance != 0 {
            return Err(DomainError::BalanceNotEmpty(self.balance));
        }

        self.account_status = AccountStatus::Unregistered;
        self.unregistered_at = Some(at);
        Ok(())
    }
}

/// Result of opening an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountCreated {
    pub user_id: i64,
    pub account_number: String,
    pub registered_at: DateTime<Utc>,
}

impl From<&Account> for AccountCreated {
    fn from(account: &Account) -> Self {
        Self {
            user_id: account.account_user.id,
            account_number: account.account_number.clone(),
            registered_at: account.registered_at,
        }
    }
}

/// Per-account entry of a user's account listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub account_number: String,
    pub balance: i64,
}

impl From<Account> for AccountSummary {
    fn from(account: Account) -> Self {
        Self {
            account_number: account.account_number,
            balance: account.balance,
        }
    }
}

/// Result of closing an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUnregistered {
    pub user_id: i64,
    pub account_number: String,
    pub unregistered_at: DateTime<Utc>,
}
