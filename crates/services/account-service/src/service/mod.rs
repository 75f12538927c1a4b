//! Service layer - account lifecycle business logic.

mod account_service;
mod locked;

pub use account_service::{AccountManager, AccountService};
pub use locked::LockedAccountService;

#[cfg(any(test, feature = "test-utils"))]
pub use account_service::MockAccountService;
