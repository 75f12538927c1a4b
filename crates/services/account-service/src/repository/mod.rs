//! Repository layer for data access.

mod account_repository;
mod account_user_repository;
pub mod entities;

pub use account_repository::{AccountRepository, AccountStore};
pub use account_user_repository::{AccountUserRepository, AccountUserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use account_repository::MockAccountRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use account_user_repository::MockAccountUserRepository;
