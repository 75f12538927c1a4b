//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.

pub mod account;
pub mod account_number;
pub mod constants;
pub mod error;

pub use account::{
    Account, AccountCreated, AccountStatus, AccountSummary, AccountUnregistered, AccountUser,
};
pub use account_number::AccountNumber;
pub use constants::*;
pub use error::{DomainError, DomainResult, ErrorCode};
