//! SeaORM entities.

pub mod account;
pub mod account_user;
