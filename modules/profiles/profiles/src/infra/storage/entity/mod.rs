pub mod account;
pub mod account_group;
pub mod profile;
