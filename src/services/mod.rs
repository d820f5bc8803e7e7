//! Application use cases and business logic.

mod account_service;

pub use account_service::{
    AccountManager, AccountService, AccountView, ChangePassword, RegisterAccount, SetStatus,
    UpdateProfile,
};
