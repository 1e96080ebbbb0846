pub mod bearer;
pub mod credential_store;
