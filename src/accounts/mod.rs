pub mod account;
pub mod client;
pub mod config;
pub mod error;
pub mod session;
pub mod types;
pub mod validator;
