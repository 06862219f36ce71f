// Kagi: stateless bearer-token authentication library

pub mod config;
pub mod constants;
pub mod error;
pub mod extractors;
pub mod filter;
pub mod identity;
pub mod logging;
pub mod login;
pub mod revocation;
pub mod runtime;
pub mod token;

pub use runtime::AuthRuntime;
