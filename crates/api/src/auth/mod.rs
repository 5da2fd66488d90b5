//! Token credential and activation primitives.
//!
//! - [`credential`] -- signing and validation of the bearer credential that
//!   scopes access to one tenant database.
//! - [`activation`] -- one-time activation codes proving out-of-band
//!   receipt before a credential becomes usable.

pub mod activation;
pub mod credential;
