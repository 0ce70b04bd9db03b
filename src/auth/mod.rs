//! RingCentral authentication.
//!
//! Provides the one-shot JWT-bearer token exchange. Tokens are not cached
//! or refreshed; a provider holds at most one token for its lifetime.

pub mod token;

pub use token::{Credentials, TokenProvider, TokenResponse};
