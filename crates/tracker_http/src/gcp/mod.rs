//! Google Cloud authentication.
pub mod credentials;
