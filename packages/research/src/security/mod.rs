//! Credential handling.
//!
//! Keeps API keys out of logs and debug output.

pub mod credentials;

pub use credentials::ApiKey;
