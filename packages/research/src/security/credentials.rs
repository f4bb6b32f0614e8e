//! Credential handling with secure memory.
//!
//! Uses the `secrecy` crate to prevent accidental logging of sensitive values.

use secrecy::{ExposeSecret, SecretBox};
use std::fmt;

/// An API key that won't be logged or displayed.
///
/// Uses `secrecy::SecretBox` to ensure model and search credentials are
/// never accidentally exposed in logs, debug output, or error messages.
pub struct ApiKey(SecretBox<str>);

impl ApiKey {
    /// Create a new API key.
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(Box::from(value.into().as_str())))
    }

    /// Expose the key value for use.
    ///
    /// Only call this when actually using the key (e.g., in a request header).
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for ApiKey {
    fn clone(&self) -> Self {
        Self::new(self.expose().to_string())
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for ApiKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ApiKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_not_in_debug() {
        let key = ApiKey::new("gsk-super-secret-key");
        let debug = format!("{:?}", key);
        assert!(!debug.contains("gsk-super"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_key_not_in_display() {
        let key = ApiKey::new("gsk-super-secret-key");
        let display = format!("{}", key);
        assert!(!display.contains("gsk-super"));
        assert!(display.contains("[REDACTED]"));
    }

    #[test]
    fn test_expose_works() {
        let key = ApiKey::new("gsk-super-secret-key");
        assert_eq!(key.expose(), "gsk-super-secret-key");
    }

    #[test]
    fn test_clone_preserves_value() {
        let key = ApiKey::new("gsk-secret");
        assert_eq!(key.clone().expose(), "gsk-secret");
    }
}
