//! Common types used throughout Guardian.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an appeal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppealId(pub Uuid);

impl AppealId {
    /// Create a new random appeal ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an appeal ID from a UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Check whether this is the nil (all-zero) ID.
    ///
    /// The nil ID is never a valid appeal reference and is rejected by
    /// every engine operation that takes an ID.
    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for AppealId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AppealId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "appeal:{}", self.0)
    }
}

/// Unique identifier for a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId(pub Uuid);

impl ResourceId {
    /// Create a new random resource ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a resource ID from a UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ResourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "resource:{}", self.0)
    }
}

/// Timestamp wrapper for consistent handling throughout Guardian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub DateTime<Utc>);

impl Timestamp {
    /// Get the current timestamp.
    ///
    /// Engine code reads time through [`Clock`](crate::Clock) instead, so
    /// this is mostly useful for defaults and tests.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Create a timestamp from a `DateTime<Utc>`.
    #[must_use]
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Check if this timestamp is in the past.
    #[must_use]
    pub fn is_past(&self) -> bool {
        self.0 < Utc::now()
    }

    /// Check if this timestamp is in the future.
    #[must_use]
    pub fn is_future(&self) -> bool {
        self.0 > Utc::now()
    }

    /// Get the inner `DateTime<Utc>`.
    #[must_use]
    pub fn into_inner(self) -> DateTime<Utc> {
        self.0
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%SZ"))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

/// An email identity, validated at construction.
///
/// Emails identify appellants, approvers, and revocation actors. Validation
/// is intentionally shallow: one `@`, a non-empty local part and domain, and
/// no whitespace. Anything stricter belongs to the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// Parse and validate an email address.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidEmail`] when the value does not look like an
    /// email address.
    pub fn parse(value: impl Into<String>) -> Result<Self, InvalidEmail> {
        let value = value.into();
        if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(InvalidEmail(value));
        }
        let mut parts = value.splitn(2, '@');
        let local = parts.next().unwrap_or_default();
        let Some(domain) = parts.next() else {
            return Err(InvalidEmail(value));
        };
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(InvalidEmail(value));
        }
        Ok(Self(value))
    }

    /// The address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Error returned when a value fails email-format validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid email address: {0:?}")]
pub struct InvalidEmail(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appeal_id_uniqueness() {
        assert_ne!(AppealId::new(), AppealId::new());
    }

    #[test]
    fn test_appeal_id_display() {
        let id = AppealId::new();
        assert!(id.to_string().starts_with("appeal:"));
    }

    #[test]
    fn test_nil_appeal_id() {
        assert!(AppealId::from_uuid(Uuid::nil()).is_nil());
        assert!(!AppealId::new().is_nil());
    }

    #[test]
    fn test_timestamp_ordering() {
        let earlier = Timestamp::from_datetime(Utc::now() - chrono::Duration::hours(1));
        let later = Timestamp::now();
        assert!(earlier < later);
        assert!(earlier.is_past());
    }

    #[test]
    fn test_email_accepts_plain_addresses() {
        for value in ["bob@x", "alice@example.com", "a.b+c@sub.example.org"] {
            assert!(Email::parse(value).is_ok(), "{value} should parse");
        }
    }

    #[test]
    fn test_email_rejects_malformed_addresses() {
        for value in ["", "bob", "@x", "bob@", "bo b@x", "bob@x@y", "bob\n@x"] {
            assert!(Email::parse(value).is_err(), "{value:?} should be rejected");
        }
    }

    #[test]
    fn test_email_display_roundtrip() {
        let email = Email::parse("bob@x").unwrap();
        assert_eq!(email.to_string(), "bob@x");
        assert_eq!(email.as_str(), "bob@x");
    }
}
