//! Account addresses and device identifiers.
//!
//! Both are opaque strings chosen by the client. They are validated once at
//! the boundary (length, charset) so that every other crate can use them as
//! map keys and storage key segments without re-checking.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length, in bytes, of an address or device identifier.
pub const MAX_IDENTIFIER_LEN: usize = 64;

fn check_identifier(raw: &str) -> Result<(), TypesError> {
    if raw.is_empty() {
        return Err(TypesError::EmptyIdentifier);
    }
    if raw.len() > MAX_IDENTIFIER_LEN {
        return Err(TypesError::IdentifierTooLong {
            len: raw.len(),
            max: MAX_IDENTIFIER_LEN,
        });
    }
    // '/' separates storage key segments.
    if raw.chars().any(|c| c == '/' || c.is_whitespace() || c.is_control()) {
        return Err(TypesError::InvalidIdentifier(raw.to_string()));
    }
    Ok(())
}

/// An account address.
///
/// Ordering is lexicographic on the raw string; the validator registry relies
/// on it for a deterministic walk during leader selection.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Create an address from a raw string.
    ///
    /// # Panics
    /// Panics if the string is not a valid identifier. Use [`Address::parse`]
    /// for untrusted input.
    pub fn new(raw: impl Into<String>) -> Self {
        let s = raw.into();
        check_identifier(&s).expect("invalid address");
        Self(s)
    }

    /// Validate and wrap untrusted input.
    pub fn parse(raw: impl Into<String>) -> Result<Self, TypesError> {
        let s = raw.into();
        check_identifier(&s)?;
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Address {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<Address> for String {
    fn from(a: Address) -> Self {
        a.0
    }
}

/// Identifies one of an account's devices.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceId(String);

impl DeviceId {
    /// # Panics
    /// Panics if the string is not a valid identifier.
    pub fn new(raw: impl Into<String>) -> Self {
        let s = raw.into();
        check_identifier(&s).expect("invalid device id");
        Self(s)
    }

    pub fn parse(raw: impl Into<String>) -> Result<Self, TypesError> {
        let s = raw.into();
        check_identifier(&s)?;
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DeviceId {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<DeviceId> for String {
    fn from(d: DeviceId) -> Self {
        d.0
    }
}
