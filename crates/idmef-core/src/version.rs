//! # Version Tokens
//!
//! An IDMEFv2 message declares the draft it follows in its `Version` field,
//! e.g. `2.D.V03`. The grammar is fixed:
//!
//! ```text
//! ^\d\.D\.V(\d+)$
//! ```
//!
//! A single-digit major version, the literal `.D.V`, then one or more digits
//! of minor version. The minor digits are the version token used to address
//! the schema namespace. Anything else is rejected; a missing or malformed
//! version is never silently defaulted.

use std::fmt;

use crate::error::IdmefError;

/// The minor-version digit sequence extracted from a `Version` field.
///
/// The reserved token `latest` addresses the fallback schema namespace and
/// can only be obtained through [`VersionToken::latest`]; field parsing never
/// produces it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VersionToken(String);

impl VersionToken {
    /// Sentinel token naming the fallback schema namespace.
    pub const LATEST: &'static str = "latest";

    /// Extract the version token from a raw `Version` field value.
    ///
    /// # Errors
    ///
    /// Returns [`IdmefError::MalformedVersion`] when the value does not match
    /// `<digit>.D.V<digits>` exactly.
    pub fn parse_field(field: &str) -> Result<Self, IdmefError> {
        let mut chars = field.chars();
        let major_ok = chars.next().is_some_and(|c| c.is_ascii_digit());
        let rest = chars.as_str();
        let minor = rest
            .strip_prefix(".D.V")
            .filter(|_| major_ok)
            .ok_or_else(|| IdmefError::malformed_version(field))?;
        Self::from_digits(minor).map_err(|_| IdmefError::malformed_version(field))
    }

    /// Build a token directly from minor-version digits (e.g. `"03"`).
    ///
    /// # Errors
    ///
    /// Returns [`IdmefError::MalformedVersion`] if `digits` is empty or
    /// contains anything but ASCII digits.
    pub fn from_digits(digits: &str) -> Result<Self, IdmefError> {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(IdmefError::malformed_version(digits));
        }
        Ok(Self(digits.to_string()))
    }

    /// The `latest` sentinel token.
    pub fn latest() -> Self {
        Self(Self::LATEST.to_string())
    }

    /// True if this is the `latest` sentinel.
    pub fn is_latest(&self) -> bool {
        self.0 == Self::LATEST
    }

    /// Access the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VersionToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
