//! Device identifier types with proper encapsulation.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Numeric device identifier - newtype for type safety.
///
/// Ids are assigned from a contiguous half-open range by [`DeviceRange`]
/// and are never reused within a fleet run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeviceId(u32);

impl DeviceId {
    /// Create a new `DeviceId`.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw numeric id.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for DeviceId {
    fn from(id: u32) -> Self {
        Self::new(id)
    }
}

/// Human-readable device name, `<prefix>-<id>`.
///
/// Used as the structured `device` field on every per-instance log line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceName(String);

impl DeviceName {
    /// Derive the display name for `id` under `prefix`.
    pub fn new(prefix: &str, id: DeviceId) -> Self {
        Self(format!("{prefix}-{id}"))
    }

    /// Check that `prefix` can start a container name.
    ///
    /// Docker names match `[a-zA-Z0-9][a-zA-Z0-9_.-]*`; the prefix is the
    /// leading part of every name, so it has to follow the same rule.
    pub fn validate_prefix(prefix: &str) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidValue {
            field: "prefix",
            reason: reason.to_string(),
        };

        let mut chars = prefix.chars();
        match chars.next() {
            None => return Err(invalid("must not be empty")),
            Some(first) if !first.is_ascii_alphanumeric() => {
                return Err(invalid("must start with a letter or digit"));
            }
            Some(_) => {}
        }
        if chars.any(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))) {
            return Err(invalid("may only contain letters, digits, '_', '.' and '-'"));
        }
        Ok(())
    }

    /// Get the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the endpoint/container for a protocol tag, `<prefix>-<id>-<tag>`.
    #[must_use]
    pub fn with_tag(&self, tag: &str) -> String {
        format!("{}-{tag}", self.0)
    }
}

impl fmt::Display for DeviceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The contiguous range of device ids a fleet covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeviceRange {
    start: u32,
    count: u32,
}

impl DeviceRange {
    /// Build the range `[start, start + count)`.
    ///
    /// Returns `None` when the end of the range does not fit in a `u32`.
    #[must_use]
    pub fn new(start: u32, count: u32) -> Option<Self> {
        start.checked_add(count).map(|_| Self { start, count })
    }

    /// First id in the range.
    #[must_use]
    pub const fn start(&self) -> u32 {
        self.start
    }

    /// Number of ids in the range.
    #[must_use]
    pub const fn len(&self) -> u32 {
        self.count
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    fn bounds(&self) -> Range<u32> {
        // `new` guarantees this addition does not overflow.
        self.start..self.start + self.count
    }

    /// Iterate the ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = DeviceId> {
        self.bounds().map(DeviceId::new)
    }
}
