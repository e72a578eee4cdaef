//! Opaque identifiers for diagram entities.
//!
//! Identifiers are minted from a process-wide counter salted with the current
//! timestamp, so two calls never return the same token during the lifetime of
//! the process.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// Opaque, globally unique token used as a map key for geometries, items and
/// modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// Mints a fresh identifier with the given prefix (`geom`, `item`, `mod`).
    ///
    /// ```
    /// use tordie_core::Identifier;
    ///
    /// let a = Identifier::mint("geom");
    /// let b = Identifier::mint("geom");
    /// assert_ne!(a, b);
    /// assert!(a.as_str().starts_with("geom_"));
    /// ```
    pub fn mint(prefix: &str) -> Self {
        let counter = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        let millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
        Self(format!(
            "{}_{}_{}",
            prefix,
            to_base36(millis),
            to_base36(counter)
        ))
    }

    /// Wraps an existing token, e.g. one read back from a document.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The prefix the identifier was minted with.
    pub fn prefix(&self) -> &str {
        self.0.split('_').next().unwrap_or_default()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Identifier {
    fn from(raw: &str) -> Self {
        Self::from_raw(raw)
    }
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::with_capacity(13);
    while value > 0 {
        buf.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    buf.reverse();
    String::from_utf8(buf).unwrap_or_default()
}
