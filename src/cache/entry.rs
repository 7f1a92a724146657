//! Cache Entry Module
//!
//! Defines the persisted envelope wrapping every cached payload.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CacheError, Result};

// == Cache Entry ==
/// Versioned, timestamped envelope written to the store as JSON.
///
/// An entry is valid iff `now - timestamp < ttl` and `version` matches the
/// reader's version. A TTL of zero or below is always expired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The cached payload
    pub data: T,
    /// Write time (Unix milliseconds)
    pub timestamp: i64,
    /// Lifetime in milliseconds from `timestamp`
    pub ttl: i64,
    /// Envelope format tag
    pub version: String,
}

/// Envelope with the payload still undecoded.
pub type RawEntry = CacheEntry<Value>;

impl<T> CacheEntry<T> {
    // == Constructor ==
    pub fn new(data: T, timestamp: i64, ttl: i64, version: impl Into<String>) -> Self {
        Self {
            data,
            timestamp,
            ttl,
            version: version.into(),
        }
    }

    // == Is Expired ==
    /// Checks expiry against `now`.
    ///
    /// Boundary condition: expired once `now - timestamp >= ttl`, so a read at
    /// exactly `timestamp + ttl` is already a miss.
    pub fn is_expired(&self, now: i64) -> bool {
        self.ttl <= 0 || now.saturating_sub(self.timestamp) >= self.ttl
    }

    /// Milliseconds since the entry was written, never negative.
    pub fn age(&self, now: i64) -> i64 {
        now.saturating_sub(self.timestamp).max(0)
    }

    pub fn is_valid(&self, now: i64, version: &str) -> bool {
        self.version == version && !self.is_expired(now)
    }
}

impl<T: Serialize> CacheEntry<T> {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl RawEntry {
    /// Parses the envelope, leaving the payload untyped.
    ///
    /// Malformed JSON or missing envelope fields yield [`CacheError::Corrupted`].
    pub fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| CacheError::Corrupted(e.to_string()))
    }

    /// Decodes the payload into `T`, rejecting anything that does not fit.
    pub fn decode<T: DeserializeOwned>(self) -> Result<CacheEntry<T>> {
        let data = serde_json::from_value(self.data)
            .map_err(|e| CacheError::Corrupted(e.to_string()))?;
        Ok(CacheEntry {
            data,
            timestamp: self.timestamp,
            ttl: self.ttl,
            version: self.version,
        })
    }
}
