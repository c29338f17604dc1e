//! Unix timestamp utilities for spend-window accounting.
//!
//! Timestamps are serialized as stringified integers to avoid precision loss
//! in JSON consumers whose number type cannot represent all 64-bit integers.
//! The day/week helpers place a timestamp into the UTC calendar windows used
//! by the rolling spend ledger.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::time::SystemTime;

/// Seconds in a UTC day.
const DAY_SECS: u64 = 86_400;

/// Seconds in a seven-day window.
const WEEK_SECS: u64 = 7 * DAY_SECS;

/// A Unix timestamp representing seconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Ord, Eq)]
pub struct UnixTimestamp(u64);

impl Serialize for UnixTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for UnixTimestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let ts = s
            .parse::<u64>()
            .map_err(|_| serde::de::Error::custom("timestamp must be a non-negative integer"))?;
        Ok(Self(ts))
    }
}

impl Display for UnixTimestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl UnixTimestamp {
    /// Creates a new [`UnixTimestamp`] from a raw seconds value.
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// Returns the current system time as a [`UnixTimestamp`].
    ///
    /// # Panics
    ///
    /// Panics if the system clock is set to a time before the Unix epoch,
    /// which should never happen on properly configured systems.
    #[must_use]
    pub fn now() -> Self {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .expect("SystemTime before UNIX epoch?!?")
            .as_secs();
        Self(now)
    }

    /// Returns the timestamp as raw seconds since the Unix epoch.
    #[must_use]
    pub const fn as_secs(&self) -> u64 {
        self.0
    }

    /// Returns the epoch day number this timestamp falls in.
    ///
    /// Day boundaries are UTC midnights.
    #[must_use]
    pub const fn epoch_day(&self) -> u64 {
        self.0 / DAY_SECS
    }

    /// Returns the epoch week number this timestamp falls in.
    ///
    /// Weeks are epoch-aligned seven-day windows, matching the executor
    /// contract's `lastWeek` accounting.
    #[must_use]
    pub const fn epoch_week(&self) -> u64 {
        self.0 / WEEK_SECS
    }
}
