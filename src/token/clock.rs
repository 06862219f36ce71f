//! Clock abstraction and the time policy shared by issuance and expiry checks.
//!
//! A [`Clock`] yields a wall-clock reading. [`TimePolicy`] resolves that
//! reading to an instant in the configured timezone, or in the system zone
//! when none is configured. The codec asks the policy for "now" both when it
//! stamps `iat`/`exp` and when it checks `exp`, so a fixed clock makes both
//! deterministic.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::ConfigError;

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Reads the operating system clock in the system timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always returns the same reading.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(NaiveDateTime);

impl FixedClock {
    pub fn new(reading: NaiveDateTime) -> Self {
        FixedClock(reading)
    }

    /// Reading equal to the UTC wall time of a Unix timestamp.
    pub fn at_timestamp(secs: i64) -> Self {
        let reading = DateTime::from_timestamp(secs, 0)
            .map(|dt| dt.naive_utc())
            .unwrap_or_default();
        FixedClock(reading)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Zone used to turn clock readings into instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimePolicy {
    System,
    Zone(Tz),
}

impl TimePolicy {
    /// Parse an optional IANA identifier; `None` or blank selects the system zone.
    pub fn from_config(timezone: Option<&str>) -> Result<Self, ConfigError> {
        match timezone.map(str::trim).filter(|t| !t.is_empty()) {
            None => Ok(TimePolicy::System),
            Some(id) => Tz::from_str(id)
                .map(TimePolicy::Zone)
                .map_err(|_| ConfigError::UnknownTimezone(id.to_string())),
        }
    }

    /// Resolve a wall-clock reading to an instant.
    ///
    /// Ambiguous readings (DST fold) pick the earliest instant. Readings that
    /// do not exist in the zone (DST gap) move forward by the gap length.
    pub fn resolve(&self, reading: NaiveDateTime) -> DateTime<Utc> {
        let resolved = match self {
            TimePolicy::System => resolve_in(&Local, reading),
            TimePolicy::Zone(tz) => resolve_in(tz, reading),
        };
        resolved.unwrap_or_else(|| Utc.from_utc_datetime(&reading))
    }
}

/// Longest span searched backwards for the offset in force before a gap.
const GAP_SEARCH_STEPS: i64 = 24 * 4;

fn resolve_in<Z: TimeZone>(zone: &Z, reading: NaiveDateTime) -> Option<DateTime<Utc>> {
    match zone.from_local_datetime(&reading) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt.with_timezone(&Utc)),
        LocalResult::None => {
            // Applying the pre-gap offset is the same as shifting by the gap
            // and applying the post-gap offset.
            let before = (1..=GAP_SEARCH_STEPS)
                .map(|step| reading - Duration::minutes(15 * step))
                .find_map(|earlier| zone.from_local_datetime(&earlier).latest())?;
            let offset = before.offset().fix().local_minus_utc();
            Some(Utc.from_utc_datetime(&(reading - Duration::seconds(i64::from(offset)))))
        }
    }
}

impl fmt::Display for TimePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimePolicy::System => f.write_str("system"),
            TimePolicy::Zone(tz) => write!(f, "{}", tz.name()),
        }
    }
}
