//! Temporal types for validity windows and injectable clocks
//!
//! Consent agreements are valid for a fixed window from issuance. Every
//! time-dependent decision reads "now" from a [`Clock`] so that expiry is
//! evaluated at the moment of use rather than at the moment of selection.

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use thiserror::Error;

const SECONDS_PER_DAY: i64 = 86_400;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid window: start {start} must be before end {end}")]
    InvalidWindow {
        start: String,
        end: String,
    },

    #[error("Date arithmetic out of range: {0}")]
    OutOfRange(String),
}

/// A half-open validity window `[starts_at, expires_at)`
///
/// A window is never unbounded: anything that can be relied upon for
/// publication carries an expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityWindow {
    /// Start of the window (inclusive)
    pub starts_at: DateTime<Utc>,
    /// End of the window (exclusive)
    pub expires_at: DateTime<Utc>,
}

impl ValidityWindow {
    /// Creates a new bounded window
    pub fn new(starts_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Result<Self, TemporalError> {
        if starts_at >= expires_at {
            return Err(TemporalError::InvalidWindow {
                start: starts_at.to_string(),
                end: expires_at.to_string(),
            });
        }
        Ok(Self { starts_at, expires_at })
    }

    /// Creates a window of `months` calendar months starting at `issued_at`
    pub fn for_months(issued_at: DateTime<Utc>, months: u32) -> Result<Self, TemporalError> {
        let expires_at = issued_at
            .checked_add_months(Months::new(months))
            .ok_or_else(|| TemporalError::OutOfRange(format!("{issued_at} + {months} months")))?;
        Self::new(issued_at, expires_at)
    }

    /// Returns true if `timestamp` falls inside the window
    ///
    /// The end is exclusive: at exactly `expires_at` the window has lapsed.
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.starts_at && timestamp < self.expires_at
    }

    /// Returns true once `timestamp` has reached the expiry
    pub fn has_lapsed(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.expires_at
    }

    /// Whole days left until expiry, rounded up; zero once lapsed
    pub fn days_remaining(&self, timestamp: DateTime<Utc>) -> i64 {
        let seconds = (self.expires_at - timestamp).num_seconds();
        if seconds <= 0 {
            0
        } else {
            (seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY
        }
    }

    /// Returns the duration of the window
    pub fn duration(&self) -> chrono::Duration {
        self.expires_at - self.starts_at
    }
}

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A manually controlled clock
#[derive(Debug)]
pub struct FixedClock {
    current: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(timestamp),
        }
    }

    /// Moves the clock to `timestamp`
    pub fn set(&self, timestamp: DateTime<Utc>) {
        let mut current = self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = timestamp;
    }

    /// Moves the clock forward by `by`
    pub fn advance(&self, by: chrono::Duration) {
        let mut current = self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *current += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
