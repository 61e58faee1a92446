use chrono::{DateTime, Duration, Utc};

use crate::db::Database;
use crate::error::AppError;

pub const WINDOW_MINUTES: i64 = 30;
pub const WINDOW_CAP: u32 = 100;

const KEY_WINDOW_START: &str = "rate_window_start";
const KEY_WINDOW_COUNT: &str = "rate_window_count";

/// Rolling 30-minute window counting successful deliveries. Persisted in
/// the settings table so the count survives restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitWindow {
    pub started_at: DateTime<Utc>,
    pub count: u32,
}

impl RateLimitWindow {
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            started_at: now,
            count: 0,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.started_at + Duration::minutes(WINDOW_MINUTES)
    }

    /// An expired window resets before any new count is added.
    pub fn refreshed(self, now: DateTime<Utc>) -> Self {
        if self.is_expired(now) {
            Self::fresh(now)
        } else {
            self
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.count >= WINDOW_CAP
    }

    pub fn remaining(&self) -> u32 {
        WINDOW_CAP.saturating_sub(self.count)
    }

    /// Whole minutes until the window resets, rounded up, never negative.
    pub fn minutes_until_reset(&self, now: DateTime<Utc>) -> i64 {
        let deadline = self.started_at + Duration::minutes(WINDOW_MINUTES);
        let seconds = (deadline - now).num_seconds().max(0);
        (seconds + 59) / 60
    }

    pub fn load(db: &Database) -> Result<Option<Self>, AppError> {
        let start = db.get_setting(KEY_WINDOW_START)?;
        let count = db.get_setting(KEY_WINDOW_COUNT)?;
        match (start, count) {
            (Some(start), Some(count)) => {
                let started_at = match DateTime::parse_from_rfc3339(&start) {
                    Ok(dt) => dt.with_timezone(&Utc),
                    Err(e) => {
                        tracing::warn!("Discarding unparsable rate window start: {e}");
                        return Ok(None);
                    }
                };
                let count = count.parse().unwrap_or(0);
                Ok(Some(Self { started_at, count }))
            }
            _ => Ok(None),
        }
    }

    pub fn store(&self, db: &Database) -> Result<(), AppError> {
        db.set_setting(KEY_WINDOW_START, &self.started_at.to_rfc3339())?;
        db.set_setting(KEY_WINDOW_COUNT, &self.count.to_string())?;
        Ok(())
    }
}
