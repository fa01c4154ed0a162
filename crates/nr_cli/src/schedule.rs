use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Datelike, FixedOffset, NaiveTime, TimeZone, Utc, Weekday};
use nr_core::{Error, Result};
use tracing::warn;

use crate::config::ScheduleConfig;

fn default_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Parse `HH:MM`. Anything unreadable falls back to 09:00.
pub fn parse_time(value: &str) -> NaiveTime {
    let mut parts = value.trim().splitn(2, ':');
    let hour = parts.next().and_then(|h| h.trim().parse::<u32>().ok());
    let minute = match parts.next() {
        Some(m) => m.trim().parse::<u32>().ok(),
        None => Some(0),
    };
    match (hour, minute) {
        (Some(hour), Some(minute)) => NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_else(default_time),
        _ => default_time(),
    }
}

/// Full or abbreviated day name, case-insensitive. Unknown names mean Monday.
pub fn parse_day(value: &str) -> Weekday {
    value.trim().parse().unwrap_or(Weekday::Mon)
}

/// `UTC`, `Z`, or a fixed offset like `+09:00`, `-0530`, `UTC+9`.
pub fn parse_timezone(value: &str) -> Result<FixedOffset> {
    let unsupported =
        || Error::Config(format!("Unsupported timezone {:?}, use UTC or an offset like +09:00", value));

    let upper = value.trim().to_uppercase();
    let rest = upper
        .strip_prefix("UTC")
        .or_else(|| upper.strip_prefix("GMT"))
        .unwrap_or(&upper);
    if rest.is_empty() || rest == "Z" {
        return FixedOffset::east_opt(0).ok_or_else(unsupported);
    }

    let sign = match rest.chars().next() {
        Some('+') => 1,
        Some('-') => -1,
        _ => return Err(unsupported()),
    };
    let body = &rest[1..];
    if !body.is_ascii() {
        return Err(unsupported());
    }
    let (hours, minutes) = match body.split_once(':') {
        Some(parts) => parts,
        None if body.len() > 2 => body.split_at(body.len() - 2),
        None => (body, "0"),
    };
    let hours: i32 = hours.parse().map_err(|_| unsupported())?;
    let minutes: i32 = minutes.parse().map_err(|_| unsupported())?;
    if !(0..=23).contains(&hours) || !(0..=59).contains(&minutes) {
        return Err(unsupported());
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(unsupported)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    Daily { at: NaiveTime },
    Weekly { day: Weekday, at: NaiveTime },
}

#[derive(Debug, Clone)]
pub struct Schedule {
    cadence: Cadence,
    tz: FixedOffset,
}

impl Schedule {
    pub fn new(cadence: Cadence, tz: FixedOffset) -> Self {
        Self { cadence, tz }
    }

    pub fn from_config(config: &ScheduleConfig) -> Result<Self> {
        let tz = parse_timezone(&config.timezone)?;
        let at = parse_time(&config.time);
        let cadence = match config.kind.trim().to_lowercase().as_str() {
            "daily" => Cadence::Daily { at },
            "weekly" => Cadence::Weekly {
                day: parse_day(&config.day_of_week),
                at,
            },
            other => {
                warn!("Unknown schedule type {:?}, running weekly on Monday", other);
                Cadence::Weekly { day: Weekday::Mon, at }
            }
        };
        Ok(Self::new(cadence, tz))
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    /// The next trigger at or after `now`. A trigger equal to `now` fires immediately.
    pub fn next_run_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let local_now = now.with_timezone(&self.tz);
        let today = local_now.date_naive();

        let (days_ahead, at) = match self.cadence {
            Cadence::Daily { at } => (i64::from(local_now.time() > at), at),
            Cadence::Weekly { day, at } => {
                let target = i64::from(day.num_days_from_monday());
                let current = i64::from(today.weekday().num_days_from_monday());
                let mut days = (target - current).rem_euclid(7);
                if days == 0 && local_now.time() > at {
                    days = 7;
                }
                (days, at)
            }
        };

        let local_target = (today + chrono::Duration::days(days_ahead)).and_time(at);
        self.tz
            .from_local_datetime(&local_target)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(now)
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cadence {
            Cadence::Daily { at } => write!(f, "daily at {} ({})", at.format("%H:%M"), self.tz),
            Cadence::Weekly { day, at } => {
                write!(f, "weekly on {:?} at {} ({})", day, at.format("%H:%M"), self.tz)
            }
        }
    }
}

/// How long to sleep until `next`; zero when it is already due.
pub fn duration_until(next: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (next - now).to_std().unwrap_or(Duration::ZERO)
}
