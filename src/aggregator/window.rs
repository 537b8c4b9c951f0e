//! Time window rules: the trailing-week cutoff and the custom-game weekdays.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, LocalResult, NaiveTime, TimeZone, Utc, Weekday,
};
use chrono_tz::Tz;
use std::fmt;

/// Zone the weekly window is evaluated in.
///
/// `Named` follows the zone's DST rules for every timestamp. `Fixed` applies
/// one offset to all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowZone {
    Named(Tz),
    Fixed(FixedOffset),
}

impl WindowZone {
    /// Start of the window `days` calendar days before `now`
    pub fn cutoff(&self, now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
        match self {
            WindowZone::Named(tz) => window_cutoff(now, tz, days),
            WindowZone::Fixed(offset) => window_cutoff(now, offset, days),
        }
    }

    pub fn is_custom_game_day(&self, start_timestamp: i64) -> bool {
        match self {
            WindowZone::Named(tz) => is_custom_game_day(start_timestamp, tz),
            WindowZone::Fixed(offset) => is_custom_game_day(start_timestamp, offset),
        }
    }
}

impl Default for WindowZone {
    fn default() -> Self {
        WindowZone::Named(Tz::UTC)
    }
}

impl From<Tz> for WindowZone {
    fn from(tz: Tz) -> Self {
        WindowZone::Named(tz)
    }
}

impl From<FixedOffset> for WindowZone {
    fn from(offset: FixedOffset) -> Self {
        WindowZone::Fixed(offset)
    }
}

impl fmt::Display for WindowZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowZone::Named(tz) => write!(f, "{}", tz.name()),
            WindowZone::Fixed(offset) => write!(f, "UTC{}", offset),
        }
    }
}

/// Midnight (in `zone`) of the day `days` calendar days before `now`.
///
/// Truncating to midnight widens the window: a match at 23:59 on the first
/// day is still inside it.
pub fn window_cutoff<Z: TimeZone>(now: DateTime<Utc>, zone: &Z, days: u32) -> DateTime<Utc> {
    let first_day = now.with_timezone(zone).date_naive() - Duration::days(i64::from(days));
    let local_midnight = first_day.and_time(NaiveTime::MIN);

    let resolved = match zone.from_local_datetime(&local_midnight) {
        LocalResult::Single(t) | LocalResult::Ambiguous(t, _) => Some(t),
        // Midnight skipped by a DST jump; the day starts an hour later
        LocalResult::None => zone
            .from_local_datetime(&(local_midnight + Duration::hours(1)))
            .earliest(),
    };
    resolved
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|| DateTime::from_naive_utc_and_offset(local_midnight, Utc))
}

/// Friday or Saturday in `zone`. Unrepresentable timestamps are neither.
pub fn is_custom_game_day<Z: TimeZone>(start_timestamp: i64, zone: &Z) -> bool {
    DateTime::from_timestamp(start_timestamp, 0)
        .map(|t| matches!(t.with_timezone(zone).weekday(), Weekday::Fri | Weekday::Sat))
        .unwrap_or(false)
}
