//! DIS time representation (IEEE 1278.1 §5.2.8 and §5.2.31).
//!
//! An hour is divided into 2^31 - 1 units. The 32-bit timestamp carries the
//! time past the hour in its upper 31 bits and a relative/absolute flag in
//! the least significant bit, so it wraps at the top of every hour.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

const SECONDS_PER_HOUR: u64 = 3600;
const UNITS_PER_HOUR: u64 = (1 << 31) - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampKind {
    #[default]
    Relative,
    Absolute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Timestamp(u32);

impl Timestamp {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn from_time_past_hour(units: u32, kind: TimestampKind) -> Self {
        let flag = match kind {
            TimestampKind::Relative => 0,
            TimestampKind::Absolute => 1,
        };
        Self((units << 1) | flag)
    }

    pub fn at(time: SystemTime, kind: TimestampKind) -> Self {
        Self::from_time_past_hour(time_past_hour(since_epoch(time)), kind)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn time_past_hour(self) -> u32 {
        self.0 >> 1
    }

    pub fn kind(self) -> TimestampKind {
        if self.0 & 1 == 1 {
            TimestampKind::Absolute
        } else {
            TimestampKind::Relative
        }
    }

    pub fn seconds_past_hour(self) -> f64 {
        self.time_past_hour() as f64 * SECONDS_PER_HOUR as f64 / UNITS_PER_HOUR as f64
    }
}

/// Hours since 1970-01-01 UTC plus the timestamp within that hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ClockTime {
    pub hour: i32,
    pub time_past_hour: u32,
}

impl ClockTime {
    pub fn at(time: SystemTime, kind: TimestampKind) -> Self {
        let since = since_epoch(time);
        Self {
            hour: (since.as_secs() / SECONDS_PER_HOUR) as i32,
            time_past_hour: Timestamp::at(time, kind).raw(),
        }
    }

    pub fn timestamp(&self) -> Timestamp {
        Timestamp::from_raw(self.time_past_hour)
    }

    pub fn to_system_time(&self) -> SystemTime {
        let hours = Duration::from_secs(self.hour.max(0) as u64 * SECONDS_PER_HOUR);
        UNIX_EPOCH + hours + Duration::from_secs_f64(self.timestamp().seconds_past_hour())
    }
}

fn since_epoch(time: SystemTime) -> Duration {
    time.duration_since(UNIX_EPOCH).unwrap_or_default()
}

fn time_past_hour(since: Duration) -> u32 {
    let nanos_into_hour =
        (since.as_secs() % SECONDS_PER_HOUR) as u128 * 1_000_000_000 + since.subsec_nanos() as u128;
    let nanos_per_hour = SECONDS_PER_HOUR as u128 * 1_000_000_000;
    (nanos_into_hour * UNITS_PER_HOUR as u128 / nanos_per_hour) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_secs(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn top_of_hour_is_zero() {
        let ts = Timestamp::at(at_secs(3600 * 450_000), TimestampKind::Relative);
        assert_eq!(ts.raw(), 0);
    }

    #[test]
    fn half_hour_scaling() {
        let ts = Timestamp::at(at_secs(3600 * 10 + 1800), TimestampKind::Relative);
        assert_eq!(ts.time_past_hour(), ((1u64 << 31) - 1) as u32 / 2);
        assert_eq!(ts.raw() & 1, 0);
        assert!((ts.seconds_past_hour() - 1800.0).abs() < 1e-3);
    }

    #[test]
    fn absolute_flag_is_lsb() {
        let time = at_secs(3600 * 10 + 42);
        let relative = Timestamp::at(time, TimestampKind::Relative);
        let absolute = Timestamp::at(time, TimestampKind::Absolute);
        assert_eq!(absolute.raw(), relative.raw() | 1);
        assert_eq!(absolute.kind(), TimestampKind::Absolute);
        assert_eq!(relative.kind(), TimestampKind::Relative);
        assert_eq!(absolute.time_past_hour(), relative.time_past_hour());
    }

    #[test]
    fn last_unit_before_the_hour_fits() {
        let time = UNIX_EPOCH + Duration::from_secs(3599) + Duration::from_nanos(999_999_999);
        let ts = Timestamp::at(time, TimestampKind::Absolute);
        assert!(ts.time_past_hour() < (1 << 31) - 1);
    }

    #[test]
    fn clock_time_hours_since_epoch() {
        let clock = ClockTime::at(at_secs(3600 * 437_000 + 900), TimestampKind::Relative);
        assert_eq!(clock.hour, 437_000);
        assert!((clock.timestamp().seconds_past_hour() - 900.0).abs() < 1e-3);

        let back = clock.to_system_time().duration_since(UNIX_EPOCH).unwrap();
        assert!((back.as_secs_f64() - (3600.0 * 437_000.0 + 900.0)).abs() < 1e-3);
    }

    #[test]
    fn before_epoch_clamps() {
        let ts = Timestamp::at(UNIX_EPOCH - Duration::from_secs(10), TimestampKind::Relative);
        assert_eq!(ts.raw(), 0);
    }
}
