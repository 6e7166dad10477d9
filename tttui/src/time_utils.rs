use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone};
use time::macros::format_description;
use time::{Duration, OffsetDateTime, PrimitiveDateTime, UtcOffset};

fn to_naive(dt: PrimitiveDateTime) -> Option<NaiveDateTime> {
    let date = NaiveDate::from_ymd_opt(
        dt.year(),
        u32::from(u8::from(dt.month())),
        u32::from(dt.day()),
    )?;
    let time = NaiveTime::from_hms_nano_opt(
        u32::from(dt.hour()),
        u32::from(dt.minute()),
        u32::from(dt.second()),
        dt.nanosecond(),
    )?;
    Some(date.and_time(time))
}

fn to_utc_offset(seconds: i32) -> UtcOffset {
    UtcOffset::from_whole_seconds(seconds).unwrap_or(UtcOffset::UTC)
}

/// Offset of `tz` in force at the instant `dt`.
fn offset_at<Tz: TimeZone>(tz: &Tz, dt: OffsetDateTime) -> UtcOffset {
    let utc = dt.to_offset(UtcOffset::UTC);
    to_naive(PrimitiveDateTime::new(utc.date(), utc.time()))
        .map(|naive| to_utc_offset(tz.offset_from_utc_datetime(&naive).fix().local_minus_utc()))
        .unwrap_or(UtcOffset::UTC)
}

/// Offset of `tz` for a wall-clock time. A repeated hour resolves to its
/// earlier instant; a skipped one takes the offset at the same UTC reading.
fn offset_for_wall_clock<Tz: TimeZone>(tz: &Tz, dt: PrimitiveDateTime) -> UtcOffset {
    let Some(naive) = to_naive(dt) else {
        return UtcOffset::UTC;
    };
    let offset = match tz.offset_from_local_datetime(&naive).earliest() {
        Some(offset) => offset.fix(),
        None => tz.offset_from_utc_datetime(&naive).fix(),
    };
    to_utc_offset(offset.local_minus_utc())
}

fn to_zone_primitive<Tz: TimeZone>(tz: &Tz, dt: OffsetDateTime) -> PrimitiveDateTime {
    let local = dt.to_offset(offset_at(tz, dt));
    PrimitiveDateTime::new(local.date(), local.time())
}

fn from_zone_primitive<Tz: TimeZone>(tz: &Tz, dt: PrimitiveDateTime) -> OffsetDateTime {
    dt.assume_offset(offset_for_wall_clock(tz, dt))
}

pub fn to_local_time(dt: OffsetDateTime) -> OffsetDateTime {
    dt.to_offset(offset_at(&chrono::Local, dt))
}

/// Wall-clock form of `dt` in the system zone, resolved per instant.
pub fn to_local_primitive(dt: OffsetDateTime) -> PrimitiveDateTime {
    to_zone_primitive(&chrono::Local, dt)
}

pub fn from_local_primitive(dt: PrimitiveDateTime) -> OffsetDateTime {
    from_zone_primitive(&chrono::Local, dt)
}

pub fn now_local() -> PrimitiveDateTime {
    to_local_primitive(OffsetDateTime::now_utc())
}

/// `HHhMMm`, the duration format used across all listings.
pub fn format_hours_minutes(duration: Duration) -> String {
    let duration = duration.abs();
    format!(
        "{:02}h{:02}m",
        duration.whole_hours(),
        duration.whole_minutes() % 60
    )
}

/// `XhYm` without padding, used in compact labels.
pub fn format_compact(duration: Duration) -> String {
    let duration = duration.abs();
    format!("{}h{}m", duration.whole_hours(), duration.whole_minutes() % 60)
}

pub fn format_clock(dt: OffsetDateTime) -> String {
    let local = to_local_time(dt);
    format!("{:02}:{:02}", local.hour(), local.minute())
}

pub fn format_day(dt: OffsetDateTime) -> String {
    let fmt = format_description!("[year]-[month]-[day]");
    to_local_time(dt).date().format(fmt).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, LocalResult};
    use time::macros::datetime;

    /// Eastern European time for 2026: UTC+2, and UTC+3 between the
    /// 29 March and 25 October switches at 01:00 UTC.
    #[derive(Debug, Clone, Copy)]
    struct Helsinki;

    impl Helsinki {
        fn winter() -> FixedOffset {
            FixedOffset::east_opt(2 * 3600).unwrap()
        }

        fn summer() -> FixedOffset {
            FixedOffset::east_opt(3 * 3600).unwrap()
        }

        fn is_summer(utc: &NaiveDateTime) -> bool {
            let at = |month, day| {
                NaiveDate::from_ymd_opt(2026, month, day)
                    .unwrap()
                    .and_hms_opt(1, 0, 0)
                    .unwrap()
            };
            (at(3, 29)..at(10, 25)).contains(utc)
        }
    }

    impl TimeZone for Helsinki {
        type Offset = FixedOffset;

        fn from_offset(_: &FixedOffset) -> Self {
            Helsinki
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let fits = |offset: FixedOffset| {
                Self::is_summer(&(*local - offset)) == (offset == Self::summer())
            };
            match (fits(Self::summer()), fits(Self::winter())) {
                (true, true) => LocalResult::Ambiguous(Self::summer(), Self::winter()),
                (true, false) => LocalResult::Single(Self::summer()),
                (false, true) => LocalResult::Single(Self::winter()),
                (false, false) => LocalResult::None,
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            if Self::is_summer(utc) {
                Self::summer()
            } else {
                Self::winter()
            }
        }
    }

    #[test]
    fn offset_follows_daylight_saving_per_instant() {
        assert_eq!(
            to_zone_primitive(&Helsinki, datetime!(2026-01-15 08:00 UTC)),
            datetime!(2026-01-15 10:00)
        );
        assert_eq!(
            to_zone_primitive(&Helsinki, datetime!(2026-07-15 08:00 UTC)),
            datetime!(2026-07-15 11:00)
        );
        assert_eq!(
            from_zone_primitive(&Helsinki, datetime!(2026-01-15 10:00)),
            datetime!(2026-01-15 08:00 UTC)
        );
        assert_eq!(
            from_zone_primitive(&Helsinki, datetime!(2026-07-15 11:00)),
            datetime!(2026-07-15 08:00 UTC)
        );
    }

    #[test]
    fn repeated_autumn_hour_resolves_to_the_earlier_instant() {
        assert_eq!(
            from_zone_primitive(&Helsinki, datetime!(2026-10-25 03:30)),
            datetime!(2026-10-25 00:30 UTC)
        );
    }

    #[test]
    fn hours_minutes_are_zero_padded() {
        assert_eq!(format_hours_minutes(Duration::minutes(42)), "00h42m");
        assert_eq!(format_hours_minutes(Duration::minutes(-125)), "02h05m");
        assert_eq!(format_compact(Duration::minutes(125)), "2h5m");
    }

    #[test]
    fn local_round_trip_is_lossless() {
        let now = OffsetDateTime::now_utc()
            .replace_nanosecond(0)
            .unwrap();
        let back = from_local_primitive(to_local_primitive(now));
        assert_eq!(back, now);
    }
}
