use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Journal days roll over at midnight UTC+9 regardless of host timezone.
pub const KST_OFFSET_HOURS: i64 = 9;

/// Calendar day of `instant` in KST.
pub fn kst_date(instant: DateTime<Utc>) -> NaiveDate {
    (instant.naive_utc() + Duration::hours(KST_OFFSET_HOURS)).date()
}

pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Wall clock, KST.
#[derive(Debug, Clone, Copy, Default)]
pub struct KstClock;

impl Clock for KstClock {
    fn today(&self) -> NaiveDate {
        kst_date(Utc::now())
    }
}

/// Pinned day, for backfilling and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn kst_rolls_over_at_15_utc() {
        let before = Utc.with_ymd_and_hms(2026, 3, 1, 14, 59, 59).unwrap();
        let after = Utc.with_ymd_and_hms(2026, 3, 1, 15, 0, 0).unwrap();
        assert_eq!(kst_date(before), NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert_eq!(kst_date(after), NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
    }

    #[test]
    fn fixed_clock_returns_pinned_day() {
        let day = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        assert_eq!(FixedClock(day).today(), day);
    }
}
