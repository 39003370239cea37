//! Instants as PostgreSQL stores them.
//!
//! `timestamptz` keeps microseconds, so anything the domain hands to a
//! repository is truncated first. Otherwise a freshly created record would
//! differ from the same record read back.

use chrono::{DateTime, SubsecRound, Utc};

/// Fractional-second digits kept by `timestamptz`.
pub const STORED_SUBSEC_DIGITS: u16 = 6;

/// Drop sub-microsecond precision from `at`.
#[must_use]
pub fn stored_instant(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(STORED_SUBSEC_DIGITS)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Timelike};
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(123_456_789, 123_456_000)]
    #[case(999_999_999, 999_999_000)]
    #[case(500_000_000, 500_000_000)]
    #[case(0, 0)]
    fn nanoseconds_are_truncated_to_microseconds(#[case] nanos: u32, #[case] expected: u32) {
        let at = Utc
            .timestamp_opt(1_772_000_000, nanos)
            .single()
            .expect("valid timestamp");

        let stored = stored_instant(at);
        assert_eq!(stored.nanosecond(), expected);
        assert_eq!(stored.timestamp(), at.timestamp());
    }

    #[rstest]
    fn truncation_is_idempotent() {
        let at = Utc
            .timestamp_opt(1_772_000_000, 42_424_242)
            .single()
            .expect("valid timestamp");
        assert_eq!(stored_instant(stored_instant(at)), stored_instant(at));
    }
}
