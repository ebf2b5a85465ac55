//! Deterministic date-range resolution from the user's own wording.
//!
//! The model's date arithmetic is never trusted: statement date ranges are
//! recomputed here from the ORIGINAL utterance, so they stay auditable no
//! matter what the model wrote into its reply.

use std::sync::OnceLock;

use chrono::{Duration, NaiveDateTime};
use log::warn;
use regex::Regex;

/// Day count assumed when the utterance carries no relative-date phrase.
pub const DEFAULT_RELATIVE_DAYS: i64 = 30;

const STAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Matches "son <N> <unit>" ("last N days/months/years"); the year unit has
/// two spellings (yıl, sene). ASCII variants cover transliterated input.
fn phrase_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\bson\s+(\d+)\s+(gün|gun|ay|yıl|yil|sene)\b")
            .expect("relative date pattern is valid")
    })
}

/// A concrete date range derived from a relative-date phrase.
#[derive(Debug, Clone, PartialEq)]
pub struct RelativeDateRange {
    /// Resolved day count (years ×365, months ×30, days ×1).
    pub days: i64,
    /// False when the 30-day default was applied.
    pub explicit: bool,
    /// Start of range, time-of-day floored to 00:00:00.
    pub start: NaiveDateTime,
    /// End of range, time-of-day ceiled to 23:59:59.
    pub end: NaiveDateTime,
}

impl RelativeDateRange {
    pub fn start_stamp(&self) -> String {
        self.start.format(STAMP_FORMAT).to_string()
    }

    pub fn end_stamp(&self) -> String {
        self.end.format(STAMP_FORMAT).to_string()
    }
}

/// Resolves the date range for `utterance` relative to `now`.
///
/// All arithmetic on the user-supplied count is checked: a count the
/// calendar cannot represent degrades to the default window instead of
/// failing the request.
pub fn resolve_relative_range(utterance: &str, now: NaiveDateTime) -> RelativeDateRange {
    let end = now
        .date()
        .and_hms_opt(23, 59, 59)
        .expect("23:59:59 is a valid time");

    let requested = phrase_pattern().captures(utterance).and_then(|caps| {
        let count: i64 = caps[1].parse().ok()?;
        match caps[2].to_lowercase().as_str() {
            "gün" | "gun" => Some(count),
            "ay" => count.checked_mul(30),
            _ => count.checked_mul(365),
        }
    });

    let (days, explicit) = match requested {
        Some(days) if start_of_window(end, days).is_some() => (days, true),
        Some(days) => {
            warn!(
                "Relative window of {} days exceeds the calendar, using the {}-day default",
                days, DEFAULT_RELATIVE_DAYS
            );
            (DEFAULT_RELATIVE_DAYS, false)
        }
        None => (DEFAULT_RELATIVE_DAYS, false),
    };

    let start = start_of_window(end, days).unwrap_or_else(|| {
        end.date()
            .and_hms_opt(0, 0, 0)
            .expect("00:00:00 is a valid time")
    });

    RelativeDateRange {
        days,
        explicit,
        start,
        end,
    }
}

fn start_of_window(end: NaiveDateTime, days: i64) -> Option<NaiveDateTime> {
    let start = end.checked_sub_signed(Duration::try_days(days)?)?;
    start.date().and_hms_opt(0, 0, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(14, 45, 12)
            .unwrap()
    }

    #[test]
    fn three_months_resolve_to_ninety_days() {
        let range = resolve_relative_range("son 3 ay hesap hareketlerimi gönder", fixed_now());
        assert!(range.explicit);
        assert_eq!(range.days, 90);
        assert_eq!(range.end_stamp(), "2024-03-15T23:59:59");
        assert_eq!(range.start_stamp(), "2023-12-16T00:00:00");
    }

    #[test]
    fn days_and_both_year_spellings() {
        let now = fixed_now();
        assert_eq!(resolve_relative_range("son 10 gün", now).days, 10);
        assert_eq!(resolve_relative_range("son 1 yıl", now).days, 365);
        assert_eq!(resolve_relative_range("son 2 sene", now).days, 730);
    }

    #[test]
    fn missing_phrase_defaults_to_thirty_days() {
        let range = resolve_relative_range("hesap özetimi gönderir misin", fixed_now());
        assert!(!range.explicit);
        assert_eq!(range.days, DEFAULT_RELATIVE_DAYS);
        assert_eq!(range.end_stamp(), "2024-03-15T23:59:59");
        assert_eq!(range.start_stamp(), "2024-02-14T00:00:00");
    }

    #[test]
    fn counts_beyond_the_calendar_degrade_to_default() {
        let now = fixed_now();

        // Underflows chrono's date range once multiplied out.
        let huge = resolve_relative_range("son 999999999 yıl özet istiyorum", now);
        assert!(!huge.explicit);
        assert_eq!(huge.days, DEFAULT_RELATIVE_DAYS);
        assert_eq!(huge.start_stamp(), "2024-02-14T00:00:00");
        assert_eq!(huge.end_stamp(), "2024-03-15T23:59:59");

        // Representable as a day count but earlier than any valid date.
        let moderate = resolve_relative_range("son 300000 yıl", now);
        assert!(!moderate.explicit);
        assert_eq!(moderate.days, DEFAULT_RELATIVE_DAYS);

        // Overflows i64 during parsing of the count itself.
        let unparsable = resolve_relative_range("son 99999999999999999999 ay", now);
        assert!(!unparsable.explicit);
        assert_eq!(unparsable.days, DEFAULT_RELATIVE_DAYS);

        // Day count at the i64 ceiling survives without multiplying.
        let ceiling = resolve_relative_range("son 9223372036854775807 gün", now);
        assert!(!ceiling.explicit);
        assert_eq!(ceiling.days, DEFAULT_RELATIVE_DAYS);
    }

    #[test]
    fn match_is_case_insensitive() {
        let range = resolve_relative_range("SON 6 AY özet istiyorum", fixed_now());
        assert!(range.explicit);
        assert_eq!(range.days, 180);
    }
}
