//! Candidate occurrence generation for one recurrence rule.
//!
//! Generation is the pluggable seam of the engine: the orchestrator only
//! needs ascending candidate start instants inside a bounded window. The
//! default backend drives the `rrule` crate over canonical RRULE text, the
//! same way the sync layer expands master events from ICS data.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use rrule::RRuleSet;

use crate::rule::RecurrenceRule;
use crate::window::ExpansionWindow;

/// Engine-wide safety cap on generated instants per series per call. Not
/// tied to any request parameter; bounds work on pathological inputs such
/// as a decades-wide query against a daily rule.
pub const HARD_CAP: u16 = 1000;

/// Source of candidate occurrence start instants for one rule.
///
/// Implementations must be pure: a finite, ascending, restartable sequence
/// that is a function of the inputs alone. Exceptions and exdates are NOT
/// applied here; candidates come out raw so the resolver can key overrides
/// off the original instants.
pub trait OccurrenceGenerator: Send + Sync {
    fn generate(
        &self,
        rule: &RecurrenceRule,
        anchor: DateTime<Utc>,
        window: &ExpansionWindow,
        cap: u16,
    ) -> Vec<DateTime<Utc>>;
}

/// Default backend over the `rrule` crate.
///
/// The parsed rule is re-serialized to `DTSTART` + `RRULE` lines and handed
/// to `RRuleSet`, which carries the RFC 5545 semantics the engine relies on:
/// COUNT counts from the anchor regardless of the window, UNTIL is
/// inclusive, BYMONTHDAY skips months without that day, and a yearly rule
/// anchored on Feb 29 skips non-leap years.
///
/// RRULE text has no sub-second precision, so the anchor is truncated to
/// whole seconds and every emitted instant is second-granularity.
#[derive(Debug, Default, Clone, Copy)]
pub struct RruleGenerator;

impl OccurrenceGenerator for RruleGenerator {
    fn generate(
        &self,
        rule: &RecurrenceRule,
        anchor: DateTime<Utc>,
        window: &ExpansionWindow,
        cap: u16,
    ) -> Vec<DateTime<Utc>> {
        let anchor = anchor.trunc_subsecs(0);
        let source = format!(
            "DTSTART:{}\nRRULE:{}",
            anchor.format("%Y%m%dT%H%M%SZ"),
            rule.to_rrule_string()
        );

        // A rule that passed our parser should always re-parse; if the
        // backend still rejects it, the series degrades to zero instances.
        let rrule_set: RRuleSet = match source.parse() {
            Ok(set) => set,
            Err(_) => return Vec::new(),
        };

        // after/before are exclusive, so widen by 1s to keep the window
        // boundaries inclusive. The overlap filter re-checks precisely.
        // Checked arithmetic: a saturated window may already sit at the
        // edge of the representable range.
        let tz: rrule::Tz = rrule::Tz::UTC;
        let after = window
            .gen_start
            .checked_sub_signed(Duration::seconds(1))
            .unwrap_or(window.gen_start)
            .with_timezone(&tz);
        let before = window
            .gen_end
            .checked_add_signed(Duration::seconds(1))
            .unwrap_or(window.gen_end)
            .with_timezone(&tz);

        let result = rrule_set.after(after).before(before).all(cap);

        result
            .dates
            .iter()
            .map(|occurrence| occurrence.with_timezone(&Utc))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn window(start: DateTime<Utc>, end: DateTime<Utc>) -> ExpansionWindow {
        ExpansionWindow {
            duration: Duration::zero(),
            gen_start: start,
            gen_end: end,
        }
    }

    fn parse(rule: &str) -> RecurrenceRule {
        RecurrenceRule::parse(rule).expect("test rule should parse")
    }

    #[test]
    fn daily_rule_steps_by_interval_days() {
        let anchor = Utc.with_ymd_and_hms(2026, 3, 15, 10, 0, 0).unwrap();
        let w = window(
            Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 21, 0, 0, 0).unwrap(),
        );

        let dates = RruleGenerator.generate(&parse("FREQ=DAILY"), anchor, &w, HARD_CAP);
        assert_eq!(dates.len(), 6);
        assert_eq!(dates[0], anchor);
        assert_eq!(dates[5], Utc.with_ymd_and_hms(2026, 3, 20, 10, 0, 0).unwrap());

        let every_other =
            RruleGenerator.generate(&parse("FREQ=DAILY;INTERVAL=2"), anchor, &w, HARD_CAP);
        assert_eq!(dates[0], every_other[0]);
        assert_eq!(every_other.len(), 3);
        assert_eq!(
            every_other[1],
            Utc.with_ymd_and_hms(2026, 3, 17, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn weekly_without_byday_steps_by_interval_weeks_from_anchor() {
        // 2026-03-02 is a Monday; no BYDAY, so only the anchor weekday fires.
        let anchor = Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap();
        let w = window(
            Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 4, 6, 0, 0, 0).unwrap(),
        );

        let dates =
            RruleGenerator.generate(&parse("FREQ=WEEKLY;INTERVAL=2"), anchor, &w, HARD_CAP);
        assert_eq!(
            dates,
            vec![
                anchor,
                anchor + Duration::days(14),
                anchor + Duration::days(28),
            ]
        );
    }

    #[test]
    fn weekly_byday_emits_each_matching_weekday_at_anchor_time() {
        // 2026-03-02 is a Monday.
        let anchor = Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap();
        let w = window(
            Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 9, 0, 0, 0).unwrap(),
        );

        let dates =
            RruleGenerator.generate(&parse("FREQ=WEEKLY;BYDAY=MO,WE,FR"), anchor, &w, HARD_CAP);
        assert_eq!(
            dates,
            vec![
                Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap(),
                Utc.with_ymd_and_hms(2026, 3, 4, 9, 30, 0).unwrap(),
                Utc.with_ymd_and_hms(2026, 3, 6, 9, 30, 0).unwrap(),
            ]
        );
    }

    #[test]
    fn monthly_positional_byday_lands_on_nth_weekday() {
        // 2026-01-13 is the second Tuesday of January 2026.
        let anchor = Utc.with_ymd_and_hms(2026, 1, 13, 10, 0, 0).unwrap();
        let w = window(
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap(),
        );

        let dates =
            RruleGenerator.generate(&parse("FREQ=MONTHLY;BYDAY=2TU"), anchor, &w, HARD_CAP);
        assert_eq!(
            dates,
            vec![
                Utc.with_ymd_and_hms(2026, 1, 13, 10, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2026, 2, 10, 10, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2026, 3, 10, 10, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2026, 4, 14, 10, 0, 0).unwrap(),
            ]
        );
    }

    #[test]
    fn monthly_by_month_day_skips_short_months() {
        let anchor = Utc.with_ymd_and_hms(2026, 1, 31, 12, 0, 0).unwrap();
        let w = window(
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap(),
        );

        let dates = RruleGenerator.generate(
            &parse("FREQ=MONTHLY;BYMONTHDAY=31"),
            anchor,
            &w,
            HARD_CAP,
        );
        // February and April have no day 31; no clamping, no roll-forward.
        assert_eq!(
            dates,
            vec![
                Utc.with_ymd_and_hms(2026, 1, 31, 12, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2026, 3, 31, 12, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2026, 5, 31, 12, 0, 0).unwrap(),
            ]
        );
    }

    #[test]
    fn yearly_feb_29_skips_non_leap_years() {
        let anchor = Utc.with_ymd_and_hms(2024, 2, 29, 8, 0, 0).unwrap();
        let w = window(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2029, 1, 1, 0, 0, 0).unwrap(),
        );

        let dates = RruleGenerator.generate(&parse("FREQ=YEARLY"), anchor, &w, HARD_CAP);
        assert_eq!(
            dates,
            vec![
                Utc.with_ymd_and_hms(2024, 2, 29, 8, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2028, 2, 29, 8, 0, 0).unwrap(),
            ]
        );
    }

    #[test]
    fn count_is_counted_from_anchor_not_window() {
        let anchor = Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap();
        let w = window(
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap(),
        );

        let dates = RruleGenerator.generate(&parse("FREQ=DAILY;COUNT=5"), anchor, &w, HARD_CAP);
        assert_eq!(dates.len(), 5);
        assert_eq!(dates[4], Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap());
    }

    #[test]
    fn until_is_inclusive() {
        let anchor = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        let w = window(
            Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap(),
        );

        let dates = RruleGenerator.generate(
            &parse("FREQ=DAILY;UNTIL=20260303T100000Z"),
            anchor,
            &w,
            HARD_CAP,
        );
        assert_eq!(dates.len(), 3);
        assert_eq!(dates[2], Utc.with_ymd_and_hms(2026, 3, 3, 10, 0, 0).unwrap());
    }

    #[test]
    fn hard_cap_truncates_runaway_series() {
        let anchor = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let w = window(
            Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        );

        // ~2192 daily occurrences in range; the cap wins.
        let dates = RruleGenerator.generate(&parse("FREQ=DAILY"), anchor, &w, HARD_CAP);
        assert_eq!(dates.len(), usize::from(HARD_CAP));
    }

    #[test]
    fn fractional_second_anchor_truncates_to_whole_seconds() {
        let anchor = Utc
            .with_ymd_and_hms(2026, 3, 15, 10, 0, 0)
            .unwrap()
            .with_nanosecond(250_000_000)
            .unwrap();
        let w = window(
            Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 17, 0, 0, 0).unwrap(),
        );

        let dates = RruleGenerator.generate(&parse("FREQ=DAILY"), anchor, &w, HARD_CAP);
        assert_eq!(dates[0], Utc.with_ymd_and_hms(2026, 3, 15, 10, 0, 0).unwrap());
        assert_eq!(dates[0], anchor.trunc_subsecs(0));
    }

    #[test]
    fn generation_is_restartable() {
        let anchor = Utc.with_ymd_and_hms(2026, 3, 15, 10, 0, 0).unwrap();
        let w = window(
            Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 21, 0, 0, 0).unwrap(),
        );
        let rule = parse("FREQ=DAILY");

        let first = RruleGenerator.generate(&rule, anchor, &w, HARD_CAP);
        let second = RruleGenerator.generate(&rule, anchor, &w, HARD_CAP);
        assert_eq!(first, second);
    }
}
