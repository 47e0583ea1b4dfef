//! RFC 5545 RRULE subset parser and validator.
//!
//! The engine supports the rule shapes the calendar UI can author: DAILY,
//! WEEKLY (optionally with a weekday list), MONTHLY (by month-day or by a
//! single positional weekday such as `2TU`), and YEARLY, each with INTERVAL
//! and at most one of COUNT/UNTIL.
//!
//! [`RecurrenceRule::parse`] never panics and never logs; batch expansion
//! turns a parse failure into zero instances for that series. Only
//! [`validate_rrule`] raises, for callers that are actively authoring a rule.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc, Weekday};
use thiserror::Error;

use crate::error::{AlmanacError, AlmanacResult};

/// Why a rule string failed to parse. The `Display` text is the human
/// message surfaced through [`validate_rrule`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleParseError {
    #[error("missing FREQ attribute")]
    MissingFreq,

    #[error("unsupported FREQ '{0}'")]
    UnsupportedFreq(String),

    #[error("malformed attribute '{0}'")]
    MalformedAttribute(String),

    #[error("invalid {key} value '{value}'")]
    InvalidValue { key: &'static str, value: String },

    #[error("COUNT and UNTIL are mutually exclusive")]
    CountAndUntil,
}

/// Supported recurrence frequencies. Sub-daily frequencies (SECONDLY,
/// MINUTELY, HOURLY) are rejected at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        }
    }
}

/// A parsed recurrence rule. Not persisted; rebuilt from the item's RRULE
/// text on every expansion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    /// Step between periods, always >= 1.
    pub interval: u32,
    /// Plain BYDAY weekday list (`MO,WE,FR`). Empty when unset.
    pub by_weekday: Vec<Weekday>,
    /// Single positional BYDAY form (`2TU` = 2nd Tuesday, `-1FR` = last
    /// Friday). Mutually exclusive with a multi-entry weekday list.
    pub by_position: Option<(i32, Weekday)>,
    /// BYMONTHDAY, 1..=31. Months shorter than the value produce no
    /// occurrence.
    pub by_month_day: Option<u32>,
    pub count: Option<u32>,
    /// Inclusive end instant for the series.
    pub until: Option<DateTime<Utc>>,
}

impl RecurrenceRule {
    /// Parse an RRULE attribute string (`FREQ=WEEKLY;BYDAY=MO,WE`).
    ///
    /// Unknown keys are ignored for forward compatibility; malformed values
    /// of known keys are errors. An empty string reports missing FREQ.
    pub fn parse(input: &str) -> Result<RecurrenceRule, RuleParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(RuleParseError::MissingFreq);
        }

        let mut frequency = None;
        let mut interval = 1u32;
        let mut by_weekday = Vec::new();
        let mut by_position = None;
        let mut by_month_day = None;
        let mut count = None;
        let mut until = None;

        for segment in trimmed.split(';') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let Some((key, value)) = segment.split_once('=') else {
                return Err(RuleParseError::MalformedAttribute(segment.to_string()));
            };

            match key.to_ascii_uppercase().as_str() {
                "FREQ" => {
                    frequency = Some(parse_frequency(value)?);
                }
                "INTERVAL" => {
                    interval = parse_positive_int(value)
                        .ok_or_else(|| RuleParseError::InvalidValue {
                            key: "INTERVAL",
                            value: value.to_string(),
                        })?;
                }
                "BYDAY" => {
                    let (list, positional) = parse_by_day(value)?;
                    by_weekday = list;
                    by_position = positional;
                }
                "BYMONTHDAY" => {
                    by_month_day = value
                        .parse::<u32>()
                        .ok()
                        .filter(|day| (1..=31).contains(day))
                        .map(Some)
                        .ok_or_else(|| RuleParseError::InvalidValue {
                            key: "BYMONTHDAY",
                            value: value.to_string(),
                        })?;
                }
                "COUNT" => {
                    count = parse_positive_int(value)
                        .map(Some)
                        .ok_or_else(|| RuleParseError::InvalidValue {
                            key: "COUNT",
                            value: value.to_string(),
                        })?;
                }
                "UNTIL" => {
                    until = Some(parse_until(value)?);
                }
                // Unknown keys (WKST, BYMONTH, ...) are not interpreted.
                _ => {}
            }
        }

        let frequency = frequency.ok_or(RuleParseError::MissingFreq)?;
        if count.is_some() && until.is_some() {
            return Err(RuleParseError::CountAndUntil);
        }

        Ok(RecurrenceRule {
            frequency,
            interval,
            by_weekday,
            by_position,
            by_month_day,
            count,
            until,
        })
    }

    /// Re-serialize into canonical RRULE text for the generator backend.
    pub fn to_rrule_string(&self) -> String {
        let mut parts = vec![format!("FREQ={}", self.frequency.as_str())];

        if self.interval != 1 {
            parts.push(format!("INTERVAL={}", self.interval));
        }
        if let Some((ordinal, weekday)) = self.by_position {
            parts.push(format!("BYDAY={}{}", ordinal, weekday_code(weekday)));
        } else if !self.by_weekday.is_empty() {
            let codes: Vec<&str> = self.by_weekday.iter().map(|wd| weekday_code(*wd)).collect();
            parts.push(format!("BYDAY={}", codes.join(",")));
        }
        if let Some(day) = self.by_month_day {
            parts.push(format!("BYMONTHDAY={day}"));
        }
        if let Some(count) = self.count {
            parts.push(format!("COUNT={count}"));
        }
        if let Some(until) = self.until {
            parts.push(format!("UNTIL={}", until.format("%Y%m%dT%H%M%SZ")));
        }

        parts.join(";")
    }
}

/// Validate a rule a user is authoring.
///
/// Returns [`AlmanacError::InvalidRrule`] (HTTP 422, code `INVALID_RRULE`)
/// with a human message on any unsupported or malformed rule.
pub fn validate_rrule(rule: &str) -> AlmanacResult<()> {
    RecurrenceRule::parse(rule)
        .map(|_| ())
        .map_err(|err| AlmanacError::InvalidRrule {
            message: err.to_string(),
        })
}

fn parse_frequency(value: &str) -> Result<Frequency, RuleParseError> {
    match value.to_ascii_uppercase().as_str() {
        "DAILY" => Ok(Frequency::Daily),
        "WEEKLY" => Ok(Frequency::Weekly),
        "MONTHLY" => Ok(Frequency::Monthly),
        "YEARLY" => Ok(Frequency::Yearly),
        other => Err(RuleParseError::UnsupportedFreq(other.to_string())),
    }
}

fn parse_positive_int(value: &str) -> Option<u32> {
    value.parse::<u32>().ok().filter(|n| *n > 0)
}

/// Parse BYDAY: either a plain weekday list or a single positional token.
/// A positional token inside a multi-entry list is rejected rather than
/// silently stripped of its ordinal.
fn parse_by_day(value: &str) -> Result<(Vec<Weekday>, Option<(i32, Weekday)>), RuleParseError> {
    let invalid = || RuleParseError::InvalidValue {
        key: "BYDAY",
        value: value.to_string(),
    };

    let tokens: Vec<&str> = value.split(',').map(str::trim).collect();
    if tokens.iter().any(|token| token.is_empty()) {
        return Err(invalid());
    }

    if tokens.len() == 1 {
        let token = tokens[0];
        let split = token
            .char_indices()
            .find(|(_, c)| c.is_ascii_alphabetic())
            .map(|(idx, _)| idx)
            .ok_or_else(invalid)?;
        let weekday = weekday_from_code(&token[split..]).ok_or_else(invalid)?;
        if split == 0 {
            return Ok((vec![weekday], None));
        }
        let ordinal: i32 = token[..split].parse().map_err(|_| invalid())?;
        if ordinal == 0 {
            return Err(invalid());
        }
        return Ok((Vec::new(), Some((ordinal, weekday))));
    }

    let mut list = Vec::with_capacity(tokens.len());
    for token in tokens {
        let weekday = weekday_from_code(token).ok_or_else(invalid)?;
        if !list.contains(&weekday) {
            list.push(weekday);
        }
    }
    Ok((list, None))
}

/// UNTIL accepts the RRULE basic forms: `YYYYMMDDTHHMMSSZ` or `YYYYMMDD`
/// (midnight UTC).
fn parse_until(value: &str) -> Result<DateTime<Utc>, RuleParseError> {
    let invalid = || RuleParseError::InvalidValue {
        key: "UNTIL",
        value: value.to_string(),
    };

    if value.contains('T') {
        NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%SZ")
            .map(|dt| dt.and_utc())
            .map_err(|_| invalid())
    } else {
        NaiveDate::parse_from_str(value, "%Y%m%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
            .ok_or_else(invalid)
    }
}

fn weekday_from_code(code: &str) -> Option<Weekday> {
    match code.to_ascii_uppercase().as_str() {
        "MO" => Some(Weekday::Mon),
        "TU" => Some(Weekday::Tue),
        "WE" => Some(Weekday::Wed),
        "TH" => Some(Weekday::Thu),
        "FR" => Some(Weekday::Fri),
        "SA" => Some(Weekday::Sat),
        "SU" => Some(Weekday::Sun),
        _ => None,
    }
}

fn weekday_code(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}
