//! Per-occurrence exception and exdate resolution.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};

use crate::item::{ExceptionOverride, RecurrableItem};

/// Resolve one candidate occurrence against the item's exdates and stored
/// overrides, keyed by the exact occurrence instant.
///
/// Returns `None` when the occurrence is excluded by an exdate. Otherwise
/// returns the instance fields: the base item's fields at
/// `[occurrence, occurrence + duration]`, with any override's present
/// fields merged on top. An override without `end_at` keeps the original
/// duration relative to its (possibly moved) start; an override whose end
/// lands before its start clamps the end to the start rather than failing.
pub fn resolve_occurrence(
    item: &RecurrableItem,
    occurrence: DateTime<Utc>,
    duration: Duration,
    ex_dates: &HashSet<DateTime<Utc>>,
    overrides: &HashMap<DateTime<Utc>, &ExceptionOverride>,
) -> Option<RecurrableItem> {
    if ex_dates.contains(&occurrence) {
        return None;
    }

    let mut instance = item.clone();
    instance.start_at = occurrence;
    instance.end_at = saturating_add(occurrence, duration);

    if let Some(exception) = overrides.get(&occurrence) {
        let fields = &exception.fields;

        let new_start = fields.start_at.unwrap_or(occurrence);
        let mut new_end = fields
            .end_at
            .unwrap_or_else(|| saturating_add(new_start, duration));
        if new_end < new_start {
            new_end = new_start;
        }
        instance.start_at = new_start;
        instance.end_at = new_end;

        if let Some(title) = &fields.title {
            instance.title = title.clone();
        }
        if let Some(description) = &fields.description {
            instance.description = Some(description.clone());
        }
        if let Some(location) = &fields.location {
            instance.location = Some(location.clone());
        }
        if let Some(is_all_day) = fields.is_all_day {
            instance.is_all_day = is_all_day;
        }
        if let Some(color) = &fields.color {
            instance.color = Some(color.clone());
        }
        if let Some(visibility) = fields.visibility {
            instance.visibility = visibility;
        }
        if let Some(category_id) = &fields.category_id {
            instance.category_id = category_id.clone();
        }
    }

    Some(instance)
}

/// Add a non-negative duration without panicking near the edge of the
/// representable range.
fn saturating_add(instant: DateTime<Utc>, duration: Duration) -> DateTime<Utc> {
    instant
        .checked_add_signed(duration)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
