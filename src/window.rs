//! Item duration and generation-window resolution.

use chrono::{DateTime, Duration, Utc};
use serde_json::json;

use crate::item::RecurrableItem;
use crate::logger::Logger;
use crate::range::QueryRange;

/// Generation bounds for one recurring item.
///
/// `gen_start` is pulled back by the item's duration so an occurrence that
/// starts before the query range but runs into it still gets generated;
/// the overlap filter makes the final call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionWindow {
    pub duration: Duration,
    pub gen_start: DateTime<Utc>,
    pub gen_end: DateTime<Utc>,
}

/// Compute the item's duration and the widened generation window.
///
/// A negative raw duration (endAt before startAt) clamps to zero and emits
/// the engine's only warning, once per item. Widening with the raw negative
/// value instead would shift `gen_start` forward and silently drop
/// zero-duration occurrences at or after the range start.
pub fn resolve_window(
    item: &RecurrableItem,
    range: &QueryRange,
    logger: &dyn Logger,
) -> ExpansionWindow {
    let raw = item.end_at - item.start_at;
    let duration = if raw < Duration::zero() {
        logger.warn(
            json!({
                "itemId": item.id,
                "startAt": item.start_at,
                "endAt": item.end_at,
            }),
            "Recurring event has endAt before startAt, clamping duration to 0",
        );
        Duration::zero()
    } else {
        raw
    };

    // Saturate rather than panic when an extreme duration pushes the
    // widened start past the representable range.
    let gen_start = range
        .start
        .checked_sub_signed(duration)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    ExpansionWindow {
        duration,
        gen_start,
        gen_end: range.end,
    }
}
