//! Engine-neutral calendar item types.
//!
//! These mirror the wire shape the surrounding service speaks (camelCase
//! JSON, ISO-8601 UTC instants). The engine reads them, expands recurring
//! ones into instances, and never persists anything.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A calendar item as loaded by the caller, possibly carrying a recurrence
/// rule.
///
/// Invariant: `rrule` and `parent_id` are mutually exclusive. An item with
/// `parent_id` set is itself a materialized exception row and is never
/// re-expanded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrableItem {
    pub id: String,
    pub owner_id: String,
    pub category_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub is_all_day: bool,
    #[serde(default)]
    pub color: Option<String>,
    pub visibility: Visibility,

    // Recurrence fields
    /// RFC 5545 RRULE text for master items
    #[serde(default)]
    pub rrule: Option<String>,
    /// Excluded occurrence start instants (exact-timestamp matches)
    #[serde(default)]
    pub ex_dates: Vec<DateTime<Utc>>,
    /// Set when this row is a materialized exception of another item
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Original occurrence instant for a materialized exception row
    #[serde(default)]
    pub original_date: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Who can see an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

/// A per-occurrence override stored against a recurring item.
///
/// `original_date` must equal the unmodified generated occurrence start
/// instant; matching is exact-timestamp, not date-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionOverride {
    pub id: String,
    pub parent_id: String,
    pub owner_id: String,
    pub original_date: DateTime<Utc>,
    pub fields: OverrideFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial item fields carried by an override. Absent fields keep the base
/// item's value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverrideFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_all_day: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
}

/// One row of expansion output: either a pass-through item (markers unset) or
/// a materialized recurring instance.
///
/// `instance_date` is the original, pre-override occurrence start. It stays
/// the stable identity key even when an override has moved the displayed
/// start.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandedInstance {
    #[serde(flatten)]
    pub item: RecurrableItem,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub is_recurring_instance: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub instance_date: Option<DateTime<Utc>>,
}

impl From<RecurrableItem> for ExpandedInstance {
    /// Pass-through conversion: the item as-is, no recurrence markers.
    fn from(item: RecurrableItem) -> Self {
        ExpandedInstance {
            item,
            is_recurring_instance: false,
            instance_date: None,
        }
    }
}
