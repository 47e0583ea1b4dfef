//! Recurrence expansion engine for the almanac calendar ecosystem.
//!
//! This crate turns a compact RFC 5545 RRULE plus a base calendar item into
//! a bounded, range-filtered list of concrete instances. Storage, HTTP, and
//! auth live upstream; the engine is a pure computation that the request
//! layer calls with already-loaded items and exceptions:
//!
//! - [`rule`] parses and validates the supported RRULE subset
//! - [`generate`] produces candidate occurrence instants (pluggable backend)
//! - [`window`] resolves item duration and widens the generation window
//! - [`overrides`] applies per-occurrence exdates and field overrides
//! - [`range`] holds the half-open query range and the final overlap test
//! - [`expand`] orchestrates the above across a batch of items
//!
//! The one observable side effect is a structured warning when an item's
//! end precedes its start; it goes through an injected [`logger::Logger`]
//! so the engine stays free of process-wide state.

pub mod error;
pub mod expand;
pub mod generate;
pub mod item;
pub mod logger;
pub mod overrides;
pub mod range;
pub mod rule;
pub mod window;

pub use error::{AlmanacError, AlmanacResult};
pub use expand::Expander;
pub use generate::{HARD_CAP, OccurrenceGenerator, RruleGenerator};
pub use item::{ExceptionOverride, ExpandedInstance, OverrideFields, RecurrableItem, Visibility};
pub use logger::{Logger, NoopLogger, TracingLogger};
pub use range::QueryRange;
pub use rule::{Frequency, RecurrenceRule, RuleParseError, validate_rrule};
pub use window::{ExpansionWindow, resolve_window};
