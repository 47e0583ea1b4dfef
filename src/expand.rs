//! Expansion orchestrator: items in, concrete instances out.

use std::collections::{HashMap, HashSet};

use crate::generate::{HARD_CAP, OccurrenceGenerator, RruleGenerator};
use crate::item::{ExceptionOverride, ExpandedInstance, RecurrableItem};
use crate::logger::Logger;
use crate::overrides::resolve_occurrence;
use crate::range::QueryRange;
use crate::rule::RecurrenceRule;
use crate::window::resolve_window;

static DEFAULT_GENERATOR: RruleGenerator = RruleGenerator;

/// Drives expansion over a batch of items with injected collaborators.
///
/// The expander is stateless between calls; it borrows the caller's logger
/// (and optionally a generator backend) and holds nothing else, so sharing
/// one across request handlers needs no locking.
pub struct Expander<'a> {
    logger: &'a dyn Logger,
    generator: &'a dyn OccurrenceGenerator,
}

impl<'a> Expander<'a> {
    pub fn new(logger: &'a dyn Logger) -> Self {
        Expander {
            logger,
            generator: &DEFAULT_GENERATOR,
        }
    }

    /// Swap the generation backend (see [`OccurrenceGenerator`]).
    pub fn with_generator(
        logger: &'a dyn Logger,
        generator: &'a dyn OccurrenceGenerator,
    ) -> Self {
        Expander { logger, generator }
    }

    /// Expand every item for the query range. Never fails: a corrupt series
    /// contributes zero instances and the batch carries on.
    ///
    /// Items without a rule, and materialized exception rows (`parent_id`
    /// set), pass through unchanged and unmarked; range-scoping such rows is
    /// the caller's concern. For generated instances, `instance_date` is the
    /// pre-override occurrence instant and `is_recurring_instance` is set.
    ///
    /// Output order: items in input order, each item's instances ascending.
    /// No ordering guarantee across items.
    pub fn expand(
        &self,
        items: &[RecurrableItem],
        range: &QueryRange,
        exceptions: &[ExceptionOverride],
    ) -> Vec<ExpandedInstance> {
        let mut output = Vec::new();

        for item in items {
            if item.rrule.is_none() || item.parent_id.is_some() {
                output.push(ExpandedInstance::from(item.clone()));
                continue;
            }
            self.expand_item(item, range, exceptions, &mut output);
        }

        output
    }

    fn expand_item(
        &self,
        item: &RecurrableItem,
        range: &QueryRange,
        exceptions: &[ExceptionOverride],
        output: &mut Vec<ExpandedInstance>,
    ) {
        let Some(rrule_text) = item.rrule.as_deref() else {
            return;
        };
        // Fault isolation: a malformed rule yields zero instances for this
        // series only.
        let Ok(rule) = RecurrenceRule::parse(rrule_text) else {
            return;
        };

        let window = resolve_window(item, range, self.logger);
        let occurrences = self
            .generator
            .generate(&rule, item.start_at, &window, HARD_CAP);

        let ex_dates: HashSet<_> = item.ex_dates.iter().copied().collect();
        let overrides: HashMap<_, _> = exceptions
            .iter()
            .filter(|exception| exception.parent_id == item.id)
            .map(|exception| (exception.original_date, exception))
            .collect();

        for occurrence in occurrences {
            let Some(fields) =
                resolve_occurrence(item, occurrence, window.duration, &ex_dates, &overrides)
            else {
                continue;
            };
            // Post-merge check: an override may have moved the instance
            // relative to the originally queried range.
            if !range.overlaps(fields.start_at, fields.end_at) {
                continue;
            }
            output.push(ExpandedInstance {
                item: fields,
                is_recurring_instance: true,
                instance_date: Some(occurrence),
            });
        }
    }
}
