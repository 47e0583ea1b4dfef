//! Injected logging capability.
//!
//! The engine owns no process-wide logger. The single warning it can emit
//! (negative-duration clamp, see [`crate::window`]) goes through a `Logger`
//! the caller supplies, which keeps the engine pure and testable.

use serde_json::Value;

/// Structured warning sink supplied by the caller.
pub trait Logger: Send + Sync {
    fn warn(&self, context: Value, message: &str);
}

/// Adapter onto the `tracing` ecosystem, the default for service callers.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn warn(&self, context: Value, message: &str) {
        tracing::warn!(context = %context, "{message}");
    }
}

/// Discards all warnings.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn warn(&self, _context: Value, _message: &str) {}
}
