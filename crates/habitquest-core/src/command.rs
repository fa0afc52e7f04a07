//! Command abstractions.

use uuid::Uuid;

/// A request to change state, routed to exactly one handler.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// Stable command name used in logs, e.g. `rules.resolve_roll`.
    fn command_type(&self) -> &'static str;

    /// Correlation ID carried onto every event the command produces.
    fn correlation_id(&self) -> Uuid;
}
