//! Aggregate root abstraction.

use uuid::Uuid;

use crate::event::DomainEvent;

/// An event-sourced aggregate: rebuilt by replaying its stream, extended by
/// buffering new events until the repository accepts them.
pub trait AggregateRoot: Send + Sync {
    /// The event type this aggregate produces and consumes.
    type Event: DomainEvent;

    /// Returns the aggregate identifier (the stream key).
    fn aggregate_id(&self) -> Uuid;

    /// Returns the number of persisted events applied so far.
    fn version(&self) -> i64;

    /// Folds one event into the aggregate state.
    fn apply(&mut self, event: &Self::Event);

    /// Returns events produced since the last successful append.
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Drops the buffered events once they are persisted.
    fn clear_uncommitted_events(&mut self);
}
