//! Shared application state.

use std::sync::{Arc, Mutex};

use habitquest_core::clock::Clock;
use habitquest_core::repository::EventRepository;
use habitquest_core::rng::DeterministicRng;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Source of "now" for event timestamps and effect expiry.
    pub clock: Arc<dyn Clock + Send + Sync>,
    /// Dice for rolls submitted without a die value.
    pub rng: Arc<Mutex<dyn DeterministicRng + Send>>,
    /// Roll log storage.
    pub event_repository: Arc<dyn EventRepository>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock + Send + Sync>,
        rng: Arc<Mutex<dyn DeterministicRng + Send>>,
        event_repository: Arc<dyn EventRepository>,
    ) -> Self {
        Self {
            clock,
            rng,
            event_repository,
        }
    }
}
