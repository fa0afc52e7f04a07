//! HabitQuest event store.
//!
//! Storage technology is left to deployments; this crate ships the
//! process-local store the API server runs on.

pub mod memory_event_repository;
