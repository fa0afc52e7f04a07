//! Shared domain abstractions for HabitQuest.
//!
//! Traits and types every bounded context depends on: errors, time and
//! randomness seams, events, aggregates, and the event repository contract.
//! It contains no infrastructure code.

pub mod aggregate;
pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod repository;
pub mod rng;
