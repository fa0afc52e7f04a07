//! HTTP API for the HabitQuest roll engine.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
