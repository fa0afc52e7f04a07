//! Domain layer: the resolution pipeline and the roll log aggregate.

pub mod ability;
pub mod activation;
pub mod aggregates;
pub mod apply;
pub mod commands;
pub mod condition;
pub mod context;
pub mod effect;
pub mod events;
pub mod filter;
pub mod normalize;
pub mod orchestrator;
pub mod outcome;
pub mod sources;
