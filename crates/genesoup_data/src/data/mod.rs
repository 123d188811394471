//! Core data structures for the Genesoup simulation.

pub mod creature;
pub mod event;
pub mod food;
pub mod gene;
pub mod geometry;
pub mod program;
