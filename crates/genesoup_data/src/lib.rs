//! Core data structures for the Genesoup simulation.
//!
//! Everything in this crate is plain state. Behavior lives in `genesoup_core`.

pub mod data;

pub use data::creature::{Creature, Laser, Lineage, Traits};
pub use data::event::LiveEvent;
pub use data::food::Food;
pub use data::gene::{Gene, Instruction, CATALOG_LEN};
pub use data::geometry::{BodyHandle, CollisionLayer, Shape, Vec2};
pub use data::program::{Program, ProgramError};
