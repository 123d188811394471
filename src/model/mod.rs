//! Facade over the engine crates, so the app and tests depend on one path.

pub use genesoup_data::{
    BodyHandle, CollisionLayer, Creature, Food, Gene, Instruction, Laser, Lineage, LiveEvent,
    Program, ProgramError, Shape, Traits, Vec2, CATALOG_LEN,
};

pub mod catalog {
    pub use genesoup_core::catalog::*;
}
pub mod config {
    pub use genesoup_core::config::*;
}
pub mod error {
    pub use genesoup_core::error::*;
}
pub mod interpreter {
    pub use genesoup_core::interpreter::*;
}
pub mod kinship {
    pub use genesoup_core::kinship::*;
}
pub mod lifecycle {
    pub use genesoup_core::lifecycle::*;
}
pub mod metrics {
    pub use genesoup_core::metrics::*;
}
pub mod mutation {
    pub use genesoup_core::mutation::*;
}
pub mod physics {
    pub use genesoup_core::physics::*;
}
pub mod program {
    pub use genesoup_core::program::*;
}
pub mod similarity {
    pub use genesoup_core::similarity::*;
}
pub mod simulation {
    pub use genesoup_core::simulation::*;
}
pub mod snapshot {
    pub use genesoup_core::snapshot::*;
}
