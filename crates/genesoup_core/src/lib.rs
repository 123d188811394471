//! # Genesoup Core
//!
//! The deterministic simulation engine for Genesoup, an artificial-life soup
//! of creatures driven by evolvable gene programs.
//!
//! This crate contains:
//! - The fixed gene catalog and program construction
//! - The gene interpreter with its per-tick instruction budget
//! - The mutation engine and jump repair
//! - Hue kinship and the bounded genome-similarity cache
//! - The hunger/mass economy and the food and starvation schedules
//! - The tick orchestrator over `hecs` arenas, behind a physics boundary
//! - Metrics collection and structured logging
//!
//! ## Example
//!
//! ```
//! use genesoup_core::config::AppConfig;
//! use genesoup_core::physics::HeadlessPhysics;
//! use genesoup_core::simulation::Simulation;
//!
//! let mut config = AppConfig::default();
//! config.world.seed = Some(42);
//! let physics = HeadlessPhysics::new(config.world.width, config.world.height);
//! let mut sim = Simulation::new(config, physics).unwrap();
//! for _ in 0..10 {
//!     sim.advance(1000.0 / 60.0).unwrap();
//! }
//! assert!(sim.population() >= 20);
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod kinship;
pub mod lifecycle;
pub mod metrics;
pub mod mutation;
pub mod physics;
pub mod program;
pub mod similarity;
pub mod simulation;
pub mod snapshot;
