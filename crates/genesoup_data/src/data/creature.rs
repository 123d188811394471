use super::geometry::{BodyHandle, Vec2};
use super::program::Program;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Heritable scalar parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Traits {
    /// Sensing radius.
    pub vision: f64,
    pub attack_range: f64,
    /// Kinship tolerance; higher means fewer creatures count as kin.
    pub family_threshold: f64,
    /// Probability that reproduction applies a mutation.
    pub mutation_rate: f64,
}

impl Default for Traits {
    fn default() -> Self {
        Self {
            vision: 275.0,
            attack_range: 75.0,
            family_threshold: 0.75,
            mutation_rate: 0.75,
        }
    }
}

/// Immutable provenance. The parent id is never resolved back to a live
/// creature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lineage {
    pub parent_id: Option<Uuid>,
    pub generation: u32,
    pub mutations: u32,
}

/// Transient attack visual owned by the attacker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Laser {
    pub target: Uuid,
    pub target_body: BodyHandle,
    pub timer: u32,
    pub from: Vec2,
    pub to: Vec2,
}

/// An agent driven by its gene program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creature {
    pub id: Uuid,
    pub body: BodyHandle,
    pub lineage: Lineage,
    pub traits: Traits,
    pub program: Program,
    /// Hue in `[0, 360)`, fixed at birth from the genetic string.
    pub hue: f64,
    /// Satiation in `[0, 1]`; the creature dies at zero.
    pub hunger: f64,
    pub mass: f64,
    /// Facing angle in radians.
    pub direction: f64,
    pub cursor: usize,
    pub pending_jump: Option<usize>,
    pub move_delay: u32,
    pub laser: Option<Laser>,
    pub birth_tick: u64,
}

impl Creature {
    #[must_use]
    pub fn is_starved(&self) -> bool {
        self.hunger <= 0.0
    }

    #[must_use]
    pub fn age(&self, tick: u64) -> u64 {
        tick.saturating_sub(self.birth_tick)
    }
}
