//! Creature birth, the hunger/mass economy and the time schedules.

use crate::config::{AppConfig, FoodConfig, MetabolismConfig, WorldConfig};
use crate::error::Result;
use crate::kinship::genetic_hue;
use crate::mutation::{self, MutationOperator};
use crate::physics::Physics;
use crate::program::random_program;
use genesoup_data::{Creature, CollisionLayer, Lineage, Program, Shape, Traits, Vec2};
use rand::Rng;
use std::f64::consts::TAU;
use uuid::Uuid;

/// Interpolates from `early` at tick zero towards `steady` as ticks grow,
/// inverse-scaled by `tick / horizon + 1`.
#[must_use]
pub fn decaying_schedule(tick: u64, early: f64, steady: f64, horizon: f64) -> f64 {
    (early - steady) / (tick as f64 / horizon + 1.0) + steady
}

/// Hunger lost per unit mass per tick.
#[must_use]
pub fn starvation_rate(tick: u64, metabolism: &MetabolismConfig, world: &WorldConfig) -> f64 {
    decaying_schedule(
        tick,
        metabolism.starvation_rate_early,
        metabolism.starvation_rate,
        world.schedule_horizon,
    )
}

#[must_use]
pub fn max_food(tick: u64, food: &FoodConfig, world: &WorldConfig) -> f64 {
    decaying_schedule(tick, food.max_food_early, food.max_food, world.schedule_horizon)
}

#[must_use]
pub fn food_spawn_interval(tick: u64, food: &FoodConfig) -> u64 {
    if tick < food.bootstrap_ticks {
        food.early_spawn_interval
    } else {
        food.spawn_interval
    }
}

#[must_use]
pub fn should_spawn_food(tick: u64, food_count: usize, config: &AppConfig) -> bool {
    tick % food_spawn_interval(tick, &config.food) == 0
        && (food_count as f64) < max_food(tick, &config.food, &config.world)
}

/// A freshly built creature and, for mutated offspring, the operator used.
#[derive(Debug, Clone)]
pub struct Birth {
    pub creature: Creature,
    pub mutated: bool,
    pub operator: Option<MutationOperator>,
}

/// Heritable state and placement for a creature about to be embodied.
#[derive(Debug, Clone)]
pub struct CreatureSeed {
    pub program: Program,
    pub traits: Traits,
    pub lineage: Lineage,
    pub position: Vec2,
    pub mass: f64,
}

impl CreatureSeed {
    /// An unparented seed with default traits.
    #[must_use]
    pub fn root(program: Program, position: Vec2, mass: f64) -> Self {
        Self {
            program,
            traits: Traits::default(),
            lineage: Lineage {
                parent_id: None,
                generation: 1,
                mutations: 0,
            },
            position,
            mass,
        }
    }
}

/// Creates the body and the runtime state for `seed`: full hunger, a random
/// heading, a fresh id and a hue derived from the genetic string.
pub fn assemble_creature<P: Physics, R: Rng>(
    seed: CreatureSeed,
    tick: u64,
    physics: &mut P,
    rng: &mut R,
) -> Creature {
    let body = physics.create_body(
        Shape::Circle {
            radius: seed.mass.sqrt(),
        },
        seed.position,
        CollisionLayer::Creature,
    );
    let hue = genetic_hue(&seed.program.genetic_string());
    Creature {
        id: Uuid::from_u128(rng.gen()),
        body,
        lineage: seed.lineage,
        traits: seed.traits,
        program: seed.program,
        hue,
        hunger: 1.0,
        mass: seed.mass,
        direction: rng.gen_range(0.0..TAU),
        cursor: 0,
        pending_jump: None,
        move_delay: 0,
        laser: None,
        birth_tick: tick,
    }
}

/// Builds a creature and its physics body at `position`.
///
/// Unparented creatures draw a first-generation program of default length;
/// children run the mutation engine over their parent's program and traits.
/// The caller owns any mass bookkeeping on the parent.
pub fn create_creature<P: Physics, R: Rng>(
    parent: Option<&Creature>,
    position: Vec2,
    tick: u64,
    config: &AppConfig,
    physics: &mut P,
    rng: &mut R,
) -> Result<Birth> {
    let mass = config.metabolism.birth_mass;
    let (seed, mutated, operator) = match parent {
        Some(parent) => {
            let offspring = mutation::evolve(&parent.program, &parent.traits, &config.evolution, rng)?;
            let seed = CreatureSeed {
                program: offspring.program,
                traits: offspring.traits,
                lineage: Lineage {
                    parent_id: Some(parent.id),
                    generation: parent.lineage.generation + 1,
                    mutations: parent.lineage.mutations + u32::from(offspring.mutated),
                },
                position,
                mass,
            };
            (seed, offspring.mutated, offspring.operator)
        }
        None => {
            let program = random_program(true, Program::DEFAULT_LENGTH, rng)?;
            (CreatureSeed::root(program, position, mass), false, None)
        }
    };
    Ok(Birth {
        creature: assemble_creature(seed, tick, physics, rng),
        mutated,
        operator,
    })
}

/// Sets mass and rescales the body so its radius stays `sqrt(mass)`.
pub fn set_mass<P: Physics>(creature: &mut Creature, mass: f64, physics: &mut P) {
    if creature.mass > 0.0 && mass > 0.0 && mass != creature.mass {
        let factor = mass.sqrt() / creature.mass.sqrt();
        if let Some(anchor) = physics.body_position(creature.body) {
            physics.set_body_scale(creature.body, factor, anchor);
        }
    }
    creature.mass = mass;
}

/// Adds `delta` to hunger, clamped to `[0, 1]`.
pub fn adjust_hunger(creature: &mut Creature, delta: f64) {
    creature.hunger = (creature.hunger + delta).clamp(0.0, 1.0);
}

/// Charges one tick of metabolism. Returns true when the creature starved.
pub fn apply_starvation(creature: &mut Creature, rate: f64) -> bool {
    adjust_hunger(creature, -rate * creature.mass);
    creature.is_starved()
}

/// Counts down the attack laser and refreshes its endpoints.
///
/// `target_position` is `None` when the target body is gone, which releases
/// the laser immediately.
pub fn tick_laser(creature: &mut Creature, own_position: Option<Vec2>, target_position: Option<Vec2>) {
    let keep = match (creature.laser.as_mut(), own_position, target_position) {
        (None, ..) => return,
        (Some(laser), Some(from), Some(to)) if laser.timer > 0 => {
            laser.timer -= 1;
            laser.from = from;
            laser.to = to;
            true
        }
        _ => false,
    };
    if !keep {
        creature.laser = None;
    }
}
