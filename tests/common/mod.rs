pub mod macros;

use genesoup_lib::model::config::AppConfig;
use genesoup_lib::model::lifecycle::CreatureSeed;
use genesoup_lib::model::physics::Physics;
use genesoup_lib::model::program::program_from_indices;
use genesoup_lib::model::simulation::Simulation;
use genesoup_lib::model::{BodyHandle, CollisionLayer, Shape, Traits, Vec2};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

pub const WAIT: usize = 15;
pub const REPLICATE: usize = 14;
pub const ATTACK: usize = 13;

#[allow(dead_code)]
pub fn uniform_program(index: usize) -> Vec<usize> {
    vec![index; 20]
}

/// Physics double: bodies never move and shapes only overlap where a test
/// says they do.
#[derive(Debug, Default)]
#[allow(dead_code)]
pub struct ScriptedPhysics {
    bodies: BTreeMap<BodyHandle, (Vec2, f64)>,
    next_id: u64,
    overlaps: HashMap<BodyHandle, Vec<BodyHandle>>,
    pub forces: Vec<(BodyHandle, Vec2)>,
    pub scales: Vec<(BodyHandle, f64)>,
    pub steps: u32,
}

#[allow(dead_code)]
impl ScriptedPhysics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `a` report `b` from shape-overlap queries.
    pub fn script_overlap(&mut self, a: BodyHandle, b: BodyHandle) {
        self.overlaps.entry(a).or_default().push(b);
    }

    pub fn radius(&self, handle: BodyHandle) -> Option<f64> {
        self.bodies.get(&handle).map(|(_, r)| *r)
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains_key(&handle)
    }
}

impl Physics for ScriptedPhysics {
    fn create_body(&mut self, shape: Shape, position: Vec2, _layer: CollisionLayer) -> BodyHandle {
        let Shape::Circle { radius } = shape;
        self.next_id += 1;
        let handle = BodyHandle(self.next_id);
        self.bodies.insert(handle, (position, radius));
        handle
    }

    fn remove_body(&mut self, handle: BodyHandle) {
        self.bodies.remove(&handle);
    }

    fn apply_force(&mut self, handle: BodyHandle, force: Vec2) {
        self.forces.push((handle, force));
    }

    fn set_body_scale(&mut self, handle: BodyHandle, factor: f64, _anchor: Vec2) {
        if let Some((_, r)) = self.bodies.get_mut(&handle) {
            *r *= factor;
        }
        self.scales.push((handle, factor));
    }

    fn body_position(&self, handle: BodyHandle) -> Option<Vec2> {
        self.bodies.get(&handle).map(|(p, _)| *p)
    }

    fn query_point_overlap(&self, handles: &[BodyHandle], point: Vec2) -> Vec<BodyHandle> {
        handles
            .iter()
            .copied()
            .filter(|h| {
                self.bodies
                    .get(h)
                    .is_some_and(|(p, r)| p.distance(point) <= *r)
            })
            .collect()
    }

    fn query_shape_overlap(&self, handle: BodyHandle, handles: &[BodyHandle]) -> Vec<BodyHandle> {
        let Some(scripted) = self.overlaps.get(&handle) else {
            return Vec::new();
        };
        handles
            .iter()
            .copied()
            .filter(|h| scripted.contains(h) && self.bodies.contains_key(h))
            .collect()
    }

    fn step(&mut self, _dt_ms: f64) {
        self.steps += 1;
    }
}

#[allow(dead_code)]
pub struct CreaturePlan {
    pub genes: Vec<usize>,
    pub position: Vec2,
    pub mass: f64,
    pub traits: Traits,
}

/// Builds a quiet world: no floor refills, no food unless asked for.
#[allow(dead_code)]
pub struct SimulationBuilder {
    config: AppConfig,
    creatures: Vec<CreaturePlan>,
    food: Vec<Vec2>,
}

#[allow(dead_code)]
impl SimulationBuilder {
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.world.seed = Some(7);
        config.world.population_floor = 0;
        config.food.max_food = 0.0;
        config.food.max_food_early = 0.0;
        Self {
            config,
            creatures: Vec::new(),
            food: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.world.seed = Some(seed);
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn with_creature(mut self, genes: Vec<usize>, x: f64, y: f64, mass: f64) -> Self {
        self.creatures.push(CreaturePlan {
            genes,
            position: Vec2::new(x, y),
            mass,
            traits: Traits::default(),
        });
        self
    }

    pub fn with_plan(mut self, plan: CreaturePlan) -> Self {
        self.creatures.push(plan);
        self
    }

    pub fn with_food(mut self, x: f64, y: f64) -> Self {
        self.food.push(Vec2::new(x, y));
        self
    }

    /// Returns the simulation and the ids of the requested creatures, in
    /// insertion order.
    pub fn build(self) -> (Simulation<ScriptedPhysics>, Vec<Uuid>) {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.world.seed.unwrap_or(0));
        let mut sim = Simulation::new(self.config, ScriptedPhysics::new())
            .expect("Failed to create simulation in test builder");
        let mut ids = Vec::new();
        for plan in self.creatures {
            let program = program_from_indices(&plan.genes, &mut rng).expect("bad test program");
            let mut seed = CreatureSeed::root(program, plan.position, plan.mass);
            seed.traits = plan.traits;
            ids.push(sim.insert_creature(seed));
        }
        for position in self.food {
            sim.insert_food(position);
        }
        (sim, ids)
    }
}
