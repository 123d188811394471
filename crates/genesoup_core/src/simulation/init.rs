use super::Simulation;
use crate::config::AppConfig;
use crate::error::{Result, SimError};
use crate::physics::Physics;
use crate::similarity::SimilarityCache;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

impl<P: Physics> Simulation<P> {
    /// Builds an empty world and fills it up to the population floor.
    ///
    /// A configured seed makes the run reproducible; without one the
    /// generator is seeded from entropy.
    pub fn new(config: AppConfig, physics: P) -> Result<Self> {
        config
            .validate()
            .map_err(|e| SimError::config(e.to_string()))?;
        let rng = match config.world.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let similarity = SimilarityCache::new(config.kinship.similarity_cache_capacity);

        let mut sim = Self {
            config,
            tick: 0,
            creatures: hecs::World::new(),
            food: hecs::World::new(),
            creature_bodies: HashMap::new(),
            creature_ids: HashMap::new(),
            food_bodies: HashMap::new(),
            next_order: 0,
            physics,
            rng,
            similarity,
            pending_events: Vec::new(),
        };
        let mut events = Vec::new();
        sim.refill_population(&mut events)?;
        sim.pending_events = events;

        tracing::info!(
            seed = ?sim.config.world.seed,
            population = sim.population(),
            fingerprint = %sim.config.fingerprint(),
            "Simulation initialised"
        );
        Ok(sim)
    }
}
