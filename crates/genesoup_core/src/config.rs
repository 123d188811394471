//! Configuration management for simulation parameters.
//!
//! Strongly-typed structures mapping to `config.toml`. Every field has a
//! default, so a file only needs to name what it overrides.
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [world]
//! width = 1280.0
//! height = 720.0
//! seed = 42
//!
//! [metabolism]
//! starvation_rate = 0.000003
//!
//! [kinship]
//! mode = "Hue"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

/// World-level parameters: spawn area, seeding and population bounds.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f64,
    pub height: f64,
    pub seed: Option<u64>,
    /// Reproduction is refused at or above this live count.
    pub population_cap: usize,
    /// Fresh creatures are spawned while the population is below this.
    pub population_floor: usize,
    /// No floor refills from this tick on.
    pub floor_cutoff_tick: u64,
    pub fresh_spawn_mass: f64,
    /// Tick scale over which the early food and starvation schedules relax.
    pub schedule_horizon: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            seed: None,
            population_cap: 75,
            population_floor: 20,
            floor_cutoff_tick: 50_000,
            fresh_spawn_mass: 120.0,
            schedule_horizon: 250_000.0,
        }
    }
}

/// Food spawning schedule and nutrition.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct FoodConfig {
    /// Steady-state food cap.
    pub max_food: f64,
    /// Food cap at tick zero.
    pub max_food_early: f64,
    pub bootstrap_ticks: u64,
    pub early_spawn_interval: u64,
    pub spawn_interval: u64,
    pub hunger_restore: f64,
    pub mass_gain: f64,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            max_food: 30.0,
            max_food_early: 75.0,
            bootstrap_ticks: 1_000,
            early_spawn_interval: 1,
            spawn_interval: 25,
            hunger_restore: 0.5,
            mass_gain: 20.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct MetabolismConfig {
    /// Steady-state hunger loss per unit mass per tick.
    pub starvation_rate: f64,
    /// Hunger loss per unit mass per tick at tick zero.
    pub starvation_rate_early: f64,
    pub birth_mass: f64,
    pub min_mass: f64,
    pub replicate_mass: f64,
}

impl Default for MetabolismConfig {
    fn default() -> Self {
        Self {
            starvation_rate: 0.000_003,
            starvation_rate_early: 0.000_001,
            birth_mass: 100.0,
            min_mass: 100.0,
            replicate_mass: 200.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct CombatConfig {
    pub mass_transfer: f64,
    pub target_hunger_loss: f64,
    pub attacker_hunger_gain: f64,
    pub laser_ticks: u32,
    /// Delay imposed when an attack finds no target.
    pub miss_delay: u32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            mass_transfer: 20.0,
            target_hunger_loss: 0.25,
            attacker_hunger_gain: 0.2,
            laser_ticks: 25,
            miss_delay: 5,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Hard cap on genes executed by one creature in one tick.
    pub max_ops_per_tick: u32,
    /// Rebuild gene memory from the catalog when cloning instead of
    /// inheriting the parent's constants.
    pub reclone_memory: bool,
    /// Weights for duplicate, insert, delete, memory and trait operators.
    pub operator_weights: [u32; 5],
    pub segment_continue_prob: f64,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            max_ops_per_tick: 50,
            reclone_memory: true,
            operator_weights: [1, 5, 5, 5, 5],
            segment_continue_prob: 0.75,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum KinshipMode {
    /// Circular hue distance against the family threshold.
    #[default]
    Hue,
    /// Genome similarity against the family threshold. Experimental.
    Similarity,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct KinshipConfig {
    pub mode: KinshipMode,
    pub similarity_cache_capacity: usize,
}

impl Default for KinshipConfig {
    fn default() -> Self {
        Self {
            mode: KinshipMode::Hue,
            similarity_cache_capacity: 1_000,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub world: WorldConfig,
    pub food: FoodConfig,
    pub metabolism: MetabolismConfig,
    pub combat: CombatConfig,
    pub evolution: EvolutionConfig,
    pub kinship: KinshipConfig,
    /// Ticks per second for the headless runner. Zero runs unpaced.
    pub target_tps: u64,
}

impl AppConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a
    /// description of the first validation failure.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.world.width > 0.0, "World width must be positive");
        anyhow::ensure!(self.world.height > 0.0, "World height must be positive");
        anyhow::ensure!(
            self.world.population_cap > 0,
            "Population cap must be positive"
        );
        anyhow::ensure!(
            self.world.population_floor <= self.world.population_cap,
            "Population floor must not exceed the population cap"
        );
        anyhow::ensure!(
            self.world.fresh_spawn_mass >= self.metabolism.min_mass,
            "Fresh spawn mass must be at least the minimum mass"
        );

        anyhow::ensure!(
            self.food.max_food >= 0.0 && self.food.max_food_early >= 0.0,
            "Food caps must be non-negative"
        );
        anyhow::ensure!(
            self.food.early_spawn_interval > 0 && self.food.spawn_interval > 0,
            "Food spawn intervals must be positive"
        );
        anyhow::ensure!(
            self.world.schedule_horizon > 0.0,
            "Schedule horizon must be positive"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.food.hunger_restore),
            "Food hunger restore must be in [0.0, 1.0]"
        );

        anyhow::ensure!(
            self.metabolism.starvation_rate >= 0.0 && self.metabolism.starvation_rate_early >= 0.0,
            "Starvation rates must be non-negative"
        );
        anyhow::ensure!(self.metabolism.min_mass > 0.0, "Minimum mass must be positive");
        anyhow::ensure!(
            self.metabolism.birth_mass >= self.metabolism.min_mass,
            "Birth mass must be at least the minimum mass"
        );
        anyhow::ensure!(
            self.metabolism.replicate_mass - self.metabolism.birth_mass >= self.metabolism.min_mass,
            "Replication must leave the parent at or above the minimum mass"
        );

        anyhow::ensure!(
            (0.0..=1.0).contains(&self.combat.target_hunger_loss)
                && (0.0..=1.0).contains(&self.combat.attacker_hunger_gain),
            "Combat hunger deltas must be in [0.0, 1.0]"
        );
        anyhow::ensure!(
            self.combat.mass_transfer >= 0.0,
            "Mass transfer must be non-negative"
        );

        anyhow::ensure!(
            self.evolution.max_ops_per_tick > 0,
            "Max ops per tick must be positive"
        );
        anyhow::ensure!(
            self.evolution.operator_weights.iter().any(|&w| w > 0),
            "At least one mutation operator needs a positive weight"
        );
        anyhow::ensure!(
            (0.0..1.0).contains(&self.evolution.segment_continue_prob),
            "Segment continue probability must be in [0.0, 1.0)"
        );

        anyhow::ensure!(
            self.kinship.similarity_cache_capacity >= 2,
            "Similarity cache capacity must be at least 2"
        );
        Ok(())
    }

    /// Parses and validates a TOML document.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Config file missing, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.food).as_bytes());
        hasher.update(format!("{:?}", self.metabolism).as_bytes());
        hasher.update(format!("{:?}", self.combat).as_bytes());
        hasher.update(format!("{:?}", self.evolution).as_bytes());
        hasher.update(format!("{:?}", self.kinship).as_bytes());
        hex::encode(hasher.finalize())
    }
}
