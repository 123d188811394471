//! The tick orchestrator.
//!
//! [`Simulation`] is the sole owner of the two arenas, creatures and food.
//! Each is a `hecs::World` holding one component per entity plus its
//! [`SpawnOrder`]; body handles and ids elsewhere are lookups into them.

use crate::config::AppConfig;
use crate::error::Result;
use crate::interpreter::{CreatureView, FoodView};
use crate::lifecycle::{self, CreatureSeed};
use crate::physics::Physics;
use crate::similarity::SimilarityCache;
use crate::snapshot::{CreatureSnapshot, FoodSnapshot, Hsl, LaserSnapshot, WorldSnapshot};
use genesoup_data::{BodyHandle, CollisionLayer, Creature, Food, LiveEvent, Shape, Vec2};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use uuid::Uuid;

pub mod init;
pub mod update;

/// Monotonic insertion counter; iteration always follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpawnOrder(pub u64);

pub struct Simulation<P: Physics> {
    pub config: AppConfig,
    pub tick: u64,
    creatures: hecs::World,
    food: hecs::World,
    creature_bodies: HashMap<BodyHandle, hecs::Entity>,
    creature_ids: HashMap<Uuid, hecs::Entity>,
    food_bodies: HashMap<BodyHandle, hecs::Entity>,
    next_order: u64,
    physics: P,
    rng: ChaCha8Rng,
    similarity: SimilarityCache,
    /// Events raised outside `update`, handed out with the next tick's.
    pending_events: Vec<LiveEvent>,
}

impl<P: Physics> Simulation<P> {
    #[must_use]
    pub fn population(&self) -> usize {
        self.creatures.len() as usize
    }

    #[must_use]
    pub fn food_count(&self) -> usize {
        self.food.len() as usize
    }

    #[must_use]
    pub fn physics(&self) -> &P {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut P {
        &mut self.physics
    }

    #[must_use]
    pub fn similarity_cache(&self) -> &SimilarityCache {
        &self.similarity
    }

    #[must_use]
    pub fn get_creature(&self, id: Uuid) -> Option<Creature> {
        let entity = *self.creature_ids.get(&id)?;
        self.creatures
            .get::<&Creature>(entity)
            .ok()
            .map(|c| (*c).clone())
    }

    /// Runs `f` on a live creature. Mass changes must go through
    /// [`Simulation::set_creature_mass`] to keep the body in step.
    pub fn with_creature_mut<T>(&mut self, id: Uuid, f: impl FnOnce(&mut Creature) -> T) -> Option<T> {
        let entity = *self.creature_ids.get(&id)?;
        let mut creature = self.creatures.get::<&mut Creature>(entity).ok()?;
        Some(f(&mut creature))
    }

    pub fn set_creature_mass(&mut self, id: Uuid, mass: f64) -> bool {
        let Some(&entity) = self.creature_ids.get(&id) else {
            return false;
        };
        let Ok(mut creature) = self.creatures.get::<&mut Creature>(entity) else {
            return false;
        };
        lifecycle::set_mass(&mut creature, mass, &mut self.physics);
        true
    }

    /// Live creatures in spawn order.
    #[must_use]
    pub fn creatures_sorted(&self) -> Vec<Creature> {
        let mut data: Vec<(SpawnOrder, Creature)> = self
            .creatures
            .query::<(&Creature, &SpawnOrder)>()
            .iter()
            .map(|(_, (c, o))| (*o, c.clone()))
            .collect();
        data.sort_by_key(|(o, _)| *o);
        data.into_iter().map(|(_, c)| c).collect()
    }

    /// Food in spawn order.
    #[must_use]
    pub fn food_sorted(&self) -> Vec<Food> {
        let mut data: Vec<(SpawnOrder, Food)> = self
            .food
            .query::<(&Food, &SpawnOrder)>()
            .iter()
            .map(|(_, (f, o))| (*o, *f))
            .collect();
        data.sort_by_key(|(o, _)| *o);
        data.into_iter().map(|(_, f)| f).collect()
    }

    /// Embodies `seed` as a live creature and returns its id.
    pub fn insert_creature(&mut self, seed: CreatureSeed) -> Uuid {
        let creature = lifecycle::assemble_creature(seed, self.tick, &mut self.physics, &mut self.rng);
        let id = creature.id;
        self.spawn_creature(creature);
        id
    }

    /// Places a food pellet and returns its id.
    pub fn insert_food(&mut self, position: Vec2) -> Uuid {
        self.spawn_food(position).id
    }

    /// Creatures whose bodies contain `point`, in spawn order.
    #[must_use]
    pub fn creatures_at(&self, point: Vec2) -> Vec<Creature> {
        let handles: Vec<BodyHandle> = self
            .creatures_sorted()
            .iter()
            .map(|c| c.body)
            .collect();
        self.physics
            .query_point_overlap(&handles, point)
            .into_iter()
            .filter_map(|h| self.creature_bodies.get(&h))
            .filter_map(|e| self.creatures.get::<&Creature>(*e).ok().map(|c| (*c).clone()))
            .collect()
    }

    /// Cached Dice similarity of two live creatures' genetic strings.
    pub fn genome_similarity(&mut self, a: Uuid, b: Uuid) -> Option<f64> {
        let a = self.get_creature(a)?.program.genetic_string();
        let b = self.get_creature(b)?.program.genetic_string();
        Some(self.similarity.similarity(&a, &b))
    }

    #[must_use]
    pub fn snapshot(&self) -> WorldSnapshot {
        let mut creatures = Vec::new();
        let mut lasers = Vec::new();
        for c in self.creatures_sorted() {
            let position = self.physics.body_position(c.body).unwrap_or_default();
            if let Some(laser) = c.laser {
                lasers.push(LaserSnapshot {
                    from: laser.from,
                    to: laser.to,
                });
            }
            creatures.push(CreatureSnapshot {
                id: c.id,
                position,
                radius: c.mass.sqrt(),
                fill: Hsl::fill(c.hue, c.hunger),
                stroke: Hsl::stroke(c.hue),
                hunger: c.hunger,
                mass: c.mass,
                generation: c.lineage.generation,
                genetic: c.program.genetic_string(),
            });
        }
        let food = self
            .food_sorted()
            .into_iter()
            .map(|f| FoodSnapshot {
                id: f.id,
                position: f.position,
            })
            .collect();
        WorldSnapshot {
            tick: self.tick,
            width: self.config.world.width,
            height: self.config.world.height,
            creatures,
            food,
            lasers,
        }
    }

    pub(crate) fn next_order(&mut self) -> SpawnOrder {
        self.next_order += 1;
        SpawnOrder(self.next_order)
    }

    pub(crate) fn spawn_creature(&mut self, creature: Creature) -> hecs::Entity {
        let (id, body) = (creature.id, creature.body);
        let order = self.next_order();
        let entity = self.creatures.spawn((creature, order));
        self.creature_bodies.insert(body, entity);
        self.creature_ids.insert(id, entity);
        entity
    }

    pub(crate) fn spawn_food(&mut self, position: Vec2) -> Food {
        let body = self.physics.create_body(
            Shape::Circle { radius: Food::RADIUS },
            position,
            CollisionLayer::Food,
        );
        let food = Food {
            id: Uuid::from_u128(self.rng.gen()),
            body,
            position,
        };
        let order = self.next_order();
        let entity = self.food.spawn((food, order));
        self.food_bodies.insert(body, entity);
        food
    }

    /// Removes a creature, its body and any laser it owns.
    pub(crate) fn remove_creature(&mut self, entity: hecs::Entity) -> Option<Creature> {
        let creature = self.creatures.remove_one::<Creature>(entity).ok()?;
        // SpawnOrder is all that is left
        let _ = self.creatures.despawn(entity);
        self.creature_bodies.remove(&creature.body);
        self.creature_ids.remove(&creature.id);
        self.physics.remove_body(creature.body);
        Some(creature)
    }

    pub(crate) fn remove_food(&mut self, entity: hecs::Entity) -> Option<Food> {
        let food = self.food.remove_one::<Food>(entity).ok()?;
        let _ = self.food.despawn(entity);
        self.food_bodies.remove(&food.body);
        self.physics.remove_body(food.body);
        Some(food)
    }

    /// Creature views in spawn order, positions read from the physics bodies.
    pub(crate) fn creature_views(&self) -> Vec<CreatureView> {
        let mut data: Vec<(SpawnOrder, CreatureView)> = self
            .creatures
            .query::<(&Creature, &SpawnOrder)>()
            .iter()
            .map(|(entity, (c, o))| (*o, self.view_of(entity, c)))
            .collect();
        data.sort_by_key(|(o, _)| *o);
        data.into_iter().map(|(_, v)| v).collect()
    }

    pub(crate) fn view_of(&self, entity: hecs::Entity, c: &Creature) -> CreatureView {
        CreatureView {
            entity,
            id: c.id,
            body: c.body,
            position: self.physics.body_position(c.body).unwrap_or_default(),
            hue: c.hue,
            family_threshold: c.traits.family_threshold,
        }
    }

    pub(crate) fn food_views(&self) -> Vec<FoodView> {
        let mut data: Vec<(SpawnOrder, FoodView)> = self
            .food
            .query::<(&Food, &SpawnOrder)>()
            .iter()
            .map(|(entity, (f, o))| {
                (
                    *o,
                    FoodView {
                        entity,
                        id: f.id,
                        body: f.body,
                        position: f.position,
                    },
                )
            })
            .collect();
        data.sort_by_key(|(o, _)| *o);
        data.into_iter().map(|(_, v)| v).collect()
    }

    /// Steps the physics collaborator by `dt_ms`, then runs one tick.
    pub fn advance(&mut self, dt_ms: f64) -> Result<Vec<LiveEvent>> {
        self.physics.step(dt_ms);
        self.update()
    }
}
