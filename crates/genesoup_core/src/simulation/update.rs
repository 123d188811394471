use super::Simulation;
use crate::config::KinshipMode;
use crate::error::Result;
use crate::interpreter::{self, CreatureView, FoodView, Interaction, SenseContext};
use crate::kinship;
use crate::lifecycle;
use crate::physics::Physics;
use genesoup_data::{BodyHandle, Creature, Food, Laser, LiveEvent, Vec2};
use rand::Rng;
use std::collections::HashSet;
use tracing::{debug, trace};
use uuid::Uuid;

/// Offset of a newborn from its parent.
const CHILD_OFFSET: Vec2 = Vec2::new(5.0, 0.0);

impl<P: Physics> Simulation<P> {
    /// Advances the simulation by one tick.
    ///
    /// In order: maybe spawn food, then for every creature alive at tick
    /// start (in spawn order) resolve feeding, its laser, its program, the
    /// interactions its program requested and its metabolism. Finally refill
    /// the population floor.
    ///
    /// # Returns
    /// Births, deaths, mutations, attacks and feedings of this tick.
    pub fn update(&mut self) -> Result<Vec<LiveEvent>> {
        self.tick += 1;
        let mut events = std::mem::take(&mut self.pending_events);

        self.pass_food_spawn();

        let mut views = self.creature_views();
        let mut food_views = self.food_views();
        let order: Vec<hecs::Entity> = views.iter().map(|v| v.entity).collect();
        let had_population = !order.is_empty();

        for entity in order {
            // killed earlier this tick
            if !self.creatures.contains(entity) {
                continue;
            }
            self.pass_feeding(entity, &mut food_views, &mut events);
            self.pass_laser(entity);
            let interactions = self.pass_genes(entity, &views, &food_views);
            self.apply_interactions(entity, interactions, &mut views, &mut events)?;
            self.pass_metabolism(entity, &mut views, &mut events);
        }

        self.refill_population(&mut events)?;
        if had_population && self.population() == 0 {
            tracing::warn!(tick = self.tick, "Population extinct");
            events.push(LiveEvent::Extinction { tick: self.tick });
        }
        Ok(events)
    }

    /// Uniform point at least `margin` away from every wall.
    fn random_position(&mut self, margin: f64) -> Vec2 {
        let (w, h) = (self.config.world.width, self.config.world.height);
        let mx = margin.min(w / 2.0);
        let my = margin.min(h / 2.0);
        Vec2::new(
            self.rng.gen_range(mx..=w - mx),
            self.rng.gen_range(my..=h - my),
        )
    }

    fn pass_food_spawn(&mut self) {
        if lifecycle::should_spawn_food(self.tick, self.food_count(), &self.config) {
            let position = self.random_position(Food::RADIUS);
            self.spawn_food(position);
        }
    }

    /// Eats at most one overlapping pellet, the first the physics reports.
    fn pass_feeding(&mut self, entity: hecs::Entity, food_views: &mut Vec<FoodView>, events: &mut Vec<LiveEvent>) {
        let Ok(body) = self.creatures.get::<&Creature>(entity).map(|c| c.body) else {
            return;
        };
        let handles: Vec<BodyHandle> = food_views.iter().map(|f| f.body).collect();
        let Some(hit) = self.physics.query_shape_overlap(body, &handles).first().copied() else {
            return;
        };
        let Some(food_entity) = self.food_bodies.get(&hit).copied() else {
            return;
        };
        let Some(food) = self.remove_food(food_entity) else {
            return;
        };
        food_views.retain(|f| f.entity != food_entity);

        let Ok(mut creature) = self.creatures.get::<&mut Creature>(entity) else {
            return;
        };
        lifecycle::adjust_hunger(&mut creature, self.config.food.hunger_restore);
        let mass = creature.mass + self.config.food.mass_gain;
        lifecycle::set_mass(&mut creature, mass, &mut self.physics);
        trace!(creature = %creature.id, food = %food.id, "Food eaten");
        events.push(LiveEvent::FoodEaten {
            creature: creature.id,
            food: food.id,
            tick: self.tick,
        });
    }

    fn pass_laser(&mut self, entity: hecs::Entity) {
        let Ok(mut creature) = self.creatures.get::<&mut Creature>(entity) else {
            return;
        };
        let Some(laser) = creature.laser else {
            return;
        };
        let own = self.physics.body_position(creature.body);
        let target = self.physics.body_position(laser.target_body);
        lifecycle::tick_laser(&mut creature, own, target);
    }

    fn pass_genes(
        &mut self,
        entity: hecs::Entity,
        views: &[CreatureView],
        food_views: &[FoodView],
    ) -> Vec<Interaction> {
        let kin = match self.config.kinship.mode {
            KinshipMode::Hue => None,
            KinshipMode::Similarity => Some(self.similarity_kin(entity, views)),
        };
        let population = self.population();
        let Ok(mut creature) = self.creatures.get::<&mut Creature>(entity) else {
            return Vec::new();
        };
        let position = self.physics.body_position(creature.body).unwrap_or_default();
        let ctx = SenseContext {
            creatures: views,
            food: food_views,
            population,
            config: &self.config,
            kin: kin.as_ref(),
        };
        let mut out = Vec::new();
        interpreter::run_turn(
            &mut creature,
            position,
            &ctx,
            &mut self.physics,
            &mut self.rng,
            &mut out,
        );
        out
    }

    /// Ids of every other creature whose genome is similar enough to count
    /// as kin.
    fn similarity_kin(&mut self, entity: hecs::Entity, views: &[CreatureView]) -> HashSet<Uuid> {
        let Ok((id, genetic, threshold)) = self
            .creatures
            .get::<&Creature>(entity)
            .map(|c| (c.id, c.program.genetic_string(), c.traits.family_threshold))
        else {
            return HashSet::new();
        };
        let mut kin = HashSet::new();
        for view in views.iter().filter(|v| v.id != id) {
            let Ok(other) = self.creatures.get::<&Creature>(view.entity) else {
                continue;
            };
            let score = self.similarity.similarity(&genetic, &other.program.genetic_string());
            if kinship::is_similar_kin(score, threshold, view.family_threshold) {
                kin.insert(view.id);
            }
        }
        kin
    }

    fn apply_interactions(
        &mut self,
        actor: hecs::Entity,
        interactions: Vec<Interaction>,
        views: &mut Vec<CreatureView>,
        events: &mut Vec<LiveEvent>,
    ) -> Result<()> {
        for interaction in interactions {
            match interaction {
                Interaction::Attack { target, target_id } => {
                    self.resolve_attack(actor, target, target_id, views, events);
                }
                Interaction::Replicate => self.resolve_replication(actor, views, events)?,
            }
        }
        Ok(())
    }

    /// Applies both sides of an attack. Nothing changes unless the attacker
    /// and the original target are both still alive.
    fn resolve_attack(
        &mut self,
        actor: hecs::Entity,
        target: hecs::Entity,
        target_id: Uuid,
        views: &mut Vec<CreatureView>,
        events: &mut Vec<LiveEvent>,
    ) {
        let Ok((attacker_id, attacker_body)) = self.creatures.get::<&Creature>(actor).map(|c| (c.id, c.body)) else {
            return;
        };
        let target_body = match self.creatures.get::<&Creature>(target) {
            Ok(victim) if victim.id == target_id => victim.body,
            _ => return,
        };
        let from = self.physics.body_position(attacker_body).unwrap_or_default();
        let to = self.physics.body_position(target_body).unwrap_or_default();
        let combat = &self.config.combat;

        if let Ok(mut attacker) = self.creatures.get::<&mut Creature>(actor) {
            attacker.laser = Some(Laser {
                target: target_id,
                target_body,
                timer: combat.laser_ticks,
                from,
                to,
            });
            lifecycle::adjust_hunger(&mut attacker, combat.attacker_hunger_gain);
            let mass = attacker.mass + combat.mass_transfer;
            lifecycle::set_mass(&mut attacker, mass, &mut self.physics);
        }
        let starved = match self.creatures.get::<&mut Creature>(target) {
            Ok(mut victim) => {
                lifecycle::adjust_hunger(&mut victim, -combat.target_hunger_loss);
                let mass = (victim.mass - combat.mass_transfer).max(self.config.metabolism.min_mass);
                lifecycle::set_mass(&mut victim, mass, &mut self.physics);
                victim.is_starved()
            }
            Err(_) => false,
        };
        trace!(attacker = %attacker_id, target = %target_id, "Attack");
        events.push(LiveEvent::Attack {
            attacker: attacker_id,
            target: target_id,
            tick: self.tick,
        });
        if starved {
            self.kill(target, views, events);
        }
    }

    fn resolve_replication(
        &mut self,
        parent_entity: hecs::Entity,
        views: &mut Vec<CreatureView>,
        events: &mut Vec<LiveEvent>,
    ) -> Result<()> {
        let Ok(parent) = self.creatures.get::<&Creature>(parent_entity).map(|c| (*c).clone()) else {
            return Ok(());
        };
        if parent.mass < self.config.metabolism.replicate_mass
            || self.population() >= self.config.world.population_cap
        {
            return Ok(());
        }
        let position = self
            .physics
            .body_position(parent.body)
            .unwrap_or_default()
            .add(CHILD_OFFSET);
        let birth = lifecycle::create_creature(
            Some(&parent),
            position,
            self.tick,
            &self.config,
            &mut self.physics,
            &mut self.rng,
        )?;
        let child = birth.creature;

        if let Ok(mut p) = self.creatures.get::<&mut Creature>(parent_entity) {
            let mass = p.mass - child.mass;
            lifecycle::set_mass(&mut p, mass, &mut self.physics);
        }

        let parent_genetic = parent.program.genetic_string();
        let child_genetic = child.program.genetic_string();
        if parent_genetic == child_genetic {
            debug!(child = %child.id, parent = %parent.id, gen = child.lineage.generation, "Birth");
        } else {
            debug!(
                child = %child.id,
                parent = %parent.id,
                gen = child.lineage.generation,
                "Birth: {parent_genetic} => {child_genetic}"
            );
        }
        events.push(LiveEvent::Birth {
            id: child.id,
            parent_id: Some(parent.id),
            gen: child.lineage.generation,
            tick: self.tick,
        });
        if let Some(op) = birth.operator {
            debug!(child = %child.id, operator = op.name(), "Mutation");
            events.push(LiveEvent::Mutation {
                id: child.id,
                operator: op.name().to_string(),
                tick: self.tick,
            });
        }

        let entity = self.spawn_creature(child);
        if let Ok(c) = self.creatures.get::<&Creature>(entity) {
            views.push(self.view_of(entity, &c));
        }
        Ok(())
    }

    fn pass_metabolism(&mut self, entity: hecs::Entity, views: &mut Vec<CreatureView>, events: &mut Vec<LiveEvent>) {
        let rate = lifecycle::starvation_rate(self.tick, &self.config.metabolism, &self.config.world);
        let starved = match self.creatures.get::<&mut Creature>(entity) {
            Ok(mut creature) => lifecycle::apply_starvation(&mut creature, rate),
            Err(_) => return,
        };
        if starved {
            self.kill(entity, views, events);
        }
    }

    fn kill(&mut self, entity: hecs::Entity, views: &mut Vec<CreatureView>, events: &mut Vec<LiveEvent>) {
        let Some(creature) = self.remove_creature(entity) else {
            return;
        };
        views.retain(|v| v.entity != entity);
        let age = creature.age(self.tick);
        debug!(id = %creature.id, age, "Death");
        events.push(LiveEvent::Death {
            id: creature.id,
            age,
            tick: self.tick,
        });
    }

    /// Spawns fresh creatures until the floor is met, until the cutoff tick.
    pub(crate) fn refill_population(&mut self, events: &mut Vec<LiveEvent>) -> Result<()> {
        while self.population() < self.config.world.population_floor
            && self.tick < self.config.world.floor_cutoff_tick
        {
            let position = self.random_position(0.0);
            let birth = lifecycle::create_creature(
                None,
                position,
                self.tick,
                &self.config,
                &mut self.physics,
                &mut self.rng,
            )?;
            let mut creature = birth.creature;
            lifecycle::set_mass(&mut creature, self.config.world.fresh_spawn_mass, &mut self.physics);
            debug!(id = %creature.id, "Fresh spawn");
            events.push(LiveEvent::Birth {
                id: creature.id,
                parent_id: None,
                gen: creature.lineage.generation,
                tick: self.tick,
            });
            self.spawn_creature(creature);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::AppConfig;
    use crate::lifecycle::CreatureSeed;
    use crate::physics::HeadlessPhysics;
    use crate::program::program_from_indices;
    use crate::simulation::Simulation;
    use genesoup_data::{Creature, Vec2};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use uuid::Uuid;

    fn seeded(seed: u64) -> Simulation<HeadlessPhysics> {
        let mut config = AppConfig::default();
        config.world.seed = Some(seed);
        let physics = HeadlessPhysics::new(config.world.width, config.world.height);
        Simulation::new(config, physics).unwrap()
    }

    #[test]
    fn test_new_fills_floor() {
        let sim = seeded(1);
        assert_eq!(sim.population(), 20);
        assert!(sim.creatures_sorted().iter().all(|c| c.mass == 120.0));
    }

    #[test]
    fn test_first_update_reports_initial_births() {
        let mut sim = seeded(2);
        let events = sim.update().unwrap();
        let births = events
            .iter()
            .filter(|e| matches!(e, genesoup_data::LiveEvent::Birth { parent_id: None, .. }))
            .count();
        assert!(births >= 20);
        assert_eq!(sim.tick, 1);
        assert!(sim.food_count() <= 1);
    }

    fn duel() -> (Simulation<HeadlessPhysics>, hecs::Entity, hecs::Entity) {
        let mut config = AppConfig::default();
        config.world.seed = Some(9);
        config.world.population_floor = 0;
        let physics = HeadlessPhysics::new(config.world.width, config.world.height);
        let mut sim = Simulation::new(config, physics).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let seed = |x: f64, rng: &mut ChaCha8Rng| {
            CreatureSeed::root(program_from_indices(&[15; 20], rng).unwrap(), Vec2::new(x, 100.0), 120.0)
        };
        let attacker = sim.insert_creature(seed(100.0, &mut rng));
        let target = sim.insert_creature(seed(150.0, &mut rng));
        let attacker = sim.creature_ids[&attacker];
        let target = sim.creature_ids[&target];
        sim.creatures.get::<&mut Creature>(attacker).unwrap().hunger = 0.5;
        (sim, attacker, target)
    }

    #[test]
    fn test_attack_applies_both_sides() {
        let (mut sim, attacker, target) = duel();
        let target_id = sim.creatures.get::<&Creature>(target).unwrap().id;
        let (mut views, mut events) = (Vec::new(), Vec::new());
        sim.resolve_attack(attacker, target, target_id, &mut views, &mut events);

        let a = sim.creatures.get::<&Creature>(attacker).unwrap().clone();
        let t = sim.creatures.get::<&Creature>(target).unwrap().clone();
        assert_eq!(a.mass, 140.0);
        assert!((a.hunger - 0.7).abs() < 1e-9);
        let laser = a.laser.unwrap();
        assert_eq!(laser.target, target_id);
        assert_eq!(laser.timer, sim.config.combat.laser_ticks);
        assert_eq!(laser.to, Vec2::new(150.0, 100.0));
        assert_eq!(t.mass, 100.0);
        assert!((t.hunger - 0.75).abs() < 1e-9);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_attack_on_vanished_target_changes_nothing() {
        let (mut sim, attacker, target) = duel();
        let target_id = sim.creatures.get::<&Creature>(target).unwrap().id;
        let before = (*sim.creatures.get::<&Creature>(attacker).unwrap()).clone();
        let (mut views, mut events) = (Vec::new(), Vec::new());

        // the entity now belongs to nobody
        sim.remove_creature(target);
        sim.resolve_attack(attacker, target, target_id, &mut views, &mut events);
        assert_eq!(*sim.creatures.get::<&Creature>(attacker).unwrap(), before);
        assert!(events.is_empty());
    }

    #[test]
    fn test_attack_with_stale_id_changes_nothing() {
        let (mut sim, attacker, target) = duel();
        let before = sim.creatures_sorted();
        let (mut views, mut events) = (Vec::new(), Vec::new());
        sim.resolve_attack(attacker, target, Uuid::nil(), &mut views, &mut events);
        assert_eq!(sim.creatures_sorted(), before);
        assert!(events.is_empty());
    }

    #[test]
    fn test_invariants_hold_over_run() {
        let mut sim = seeded(3);
        for _ in 0..500 {
            sim.advance(1000.0 / 60.0).unwrap();
            for c in sim.creatures_sorted() {
                assert!((0.0..=1.0).contains(&c.hunger));
                assert!(c.mass >= 100.0);
                assert!(c.cursor < c.program.len());
            }
            assert!(sim.population() <= 75);
        }
    }
}
