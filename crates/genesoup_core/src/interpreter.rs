//! The gene interpreter.
//!
//! Each tick a creature either burns one tick of the delay left by its last
//! instruction, or executes instructions from its cursor until one of them
//! leaves a delay behind (or the per-tick cap is hit). Effects may change the
//! acting creature directly; anything touching another creature or the
//! population is returned as an [`Interaction`] for the orchestrator.

use crate::config::AppConfig;
use crate::kinship;
use crate::lifecycle::adjust_hunger;
use crate::physics::Physics;
use genesoup_data::{BodyHandle, Creature, Instruction, Vec2};
use rand::Rng;
use std::collections::HashSet;
use std::f64::consts::{PI, TAU};
use uuid::Uuid;

/// Read-only view of another creature, captured at tick start.
#[derive(Debug, Clone, Copy)]
pub struct CreatureView {
    pub entity: hecs::Entity,
    pub id: Uuid,
    pub body: BodyHandle,
    pub position: Vec2,
    pub hue: f64,
    pub family_threshold: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct FoodView {
    pub entity: hecs::Entity,
    pub id: Uuid,
    pub body: BodyHandle,
    pub position: Vec2,
}

/// Everything an instruction may sense.
pub struct SenseContext<'a> {
    pub creatures: &'a [CreatureView],
    pub food: &'a [FoodView],
    pub population: usize,
    pub config: &'a AppConfig,
    /// Precomputed kin ids for the acting creature. When absent, kinship is
    /// decided by hue.
    pub kin: Option<&'a HashSet<Uuid>>,
}

impl SenseContext<'_> {
    fn is_kin(&self, creature: &Creature, other: &CreatureView) -> bool {
        match self.kin {
            Some(kin) => kin.contains(&other.id),
            None => kinship::is_kin(
                (creature.hue, creature.traits.family_threshold),
                (other.hue, other.family_threshold),
            ),
        }
    }

    fn nearest_creature(
        &self,
        creature: &Creature,
        position: Vec2,
        range: f64,
        want_kin: bool,
    ) -> Option<&CreatureView> {
        nearest_in_range(
            position,
            range,
            self.creatures
                .iter()
                .filter(|v| v.id != creature.id && self.is_kin(creature, v) == want_kin)
                .map(|v| (v, v.position)),
        )
    }

    fn nearest_food(&self, position: Vec2, range: f64) -> Option<&FoodView> {
        nearest_in_range(position, range, self.food.iter().map(|f| (f, f.position)))
    }
}

/// Effects the orchestrator applies once the acting creature's turn ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    /// Transfer from `target` to the acting creature, applied to both or
    /// neither.
    Attack { target: hecs::Entity, target_id: Uuid },
    Replicate,
}

/// Linear scan for the closest item within `range`. The first of several
/// equally close items wins.
pub fn nearest_in_range<T>(
    origin: Vec2,
    range: f64,
    items: impl IntoIterator<Item = (T, Vec2)>,
) -> Option<T> {
    let mut best: Option<(T, f64)> = None;
    for (item, position) in items {
        let distance = origin.distance(position);
        let closer = best.as_ref().map_or(true, |(_, d)| distance < *d);
        if closer && distance <= range {
            best = Some((item, distance));
        }
    }
    best.map(|(item, _)| item)
}

/// Drives one tick of `creature`'s program. Returns the number of
/// instructions executed.
pub fn run_turn<P: Physics, R: Rng>(
    creature: &mut Creature,
    position: Vec2,
    ctx: &SenseContext<'_>,
    physics: &mut P,
    rng: &mut R,
    out: &mut Vec<Interaction>,
) -> u32 {
    if creature.move_delay > 0 {
        creature.move_delay -= 1;
        return 0;
    }

    let len = creature.program.len();
    let mut ops = 0;
    while creature.move_delay == 0 && ops < ctx.config.evolution.max_ops_per_tick {
        ops += 1;
        if creature.cursor >= len {
            creature.cursor = 0;
        }
        let Some(gene) = creature.program.get(creature.cursor) else {
            break;
        };
        let (instruction, time_cost) = (gene.instruction, gene.time_cost);
        creature.move_delay = time_cost;
        execute(instruction, creature, position, ctx, physics, rng, out);

        creature.cursor = match creature.pending_jump.take() {
            Some(to) if to < len => to,
            Some(_) => rng.gen_range(0..len),
            None => (creature.cursor + 1) % len,
        };
    }
    ops
}

fn execute<P: Physics, R: Rng>(
    instruction: Instruction,
    creature: &mut Creature,
    position: Vec2,
    ctx: &SenseContext<'_>,
    physics: &mut P,
    rng: &mut R,
    out: &mut Vec<Interaction>,
) {
    let vision = creature.traits.vision;
    match instruction {
        Instruction::Move { power } => {
            physics.apply_force(creature.body, Vec2::from_angle(creature.direction, power));
            adjust_hunger(creature, -power * 5.0);
        }
        Instruction::TurnRandom => creature.direction = rng.gen_range(0.0..TAU),
        Instruction::TurnFixed { direction } => creature.direction = direction,
        Instruction::TurnToFood => {
            if let Some(food) = ctx.nearest_food(position, vision) {
                creature.direction = position.angle_to(food.position);
            }
        }
        Instruction::TurnToKin | Instruction::TurnFromKin => {
            if let Some(kin) = ctx.nearest_creature(creature, position, vision, true) {
                let away = matches!(instruction, Instruction::TurnFromKin);
                creature.direction = heading(position, kin.position, away);
            }
        }
        Instruction::TurnToStranger | Instruction::TurnFromStranger => {
            if let Some(stranger) = ctx.nearest_creature(creature, position, vision, false) {
                let away = matches!(instruction, Instruction::TurnFromStranger);
                creature.direction = heading(position, stranger.position, away);
            }
        }
        Instruction::JumpIfKin { to } => {
            if ctx.nearest_creature(creature, position, vision, true).is_some() {
                creature.pending_jump = Some(to);
            }
        }
        Instruction::JumpIfStranger { to } => {
            if ctx.nearest_creature(creature, position, vision, false).is_some() {
                creature.pending_jump = Some(to);
            }
        }
        Instruction::JumpIfFood { to } => {
            if ctx.nearest_food(position, vision).is_some() {
                creature.pending_jump = Some(to);
            }
        }
        Instruction::JumpIfHungry { threshold, to } => {
            if creature.hunger < threshold {
                creature.pending_jump = Some(to);
            }
        }
        Instruction::JumpIfLarge { threshold, to } => {
            if creature.mass > threshold {
                creature.pending_jump = Some(to);
            }
        }
        Instruction::Attack => attack(creature, position, ctx, out),
        Instruction::Replicate => {
            if creature.mass >= ctx.config.metabolism.replicate_mass
                && ctx.population < ctx.config.world.population_cap
            {
                out.push(Interaction::Replicate);
            }
        }
        Instruction::Wait => {}
    }
}

fn heading(from: Vec2, to: Vec2, away: bool) -> f64 {
    let angle = from.angle_to(to);
    if away {
        (angle - PI).rem_euclid(TAU)
    } else {
        angle
    }
}

/// Picks the nearest stranger in range. Both sides of the transfer are left
/// to the orchestrator.
fn attack(creature: &mut Creature, position: Vec2, ctx: &SenseContext<'_>, out: &mut Vec<Interaction>) {
    let Some(target) = ctx.nearest_creature(creature, position, creature.traits.attack_range, false) else {
        creature.move_delay = ctx.config.combat.miss_delay;
        return;
    };
    out.push(Interaction::Attack {
        target: target.entity,
        target_id: target.id,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::HeadlessPhysics;
    use crate::program::program_from_indices;
    use genesoup_data::{Lineage, Program, Traits};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn creature_with(indices: &[usize], physics: &mut HeadlessPhysics, rng: &mut ChaCha8Rng) -> Creature {
        let program = program_from_indices(indices, rng).unwrap();
        let body = physics.create_body(
            genesoup_data::Shape::Circle { radius: 10.0 },
            Vec2::new(100.0, 100.0),
            genesoup_data::CollisionLayer::Creature,
        );
        Creature {
            id: Uuid::from_u128(1),
            body,
            lineage: Lineage {
                parent_id: None,
                generation: 1,
                mutations: 0,
            },
            traits: Traits::default(),
            program,
            hue: 0.0,
            hunger: 1.0,
            mass: 100.0,
            direction: 0.0,
            cursor: 0,
            pending_jump: None,
            move_delay: 0,
            laser: None,
            birth_tick: 0,
        }
    }

    fn view(world: &mut hecs::World, id: u128, position: Vec2, hue: f64) -> CreatureView {
        CreatureView {
            entity: world.spawn(()),
            id: Uuid::from_u128(id),
            body: BodyHandle(1000 + id as u64),
            position,
            hue,
            family_threshold: 0.75,
        }
    }

    fn ctx<'a>(config: &'a AppConfig, creatures: &'a [CreatureView], food: &'a [FoodView]) -> SenseContext<'a> {
        SenseContext {
            creatures,
            food,
            population: creatures.len(),
            config,
            kin: None,
        }
    }

    #[test]
    fn test_nearest_prefers_first_on_tie() {
        let origin = Vec2::ZERO;
        let items = [("a", Vec2::new(3.0, 0.0)), ("b", Vec2::new(0.0, 3.0)), ("c", Vec2::new(9.0, 0.0))];
        assert_eq!(nearest_in_range(origin, 5.0, items), Some("a"));
        assert_eq!(nearest_in_range(origin, 2.0, items), None);
    }

    #[test]
    fn test_delay_blocks_execution() {
        let mut physics = HeadlessPhysics::new(500.0, 500.0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut c = creature_with(&[15; 20], &mut physics, &mut rng);
        let config = AppConfig::default();
        let mut out = Vec::new();

        assert_eq!(run_turn(&mut c, Vec2::ZERO, &ctx(&config, &[], &[]), &mut physics, &mut rng, &mut out), 1);
        assert_eq!(c.move_delay, 100);
        assert_eq!(c.cursor, 1);
        for _ in 0..100 {
            assert_eq!(run_turn(&mut c, Vec2::ZERO, &ctx(&config, &[], &[]), &mut physics, &mut rng, &mut out), 0);
        }
        assert_eq!(c.move_delay, 0);
        assert_eq!(c.cursor, 1);
    }

    #[test]
    fn test_zero_cost_loop_hits_cap() {
        let mut physics = HeadlessPhysics::new(500.0, 500.0);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut c = creature_with(&[15; 20], &mut physics, &mut rng);
        let mut genes = c.program.clone().into_genes();
        for g in &mut genes {
            g.time_cost = 0;
        }
        c.program = Program::new(genes).unwrap();
        let config = AppConfig::default();
        let mut out = Vec::new();
        let ops = run_turn(&mut c, Vec2::ZERO, &ctx(&config, &[], &[]), &mut physics, &mut rng, &mut out);
        assert_eq!(ops, 50);
        assert_eq!(c.cursor, 50 % 20);
    }

    #[test]
    fn test_out_of_range_cursor_wraps() {
        let mut physics = HeadlessPhysics::new(500.0, 500.0);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut c = creature_with(&[15; 20], &mut physics, &mut rng);
        c.cursor = 57;
        let config = AppConfig::default();
        let mut out = Vec::new();
        run_turn(&mut c, Vec2::ZERO, &ctx(&config, &[], &[]), &mut physics, &mut rng, &mut out);
        assert_eq!(c.cursor, 1);
    }

    #[test]
    fn test_jump_if_hungry_redirects_cursor() {
        let mut physics = HeadlessPhysics::new(500.0, 500.0);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut indices = vec![15; 20];
        indices[0] = 11;
        let mut c = creature_with(&indices, &mut physics, &mut rng);
        let mut genes = c.program.clone().into_genes();
        genes[0].instruction = Instruction::JumpIfHungry {
            threshold: 0.5,
            to: 7,
        };
        c.program = Program::new(genes).unwrap();
        c.hunger = 0.4;
        let config = AppConfig::default();
        let mut out = Vec::new();
        run_turn(&mut c, Vec2::ZERO, &ctx(&config, &[], &[]), &mut physics, &mut rng, &mut out);
        assert_eq!(c.cursor, 7);
        assert!(c.pending_jump.is_none());
    }

    #[test]
    fn test_move_costs_hunger() {
        let mut physics = HeadlessPhysics::new(500.0, 500.0);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut c = creature_with(&[0; 20], &mut physics, &mut rng);
        let Instruction::Move { power } = c.program.genes()[0].instruction else {
            panic!("expected move");
        };
        let config = AppConfig::default();
        let mut out = Vec::new();
        run_turn(&mut c, Vec2::ZERO, &ctx(&config, &[], &[]), &mut physics, &mut rng, &mut out);
        assert!((c.hunger - (1.0 - power * 5.0)).abs() < 1e-12);
        assert_eq!(c.move_delay, 100);
    }

    #[test]
    fn test_attack_miss_sets_short_delay() {
        let mut physics = HeadlessPhysics::new(500.0, 500.0);
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let mut c = creature_with(&[13; 20], &mut physics, &mut rng);
        let config = AppConfig::default();
        let mut out = Vec::new();
        run_turn(&mut c, Vec2::ZERO, &ctx(&config, &[], &[]), &mut physics, &mut rng, &mut out);
        assert_eq!(c.move_delay, 5);
        assert!(out.is_empty());
        assert!(c.laser.is_none());
    }

    #[test]
    fn test_attack_hits_nearest_stranger_only() {
        let mut physics = HeadlessPhysics::new(500.0, 500.0);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut world = hecs::World::new();
        let mut c = creature_with(&[13; 20], &mut physics, &mut rng);
        c.hunger = 0.5;
        let me = Vec2::new(100.0, 100.0);
        let kin = view(&mut world, 2, Vec2::new(110.0, 100.0), 0.0);
        let stranger = view(&mut world, 3, Vec2::new(130.0, 100.0), 180.0);
        let far = view(&mut world, 4, Vec2::new(300.0, 100.0), 180.0);
        let views = [kin, stranger, far];
        let config = AppConfig::default();
        let mut out = Vec::new();
        run_turn(&mut c, me, &ctx(&config, &views, &[]), &mut physics, &mut rng, &mut out);

        assert_eq!(
            out,
            vec![Interaction::Attack {
                target: stranger.entity,
                target_id: stranger.id
            }]
        );
        // nothing is applied until the orchestrator resolves the attack
        assert_eq!(c.hunger, 0.5);
        assert_eq!(c.mass, 100.0);
        assert_eq!(c.move_delay, 50);
        assert!(c.laser.is_none());
    }

    #[test]
    fn test_kin_set_overrides_hue() {
        let mut physics = HeadlessPhysics::new(500.0, 500.0);
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut world = hecs::World::new();
        let mut c = creature_with(&[13; 20], &mut physics, &mut rng);
        let stranger_by_hue = view(&mut world, 3, Vec2::new(130.0, 100.0), 180.0);
        let views = [stranger_by_hue];
        let kin: HashSet<Uuid> = [stranger_by_hue.id].into_iter().collect();
        let config = AppConfig::default();
        let ctx = SenseContext {
            kin: Some(&kin),
            ..ctx(&config, &views, &[])
        };
        let mut out = Vec::new();
        run_turn(&mut c, Vec2::new(100.0, 100.0), &ctx, &mut physics, &mut rng, &mut out);
        assert!(out.is_empty());
        assert_eq!(c.move_delay, 5);
    }

    #[test]
    fn test_replicate_threshold() {
        let mut physics = HeadlessPhysics::new(500.0, 500.0);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let config = AppConfig::default();

        for (mass, expected) in [(199.0, 0), (200.0, 1)] {
            let mut c = creature_with(&[14; 20], &mut physics, &mut rng);
            c.mass = mass;
            let mut out = Vec::new();
            run_turn(&mut c, Vec2::ZERO, &ctx(&config, &[], &[]), &mut physics, &mut rng, &mut out);
            assert_eq!(out.len(), expected);
        }
    }

    #[test]
    fn test_replicate_refused_at_cap() {
        let mut physics = HeadlessPhysics::new(500.0, 500.0);
        let mut rng = ChaCha8Rng::seed_from_u64(10);
        let config = AppConfig::default();
        let mut c = creature_with(&[14; 20], &mut physics, &mut rng);
        c.mass = 400.0;
        let ctx = SenseContext {
            population: 75,
            ..ctx(&config, &[], &[])
        };
        let mut out = Vec::new();
        run_turn(&mut c, Vec2::ZERO, &ctx, &mut physics, &mut rng, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_turn_to_food_in_sight() {
        let mut physics = HeadlessPhysics::new(500.0, 500.0);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut world = hecs::World::new();
        let mut c = creature_with(&[3; 20], &mut physics, &mut rng);
        let food = [FoodView {
            entity: world.spawn(()),
            id: Uuid::from_u128(77),
            body: BodyHandle(500),
            position: Vec2::new(100.0, 200.0),
        }];
        let config = AppConfig::default();
        let mut out = Vec::new();
        run_turn(&mut c, Vec2::new(100.0, 100.0), &ctx(&config, &[], &food), &mut physics, &mut rng, &mut out);
        assert!((c.direction - PI / 2.0).abs() < 1e-12);
    }
}
