//! The fixed gene catalog.
//!
//! Each entry names an instruction kind, the ticks it blocks its creature for,
//! and whether it may appear in an unparented creature's first program. The
//! table order is the catalog index and must match
//! [`Instruction::catalog_index`].

use crate::error::{Result, SimError};
use genesoup_data::{Gene, Instruction, CATALOG_LEN};
use rand::Rng;
use std::f64::consts::TAU;
use uuid::Uuid;

/// Static description of one catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneRule {
    pub index: usize,
    pub name: &'static str,
    pub time_cost: u32,
    pub first_generation: bool,
}

const fn rule(index: usize, name: &'static str, time_cost: u32, first_generation: bool) -> GeneRule {
    GeneRule {
        index,
        name,
        time_cost,
        first_generation,
    }
}

pub const RULES: [GeneRule; CATALOG_LEN] = [
    rule(0, "move", 100, true),
    rule(1, "change direction to new random", 5, true),
    rule(2, "change direction to same random", 5, true),
    rule(3, "change direction to food in sight", 50, true),
    rule(4, "change direction to family in sight", 10, false),
    rule(5, "change direction away from family in sight", 10, false),
    rule(6, "change direction to enemy in sight", 10, false),
    rule(7, "change direction away from enemy in sight", 10, false),
    rule(8, "jump if family in sight", 5, false),
    rule(9, "jump if enemy in sight", 5, false),
    rule(10, "jump if food in sight", 5, true),
    rule(11, "jump if hungry", 5, false),
    rule(12, "jump if large", 5, false),
    rule(13, "attack nearest", 50, true),
    rule(14, "replicate", 5, true),
    rule(15, "wait", 100, false),
];

const MOVE_POWER_MIN: f64 = 0.0005;
const MOVE_POWER_MAX: f64 = 0.005;
const LARGE_THRESHOLD_MIN: u32 = 100;
const LARGE_THRESHOLD_MAX: u32 = 500;

pub fn gene_rule(index: usize) -> Result<&'static GeneRule> {
    RULES.get(index).ok_or(SimError::UnknownGene(index))
}

pub fn first_generation_indices() -> impl Iterator<Item = usize> {
    RULES.iter().filter(|r| r.first_generation).map(|r| r.index)
}

pub fn new_gene_id<R: Rng>(rng: &mut R) -> Uuid {
    Uuid::from_u128(rng.gen())
}

/// Draws fresh memory for catalog entry `index` inside a program of
/// `program_len` genes.
pub fn build_instruction<R: Rng>(index: usize, program_len: usize, rng: &mut R) -> Result<Instruction> {
    let len = program_len.max(1);
    let ins = match index {
        0 => Instruction::Move {
            power: rng.gen_range(MOVE_POWER_MIN..MOVE_POWER_MAX),
        },
        1 => Instruction::TurnRandom,
        2 => Instruction::TurnFixed {
            direction: rng.gen_range(0.0..TAU),
        },
        3 => Instruction::TurnToFood,
        4 => Instruction::TurnToKin,
        5 => Instruction::TurnFromKin,
        6 => Instruction::TurnToStranger,
        7 => Instruction::TurnFromStranger,
        8 => Instruction::JumpIfKin {
            to: rng.gen_range(0..len),
        },
        9 => Instruction::JumpIfStranger {
            to: rng.gen_range(0..len),
        },
        10 => Instruction::JumpIfFood {
            to: rng.gen_range(0..len),
        },
        11 => Instruction::JumpIfHungry {
            threshold: rng.gen::<f64>(),
            to: rng.gen_range(0..len),
        },
        12 => Instruction::JumpIfLarge {
            threshold: f64::from(rng.gen_range(LARGE_THRESHOLD_MIN..LARGE_THRESHOLD_MAX)),
            to: rng.gen_range(0..len),
        },
        13 => Instruction::Attack,
        14 => Instruction::Replicate,
        15 => Instruction::Wait,
        other => return Err(SimError::UnknownGene(other)),
    };
    Ok(ins)
}

/// Instantiates catalog entry `index` with a fresh id and fresh memory.
pub fn build_gene<R: Rng>(index: usize, program_len: usize, rng: &mut R) -> Result<Gene> {
    let rule = gene_rule(index)?;
    let instruction = build_instruction(index, program_len, rng)?;
    Ok(Gene {
        id: new_gene_id(rng),
        index,
        time_cost: rule.time_cost,
        instruction,
    })
}

/// Picks a uniformly random catalog entry, restricted to first-generation
/// entries when `first_generation` is set, and instantiates it.
pub fn random_gene<R: Rng>(first_generation: bool, program_len: usize, rng: &mut R) -> Result<Gene> {
    let index = if first_generation {
        let eligible: Vec<usize> = first_generation_indices().collect();
        eligible[rng.gen_range(0..eligible.len())]
    } else {
        rng.gen_range(0..CATALOG_LEN)
    };
    build_gene(index, program_len, rng)
}
