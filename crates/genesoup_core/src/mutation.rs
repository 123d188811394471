//! The mutation engine.
//!
//! Reproduction clones the parent's program gene by gene and, with
//! probability `mutation_rate`, applies exactly one weighted operator. Jumps
//! are pinned to the id of the gene they point at before mutating and
//! re-resolved to indices afterwards.

use crate::catalog;
use crate::config::EvolutionConfig;
use crate::error::Result;
use genesoup_data::{Gene, Program, Traits};
use rand::Rng;
use uuid::Uuid;

const MAX_SEGMENT: usize = 10;
const TRADEOFF_TOTAL: f64 = 350.0;
const ATTACK_RANGE_MAX: u32 = 175;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationOperator {
    DuplicateSegment,
    InsertSegment,
    DeleteSegment,
    MutateMemory,
    ModifyTraits,
}

impl MutationOperator {
    /// Table order; weights in [`EvolutionConfig::operator_weights`] follow it.
    pub const ALL: [MutationOperator; 5] = [
        MutationOperator::DuplicateSegment,
        MutationOperator::InsertSegment,
        MutationOperator::DeleteSegment,
        MutationOperator::MutateMemory,
        MutationOperator::ModifyTraits,
    ];

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            MutationOperator::DuplicateSegment => "duplicate gene segment",
            MutationOperator::InsertSegment => "random gene segment insertion",
            MutationOperator::DeleteSegment => "random gene segment deletion",
            MutationOperator::MutateMemory => "random gene memory mutation",
            MutationOperator::ModifyTraits => "random trait modification",
        }
    }

    /// Whether the operator may run on a program of `len` genes.
    #[must_use]
    pub fn is_eligible(&self, len: usize) -> bool {
        match self {
            MutationOperator::DuplicateSegment | MutationOperator::InsertSegment => {
                len < Program::MAX_LENGTH
            }
            MutationOperator::DeleteSegment => len > Program::MIN_LENGTH + 10,
            MutationOperator::MutateMemory | MutationOperator::ModifyTraits => true,
        }
    }
}

/// Weighted choice among operators eligible for a program of `len` genes.
///
/// Draws uniformly in `[0, total)` and returns the first operator whose
/// running weight exceeds the draw.
pub fn select_operator<R: Rng>(len: usize, weights: &[u32; 5], rng: &mut R) -> Option<MutationOperator> {
    let eligible: Vec<(MutationOperator, u32)> = MutationOperator::ALL
        .iter()
        .zip(weights.iter())
        .filter(|(op, &w)| w > 0 && op.is_eligible(len))
        .map(|(&op, &w)| (op, w))
        .collect();
    let total: u32 = eligible.iter().map(|(_, w)| w).sum();
    if total == 0 {
        return None;
    }
    let draw = rng.gen_range(0.0..f64::from(total));
    let mut sum = 0.0;
    for (op, w) in eligible {
        sum += f64::from(w);
        if sum > draw {
            return Some(op);
        }
    }
    None
}

/// Result of one reproduction event.
#[derive(Debug, Clone)]
pub struct Offspring {
    pub program: Program,
    pub traits: Traits,
    /// True when the mutation roll succeeded, even if the operator was a
    /// no-op on this program.
    pub mutated: bool,
    pub operator: Option<MutationOperator>,
}

/// Gene plus the id of the gene its jump pointed at before mutation.
#[derive(Debug, Clone)]
struct Slot {
    gene: Gene,
    jump_to: Option<Uuid>,
}

/// Copies every gene with a fresh id. Memory is inherited unless
/// `reclone_memory` is set, in which case it is rebuilt from the catalog.
pub fn clone_genes<R: Rng>(parent: &Program, reclone_memory: bool, rng: &mut R) -> Result<Vec<Gene>> {
    let len = parent.len();
    parent
        .genes()
        .iter()
        .map(|g| {
            if reclone_memory {
                catalog::build_gene(g.index, len, rng)
            } else {
                Ok(Gene {
                    id: catalog::new_gene_id(rng),
                    ..g.clone()
                })
            }
        })
        .collect()
}

/// Produces a child's program and traits from its parent's.
pub fn evolve<R: Rng>(
    parent: &Program,
    traits: &Traits,
    config: &EvolutionConfig,
    rng: &mut R,
) -> Result<Offspring> {
    let genes = clone_genes(parent, config.reclone_memory, rng)?;
    if rng.gen::<f64>() > traits.mutation_rate {
        return Ok(Offspring {
            program: Program::new(genes)?,
            traits: *traits,
            mutated: false,
            operator: None,
        });
    }

    let mut slots: Vec<Slot> = genes
        .iter()
        .map(|g| Slot {
            gene: g.clone(),
            jump_to: g
                .instruction
                .jump_target()
                .and_then(|to| genes.get(to))
                .map(|target| target.id),
        })
        .collect();
    let mut child_traits = *traits;

    let operator = select_operator(slots.len(), &config.operator_weights, rng);
    if let Some(op) = operator {
        apply_operator(op, &mut slots, &mut child_traits, config, rng)?;
    }
    repair_jumps(&mut slots, rng);

    let genes = slots.into_iter().map(|s| s.gene).collect();
    Ok(Offspring {
        program: Program::new(genes)?,
        traits: child_traits,
        mutated: true,
        operator,
    })
}

fn apply_operator<R: Rng>(
    op: MutationOperator,
    slots: &mut Vec<Slot>,
    traits: &mut Traits,
    config: &EvolutionConfig,
    rng: &mut R,
) -> Result<()> {
    let len = slots.len();
    match op {
        MutationOperator::DuplicateSegment => {
            let size = rng.gen_range(1..MAX_SEGMENT);
            let start = rng.gen_range(0..len);
            let at = rng.gen_range(0..len);
            let room = Program::MAX_LENGTH - len;
            let copies: Vec<Slot> = slots[start..(start + size).min(len)]
                .iter()
                .take(room)
                .map(|s| Slot {
                    gene: Gene {
                        id: catalog::new_gene_id(rng),
                        ..s.gene.clone()
                    },
                    jump_to: s.jump_to,
                })
                .collect();
            slots.splice(at..at, copies);
        }
        MutationOperator::InsertSegment => {
            let at = rng.gen_range(0..len);
            let mut segment = vec![fresh_slot(len, rng)?];
            while rng.gen::<f64>() < config.segment_continue_prob
                && len + segment.len() < Program::MAX_LENGTH
            {
                segment.push(fresh_slot(len, rng)?);
            }
            slots.splice(at..at, segment);
        }
        MutationOperator::DeleteSegment => {
            let start = rng.gen_range(0..len);
            let size = rng.gen_range(1..MAX_SEGMENT);
            slots.drain(start..(start + size).min(len));
        }
        MutationOperator::MutateMemory => {
            while rng.gen::<f64>() < config.segment_continue_prob {
                let at = rng.gen_range(0..len);
                let index = slots[at].gene.index;
                slots[at] = Slot {
                    gene: catalog::build_gene(index, len, rng)?,
                    jump_to: None,
                };
            }
        }
        MutationOperator::ModifyTraits => {
            if rng.gen_bool(0.5) {
                let attack_range = f64::from(rng.gen_range(0..ATTACK_RANGE_MAX));
                traits.vision = TRADEOFF_TOTAL - attack_range;
                traits.attack_range = attack_range;
            } else {
                let yoked = rng.gen::<f64>();
                traits.family_threshold = yoked;
                traits.mutation_rate = yoked;
            }
        }
    }
    Ok(())
}

fn fresh_slot<R: Rng>(len: usize, rng: &mut R) -> Result<Slot> {
    Ok(Slot {
        gene: catalog::random_gene(false, len, rng)?,
        jump_to: None,
    })
}

/// Points every jump back at its recorded gene, or at a random index when
/// that gene is gone.
fn repair_jumps<R: Rng>(slots: &mut [Slot], rng: &mut R) {
    let len = slots.len();
    let positions: std::collections::HashMap<Uuid, usize> = slots
        .iter()
        .enumerate()
        .rev()
        .map(|(i, s)| (s.gene.id, i))
        .collect();
    for slot in slots.iter_mut() {
        if slot.gene.instruction.jump_target().is_none() {
            continue;
        }
        let target = slot
            .jump_to
            .and_then(|id| positions.get(&id).copied())
            .unwrap_or_else(|| rng.gen_range(0..len));
        slot.gene.instruction.set_jump_target(target);
    }
}
