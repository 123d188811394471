//! Program construction helpers.

use crate::catalog;
use crate::error::Result;
use genesoup_data::{Gene, Program};
use rand::Rng;

/// Builds a program of `len` random genes. First-generation programs only
/// draw catalog entries flagged for unparented creatures.
pub fn random_program<R: Rng>(first_generation: bool, len: usize, rng: &mut R) -> Result<Program> {
    let genes = (0..len)
        .map(|_| catalog::random_gene(first_generation, len, rng))
        .collect::<Result<Vec<Gene>>>()?;
    Ok(Program::new(genes)?)
}

/// Builds a program from explicit catalog indices, memory drawn fresh.
pub fn program_from_indices<R: Rng>(indices: &[usize], rng: &mut R) -> Result<Program> {
    let len = indices.len();
    let genes = indices
        .iter()
        .map(|&i| catalog::build_gene(i, len, rng))
        .collect::<Result<Vec<_>>>()?;
    Ok(Program::new(genes)?)
}
